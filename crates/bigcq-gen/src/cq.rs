//! Competency-question materialization.
//!
//! For each applicable category the generator expands the category's templates
//! through the synonym dictionary, then fills the `{CAD}`, `{CAR}` and `{VERB}`
//! placeholders from the axiom shape.
//!
//! Verb axioms ("Every c1 op1 c2") draw on both families:
//! - SPO templates get all three placeholders;
//! - subclass templates have no verb slot, so `{CAR}` becomes
//!   "something that op1 c2".
//!
//! Copula axioms ("Every c1 is c2") use only the subclass family and never
//! produce verb questions.

use bigcq_shape::AxiomShape;
use std::collections::BTreeSet;
use tracing::trace;

use crate::catalog::TemplateCatalog;
use crate::category::{Category, CategoryMap, Focus};
use crate::paraphrase::paraphrase_cqs;
use crate::synsets::SynsetExpander;
use crate::{GenerationError, GeneratorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Cad,
    Car,
    Verb,
}

impl Placeholder {
    fn token(self) -> &'static str {
        match self {
            Placeholder::Cad => "{CAD}",
            Placeholder::Car => "{CAR}",
            Placeholder::Verb => "{VERB}",
        }
    }
}

/// Per-row cap on materialized variants, shared by the template pass and
/// the paraphrase pass.
#[derive(Debug, Clone)]
pub struct Budget {
    limit: Option<usize>,
    used: usize,
}

impl Budget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn charge(&mut self, n: usize) -> Result<(), GenerationError> {
        self.used = self.used.saturating_add(n);
        match self.limit {
            Some(limit) if self.used > limit => Err(GenerationError::VariantLimitExceeded {
                limit,
                requested: self.used,
            }),
            _ => Ok(()),
        }
    }
}

pub struct CqGenerator<'a> {
    catalog: &'a TemplateCatalog,
    config: &'a GeneratorConfig,
}

impl<'a> CqGenerator<'a> {
    pub fn new(catalog: &'a TemplateCatalog, config: &'a GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn expander(&self) -> SynsetExpander<'a> {
        SynsetExpander::new(&self.catalog.synonyms)
    }

    /// A fresh budget at the configured per-row cap.
    pub fn budget(&self) -> Budget {
        Budget::new(self.config.max_variants_per_row)
    }

    /// Question surface forms per category, deduplicated.
    pub fn make_cqs(
        &self,
        shape: &AxiomShape,
    ) -> Result<CategoryMap<BTreeSet<String>>, GenerationError> {
        self.make_cqs_within(shape, &mut self.budget())
    }

    /// [`make_cqs`](Self::make_cqs) charging an existing budget.
    pub fn make_cqs_within(
        &self,
        shape: &AxiomShape,
        budget: &mut Budget,
    ) -> Result<CategoryMap<BTreeSet<String>>, GenerationError> {
        let mut cqs: CategoryMap<BTreeSet<String>> = CategoryMap::default();
        let spo = self.catalog.spo_family(shape.is_equivalence);
        let subclass = self.catalog.subclass_family(shape.is_equivalence);

        for category in Category::ALL {
            if !category.applies_to(shape) {
                continue;
            }
            let questions = match (&shape.predicate_id, category.focus()) {
                (Some(_), Focus::Whole) => self.both_families(
                    shape,
                    category,
                    &[Placeholder::Car, Placeholder::Verb, Placeholder::Cad],
                    budget,
                )?,
                (Some(_), Focus::Domain) => self.both_families(
                    shape,
                    category,
                    &[Placeholder::Car, Placeholder::Verb],
                    budget,
                )?,
                (Some(_), Focus::Range) => self.fill(
                    shape,
                    spo.get(category),
                    &[Placeholder::Cad, Placeholder::Verb],
                    false,
                    budget,
                )?,
                (Some(_), Focus::Verb) => self.fill(
                    shape,
                    spo.get(category),
                    &[Placeholder::Cad, Placeholder::Car],
                    false,
                    budget,
                )?,
                (None, Focus::Whole) => self.fill(
                    shape,
                    subclass.get(category),
                    &[Placeholder::Cad, Placeholder::Car],
                    false,
                    budget,
                )?,
                (None, Focus::Domain) => self.fill(
                    shape,
                    subclass.get(category),
                    &[Placeholder::Car],
                    false,
                    budget,
                )?,
                (None, Focus::Range) => self.fill(
                    shape,
                    subclass.get(category),
                    &[Placeholder::Cad],
                    false,
                    budget,
                )?,
                (None, Focus::Verb) => continue,
            };
            trace!(%category, count = questions.len(), "materialized questions");
            cqs.set(category, questions);
        }
        Ok(cqs)
    }

    /// Second pass over one category's questions; see [`paraphrase_cqs`].
    pub fn paraphrase_cqs<S: AsRef<str>>(
        &self,
        cqs: &[S],
        budget: &mut Budget,
    ) -> Result<Vec<String>, GenerationError> {
        paraphrase_cqs(&self.expander(), cqs, budget)
    }

    fn both_families(
        &self,
        shape: &AxiomShape,
        category: Category,
        placeholders: &[Placeholder],
        budget: &mut Budget,
    ) -> Result<BTreeSet<String>, GenerationError> {
        let with_verb: Vec<Placeholder> = placeholders
            .iter()
            .copied()
            .chain(std::iter::once(Placeholder::Verb))
            .fold(Vec::new(), |mut acc, p| {
                if !acc.contains(&p) {
                    acc.push(p);
                }
                acc
            });
        let without_verb: Vec<Placeholder> = placeholders
            .iter()
            .copied()
            .filter(|p| *p != Placeholder::Verb)
            .collect();

        let spo = self.catalog.spo_family(shape.is_equivalence);
        let subclass = self.catalog.subclass_family(shape.is_equivalence);

        let mut out = self.fill(shape, spo.get(category), &with_verb, false, budget)?;
        out.extend(self.fill(shape, subclass.get(category), &without_verb, true, budget)?);
        Ok(out)
    }

    /// Expand `templates` and substitute `placeholders`.
    ///
    /// With `attach_verb_to_car`, `{VERB}` is left alone and `{CAR}` becomes
    /// "something that <verb> <car>".
    fn fill(
        &self,
        shape: &AxiomShape,
        templates: &[String],
        placeholders: &[Placeholder],
        attach_verb_to_car: bool,
        budget: &mut Budget,
    ) -> Result<BTreeSet<String>, GenerationError> {
        let expander = self.expander();
        let mut variants = Vec::new();
        for template in templates {
            budget.charge(expander.variant_count(template))?;
            variants.extend(expander.expand(template));
        }

        let domain = shape.domain_text.to_lowercase();
        let range = shape.range_text.to_lowercase();
        let verb = shape
            .predicate_id
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let mut replacements: Vec<(&'static str, String)> = Vec::new();
        for &placeholder in placeholders {
            let value = match placeholder {
                Placeholder::Verb if attach_verb_to_car => continue,
                Placeholder::Car if attach_verb_to_car => format!("something that {verb} {range}"),
                Placeholder::Cad => domain.clone(),
                Placeholder::Car => range.clone(),
                Placeholder::Verb => verb.clone(),
            };
            replacements.push((placeholder.token(), value));
        }

        Ok(variants
            .into_iter()
            .map(|mut q| {
                for (token, value) in &replacements {
                    q = q.replace(token, value);
                }
                q
            })
            .collect())
    }
}
