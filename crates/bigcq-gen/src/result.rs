//! Per-row generation result: questions and queries keyed by category.

use bigcq_shape::AxiomShape;
use serde::Serialize;
use tracing::debug;

use crate::catalog::TemplateCatalog;
use crate::category::{Category, CategoryMap};
use crate::cq::CqGenerator;
use crate::sparql::make_queries;
use crate::{GenerationError, GeneratorConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    /// Paraphrased questions; may contain duplicates until serialization.
    pub cqs: CategoryMap<Vec<String>>,
    pub queries: CategoryMap<Option<String>>,
}

/// Which side of a category was dropped by [`GenerationResult::align`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misalignment {
    QueryWithoutQuestions,
    QuestionsWithoutQuery,
}

impl GenerationResult {
    /// Drop queries with no questions and questions with no query.
    pub fn align(&mut self) -> Vec<(Category, Misalignment)> {
        let mut dropped = Vec::new();
        for category in Category::ALL {
            let has_cqs = !self.cqs.get(category).is_empty();
            let has_query = self.queries.get(category).is_some();
            match (has_cqs, has_query) {
                (false, true) => {
                    self.queries.set(category, None);
                    dropped.push((category, Misalignment::QueryWithoutQuestions));
                }
                (true, false) => {
                    self.cqs.set(category, Vec::new());
                    dropped.push((category, Misalignment::QuestionsWithoutQuery));
                }
                _ => {}
            }
        }
        dropped
    }

    /// Categories holding both questions and a query.
    pub fn populated(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&c| !self.cqs.get(c).is_empty() && self.queries.get(c).is_some())
            .collect()
    }

    /// `(query, questions)` pairs for the populated categories.
    pub fn pairs(&self) -> impl Iterator<Item = (Category, &str, &[String])> {
        Category::ALL.into_iter().filter_map(|c| {
            let query = self.queries.get(c).as_deref()?;
            Some((c, query, self.cqs.get(c).as_slice()))
        })
    }
}

/// Full per-row generation: questions, paraphrases, queries, alignment.
pub fn generate(
    catalog: &TemplateCatalog,
    config: &GeneratorConfig,
    shape: &AxiomShape,
    turtle_pattern: &str,
) -> Result<GenerationResult, GenerationError> {
    let generator = CqGenerator::new(catalog, config);
    let mut budget = generator.budget();
    let materialized = generator.make_cqs_within(shape, &mut budget)?;
    let mut cqs: CategoryMap<Vec<String>> = CategoryMap::default();
    for (category, set) in materialized.iter() {
        let list: Vec<&String> = set.iter().collect();
        cqs.set(category, generator.paraphrase_cqs(&list, &mut budget)?);
    }
    let queries = make_queries(turtle_pattern, shape);

    let mut result = GenerationResult { cqs, queries };
    for (category, side) in result.align() {
        debug!(%category, ?side, "dropped misaligned category");
    }
    Ok(result)
}
