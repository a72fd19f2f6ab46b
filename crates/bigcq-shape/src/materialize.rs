//! Predicate materialization.
//!
//! ACE verbalizations name properties with artificial ids (`op1`, `dp2`). A
//! dependency parser reads "Every c1 op1 c2" as a run of proper nouns and finds
//! no verb, so before parsing every property id is swapped for a real verb
//! from a fixed pool ("Every c1 uses c2"). After the spans are cut out the
//! substitution is reversed so the ids come back verbatim.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::ShapeError;

/// Verbs handed out to property ids, in discovery order.
pub const DEFAULT_VERB_POOL: [&str; 10] = [
    "uses", "knows", "thinks", "helps", "proves", "shows", "makes", "confirms", "contains",
    "converts",
];

/// One placeholder ↔ verb substitution recorded for a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbBinding {
    pub placeholder: String,
    pub verb: String,
}

/// A sentence with its property ids replaced by verbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materialized {
    pub text: String,
    /// Bindings in first-seen order.
    pub bindings: Vec<VerbBinding>,
}

impl Materialized {
    /// The placeholder whose verb is `verb`, if any.
    pub fn placeholder_for_verb(&self, verb: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.verb == verb)
            .map(|b| b.placeholder.as_str())
    }
}

/// Bidirectional placeholder ↔ verb transform over a fixed verb pool.
#[derive(Debug, Clone)]
pub struct PredicateMaterializer {
    verbs: Vec<String>,
    property_id: Regex,
}

impl Default for PredicateMaterializer {
    fn default() -> Self {
        Self::new(DEFAULT_VERB_POOL.iter().map(|v| v.to_string()).collect())
    }
}

impl PredicateMaterializer {
    pub fn new(verbs: Vec<String>) -> Self {
        Self {
            verbs,
            property_id: Regex::new(r"\b(?:op|dp)[0-9]+\b").expect("static regex"),
        }
    }

    pub fn verbs(&self) -> &[String] {
        &self.verbs
    }

    /// Replace every `op<N>` / `dp<N>` with a pool verb. The pool is indexed by
    /// discovery order within this one sentence.
    pub fn materialize(&self, text: &str) -> Result<Materialized, ShapeError> {
        let mut bindings: Vec<VerbBinding> = Vec::new();
        for m in self.property_id.find_iter(text) {
            if bindings.iter().any(|b| b.placeholder == m.as_str()) {
                continue;
            }
            let verb = self
                .verbs
                .get(bindings.len())
                .ok_or(ShapeError::VerbPoolExhausted {
                    pool_size: self.verbs.len(),
                })?;
            bindings.push(VerbBinding {
                placeholder: m.as_str().to_string(),
                verb: verb.clone(),
            });
        }

        let text = replace_words(
            text,
            bindings
                .iter()
                .map(|b| (b.placeholder.as_str(), b.verb.as_str())),
        )?;
        Ok(Materialized { text, bindings })
    }

    /// Reverse [`materialize`](Self::materialize) on a fragment of the
    /// materialized sentence: "c1 knows c2" → "c1 op2 c2".
    pub fn dematerialize(
        &self,
        text: &str,
        bindings: &[VerbBinding],
    ) -> Result<String, ShapeError> {
        replace_words(
            text,
            bindings
                .iter()
                .map(|b| (b.verb.as_str(), b.placeholder.as_str())),
        )
    }
}

/// Swap whole-word occurrences of each `from` for its `to` in a single pass,
/// so one substitution never feeds another.
fn replace_words<'a>(
    text: &str,
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<String, ShapeError> {
    let pairs: Vec<(&str, &str)> = pairs.collect();
    if pairs.is_empty() {
        return Ok(text.to_string());
    }
    let alternation = pairs
        .iter()
        .map(|(from, _)| regex::escape(from))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&format!(r"\b(?:{alternation})\b"))?;
    Ok(re
        .replace_all(text, |caps: &Captures<'_>| {
            let hit = &caps[0];
            pairs
                .iter()
                .find(|(from, _)| *from == hit)
                .map_or(hit, |(_, to)| *to)
                .to_string()
        })
        .into_owned())
}
