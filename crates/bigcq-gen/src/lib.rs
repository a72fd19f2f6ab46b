//! Template materialization for BigCQ.
//!
//! Given an [`AxiomShape`](bigcq_shape::AxiomShape), produce:
//! - natural-language competency questions per [`Category`], by expanding
//!   template families with synonym sets and filling the shape's spans in;
//! - one SPARQL query per category, by turning the focused identifier of the
//!   axiom pattern into `?x`.
//!
//! Both sides gate categories through [`Category::applies_to`], so every
//! query has questions and vice versa.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub mod catalog;
pub mod category;
pub mod cq;
pub mod paraphrase;
pub mod result;
pub mod sparql;
pub mod synsets;

pub use catalog::{FamilyKind, TemplateCatalog, TemplateFamily, TemplatePaths};
pub use category::{Category, CategoryMap, Focus};
pub use cq::{Budget, CqGenerator};
pub use paraphrase::{match_paraphrasable, paraphrase_cqs, ParaphraseMatch};
pub use result::{generate, GenerationResult, Misalignment};
pub use sparql::make_queries;
pub use synsets::{unresolved_markers, SynonymDictionary, SynsetExpander};

/// Default per-row cap on materialized template variants.
pub const DEFAULT_MAX_VARIANTS_PER_ROW: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `None` disables the cap.
    pub max_variants_per_row: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_variants_per_row: Some(DEFAULT_MAX_VARIANTS_PER_ROW),
        }
    }
}

/// Configuration-load failures. Always fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("template family {kind} not found at {}", path.display())]
    MissingFamily { kind: &'static str, path: PathBuf },
    #[error("unknown question category `{key}` in {family}")]
    UnknownCategory { family: String, key: String },
    #[error("synonym key `{0}` is not a bracketed marker")]
    InvalidMarker(String),
    #[error("synonym set `{0}` has no replacements")]
    EmptySynset(String),
    #[error("synonym key `{0}` is declared twice")]
    DuplicateMarker(String),
}

/// Per-row generation failures; the row is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("row would materialize {requested} variants (limit {limit})")]
    VariantLimitExceeded { limit: usize, requested: usize },
}
