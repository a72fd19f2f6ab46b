//! Axiom-shape analysis for BigCQ.
//!
//! Turns an ACE verbalization of a description-logic axiom ("Every c1 op1 c2")
//! into an [`AxiomShape`]: the predicate of the main verb, the class-axiom
//! domain/range text spans, and the structural elements of each span.
//!
//! Parsing is an external concern behind [`DependencyParser`]. Two providers
//! ship here:
//! - [`PrecomputedParses`]: spaCy-style token lists loaded from JSON,
//! - [`AceHeuristicParser`]: a rule-based parser for the controlled ACE shapes.

use thiserror::Error;

pub mod ace;
pub mod analyzer;
pub mod elements;
pub mod materialize;
pub mod parse;
pub mod precomputed;

pub use ace::AceHeuristicParser;
pub use analyzer::{AxiomShape, ShapeAnalyzer, Span};
pub use elements::{Element, ElementKind};
pub use materialize::{Materialized, PredicateMaterializer, VerbBinding, DEFAULT_VERB_POOL};
pub use parse::{DependencyParser, ParsedSentence, Token};
pub use precomputed::PrecomputedParses;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("parse has no ROOT token")]
    MissingRoot,
    #[error("malformed axiom shape: no subject under the root of `{0}`")]
    MissingSubject(String),
    #[error("malformed axiom shape: no range fragment under the root of `{0}`")]
    MissingRange(String),
    #[error("more property ids than verbs in the pool ({pool_size})")]
    VerbPoolExhausted { pool_size: usize },
    #[error("span {start}..{end} outside sentence of {len} bytes")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ShapeError {
    /// Errors that only invalidate the current row.
    ///
    /// I/O and JSON failures come from loading parser resources and are fatal.
    pub fn is_row_skip(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Json(_))
    }
}
