//! Axiom-shape analysis.
//!
//! Given an ACE verbalization ("Every c1 op1 c2.") the analyzer finds:
//! - the predicate id of the main verb (absent for copula axioms),
//! - the class-axiom domain (subject subtree) and range (complement subtree),
//! - the structural elements of each side and whether it is complex.
//!
//! Pipeline per sentence:
//!
//! ```text
//! verbalization ──► first line ──► materialize (op1 → uses)
//!                                        │
//!                                        ▼
//!                                 external parse
//!                                        │
//!                   root / nsubj / attr|dobj|prep|conj subtrees
//!                                        │
//!                                        ▼
//!             slice spans ──► dematerialize ──► elements ──► strip "a "
//! ```

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::elements::{describe, strip_articles, Element};
use crate::materialize::{Materialized, PredicateMaterializer};
use crate::parse::{dep, DependencyParser, ParsedSentence};
use crate::ShapeError;

/// Half-open byte range into the materialized sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Structural decomposition of one verbalized axiom.
///
/// Built once per input row; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxiomShape {
    /// `op<N>`/`dp<N>` of the main verb; `None` when the root is a copula.
    pub predicate_id: Option<String>,
    /// Class-axiom domain ("CAD").
    pub domain_text: String,
    /// Class-axiom range ("CAR").
    pub range_text: String,
    pub domain_is_complex: bool,
    pub range_is_complex: bool,
    pub domain_elems: BTreeSet<Element>,
    pub range_elems: BTreeSet<Element>,
    /// ACE writes equivalence axioms on two lines.
    pub is_equivalence: bool,
}

impl AxiomShape {
    /// Domain is a single named element and can become a query focus.
    pub fn domain_is_focusable(&self) -> bool {
        !self.domain_is_complex && !self.domain_elems.is_empty()
    }

    /// Range is a single named element and can become a query focus.
    pub fn range_is_focusable(&self) -> bool {
        !self.range_is_complex && !self.range_elems.is_empty()
    }

    /// The lone domain element, when [`domain_is_focusable`](Self::domain_is_focusable).
    pub fn domain_focus(&self) -> Option<&Element> {
        self.domain_is_focusable()
            .then(|| self.domain_elems.iter().next())
            .flatten()
    }

    /// The lone range element, when [`range_is_focusable`](Self::range_is_focusable).
    pub fn range_focus(&self) -> Option<&Element> {
        self.range_is_focusable()
            .then(|| self.range_elems.iter().next())
            .flatten()
    }
}

/// Read-only analysis context: a parser plus the verb pool.
///
/// One instance is shared by every row; nothing in it changes per call.
pub struct ShapeAnalyzer<P> {
    parser: P,
    materializer: PredicateMaterializer,
}

impl<P: DependencyParser> ShapeAnalyzer<P> {
    pub fn new(parser: P) -> Self {
        Self::with_materializer(parser, PredicateMaterializer::default())
    }

    pub fn with_materializer(parser: P, materializer: PredicateMaterializer) -> Self {
        Self {
            parser,
            materializer,
        }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn materializer(&self) -> &PredicateMaterializer {
        &self.materializer
    }

    /// First line of the verbalization with its property ids materialized;
    /// this is the exact sentence handed to the parser.
    pub fn materialize(&self, verbalization: &str) -> Result<Materialized, ShapeError> {
        self.materializer.materialize(first_line(verbalization))
    }

    pub fn analyze(&self, verbalization: &str) -> Result<AxiomShape, ShapeError> {
        let is_equivalence = verbalization
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .count()
            > 1;

        let materialized = self.materialize(verbalization)?;
        let doc = self.parser.parse(&materialized.text)?;
        self.analyze_parsed(&doc, &materialized, is_equivalence)
    }

    /// Shape extraction over an already-parsed materialized sentence.
    pub fn analyze_parsed(
        &self,
        doc: &ParsedSentence,
        materialized: &Materialized,
        is_equivalence: bool,
    ) -> Result<AxiomShape, ShapeError> {
        let root = doc.root().ok_or(ShapeError::MissingRoot)?;
        let predicate_id = materialized
            .placeholder_for_verb(&doc.token(root).text)
            .map(str::to_string);

        let domain_span = doc
            .children(root)
            .iter()
            .find(|&&child| doc.token(child).dep == dep::NSUBJ)
            .and_then(|&child| subtree_span(doc, child))
            .ok_or_else(|| ShapeError::MissingSubject(doc.text().to_string()))?;

        let range_spans: Vec<Span> = doc
            .children(root)
            .iter()
            .filter(|&&child| dep::RANGE_LABELS.contains(&doc.token(child).dep.as_str()))
            .filter_map(|&child| subtree_span(doc, child))
            .collect();
        let range_span = merge_conjunction_spans(doc.text(), &range_spans)
            .ok_or_else(|| ShapeError::MissingRange(doc.text().to_string()))?;

        let domain_raw = self.slice(doc.text(), domain_span, materialized)?;
        let range_raw = self.slice(doc.text(), range_span, materialized)?;

        let domain = describe(&domain_raw);
        let range = describe(&range_raw);

        let shape = AxiomShape {
            predicate_id,
            domain_text: strip_articles(&domain_raw),
            range_text: strip_articles(&range_raw),
            domain_is_complex: domain.is_complex,
            range_is_complex: range.is_complex,
            domain_elems: domain.elements,
            range_elems: range.elements,
            is_equivalence,
        };
        debug!(
            sentence = %doc.text(),
            predicate = ?shape.predicate_id,
            domain = %shape.domain_text,
            range = %shape.range_text,
            "analyzed axiom shape"
        );
        Ok(shape)
    }

    fn slice(
        &self,
        text: &str,
        span: Span,
        materialized: &Materialized,
    ) -> Result<String, ShapeError> {
        let raw = text
            .get(span.start..span.end)
            .ok_or(ShapeError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: text.len(),
            })?;
        self.materializer
            .dematerialize(raw, &materialized.bindings)
    }
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

/// Byte extent of the subtree under `token`, not counting a leading "every"
/// determiner or sentence-final punctuation.
pub fn subtree_span(doc: &ParsedSentence, token: usize) -> Option<Span> {
    let subtree = doc.subtree(token);
    let start = subtree
        .iter()
        .map(|&i| doc.token(i))
        .filter(|t| !t.text.is_empty() && !t.text.eq_ignore_ascii_case("every"))
        .map(|t| t.idx)
        .min()?;
    let end = subtree
        .iter()
        .map(|&i| doc.token(i))
        .filter(|t| !t.text.is_empty() && t.text != "!" && t.text != ".")
        .map(|t| t.end())
        .max()?;
    (start <= end).then_some(Span { start, end })
}

/// Two range fragments separated only by "and" become one span; otherwise the
/// first fragment is the range.
///
/// Three or more conjuncts are not merged.
pub fn merge_conjunction_spans(text: &str, spans: &[Span]) -> Option<Span> {
    if let [first, second] = spans {
        let between = text.get(first.end..second.start).map(str::trim);
        if between == Some("and") {
            return Some(Span {
                start: first.start,
                end: second.end,
            });
        }
    }
    if spans.len() > 2 {
        debug!(fragments = spans.len(), "range has more than two fragments; keeping the first");
    }
    spans.first().copied()
}
