//! SPARQL query generation from the preprocessed axiom pattern.
//!
//! The pattern is the axiom in Turtle with identifiers written as IRIs:
//! `<c1> rdfs:subClassOf [ owl:someValuesFrom <c2> ; owl:onProperty <op1> ] .`
//!
//! `ASK` wraps the pattern as-is; the `SELECT` categories turn the focused
//! identifier into `?x`.

use bigcq_shape::AxiomShape;
use regex::Regex;
use std::sync::OnceLock;

use crate::category::{Category, CategoryMap, Focus};

pub const FOCUS_VAR: &str = "?x";

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\r\n]+").expect("static regex"))
}

/// Collapse whitespace runs to single spaces.
pub fn normalize_pattern(pattern: &str) -> String {
    whitespace().replace_all(pattern.trim(), " ").into_owned()
}

/// Replace the IRI `<id>` with the focus variable.
pub fn focus_on(pattern: &str, id: &str) -> String {
    pattern.replace(&format!("<{id}>"), FOCUS_VAR)
}

fn wrap(category: Category, pattern: &str) -> String {
    if category == Category::Ask {
        format!("ASK WHERE {{ {pattern} }}")
    } else if category.is_count() {
        format!("SELECT (COUNT({FOCUS_VAR}) AS ?cnt) WHERE {{ {pattern} }}")
    } else {
        format!("SELECT {FOCUS_VAR} WHERE {{ {pattern} }}")
    }
}

/// At most one query per category.
pub fn make_queries(turtle_pattern: &str, shape: &AxiomShape) -> CategoryMap<Option<String>> {
    let turtle = normalize_pattern(turtle_pattern);
    CategoryMap::from_fn(|category| {
        if !category.applies_to(shape) {
            return None;
        }
        let body = match category.focus() {
            Focus::Whole => turtle.clone(),
            Focus::Domain => focus_on(&turtle, shape.domain_focus()?.as_str()),
            Focus::Range => focus_on(&turtle, shape.range_focus()?.as_str()),
            Focus::Verb => focus_on(&turtle, shape.predicate_id.as_deref()?),
        };
        Some(wrap(category, &body))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(
            normalize_pattern("  <c1>\n\trdfs:subClassOf   <c2> .\r\n"),
            "<c1> rdfs:subClassOf <c2> ."
        );
    }

    #[test]
    fn focus_replaces_every_occurrence_of_the_iri_only() {
        assert_eq!(
            focus_on("<c1> a <c12> , <c1> .", "c1"),
            "?x a <c12> , ?x ."
        );
    }

    #[test]
    fn wrappers() {
        assert_eq!(wrap(Category::Ask, "p"), "ASK WHERE { p }");
        assert_eq!(wrap(Category::SelectCad, "p"), "SELECT ?x WHERE { p }");
        assert_eq!(
            wrap(Category::SelectCountVerb, "p"),
            "SELECT (COUNT(?x) AS ?cnt) WHERE { p }"
        );
    }
}
