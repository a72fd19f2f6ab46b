use bigcq_shape::{AceHeuristicParser, AxiomShape, ShapeAnalyzer, ShapeError};

fn analyze(verbalization: &str) -> AxiomShape {
    ShapeAnalyzer::new(AceHeuristicParser::default())
        .analyze(verbalization)
        .expect("analyze")
}

fn elems(set: &std::collections::BTreeSet<bigcq_shape::Element>) -> Vec<&str> {
    let mut out: Vec<&str> = set.iter().map(|e| e.as_str()).collect();
    out.sort();
    out
}

#[test]
fn simple_object_property_axiom() {
    let shape = analyze("Every c1 op1 c2");
    assert_eq!(shape.predicate_id.as_deref(), Some("op1"));
    assert_eq!(shape.domain_text, "c1");
    assert_eq!(shape.range_text, "c2");
    assert_eq!(elems(&shape.domain_elems), vec!["c1"]);
    assert_eq!(elems(&shape.range_elems), vec!["c2"]);
    assert!(!shape.domain_is_complex);
    assert!(!shape.range_is_complex);
    assert!(!shape.is_equivalence);
}

#[test]
fn copula_axiom_has_no_predicate() {
    let shape = analyze("Every c1 is c2");
    assert_eq!(shape.predicate_id, None);
    assert_eq!(shape.domain_text, "c1");
    assert_eq!(shape.range_text, "c2");
}

#[test]
fn article_before_identifier_is_dropped() {
    let shape = analyze("Every c1 is a c2.");
    assert_eq!(shape.range_text, "c2");
    assert_eq!(elems(&shape.range_elems), vec!["c2"]);
}

#[test]
fn two_lines_mark_an_equivalence() {
    let shape = analyze("Every c1 is a c2.\nEvery c2 is a c1.");
    assert!(shape.is_equivalence);
    assert_eq!(shape.domain_text, "c1");

    let shape = analyze("Every c1 is a c2.\n\n");
    assert!(!shape.is_equivalence);
}

#[test]
fn cardinality_makes_range_complex() {
    let shape = analyze("Every c1 op1 at least 2 c2.");
    assert_eq!(shape.range_text, "at least 2 c2");
    assert!(shape.range_is_complex);
    assert_eq!(elems(&shape.range_elems), vec!["at least", "c2"]);
    assert!(shape.range_focus().is_none());
}

#[test]
fn conjoined_range_is_merged() {
    let shape = analyze("Every c1 op1 c2 and op2 c3.");
    assert_eq!(shape.predicate_id.as_deref(), Some("op1"));
    assert_eq!(shape.range_text, "c2 and op2 c3");
    assert_eq!(elems(&shape.range_elems), vec!["c2", "c3", "op2"]);
    assert!(shape.range_is_complex);
}

#[test]
fn relative_clause_stays_in_domain() {
    let shape = analyze("Every c1 that op2 c3 op1 c2.");
    assert_eq!(shape.predicate_id.as_deref(), Some("op1"));
    assert_eq!(shape.domain_text, "c1 that op2 c3");
    assert!(shape.domain_is_complex);
    assert_eq!(shape.range_text, "c2");
    assert!(!shape.range_is_complex);
}

#[test]
fn everything_subject_with_copula() {
    let shape = analyze("Everything that op1 a c2 is a c3.");
    assert_eq!(shape.predicate_id, None);
    assert_eq!(shape.domain_text, "Everything that op1 c2");
    assert_eq!(elems(&shape.domain_elems), vec!["Everything", "c2", "op1"]);
    assert_eq!(shape.range_text, "c3");
}

#[test]
fn range_phrased_as_unnamed_thing() {
    let shape = analyze("Every c1 is something that op1 a c2.");
    assert_eq!(shape.predicate_id, None);
    assert_eq!(shape.range_text, "something that op1 c2");
    assert!(shape.range_is_complex);
}

#[test]
fn sentence_without_subject_is_a_row_skip() {
    let err = ShapeAnalyzer::new(AceHeuristicParser::default())
        .analyze("op1 c2.")
        .unwrap_err();
    assert!(matches!(err, ShapeError::MissingSubject(_)));
    assert!(err.is_row_skip());
}

#[test]
fn materialized_sentence_is_what_the_parser_sees() {
    let analyzer = ShapeAnalyzer::new(AceHeuristicParser::default());
    let m = analyzer.materialize("Every c1 dp1 dt1.\nEvery c2 op1 c1.").unwrap();
    assert_eq!(m.text, "Every c1 uses dt1.");
    assert_eq!(m.bindings.len(), 1);
}
