use bigcq_gen::{unresolved_markers, SynonymDictionary, SynsetExpander};
use proptest::prelude::*;

fn marker() -> impl Strategy<Value = String> {
    proptest::string::string_regex("\\[[a-z]{1,6}\\]").unwrap()
}

fn phrase() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,8}( [a-z]{1,8})?").unwrap()
}

fn plain_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z{}A-Z0-9 ?]{0,40}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn templates_without_markers_expand_to_themselves(template in plain_text(), m in marker(), r in phrase()) {
        let dict = SynonymDictionary::new(vec![(m, vec![r])]).unwrap();
        let out = SynsetExpander::new(&dict).expand(&template);
        prop_assert_eq!(out, vec![template]);
    }

    #[test]
    fn two_markers_multiply(
        a in proptest::collection::vec(phrase(), 1..5),
        b in proptest::collection::vec(phrase(), 1..5),
    ) {
        let dict = SynonymDictionary::new(vec![
            ("[first]".to_string(), a.clone()),
            ("[second]".to_string(), b.clone()),
        ])
        .unwrap();
        let expander = SynsetExpander::new(&dict);
        let template = "[first] {CAD} [second] {CAR}?";
        let out = expander.expand(template);
        prop_assert_eq!(out.len(), a.len() * b.len());
        prop_assert_eq!(expander.variant_count(template), a.len() * b.len());
        prop_assert_eq!(&out[0], &format!("{} {{CAD}} {} {{CAR}}?", a[0], b[0]));
    }

    #[test]
    fn expansion_leaves_no_known_marker(words in proptest::collection::vec(
        prop_oneof![
            Just("[what]".to_string()),
            Just("[kind]".to_string()),
            Just("of".to_string()),
            Just("{CAD}".to_string()),
        ],
        0..6,
    )) {
        let dict = SynonymDictionary::from_json_str(
            r#"{"[what]": ["what", "which"], "[kind]": ["kind", "type"]}"#,
        )
        .unwrap();
        for variant in SynsetExpander::new(&dict).expand(&words.join(" ")) {
            prop_assert!(unresolved_markers(&variant).is_empty(), "left over in {variant:?}");
        }
    }

    #[test]
    fn count_matches_expansion_when_phrases_nest_markers(
        outer in proptest::collection::vec(
            prop_oneof![phrase(), phrase().prop_map(|p| format!("{p} [inner]"))],
            1..4,
        ),
        inner in proptest::collection::vec(phrase(), 1..4),
        with_inner in any::<bool>(),
    ) {
        let dict = SynonymDictionary::new(vec![
            ("[outer]".to_string(), outer),
            ("[inner]".to_string(), inner),
        ])
        .unwrap();
        let expander = SynsetExpander::new(&dict);
        let template = if with_inner { "[outer] and [inner]?" } else { "[outer]?" };
        prop_assert_eq!(expander.variant_count(template), expander.expand(template).len());
    }
}
