use bigcq_shape::elements::describe;
use bigcq_shape::PredicateMaterializer;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    proptest::string::string_regex("(c|dt|i|dp|op)[1-9][0-9]?").unwrap()
}

fn sentence_word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Every".to_string()),
        Just("is".to_string()),
        Just("a".to_string()),
        Just("that".to_string()),
        Just("and".to_string()),
        identifier(),
    ]
}

fn filler() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            Just("something".to_string()),
            Just("that".to_string()),
            Just("or".to_string()),
            Just("and".to_string()),
            Just("is".to_string()),
        ],
        0..4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn dematerialize_restores_every_identifier(words in proptest::collection::vec(sentence_word(), 1..10)) {
        let text = words.join(" ");
        let m = PredicateMaterializer::default();
        let materialized = m.materialize(&text).expect("pool is large enough");
        prop_assert!(!materialized.text.contains("op"));
        prop_assert_eq!(
            m.dematerialize(&materialized.text, &materialized.bindings).expect("valid pattern"),
            text
        );
    }

    #[test]
    fn second_distinct_identifier_flips_complexity(
        first in identifier(),
        second in identifier(),
        pre in filler(),
        post in filler(),
    ) {
        prop_assume!(first != second);
        let mut words = pre.clone();
        words.push(first.clone());
        words.extend(post.iter().cloned());
        let single = describe(&words.join(" "));
        prop_assert!(!single.is_complex);
        prop_assert_eq!(single.elements.len(), 1);

        words.push(second);
        let double = describe(&words.join(" "));
        prop_assert!(double.is_complex);
        prop_assert_eq!(double.elements.len(), 2);
    }

    #[test]
    fn span_without_identifiers_is_empty(words in filler()) {
        let c = describe(&words.join(" "));
        prop_assert!(c.elements.is_empty());
        prop_assert!(!c.is_complex);
    }
}
