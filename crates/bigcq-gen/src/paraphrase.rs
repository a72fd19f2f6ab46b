//! Paraphrase pass over generated questions.
//!
//! Questions of the form "what is c1 that op1 <rest>" get nine extra
//! rewordings ("which kinds of c1 op1 <rest>", "what c1 does op1 <rest>", …).
//! The skeletons use upper-case synonym markers (`[WHAT]`, `[TYPES]`, `[KIND]`,
//! `[IS]`, `[DOES]`) resolved through the same dictionary as the templates.

use nom::{bytes::complete::tag, character::complete::char as pchar, sequence::tuple, IResult};

use bigcq_shape::elements::{class_id, property_id};

use crate::cq::Budget;
use crate::synsets::SynsetExpander;
use crate::GenerationError;

/// Named groups of a paraphrasable question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParaphraseMatch<'a> {
    pub class_var: &'a str,
    pub predicate_var: &'a str,
    pub rest: &'a str,
}

impl<'a> ParaphraseMatch<'a> {
    /// The nine rewording skeletons, markers unresolved.
    pub fn skeletons(&self) -> [String; 9] {
        let (c, p, r) = (self.class_var, self.predicate_var, self.rest);
        [
            format!("[WHAT] {c} {p} {r}"),
            format!("[WHAT] [TYPES] of {c} {p} {r}"),
            format!("[WHAT] [KIND] of {c} {p} {r}"),
            format!("[WHAT] [TYPES] of are {c} which {p} {r}"),
            format!("[WHAT] [IS] {c} which {p} {r}"),
            format!("[WHAT] [IS] {c} {p} {r}"),
            format!("[WHAT] {c} [DOES] {p} {r}"),
            format!("[WHAT] {c} has {p} {r}"),
            format!("[WHAT] {c} have {p} {r}"),
        ]
    }
}

fn after_what_is(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (class_var, _, predicate_var, _)) =
        tuple((class_id, tag(" that "), property_id, pchar(' ')))(input)?;
    Ok((input, (class_var, predicate_var)))
}

/// Find "what is <class> that <property> <rest>" anywhere in `cq`.
///
/// `rest` runs to the end of the line.
pub fn match_paraphrasable(cq: &str) -> Option<ParaphraseMatch<'_>> {
    const LEAD: &str = "what is ";
    cq.match_indices(LEAD).find_map(|(at, _)| {
        let (rest, (class_var, predicate_var)) = after_what_is(&cq[at + LEAD.len()..]).ok()?;
        let rest = rest.split('\n').next().unwrap_or(rest);
        Some(ParaphraseMatch {
            class_var,
            predicate_var,
            rest,
        })
    })
}

/// Each matching question is preceded by the expansions of its nine
/// skeletons; other questions pass through. No dedup.
///
/// Every skeleton's variant count is charged to `budget` before it is
/// expanded.
pub fn paraphrase_cqs<S: AsRef<str>>(
    expander: &SynsetExpander<'_>,
    cqs: &[S],
    budget: &mut Budget,
) -> Result<Vec<String>, GenerationError> {
    let mut out = Vec::with_capacity(cqs.len());
    for cq in cqs {
        let cq = cq.as_ref();
        if let Some(m) = match_paraphrasable(cq) {
            for skeleton in m.skeletons() {
                budget.charge(expander.variant_count(&skeleton))?;
                out.extend(expander.expand(&skeleton));
            }
        }
        out.push(cq.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synsets::SynonymDictionary;

    #[test]
    fn matches_named_groups() {
        let m = match_paraphrasable("so what is c1 that op2 some c3?").unwrap();
        assert_eq!(m.class_var, "c1");
        assert_eq!(m.predicate_var, "op2");
        assert_eq!(m.rest, "some c3?");
    }

    #[test]
    fn rejects_near_misses() {
        assert!(match_paraphrasable("what is c1 that c2 op1 c3").is_none());
        assert!(match_paraphrasable("What is c1 that op1 c2").is_none());
        assert!(match_paraphrasable("what is c1x that op1 c2").is_none());
        assert!(match_paraphrasable("what is c1 that op1").is_none());
    }

    #[test]
    fn second_occurrence_can_match() {
        let m = match_paraphrasable("what is it? what is c4 that dp1 dt1").unwrap();
        assert_eq!(m.class_var, "c4");
        assert_eq!(m.rest, "dt1");
    }

    fn upper_dict() -> SynonymDictionary {
        SynonymDictionary::from_json_str(
            r#"{"[WHAT]": ["what", "which"], "[TYPES]": ["types"], "[KIND]": ["kind"],
                "[IS]": ["is"], "[DOES]": ["does"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn appends_expanded_skeletons_before_original() {
        let dict = upper_dict();
        let expander = SynsetExpander::new(&dict);
        let mut budget = Budget::unlimited();
        let out = paraphrase_cqs(
            &expander,
            &["what is c1 that op1 c2?", "does c1 op1 c2?"],
            &mut budget,
        )
        .unwrap();
        assert_eq!(budget.used(), 9 * 2);
        // 9 skeletons × 2 ways to say [WHAT], the original, the pass-through.
        assert_eq!(out.len(), 9 * 2 + 2);
        assert_eq!(out[0], "what c1 op1 c2?");
        assert_eq!(out[1], "which c1 op1 c2?");
        assert!(out.contains(&"which kind of c1 op1 c2?".to_string()));
        assert!(out.contains(&"what c1 does op1 c2?".to_string()));
        assert_eq!(out[18], "what is c1 that op1 c2?");
        assert_eq!(out[19], "does c1 op1 c2?");
    }

    #[test]
    fn skeleton_variants_count_against_the_budget() {
        let dict = upper_dict();
        let expander = SynsetExpander::new(&dict);

        let mut roomy = Budget::new(Some(18));
        assert!(paraphrase_cqs(&expander, &["what is c1 that op1 c2?"], &mut roomy).is_ok());

        let mut tight = Budget::new(Some(17));
        assert!(matches!(
            paraphrase_cqs(&expander, &["what is c1 that op1 c2?"], &mut tight),
            Err(GenerationError::VariantLimitExceeded { limit: 17, .. })
        ));

        let mut untouched = Budget::new(Some(0));
        assert_eq!(
            paraphrase_cqs(&expander, &["does c1 op1 c2?"], &mut untouched).unwrap(),
            vec!["does c1 op1 c2?".to_string()]
        );
    }
}
