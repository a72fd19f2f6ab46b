//! Rule-based dependency parser for materialized ACE sentences.
//!
//! ACE verbalizations of OWL axioms come in a small number of shapes, so a
//! statistical parser is not required to locate the subject and complement:
//!
//! ```text
//! Every c1 uses c2.                     nsubj ← ROOT → dobj
//! Every c1 is a c2.                     nsubj ← ROOT → attr
//! Every c1 that knows c3 uses c2.       relative clause stays in the subject
//! Every c1 does not use c2.             aux/neg attach to the root
//! Every c1 uses c2 and knows c3.        dobj + cc + conj
//! ```
//!
//! The root is the first copula or pool verb that does not open a relative
//! clause. Every token before it (minus auxiliaries) is the subject subtree,
//! headed by its last token; the complement is split on the first "and".

use crate::materialize::DEFAULT_VERB_POOL;
use crate::parse::{dep, DependencyParser, ParsedSentence, Token};
use crate::ShapeError;

const COPULAS: [&str; 2] = ["is", "are"];
const AUXILIARIES: [&str; 3] = ["does", "do", "not"];
const RELATIVIZERS: [&str; 3] = ["that", "who", "which"];
const DETERMINERS: [&str; 6] = ["every", "each", "a", "an", "the", "no"];
const QUANTIFIER_WORDS: [&str; 6] = ["at", "least", "most", "exactly", "more", "than"];
const PREPOSITIONS: [&str; 9] = ["to", "of", "by", "in", "for", "with", "from", "into", "on"];
const FINAL_PUNCT: [&str; 3] = [".", "!", "?"];

#[derive(Debug, Clone)]
pub struct AceHeuristicParser {
    verbs: Vec<String>,
}

impl Default for AceHeuristicParser {
    fn default() -> Self {
        Self::new(DEFAULT_VERB_POOL.iter().map(|v| v.to_string()).collect())
    }
}

fn lower(token: &Token) -> String {
    token.text.to_ascii_lowercase()
}

fn is_one_of(token: &Token, words: &[&str]) -> bool {
    let t = lower(token);
    words.iter().any(|w| *w == t)
}

/// Split into word tokens and single-character punctuation, with byte offsets.
pub fn tokenize(sentence: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut word_start: Option<usize> = None;

    let flush = |start: &mut Option<usize>, end: usize, out: &mut Vec<Token>| {
        if let Some(s) = start.take() {
            out.push(Token {
                text: sentence[s..end].to_string(),
                idx: s,
                dep: String::new(),
                head: 0,
            });
        }
    };

    for (i, c) in sentence.char_indices() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            if word_start.is_none() {
                word_start = Some(i);
            }
            continue;
        }
        flush(&mut word_start, i, &mut out);
        if !c.is_whitespace() {
            out.push(Token {
                text: c.to_string(),
                idx: i,
                dep: String::new(),
                head: 0,
            });
        }
    }
    flush(&mut word_start, sentence.len(), &mut out);
    out
}

impl AceHeuristicParser {
    pub fn new(verbs: Vec<String>) -> Self {
        Self { verbs }
    }

    fn is_verb(&self, token: &Token) -> bool {
        let t = lower(token);
        COPULAS.contains(&t.as_str()) || self.verbs.iter().any(|v| *v == t)
    }

    fn find_root(&self, tokens: &[Token]) -> Option<usize> {
        (0..tokens.len()).find(|&i| {
            self.is_verb(&tokens[i]) && !(i > 0 && is_one_of(&tokens[i - 1], &RELATIVIZERS))
        })
    }

    fn label_chunk(tokens: &mut [Token], range: std::ops::Range<usize>, label: &str, root: usize) {
        if range.is_empty() {
            return;
        }
        let head = range
            .clone()
            .find(|&i| {
                let t = &tokens[i];
                !is_one_of(t, &DETERMINERS)
                    && !is_one_of(t, &QUANTIFIER_WORDS)
                    && !t.text.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(range.end - 1);
        for i in range {
            if i == head {
                tokens[i].dep = label.to_string();
                tokens[i].head = root;
            } else {
                tokens[i].dep = if is_one_of(&tokens[i], &DETERMINERS) {
                    dep::DET.to_string()
                } else {
                    dep::DEP.to_string()
                };
                tokens[i].head = head;
            }
        }
    }
}

impl DependencyParser for AceHeuristicParser {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence, ShapeError> {
        let mut tokens = tokenize(sentence);
        let root = self.find_root(&tokens).ok_or(ShapeError::MissingRoot)?;
        let copular = is_one_of(&tokens[root], &COPULAS);
        tokens[root].dep = dep::ROOT.to_string();
        tokens[root].head = root;

        // Auxiliaries directly before the root.
        let mut subject_end = root;
        while subject_end > 0 && is_one_of(&tokens[subject_end - 1], &AUXILIARIES) {
            subject_end -= 1;
            let label = if lower(&tokens[subject_end]) == "not" {
                dep::NEG
            } else {
                dep::AUX
            };
            tokens[subject_end].dep = label.to_string();
            tokens[subject_end].head = root;
        }

        if subject_end > 0 {
            let head = subject_end - 1;
            for i in 0..subject_end {
                tokens[i].head = if i == head { root } else { head };
                tokens[i].dep = if i == head {
                    dep::NSUBJ.to_string()
                } else if is_one_of(&tokens[i], &DETERMINERS) {
                    dep::DET.to_string()
                } else {
                    dep::DEP.to_string()
                };
            }
        }

        let mut content_end = tokens.len();
        while content_end > root + 1 && is_one_of(&tokens[content_end - 1], &FINAL_PUNCT) {
            content_end -= 1;
            tokens[content_end].dep = dep::PUNCT.to_string();
            tokens[content_end].head = root;
        }

        let mut content_start = root + 1;
        if copular && content_start < content_end && lower(&tokens[content_start]) == "not" {
            tokens[content_start].dep = dep::NEG.to_string();
            tokens[content_start].head = root;
            content_start += 1;
        }

        let first_label = if content_start < content_end
            && is_one_of(&tokens[content_start], &PREPOSITIONS)
        {
            dep::PREP
        } else if copular {
            dep::ATTR
        } else {
            dep::DOBJ
        };

        let split = (content_start + 1..content_end.saturating_sub(1))
            .find(|&i| lower(&tokens[i]) == "and");
        match split {
            Some(and_idx) => {
                Self::label_chunk(&mut tokens, content_start..and_idx, first_label, root);
                tokens[and_idx].dep = dep::CC.to_string();
                tokens[and_idx].head = root;
                Self::label_chunk(&mut tokens, and_idx + 1..content_end, dep::CONJ, root);
            }
            None => {
                Self::label_chunk(&mut tokens, content_start..content_end, first_label, root);
            }
        }

        ParsedSentence::new(sentence, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(doc: &ParsedSentence) -> Vec<(&str, &str)> {
        doc.tokens()
            .iter()
            .map(|t| (t.text.as_str(), t.dep.as_str()))
            .collect()
    }

    #[test]
    fn tokenizes_with_byte_offsets() {
        let toks = tokenize("Every c1 uses c2.");
        let texts: Vec<_> = toks.iter().map(|t| (t.text.as_str(), t.idx)).collect();
        assert_eq!(
            texts,
            vec![("Every", 0), ("c1", 6), ("uses", 9), ("c2", 14), (".", 16)]
        );
    }

    #[test]
    fn simple_verb_axiom() {
        let doc = AceHeuristicParser::default().parse("Every c1 uses c2.").unwrap();
        assert_eq!(
            labels(&doc),
            vec![
                ("Every", "det"),
                ("c1", "nsubj"),
                ("uses", "ROOT"),
                ("c2", "dobj"),
                (".", "punct")
            ]
        );
    }

    #[test]
    fn copula_axiom_has_attr_range() {
        let doc = AceHeuristicParser::default().parse("Every c1 is a c2.").unwrap();
        assert_eq!(doc.token(2).dep, "ROOT");
        assert_eq!(doc.token(3).dep, "det");
        assert_eq!(doc.token(4).dep, "attr");
        assert_eq!(doc.token(3).head, 4);
    }

    #[test]
    fn relative_clause_verb_is_not_the_root() {
        let doc = AceHeuristicParser::default()
            .parse("Every c1 that knows c3 uses c2.")
            .unwrap();
        assert_eq!(doc.root(), Some(5));
        assert_eq!(doc.token(4).dep, "nsubj");
        assert_eq!(doc.subtree(4), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn conjunction_and_negation() {
        let doc = AceHeuristicParser::default()
            .parse("Every c1 does not use c2 and knows c3.")
            .unwrap();
        // "use" is not a pool verb, so the root is "knows".
        assert_eq!(doc.root(), Some(7));

        let doc = AceHeuristicParser::default()
            .parse("No c1 does not uses c2 and knows c3.")
            .unwrap();
        assert_eq!(doc.root(), Some(4));
        assert_eq!(doc.token(2).dep, "aux");
        assert_eq!(doc.token(3).dep, "neg");
        assert_eq!(doc.token(5).dep, "dobj");
        assert_eq!(doc.token(6).dep, "cc");
        assert_eq!(doc.token(7).dep, "conj");
    }

    #[test]
    fn sentence_without_verb_has_no_root() {
        let err = AceHeuristicParser::default().parse("c1 op1 c2").unwrap_err();
        assert!(matches!(err, ShapeError::MissingRoot));
    }
}
