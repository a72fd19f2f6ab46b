//! Dependency-parse interface consumed by the shape analyzer.
//!
//! Parsing itself is an external concern: a provider turns a sentence into an
//! ordered token list where every token points at its head and carries a
//! dependency label. Exactly one token is labelled `ROOT`.
//!
//! Offsets in [`Token::idx`] are **byte** offsets into the parsed sentence.
//! Providers that receive character offsets (spaCy exports do) must convert
//! them before building a [`ParsedSentence`].

use serde::{Deserialize, Serialize};

use crate::ShapeError;

/// Dependency labels the analyzer cares about (spaCy / ClearNLP names).
pub mod dep {
    pub const ROOT: &str = "ROOT";
    pub const NSUBJ: &str = "nsubj";
    pub const ATTR: &str = "attr";
    pub const DOBJ: &str = "dobj";
    pub const PREP: &str = "prep";
    pub const CONJ: &str = "conj";
    pub const CC: &str = "cc";
    pub const DET: &str = "det";
    pub const AUX: &str = "aux";
    pub const NEG: &str = "neg";
    pub const PUNCT: &str = "punct";
    pub const DEP: &str = "dep";

    /// Labels whose subtrees make up the class-axiom range.
    pub const RANGE_LABELS: [&str; 4] = [ATTR, DOBJ, PREP, CONJ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Byte offset of the first character in the sentence.
    pub idx: usize,
    pub dep: String,
    /// Index of the head token; the root points at itself.
    pub head: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.idx + self.text.len()
    }
}

/// A parsed sentence: tokens in surface order plus precomputed child lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSentence {
    text: String,
    tokens: Vec<Token>,
    children: Vec<Vec<usize>>,
}

impl ParsedSentence {
    /// Validate head pointers and offsets, then index children.
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Result<Self, ShapeError> {
        let text = text.into();
        let mut children = vec![Vec::new(); tokens.len()];
        for (i, token) in tokens.iter().enumerate() {
            if token.head >= tokens.len() {
                return Err(ShapeError::Parse(format!(
                    "token {i} (`{}`) has head {} outside the sentence",
                    token.text, token.head
                )));
            }
            if text.get(token.idx..token.end()) != Some(token.text.as_str()) {
                return Err(ShapeError::Parse(format!(
                    "token {i} (`{}`) does not match the sentence at byte {}",
                    token.text, token.idx
                )));
            }
            if token.head != i {
                children[token.head].push(i);
            }
        }
        Ok(Self {
            text,
            tokens,
            children,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, i: usize) -> &Token {
        &self.tokens[i]
    }

    /// The single `ROOT` token.
    pub fn root(&self) -> Option<usize> {
        self.tokens.iter().position(|t| t.dep == dep::ROOT)
    }

    /// Direct dependents of `i`, in surface order.
    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// `i` and every token transitively depending on it, in surface order.
    pub fn subtree(&self, i: usize) -> Vec<usize> {
        let mut seen = vec![false; self.tokens.len()];
        let mut stack = vec![i];
        while let Some(cur) = stack.pop() {
            if seen[cur] {
                continue;
            }
            seen[cur] = true;
            stack.extend(self.children[cur].iter().copied());
        }
        seen.iter()
            .enumerate()
            .filter_map(|(idx, hit)| hit.then_some(idx))
            .collect()
    }
}

/// The external parser boundary.
///
/// Implementations are shared read-only across worker threads.
pub trait DependencyParser: Send + Sync {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence, ShapeError>;
}

impl<P: DependencyParser + ?Sized> DependencyParser for Box<P> {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence, ShapeError> {
        (**self).parse(sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, idx: usize, dep: &str, head: usize) -> Token {
        Token {
            text: text.to_string(),
            idx,
            dep: dep.to_string(),
            head,
        }
    }

    fn every_c1_uses_c2() -> ParsedSentence {
        ParsedSentence::new(
            "Every c1 uses c2.",
            vec![
                tok("Every", 0, dep::DET, 1),
                tok("c1", 6, dep::NSUBJ, 2),
                tok("uses", 9, dep::ROOT, 2),
                tok("c2", 14, dep::DOBJ, 2),
                tok(".", 16, dep::PUNCT, 2),
            ],
        )
        .expect("valid parse")
    }

    #[test]
    fn subtree_is_transitive_and_ordered() {
        let s = every_c1_uses_c2();
        assert_eq!(s.root(), Some(2));
        assert_eq!(s.subtree(1), vec![0, 1]);
        assert_eq!(s.subtree(2), vec![0, 1, 2, 3, 4]);
        assert_eq!(s.children(2), &[1, 3, 4]);
    }

    #[test]
    fn rejects_dangling_heads_and_misaligned_offsets() {
        let err = ParsedSentence::new("a b", vec![tok("a", 0, dep::ROOT, 7)]);
        assert!(matches!(err, Err(ShapeError::Parse(_))));

        let err = ParsedSentence::new("a b", vec![tok("b", 0, dep::ROOT, 0)]);
        assert!(matches!(err, Err(ShapeError::Parse(_))));
    }
}
