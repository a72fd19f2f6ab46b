//! Parses computed ahead of time by an external NLP pipeline.
//!
//! File format (JSON): an object keyed by the *materialized* sentence, each
//! value a token list as exported from spaCy:
//!
//! ```json
//! {
//!   "Every c1 uses c2.": [
//!     {"text": "Every", "idx": 0, "dep": "det", "head": 1},
//!     {"text": "c1", "idx": 6, "dep": "nsubj", "head": 2},
//!     {"text": "uses", "idx": 9, "dep": "ROOT", "head": 2},
//!     {"text": "c2", "idx": 14, "dep": "dobj", "head": 2},
//!     {"text": ".", "idx": 16, "dep": "punct", "head": 2}
//!   ]
//! }
//! ```
//!
//! `idx` is a character offset; it is converted to a byte offset on load.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::parse::{DependencyParser, ParsedSentence, Token};
use crate::ShapeError;

#[derive(Debug, Clone, Deserialize)]
struct RawToken {
    text: String,
    idx: usize,
    dep: String,
    head: usize,
}

pub struct PrecomputedParses {
    parses: HashMap<String, ParsedSentence>,
    fallback: Option<Box<dyn DependencyParser>>,
}

impl std::fmt::Debug for PrecomputedParses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrecomputedParses")
            .field("sentences", &self.parses.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

fn char_to_byte_offsets(sentence: &str) -> Vec<usize> {
    sentence
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(sentence.len()))
        .collect()
}

impl PrecomputedParses {
    pub fn from_json_str(text: &str) -> Result<Self, ShapeError> {
        let raw: HashMap<String, Vec<RawToken>> = serde_json::from_str(text)?;
        let mut parses = HashMap::with_capacity(raw.len());
        for (sentence, raw_tokens) in raw {
            let offsets = char_to_byte_offsets(&sentence);
            let tokens = raw_tokens
                .into_iter()
                .map(|t| {
                    let idx = *offsets.get(t.idx).ok_or_else(|| {
                        ShapeError::Parse(format!(
                            "token `{}` starts at char {} past the end of `{sentence}`",
                            t.text, t.idx
                        ))
                    })?;
                    Ok(Token {
                        text: t.text,
                        idx,
                        dep: t.dep,
                        head: t.head,
                    })
                })
                .collect::<Result<Vec<_>, ShapeError>>()?;
            let parsed = ParsedSentence::new(sentence.clone(), tokens)?;
            parses.insert(sentence, parsed);
        }
        Ok(Self {
            parses,
            fallback: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ShapeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parser consulted for sentences missing from the file.
    pub fn with_fallback(mut self, fallback: Box<dyn DependencyParser>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }
}

impl DependencyParser for PrecomputedParses {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence, ShapeError> {
        if let Some(parsed) = self.parses.get(sentence) {
            return Ok(parsed.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.parse(sentence),
            None => Err(ShapeError::Parse(format!(
                "no precomputed parse for `{sentence}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ace::AceHeuristicParser;

    const SAMPLE: &str = r#"{
        "Every c1 uses c2.": [
            {"text": "Every", "idx": 0, "dep": "det", "head": 1},
            {"text": "c1", "idx": 6, "dep": "nsubj", "head": 2},
            {"text": "uses", "idx": 9, "dep": "ROOT", "head": 2},
            {"text": "c2", "idx": 14, "dep": "dobj", "head": 2},
            {"text": ".", "idx": 16, "dep": "punct", "head": 2}
        ],
        "Every é1 uses c2": [
            {"text": "Every", "idx": 0, "dep": "det", "head": 1},
            {"text": "é1", "idx": 6, "dep": "nsubj", "head": 2},
            {"text": "uses", "idx": 9, "dep": "ROOT", "head": 2},
            {"text": "c2", "idx": 14, "dep": "dobj", "head": 2}
        ]
    }"#;

    #[test]
    fn loads_and_converts_char_offsets() {
        let parses = PrecomputedParses::from_json_str(SAMPLE).unwrap();
        assert_eq!(parses.len(), 2);
        let doc = parses.parse("Every é1 uses c2").unwrap();
        // "é" is two bytes wide.
        assert_eq!(doc.token(2).idx, 10);
        assert_eq!(doc.token(3).idx, 15);
    }

    #[test]
    fn missing_sentence_uses_fallback_when_present() {
        let parses = PrecomputedParses::from_json_str(SAMPLE).unwrap();
        assert!(parses.parse("Every c3 is a c4.").is_err());

        let parses = parses.with_fallback(Box::new(AceHeuristicParser::default()));
        let doc = parses.parse("Every c3 is a c4.").unwrap();
        assert_eq!(doc.root(), Some(2));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parses.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let parses = PrecomputedParses::load(&path).unwrap();
        assert!(!parses.is_empty());
    }
}
