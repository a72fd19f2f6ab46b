//! Structural identifiers inside a verbalized span.
//!
//! A span such as "at least 2 c2 that op1 i1" is reduced to the set of
//! distinct structural elements it mentions (`at least`, `c2`, `op1`, `i1`).
//! More than one element means the span describes a complex class.
//!
//! Matching is whole-word: `c1` matches in "a c1." but not in "xc1" or "c1b".

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, satisfy},
    combinator::{map, not, recognize},
    sequence::{pair, terminated},
    IResult,
};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Everything,
    No,
    AtLeast,
    AtMost,
    Exactly,
    Class,
    Datatype,
    Individual,
    DataProperty,
    ObjectProperty,
}

/// One structural element, kept verbatim (`c1`, `dp12`, `at most`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element {
    pub kind: ElementKind,
    pub text: String,
}

impl Element {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_end(input: &str) -> IResult<&str, ()> {
    not(satisfy(is_word_char))(input)
}

fn numbered<'a>(
    prefix: &'static str,
    kind: ElementKind,
) -> impl FnMut(&'a str) -> IResult<&'a str, Element> {
    map(recognize(pair(tag(prefix), digit1)), move |text: &str| {
        Element::new(kind, text)
    })
}

fn keyword<'a>(
    word: &'static str,
    kind: ElementKind,
) -> impl FnMut(&'a str) -> IResult<&'a str, Element> {
    map(tag(word), move |text: &str| Element::new(kind, text))
}

/// A numbered identifier (`c<N>`, `dt<N>`, `i<N>`, `dp<N>`, `op<N>`) ending at
/// a word boundary.
pub fn identifier(input: &str) -> IResult<&str, Element> {
    alt((
        terminated(numbered("c", ElementKind::Class), word_end),
        terminated(numbered("dt", ElementKind::Datatype), word_end),
        terminated(numbered("i", ElementKind::Individual), word_end),
        terminated(numbered("dp", ElementKind::DataProperty), word_end),
        terminated(numbered("op", ElementKind::ObjectProperty), word_end),
    ))(input)
}

/// A class identifier `c<N>`.
pub fn class_id(input: &str) -> IResult<&str, &str> {
    terminated(recognize(pair(tag("c"), digit1)), word_end)(input)
}

/// A property identifier `op<N>` or `dp<N>`.
pub fn property_id(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(alt((tag("op"), tag("dp"))), digit1)),
        word_end,
    )(input)
}

/// Any structural element: a modifier keyword or an identifier.
pub fn element(input: &str) -> IResult<&str, Element> {
    alt((
        terminated(keyword("Everything", ElementKind::Everything), word_end),
        terminated(keyword("no", ElementKind::No), word_end),
        terminated(keyword("at least", ElementKind::AtLeast), word_end),
        terminated(keyword("at most", ElementKind::AtMost), word_end),
        terminated(keyword("exactly", ElementKind::Exactly), word_end),
        identifier,
    ))(input)
}

/// Distinct elements mentioned in `text`, scanning left to right without
/// overlapping matches.
pub fn scan_elements(text: &str) -> BTreeSet<Element> {
    let mut out = BTreeSet::new();
    let mut rest = text;
    let mut prev: Option<char> = None;

    while !rest.is_empty() {
        if !prev.is_some_and(is_word_char) {
            if let Ok((after, el)) = element(rest) {
                prev = rest[..rest.len() - after.len()].chars().last();
                out.insert(el);
                rest = after;
                continue;
            }
        }
        let mut chars = rest.chars();
        prev = chars.next();
        rest = chars.as_str();
    }
    out
}

/// Element set plus the complexity flag derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Complexity {
    pub elements: BTreeSet<Element>,
    pub is_complex: bool,
}

pub fn describe(text: &str) -> Complexity {
    let elements = scan_elements(text);
    Complexity {
        is_complex: elements.len() > 1,
        elements,
    }
}

/// Drop the indefinite article in front of an identifier:
/// "something that op1 a c2" → "something that op1 c2".
pub fn strip_articles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;

    while !rest.is_empty() {
        if !prev.is_some_and(is_word_char) {
            if let Some(after) = rest.strip_prefix("a ") {
                if identifier(after).is_ok() {
                    prev = Some(' ');
                    rest = after;
                    continue;
                }
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
            prev = Some(c);
        }
        rest = chars.as_str();
    }
    out
}
