//! Synonym sets and combinatorial template expansion.
//!
//! Templates mark interchangeable words with bracketed keys: `[is]`, `[kind]`.
//! The dictionary maps each key to its replacement phrases; expansion produces
//! every combination:
//!
//! ```text
//! "[what] [kind] of {CAD}"   with [what] → what|which, [kind] → kind|type|sort
//!   → 2 × 3 = 6 variants
//! ```
//!
//! Keys are applied in the dictionary's declared order.

use regex::Regex;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::CatalogError;

/// Object entries in file order, repeats included.
struct RawEntries(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping markers to lists of phrases")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymDictionary {
    entries: Vec<(String, Vec<String>)>,
}

impl SynonymDictionary {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Result<Self, CatalogError> {
        for (marker, replacements) in &entries {
            if marker.len() < 3 || !marker.starts_with('[') || !marker.ends_with(']') {
                return Err(CatalogError::InvalidMarker(marker.clone()));
            }
            if replacements.is_empty() {
                return Err(CatalogError::EmptySynset(marker.clone()));
            }
        }
        for (i, (marker, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(m, _)| m == marker) {
                return Err(CatalogError::DuplicateMarker(marker.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse `{"[is]": ["is", "are"], ...}` keeping key order. A repeated
    /// key is a [`CatalogError::DuplicateMarker`].
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let RawEntries(entries) =
            serde_json::from_str(text).map_err(|source| CatalogError::Json {
                what: "synonym dictionary".to_string(),
                source,
            })?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(m, r)| (m.as_str(), r.as_slice()))
    }

    pub fn get(&self, marker: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(m, _)| m == marker)
            .map(|(_, r)| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SynsetExpander<'a> {
    synonyms: &'a SynonymDictionary,
}

impl<'a> SynsetExpander<'a> {
    pub fn new(synonyms: &'a SynonymDictionary) -> Self {
        Self { synonyms }
    }

    /// Every lexical variant of `template`.
    ///
    /// A template without markers comes back unchanged as the only variant.
    pub fn expand(&self, template: &str) -> Vec<String> {
        let mut variants = vec![template.to_string()];
        for (marker, replacements) in self.synonyms.iter() {
            variants = variants
                .into_iter()
                .flat_map(|variant| {
                    if variant.contains(marker) {
                        replacements
                            .iter()
                            .map(|r| variant.replace(marker, r))
                            .collect::<Vec<_>>()
                    } else {
                        vec![variant]
                    }
                })
                .collect();
        }
        variants
    }

    /// Concatenated expansions, no dedup.
    pub fn expand_all<S: AsRef<str>>(&self, templates: &[S]) -> Vec<String> {
        templates
            .iter()
            .flat_map(|t| self.expand(t.as_ref()))
            .collect()
    }

    /// Number of variants [`expand`](Self::expand) will produce, computed
    /// without building them.
    ///
    /// Follows the same marker-by-marker pass as `expand`, tracking for each
    /// group of variants which later markers it still contains, so markers
    /// introduced by a replacement phrase are counted too.
    pub fn variant_count(&self, template: &str) -> usize {
        let markers: Vec<(&str, &[String])> = self.synonyms.iter().collect();
        let pending = |text: &str, after: usize| -> BTreeSet<usize> {
            (after..markers.len())
                .filter(|&j| text.contains(markers[j].0))
                .collect()
        };

        let mut groups: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        groups.insert(pending(template, 0), 1);
        for (i, (_, replacements)) in markers.iter().enumerate() {
            let mut next: HashMap<BTreeSet<usize>, usize> = HashMap::new();
            for (present, count) in groups {
                if !present.contains(&i) {
                    let slot = next.entry(present).or_default();
                    *slot = slot.saturating_add(count);
                    continue;
                }
                for r in replacements.iter() {
                    let mut after: BTreeSet<usize> =
                        present.iter().copied().filter(|&j| j > i).collect();
                    after.extend(pending(r, i + 1));
                    let slot = next.entry(after).or_default();
                    *slot = slot.saturating_add(count);
                }
            }
            groups = next;
        }
        groups
            .values()
            .fold(0usize, |acc, &count| acc.saturating_add(count))
    }
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\[\]\s]+\]").expect("static regex"))
}

/// Bracketed markers still present in `text` (no dictionary entry, or a
/// misspelt key in a template).
pub fn unresolved_markers(text: &str) -> Vec<&str> {
    marker_regex().find_iter(text).map(|m| m.as_str()).collect()
}
