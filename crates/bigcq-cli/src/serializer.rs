//! Query → questions mapping files.
//!
//! Every distinct query becomes one `query_to_cqs_<n>.json` holding the query
//! and every question any row paired with it:
//!
//! ```json
//! {
//!     "cqs": [
//!         "does c1 op1 c2?"
//!     ],
//!     "query": "ASK WHERE { ... }"
//! }
//! ```

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::ProcessedRow;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("output directory {} already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Keys in alphabetical order, matching the on-disk layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryGroup {
    pub cqs: Vec<String>,
    pub query: String,
}

/// Group questions by query string, both in first-seen order.
pub fn group_by_query(rows: &[ProcessedRow]) -> Vec<QueryGroup> {
    let mut groups: Vec<QueryGroup> = Vec::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        for (_, query, cqs) in row.result.pairs() {
            let slot = *index.entry(query.to_string()).or_insert_with(|| {
                groups.push(QueryGroup {
                    cqs: Vec::new(),
                    query: query.to_string(),
                });
                seen.push(HashSet::new());
                groups.len() - 1
            });
            for cq in cqs {
                if seen[slot].insert(cq.clone()) {
                    groups[slot].cqs.push(cq.clone());
                }
            }
        }
    }
    groups
}

pub fn to_json(group: &QueryGroup) -> Result<String, SerializeError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    group.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn file_name(n: usize) -> String {
    format!("query_to_cqs_{n}.json")
}

/// Write one file per group into the new directory `out`.
pub fn write_groups(out: &Path, groups: &[QueryGroup]) -> Result<Vec<PathBuf>, SerializeError> {
    if out.exists() {
        return Err(SerializeError::OutputExists(out.to_path_buf()));
    }
    std::fs::create_dir_all(out).map_err(|source| SerializeError::Io {
        path: out.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        let path = out.join(file_name(i + 1));
        std::fs::write(&path, to_json(group)?).map_err(|source| SerializeError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), cqs = group.cqs.len(), "wrote mapping");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigcq_gen::{Category, GenerationResult};
    use bigcq_shape::AxiomShape;
    use std::collections::BTreeSet;

    fn row(id: &str, pairs: &[(Category, &str, &[&str])]) -> ProcessedRow {
        let mut result = GenerationResult::default();
        for (category, query, cqs) in pairs {
            result.queries.set(*category, Some(query.to_string()));
            result
                .cqs
                .set(*category, cqs.iter().map(|s| s.to_string()).collect());
        }
        ProcessedRow {
            id: id.to_string(),
            verbalization: format!("row {id}"),
            shape: AxiomShape {
                predicate_id: None,
                domain_text: "c1".into(),
                range_text: "c2".into(),
                domain_is_complex: false,
                range_is_complex: false,
                domain_elems: BTreeSet::new(),
                range_elems: BTreeSet::new(),
                is_equivalence: false,
            },
            result,
        }
    }

    #[test]
    fn groups_merge_across_rows_without_duplicates() {
        let rows = vec![
            row("1", &[(Category::Ask, "ASK q1", &["a?", "b?"]), (Category::SelectCad, "SELECT q2", &["c?"])]),
            row("2", &[(Category::Ask, "ASK q1", &["b?", "d?"])]),
        ];
        let groups = group_by_query(&rows);
        assert_eq!(
            groups,
            vec![
                QueryGroup {
                    cqs: vec!["a?".into(), "b?".into(), "d?".into()],
                    query: "ASK q1".into(),
                },
                QueryGroup {
                    cqs: vec!["c?".into()],
                    query: "SELECT q2".into(),
                },
            ]
        );
    }

    #[test]
    fn json_layout_is_sorted_with_four_space_indent() {
        let json = to_json(&QueryGroup {
            cqs: vec!["a?".into()],
            query: "ASK q".into(),
        })
        .unwrap();
        assert_eq!(json, "{\n    \"cqs\": [\n        \"a?\"\n    ],\n    \"query\": \"ASK q\"\n}");
    }

    #[test]
    fn refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_groups(dir.path(), &[]).unwrap_err();
        assert!(matches!(err, SerializeError::OutputExists(_)));
    }

    #[test]
    fn numbers_files_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("mapping");
        let groups = vec![
            QueryGroup { cqs: vec!["a?".into()], query: "q1".into() },
            QueryGroup { cqs: vec!["b?".into()], query: "q2".into() },
        ];
        let written = write_groups(&out, &groups).unwrap();
        assert_eq!(written, vec![out.join("query_to_cqs_1.json"), out.join("query_to_cqs_2.json")]);
        let second: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(second["query"], "q2");
    }
}
