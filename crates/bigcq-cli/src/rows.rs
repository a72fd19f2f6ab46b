//! Input rows: `id,verbalization,axiom_pattern` CSV without a header.
//!
//! Fields follow RFC 4180 quoting. Equivalence verbalizations span two lines,
//! so quoted fields may contain newlines as well as commas and `""`.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::SkipReason;

/// ACE writes this instead of a sentence when it cannot verbalize an axiom.
pub const ACE_ERROR_SENTINEL: &str = "/* BUG:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxiomRow {
    /// 1-based line where the record starts.
    pub line: usize,
    pub id: String,
    pub verbalization: String,
    /// The axiom in Turtle with identifiers written as `<c1>`, `<op1>`, ...
    pub axiom_pattern: String,
}

impl AxiomRow {
    pub fn is_ace_error(&self) -> bool {
        self.verbalization.starts_with(ACE_ERROR_SENTINEL)
    }
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 3 fields, found {found}")]
    ShortRow { line: usize, found: usize },
    #[error("line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: text after a closing quote")]
    TrailingAfterQuote { line: usize },
}

/// Split CSV text into `(start line, fields)` records. Blank lines are skipped.
pub fn parse_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, RowError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut record_line = 1;
    let mut in_quotes = false;
    let mut closed_quote = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    closed_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !closed_quote => in_quotes = true,
            ',' => {
                fields.push(std::mem::take(&mut field));
                closed_quote = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if !(fields.is_empty() && field.is_empty() && !closed_quote) {
                    fields.push(std::mem::take(&mut field));
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                closed_quote = false;
                line += 1;
                record_line = line;
            }
            _ if closed_quote => return Err(RowError::TrailingAfterQuote { line }),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RowError::UnterminatedQuote { line: record_line });
    }
    if !(fields.is_empty() && field.is_empty() && !closed_quote) {
        fields.push(field);
        records.push((record_line, fields));
    }
    Ok(records)
}

/// Every record as a row. Extra columns are ignored.
pub fn parse_rows(text: &str) -> Result<Vec<AxiomRow>, RowError> {
    parse_records(text)?
        .into_iter()
        .map(|(line, fields)| {
            let found = fields.len();
            let mut fields = fields.into_iter();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(id), Some(verbalization), Some(axiom_pattern)) => Ok(AxiomRow {
                    line,
                    id,
                    verbalization,
                    axiom_pattern,
                }),
                _ => Err(RowError::ShortRow { line, found }),
            }
        })
        .collect()
}

pub fn read_rows(path: &Path) -> Result<Vec<AxiomRow>, RowError> {
    let text = std::fs::read_to_string(path).map_err(|source| RowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rows(&text)
}

/// Rows worth analyzing, plus the ones dropped up front.
///
/// ACE error rows go first; among the rest only the first occurrence of
/// each verbalization survives.
pub fn select_rows(rows: Vec<AxiomRow>) -> (Vec<AxiomRow>, Vec<(AxiomRow, SkipReason)>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();
    for row in rows {
        if row.is_ace_error() {
            dropped.push((row, SkipReason::AceError));
        } else if !seen.insert(row.verbalization.clone()) {
            dropped.push((row, SkipReason::DuplicateVerbalization));
        } else {
            kept.push(row);
        }
    }
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_keep_commas_quotes_and_newlines() {
        let text = "1,\"Every c1 is a c2.\nEvery c2 is a c1.\",<c1> owl:equivalentClass <c2> .\n\
                    2,\"a, \"\"b\"\"\",x\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 1);
        assert_eq!(records[0].1[1], "Every c1 is a c2.\nEvery c2 is a c1.");
        assert_eq!(records[1].0, 3);
        assert_eq!(records[1].1, vec!["2", "a, \"b\"", "x"]);
    }

    #[test]
    fn crlf_and_blank_lines() {
        let records = parse_records("1,a,b\r\n\r\n2,c,d").unwrap();
        assert_eq!(
            records,
            vec![
                (1, vec!["1".to_string(), "a".into(), "b".into()]),
                (3, vec!["2".to_string(), "c".into(), "d".into()]),
            ]
        );
    }

    #[test]
    fn empty_quoted_field_is_a_field() {
        let records = parse_records("\"\",x,y").unwrap();
        assert_eq!(records[0].1, vec!["", "x", "y"]);
    }

    #[test]
    fn malformed_quoting() {
        assert!(matches!(
            parse_records("1,\"open\n2,a,b"),
            Err(RowError::UnterminatedQuote { line: 1 })
        ));
        assert!(matches!(
            parse_records("1,\"a\"b,c"),
            Err(RowError::TrailingAfterQuote { line: 1 })
        ));
    }

    #[test]
    fn short_rows_report_their_line() {
        let err = parse_rows("1,a,b\n2,only\n").unwrap_err();
        assert!(matches!(err, RowError::ShortRow { line: 2, found: 2 }));
    }

    #[test]
    fn selection_drops_ace_errors_and_repeats() {
        let rows = parse_rows(
            "1,Every c1 op1 c2.,p\n2,/* BUG: no verbalization */,q\n3,Every c1 op1 c2.,p\n4,Every c1 is a c2.,r\n",
        )
        .unwrap();
        let (kept, dropped) = select_rows(rows);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].1, SkipReason::AceError);
        assert_eq!(dropped[1].1, SkipReason::DuplicateVerbalization);
        assert_eq!(dropped[1].0.id, "3");
    }
}
