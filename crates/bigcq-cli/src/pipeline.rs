//! Row pipeline: analyze → questions → paraphrases → queries → alignment.
//!
//! The catalog and analyzer are shared read-only across a rayon pool; each row
//! is independent. A skipped row never aborts the run.

use bigcq_gen::{generate, GenerationError, GenerationResult, GeneratorConfig, TemplateCatalog};
use bigcq_shape::{
    AceHeuristicParser, AxiomShape, DependencyParser, PrecomputedParses, ShapeAnalyzer,
    ShapeError,
};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::rows::AxiomRow;

pub type BoxedAnalyzer = ShapeAnalyzer<Box<dyn DependencyParser>>;

/// Why a row produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AceError,
    DuplicateVerbalization,
    MalformedShape,
    VariantLimit,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::AceError => "ace_error",
            SkipReason::DuplicateVerbalization => "duplicate_verbalization",
            SkipReason::MalformedShape => "malformed_shape",
            SkipReason::VariantLimit => "variant_limit",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("row {id} (line {line}): {source}")]
    Fatal {
        id: String,
        line: usize,
        #[source]
        source: ShapeError,
    },
}

/// Everything a worker needs; shared by reference.
pub struct PipelineContext {
    pub analyzer: BoxedAnalyzer,
    pub catalog: TemplateCatalog,
    pub config: GeneratorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Worker threads; `None` uses the available parallelism.
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRow {
    pub id: String,
    pub verbalization: String,
    pub shape: AxiomShape,
    pub result: GenerationResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub rows_read: usize,
    pub processed: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl RunReport {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Successful rows in input order.
    pub rows: Vec<ProcessedRow>,
    pub report: RunReport,
}

/// Precomputed parses when given, backed by the heuristic parser for
/// sentences the file does not cover.
pub fn build_analyzer(parses: Option<&Path>) -> Result<BoxedAnalyzer, ShapeError> {
    let parser: Box<dyn DependencyParser> = match parses {
        Some(path) => {
            let parses = PrecomputedParses::load(path)?
                .with_fallback(Box::new(AceHeuristicParser::default()));
            info!(path = %path.display(), sentences = parses.len(), "loaded precomputed parses");
            Box::new(parses)
        }
        None => Box::new(AceHeuristicParser::default()),
    };
    Ok(ShapeAnalyzer::new(parser))
}

enum RowOutcome {
    Done(Box<ProcessedRow>),
    Skipped(SkipReason),
}

fn process_row(ctx: &PipelineContext, row: &AxiomRow) -> Result<RowOutcome, ShapeError> {
    let shape = match ctx.analyzer.analyze(&row.verbalization) {
        Ok(shape) => shape,
        Err(err) if err.is_row_skip() => {
            warn!(id = %row.id, line = row.line, error = %err, "skipping row");
            return Ok(RowOutcome::Skipped(SkipReason::MalformedShape));
        }
        Err(err) => return Err(err),
    };
    match generate(&ctx.catalog, &ctx.config, &shape, &row.axiom_pattern) {
        Ok(result) => {
            debug!(id = %row.id, categories = result.populated().len(), "row generated");
            Ok(RowOutcome::Done(Box::new(ProcessedRow {
                id: row.id.clone(),
                verbalization: row.verbalization.clone(),
                shape,
                result,
            })))
        }
        Err(err @ GenerationError::VariantLimitExceeded { .. }) => {
            warn!(id = %row.id, line = row.line, error = %err, "skipping row");
            Ok(RowOutcome::Skipped(SkipReason::VariantLimit))
        }
    }
}

/// Process `rows` on a pool of `config.jobs` threads, keeping input order.
///
/// `rows` should already have gone through [`select_rows`](crate::rows::select_rows);
/// pass what it dropped as `pre_skipped` so the report covers the whole input.
pub fn run_pipeline(
    rows: &[AxiomRow],
    pre_skipped: &[SkipReason],
    ctx: &PipelineContext,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()?;

    let report = Mutex::new(RunReport {
        rows_read: rows.len() + pre_skipped.len(),
        ..Default::default()
    });
    for &reason in pre_skipped {
        report.lock().record_skip(reason);
    }

    let outcomes: Vec<Option<ProcessedRow>> = pool.install(|| {
        rows.par_iter()
            .map(|row| match process_row(ctx, row) {
                Ok(RowOutcome::Done(done)) => {
                    report.lock().processed += 1;
                    Ok(Some(*done))
                }
                Ok(RowOutcome::Skipped(reason)) => {
                    report.lock().record_skip(reason);
                    Ok(None)
                }
                Err(source) => Err(PipelineError::Fatal {
                    id: row.id.clone(),
                    line: row.line,
                    source,
                }),
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let report = report.into_inner();
    info!(
        rows = report.rows_read,
        processed = report.processed,
        skipped = report.total_skipped(),
        threads = pool.current_num_threads(),
        "pipeline finished"
    );
    Ok(PipelineOutput {
        rows: outcomes.into_iter().flatten().collect(),
        report,
    })
}
