//! Batch side of BigCQ: CSV rows in, query → CQ mapping files out.

pub mod pipeline;
pub mod rows;
pub mod serializer;
pub mod summary;

pub use pipeline::{
    build_analyzer, run_pipeline, PipelineConfig, PipelineContext, PipelineError,
    PipelineOutput, ProcessedRow, RunReport, SkipReason,
};
pub use rows::{parse_rows, read_rows, select_rows, AxiomRow, RowError, ACE_ERROR_SENTINEL};
pub use serializer::{group_by_query, write_groups, QueryGroup, SerializeError};
pub use summary::Summary;
