//! Error taxonomy for the drafting pipeline.
//!
//! Each concern gets its own enum so callers can tell a fatal extraction
//! failure apart from the recoverable ones: cache errors degrade to a direct
//! load, generation errors are absorbed by the email writer's fallback.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a source document into usable text. Fatal to the run.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("no meaningful text extracted from {0}")]
    Empty(PathBuf),
    #[error("{0} text is empty or unparseable")]
    UnusableText(&'static str),
}

/// Cache storage failure. Caught at the store boundary and converted to a
/// cache-miss (direct load); never surfaced to the pipeline.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("cache metadata read failed for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Text-generation failure. Caught inside the email writer stage, which
/// answers with the templated fallback instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is disabled")]
    Unavailable,
    #[error("generation timed out after {0}s")]
    Timeout(u64),
    #[error("generation returned empty content")]
    Empty,
    #[error("generation API error: {0}")]
    Api(String),
}

/// Top-level stage failure, attributed to the stage that raised it by the
/// pipeline. Only extraction errors actually terminate a run.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("context entry '{0}' already written")]
    DuplicateEntry(String),
    #[error("context entry '{0}' missing")]
    MissingEntry(String),
}
