//! Error types shared by the planners and the executor.
//!
//! Planning problems are [`InputError`]s and are always raised before anything
//! touches the filesystem. [`SplitError`] covers a run: engine and filesystem
//! failures, plus the wrapper that records which task a run died on.

use std::path::PathBuf;
use thiserror::Error;

/// Which page field of a range row was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Start => f.write_str("start page"),
            Field::End => f.write_str("end page"),
        }
    }
}

/// Why a single range row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("start page and end page must both be filled in")]
    MissingField,

    #[error("{field} is not a number: {text:?}")]
    NotANumber { field: Field, text: String },

    #[error("{field} must be at least 1 (got {value})")]
    OutOfRange { field: Field, value: i64 },

    #[error("start page ({start}) is after end page ({end})")]
    InvertedRange { start: i64, end: i64 },

    #[error("end page ({end}) exceeds the document's {total_pages} pages")]
    ExceedsDocument { end: i64, total_pages: u32 },
}

/// Bad caller input, detected while building a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// `row` is 0-based; the message shows it 1-based.
    #[error("row {}: {reason}", .row + 1)]
    Row { row: usize, reason: RowError },

    /// A task handed straight to the executor was out of bounds. `index` is
    /// 0-based; the message shows it 1-based.
    #[error("task {}: {reason}", .index + 1)]
    Task { index: usize, reason: RowError },

    #[error("nothing to split: the plan has no tasks")]
    EmptyPlan,

    #[error("document has no bookmarks at the requested depth")]
    NoChapters,

    #[error("chapter {number} does not exist (document has {count} chapters)")]
    UnknownChapter { number: usize, count: usize },

    #[error("outline level must be 1, 2 or 3 (got {0})")]
    InvalidLevel(u32),

    #[error("size limit must be a positive number (got {0})")]
    InvalidSizeLimit(f64),

    #[error("document has no pages")]
    EmptyDocument,
}

impl InputError {
    pub fn row(row: usize, reason: RowError) -> Self {
        InputError::Row { row, reason }
    }
}

/// A PDF engine call failed.
#[derive(Debug, Error)]
#[error("{op} failed for {}: {message}", .path.display())]
pub struct EngineError {
    pub op: &'static str,
    pub path: PathBuf,
    pub message: String,
}

impl EngineError {
    pub fn new(op: &'static str, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            op,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `index` is 0-based; the message shows it 1-based.
    #[error("failed at task {} of {total} ({name}): {source}", .index + 1)]
    TaskFailed {
        index: usize,
        total: usize,
        name: String,
        #[source]
        source: Box<SplitError>,
    },

    #[error("a split is already running for this document")]
    AlreadyRunning,
}

impl SplitError {
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SplitError> = std::result::Result<T, E>;
