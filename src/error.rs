//! Error types for log aggregation and figure layout.

use std::path::PathBuf;

/// Errors raised while turning a results log into a [`crate::results::ResultTable`].
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    /// A required field is missing or does not parse.
    #[error("malformed line {line}: {reason} (in {text:?})")]
    MalformedLine {
        line: usize,
        reason: String,
        text: String,
    },
    /// A later line carries a different seed than the first data line.
    #[error("seed mismatch on line {line}: expected seed={expected}, found seed={found}")]
    SeedMismatch {
        line: usize,
        expected: u64,
        found: u64,
    },
    /// An unsparsified baseline entry would share its task column with another entry.
    #[error("line {line}: task={task} already has an unsparsified baseline entry or is assigned at another sparsity")]
    DuplicateBaselineTask { line: usize, task: u32 },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single `key=<digits>` extraction, before a line number is known.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("missing {0}=<n>")]
    Missing(&'static str),
    #[error("{key}={digits} does not fit in an integer")]
    Overflow { key: &'static str, digits: String },
}

impl ResultsError {
    /// True for errors caused by unreadable input rather than inconsistent input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedLine { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResultsError>;

/// Errors raised when the three result tables cannot share one figure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("{left} and {right} tables have different task columns: {left_columns:?} vs {right_columns:?}")]
    ColumnMismatch {
        left: &'static str,
        right: &'static str,
        left_columns: Vec<u32>,
        right_columns: Vec<u32>,
    },
    #[error("{left} and {right} tables have different sparsity rows: {left_rows:?} vs {right_rows:?}")]
    RowMismatch {
        left: &'static str,
        right: &'static str,
        left_rows: Vec<u32>,
        right_rows: Vec<u32>,
    },
    #[error("supervised table must have exactly one sparsity row, found {0}")]
    SupervisedRows(usize),
    #[error("supervised table must hold the unsparsified baseline (sparsity 0), found sparsity {0}")]
    SupervisedNotBaseline(u32),
}

/// Errors raised while producing the figure.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("invalid plot config: {0}")]
    Config(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("failed to create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render figure to {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors raised while saving or loading exported tables.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
