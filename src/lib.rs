//! Aggregate per-task accuracy logs across sparsity levels and plot regular,
//! weighted and supervised (upper bound) runs side by side.
//!
//! - [`results`]: `key=<n>` field extraction and the (sparsity, task) table
//! - [`plotting`]: shape checks, grid layout and rendering
//! - [`plot_config`]: figure settings
//! - [`export`]: JSON snapshot of the aggregated tables

pub mod error;
pub mod export;
pub mod plot_config;
pub mod plotting;
pub mod results;

pub use error::{FieldError, ResultsError, ShapeError};
pub use plot_config::PlotConfig;
pub use results::{extract_seed, extract_sparsity, extract_task, ResultTable};
