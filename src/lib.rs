pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod outline;
pub mod plan;
pub mod probe;
pub mod ranges;
pub mod report;
pub mod sanitize;
pub mod size_plan;
pub mod util;

pub use probe::{DocumentSummary, summarize};
