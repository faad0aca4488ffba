pub mod command;
pub mod config;
pub mod metrics_export;
pub mod observability;
pub mod ordering;
pub mod report;
pub mod store;

pub use report::{ReviewEngine, ReviewError};
