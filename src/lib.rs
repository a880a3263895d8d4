//! RfmForge: customer segmentation by quartile-based RFM scoring
//!
//! Transactions are grouped per customer into Recency, Frequency and
//! Monetary values, each measure is binned into quartile scores 1-4, and
//! customers sharing the same "R-F-M" score are profiled as a segment.

pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod rfm;
pub mod scoring;
pub mod segments;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{export_report, load_transactions, ColumnMapping};
pub use error::RfmError;
pub use model::{
    CustomerRfm, Measure, RfmReport, ScoredCustomer, SegmentProfile, Transaction,
    TransactionRecord,
};
pub use pipeline::run;
pub use rfm::{aggregate, Aggregation};
pub use scoring::QuartileBoundaries;
pub use segments::{composite_label, segment_name};
pub use viz::generate_segment_charts;

/// Result type for the binary and chart rendering
pub type Result<T> = anyhow::Result<T>;
