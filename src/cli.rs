//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::data::ColumnMapping;

/// Customer segmentation CLI using quartile-based RFM scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data.csv")]
    pub input: PathBuf,

    /// Column holding the customer identifier
    #[arg(long, default_value = "from_totally_fake_account")]
    pub customer_column: String,

    /// Column holding the transaction date
    #[arg(long, default_value = "not_happened_yet_date")]
    pub timestamp_column: String,

    /// Column holding the counterparty identifier
    #[arg(long, default_value = "to_randomly_generated_account")]
    pub counterparty_column: String,

    /// Column holding the transaction amount
    #[arg(long, default_value = "monopoly_money_amount")]
    pub amount_column: String,

    /// Output path for the segment count chart; the mean-measures chart is
    /// written next to it with a `_means` suffix
    #[arg(short, long, default_value = "rfm_segments.png")]
    pub output: String,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Directory to export customers.csv and segments.csv into
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Number of customer rows to print from the end of the RFM table
    #[arg(long, default_value = "5")]
    pub tail: usize,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Source columns for the transaction loader
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            customer_id: self.customer_column.clone(),
            timestamp: self.timestamp_column.clone(),
            counterparty_id: self.counterparty_column.clone(),
            amount: self.amount_column.clone(),
        }
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
