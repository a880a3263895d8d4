//! Transaction loading and result export using Polars

use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::RfmError;
use crate::model::{RfmReport, ScoredCustomer, SegmentProfile, TransactionRecord};

/// Date-time layouts tried in order after RFC 3339
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date-only layouts, interpreted as midnight
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Source column names for the four transaction fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub customer_id: String,
    pub timestamp: String,
    pub counterparty_id: String,
    pub amount: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            customer_id: "from_totally_fake_account".to_string(),
            timestamp: "not_happened_yet_date".to_string(),
            counterparty_id: "to_randomly_generated_account".to_string(),
            amount: "monopoly_money_amount".to_string(),
        }
    }
}

/// Load a CSV transaction log.
///
/// All columns are read as text and converted per field: blank cells become
/// `None`. Validation later decides which of them are required.
///
/// # Arguments
/// * `file_path` - Path to the CSV file (header row required)
/// * `columns` - Which columns hold the four transaction fields
pub fn load_transactions(
    file_path: impl AsRef<Path>,
    columns: &ColumnMapping,
) -> Result<Vec<TransactionRecord>, RfmError> {
    let file_path = file_path.as_ref();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()?;

    debug!(path = %file_path.display(), rows = df.height(), "read transaction file");

    let records = records_from_frame(&df, columns)?;
    info!(path = %file_path.display(), records = records.len(), "loaded transactions");
    Ok(records)
}

/// Convert a string-typed frame into transaction records
pub fn records_from_frame(
    df: &DataFrame,
    columns: &ColumnMapping,
) -> Result<Vec<TransactionRecord>, RfmError> {
    let customers = string_column(df, &columns.customer_id)?;
    let timestamps = string_column(df, &columns.timestamp)?;
    let counterparties = string_column(df, &columns.counterparty_id)?;
    let amounts = string_column(df, &columns.amount)?;

    customers
        .into_iter()
        .zip(timestamps)
        .zip(counterparties)
        .zip(amounts)
        .enumerate()
        .map(|(row, (((customer, timestamp), counterparty), amount))| {
            let timestamp = non_blank(timestamp)
                .map(|raw| {
                    parse_timestamp(raw).ok_or_else(|| RfmError::InvalidField {
                        row,
                        field: "timestamp",
                        value: raw.to_string(),
                    })
                })
                .transpose()?;

            let amount = non_blank(amount)
                .map(|raw| {
                    raw.parse::<f64>()
                        .ok()
                        .filter(|amount| amount.is_finite())
                        .ok_or_else(|| RfmError::InvalidField {
                            row,
                            field: "amount",
                            value: raw.to_string(),
                        })
                })
                .transpose()?;

            Ok(TransactionRecord {
                customer_id: non_blank(customer).map(str::to_string),
                timestamp,
                counterparty_id: non_blank(counterparty).map(str::to_string),
                amount,
            })
        })
        .collect()
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, RfmError> {
    let column = df.column(name).map_err(|_| RfmError::MissingColumn {
        column: name.to_string(),
    })?;
    Ok(column.str()?)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a timestamp in any of the accepted layouts
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Per-customer table: raw measures, scores, label and segment name
pub fn customers_frame(customers: &[ScoredCustomer]) -> PolarsResult<DataFrame> {
    df!(
        "customer_id" => customers.iter().map(|c| c.rfm.customer_id.as_str()).collect::<Vec<_>>(),
        "recency" => customers.iter().map(|c| c.rfm.recency).collect::<Vec<_>>(),
        "frequency" => customers.iter().map(|c| c.rfm.frequency).collect::<Vec<_>>(),
        "monetary" => customers.iter().map(|c| c.rfm.monetary).collect::<Vec<_>>(),
        "recency_score" => customers.iter().map(|c| c.recency_score as u32).collect::<Vec<_>>(),
        "frequency_score" => customers.iter().map(|c| c.frequency_score as u32).collect::<Vec<_>>(),
        "monetary_score" => customers.iter().map(|c| c.monetary_score as u32).collect::<Vec<_>>(),
        "rfm_score" => customers.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        "segment" => customers.iter().map(|c| c.segment_name).collect::<Vec<_>>()
    )
}

/// Per-segment table: label, name, count and mean measures
pub fn segments_frame(profiles: &[SegmentProfile]) -> PolarsResult<DataFrame> {
    df!(
        "rfm_score" => profiles.iter().map(|p| p.label.as_str()).collect::<Vec<_>>(),
        "segment" => profiles.iter().map(|p| p.segment_name).collect::<Vec<_>>(),
        "customer_count" => profiles.iter().map(|p| p.customer_count as u64).collect::<Vec<_>>(),
        "mean_recency" => profiles.iter().map(|p| p.mean_recency).collect::<Vec<_>>(),
        "mean_frequency" => profiles.iter().map(|p| p.mean_frequency).collect::<Vec<_>>(),
        "mean_monetary" => profiles.iter().map(|p| p.mean_monetary).collect::<Vec<_>>()
    )
}

/// Write `customers.csv` and `segments.csv` into `output_dir`, creating it if needed
pub fn export_report(report: &RfmReport, output_dir: impl AsRef<Path>) -> Result<(), RfmError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut customers = customers_frame(&report.customers)?;
    write_csv(&mut customers, &output_dir.join("customers.csv"))?;

    let mut segments = segments_frame(&report.profiles)?;
    write_csv(&mut segments, &output_dir.join("segments.csv"))?;

    info!(dir = %output_dir.display(), "exported RFM tables");
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), RfmError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote CSV");
    Ok(())
}
