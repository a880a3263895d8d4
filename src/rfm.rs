//! Per-customer Recency / Frequency / Monetary aggregation using Polars

use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::debug;

use crate::error::RfmError;
use crate::model::{CustomerRfm, Transaction, TransactionRecord};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// RFM values per customer together with the recency reference date
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Latest timestamp across all transactions
    pub reference_date: NaiveDateTime,
    /// One entry per customer, ordered by customer id
    pub customers: Vec<CustomerRfm>,
}

/// Validate records and compute RFM values per customer.
///
/// Recency is measured against the latest timestamp in the whole dataset,
/// in whole days. Customers are returned ordered by customer id.
///
/// # Errors
/// * `EmptyDataset` if `records` is empty
/// * `MissingField` if any record lacks a customer id or timestamp
/// * `InvalidField` if any amount is not finite
pub fn aggregate(records: &[TransactionRecord]) -> Result<Aggregation, RfmError> {
    if records.is_empty() {
        return Err(RfmError::EmptyDataset);
    }

    let transactions = records
        .iter()
        .enumerate()
        .map(|(row, record)| Transaction::from_record(row, record))
        .collect::<Result<Vec<_>, _>>()?;

    aggregate_transactions(&transactions)
}

/// Compute RFM values from already validated transactions
pub fn aggregate_transactions(transactions: &[Transaction]) -> Result<Aggregation, RfmError> {
    let reference_date = reference_date(transactions).ok_or(RfmError::EmptyDataset)?;
    let reference_millis = reference_date.and_utc().timestamp_millis();

    let rfm_df = transactions_frame(transactions)?
        .lazy()
        .group_by([col("customer_id")])
        .agg([
            // Recency: last purchase per customer
            col("timestamp_ms").max().alias("last_seen_ms"),
            // Frequency: timestamps are never null, so every row counts
            col("timestamp_ms").count().alias("frequency"),
            // Monetary: nulls are skipped
            col("amount").sum().alias("monetary"),
        ])
        .sort(["customer_id"], SortMultipleOptions::default())
        .collect()?;

    debug!(
        transactions = transactions.len(),
        customers = rfm_df.height(),
        %reference_date,
        "aggregated transactions"
    );

    let customers = customers_from_frame(&rfm_df, reference_millis)?;
    Ok(Aggregation {
        reference_date,
        customers,
    })
}

/// Latest timestamp across all transactions
pub fn reference_date(transactions: &[Transaction]) -> Option<NaiveDateTime> {
    transactions.iter().map(|tx| tx.timestamp).max()
}

/// One row per transaction: customer, epoch milliseconds, nullable amount
fn transactions_frame(transactions: &[Transaction]) -> PolarsResult<DataFrame> {
    df!(
        "customer_id" => transactions
            .iter()
            .map(|tx| tx.customer_id.as_str())
            .collect::<Vec<_>>(),
        "timestamp_ms" => transactions
            .iter()
            .map(|tx| tx.timestamp.and_utc().timestamp_millis())
            .collect::<Vec<_>>(),
        "amount" => transactions.iter().map(|tx| tx.amount).collect::<Vec<_>>()
    )
}

/// Convert the grouped frame into `CustomerRfm` values
fn customers_from_frame(df: &DataFrame, reference_millis: i64) -> PolarsResult<Vec<CustomerRfm>> {
    let customer_ids = df.column("customer_id")?.str()?;
    let last_seen = df.column("last_seen_ms")?.i64()?;
    let frequency = df.column("frequency")?.cast(&DataType::UInt64)?;
    let monetary = df.column("monetary")?.cast(&DataType::Float64)?;

    Ok(customer_ids
        .into_no_null_iter()
        .zip(last_seen.into_no_null_iter())
        .zip(frequency.u64()?.into_no_null_iter())
        .zip(monetary.f64()?.into_iter())
        .map(|(((customer_id, last_seen), frequency), monetary)| CustomerRfm {
            customer_id: customer_id.to_string(),
            // Non-negative, so integer division is a floor
            recency: (reference_millis - last_seen) / MILLIS_PER_DAY,
            frequency,
            monetary: monetary.unwrap_or(0.0),
        })
        .collect())
}
