//! Record types flowing through the RFM pipeline

use chrono::NaiveDateTime;

use crate::error::RfmError;
use crate::scoring::QuartileBoundaries;

/// A transaction row as read from the source, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    pub customer_id: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub counterparty_id: Option<String>,
    pub amount: Option<f64>,
}

/// A validated transaction. Only the customer and timestamp are required;
/// a blank amount contributes nothing to the customer's monetary total.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub customer_id: String,
    pub timestamp: NaiveDateTime,
    pub counterparty_id: Option<String>,
    pub amount: Option<f64>,
}

impl Transaction {
    /// Validate a loaded record. `row` is only used for error reporting.
    pub fn from_record(row: usize, record: &TransactionRecord) -> Result<Self, RfmError> {
        let missing = |field| RfmError::MissingField { row, field };

        if let Some(amount) = record.amount.filter(|a| !a.is_finite()) {
            return Err(RfmError::InvalidField {
                row,
                field: "amount",
                value: amount.to_string(),
            });
        }

        Ok(Self {
            customer_id: record.customer_id.clone().ok_or_else(|| missing("customer_id"))?,
            timestamp: record.timestamp.ok_or_else(|| missing("timestamp"))?,
            counterparty_id: record.counterparty_id.clone(),
            amount: record.amount,
        })
    }
}

/// Per-customer recency, frequency and monetary values
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRfm {
    pub customer_id: String,
    /// Whole days between the customer's last transaction and the reference date
    pub recency: i64,
    /// Number of transactions
    pub frequency: u64,
    /// Sum of transaction amounts
    pub monetary: f64,
}

/// The three RFM measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Recency,
    Frequency,
    Monetary,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Recency, Measure::Frequency, Measure::Monetary];

    /// Raw value of this measure for a customer
    pub fn value(self, customer: &CustomerRfm) -> f64 {
        match self {
            Measure::Recency => customer.recency as f64,
            Measure::Frequency => customer.frequency as f64,
            Measure::Monetary => customer.monetary,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Measure::Recency => "Recency",
            Measure::Frequency => "Frequency",
            Measure::Monetary => "Monetary",
        }
    }
}

/// Customer with quartile scores and composite segment label
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub rfm: CustomerRfm,
    pub recency_score: u8,
    pub frequency_score: u8,
    pub monetary_score: u8,
    /// Composite key, e.g. "4-4-4"
    pub label: String,
    /// Friendly segment name, `None` for uncategorized labels
    pub segment_name: Option<&'static str>,
}

/// Aggregate statistics for one composite label
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProfile {
    pub label: String,
    pub segment_name: Option<&'static str>,
    pub customer_count: usize,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: f64,
}

/// Quartile boundaries for each measure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureBoundaries {
    pub recency: QuartileBoundaries,
    pub frequency: QuartileBoundaries,
    pub monetary: QuartileBoundaries,
}

impl MeasureBoundaries {
    pub fn get(&self, measure: Measure) -> &QuartileBoundaries {
        match measure {
            Measure::Recency => &self.recency,
            Measure::Frequency => &self.frequency,
            Measure::Monetary => &self.monetary,
        }
    }
}

/// Full output of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RfmReport {
    /// Latest transaction timestamp in the dataset, the recency reference
    pub reference_date: NaiveDateTime,
    /// Scored customers ordered by customer id
    pub customers: Vec<ScoredCustomer>,
    pub boundaries: MeasureBoundaries,
    /// One profile per observed label, ordered by label
    pub profiles: Vec<SegmentProfile>,
}

impl RfmReport {
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }
}
