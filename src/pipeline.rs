//! End-to-end RFM computation: aggregate, score, label, profile

use tracing::{debug, info, warn};

use crate::error::RfmError;
use crate::model::{
    CustomerRfm, Measure, MeasureBoundaries, RfmReport, ScoredCustomer, TransactionRecord,
};
use crate::rfm::{aggregate, Aggregation};
use crate::scoring::{score_measure, QuartileBoundaries};
use crate::segments::{composite_label, profile_segments, segment_name};

/// Run the full segmentation over a loaded transaction set.
///
/// Pure: the same records always produce the same report.
pub fn run(records: &[TransactionRecord]) -> Result<RfmReport, RfmError> {
    let Aggregation {
        reference_date,
        customers,
    } = aggregate(records)?;
    info!(customers = customers.len(), %reference_date, "computed RFM values");

    let boundaries = compute_boundaries(&customers)?;
    let scored = score_customers(customers, &boundaries);
    let profiles = profile_segments(&scored)?;
    info!(segments = profiles.len(), "profiled segments");

    Ok(RfmReport {
        reference_date,
        customers: scored,
        boundaries,
        profiles,
    })
}

/// Quartile boundaries for all three measures
pub fn compute_boundaries(customers: &[CustomerRfm]) -> Result<MeasureBoundaries, RfmError> {
    let boundaries = MeasureBoundaries {
        recency: QuartileBoundaries::compute(customers, Measure::Recency)?,
        frequency: QuartileBoundaries::compute(customers, Measure::Frequency)?,
        monetary: QuartileBoundaries::compute(customers, Measure::Monetary)?,
    };

    for measure in Measure::ALL {
        let b = boundaries.get(measure);
        debug!(
            measure = measure.name(),
            q25 = b.q25,
            q50 = b.q50,
            q75 = b.q75,
            "quartile boundaries"
        );
        if b.is_degenerate() {
            warn!(
                measure = measure.name(),
                q25 = b.q25,
                q50 = b.q50,
                q75 = b.q75,
                "quartile boundaries coincide, some score bands will be empty"
            );
        }
    }

    Ok(boundaries)
}

/// Attach scores, composite label and segment name to each customer
pub fn score_customers(
    customers: Vec<CustomerRfm>,
    boundaries: &MeasureBoundaries,
) -> Vec<ScoredCustomer> {
    let recency = score_measure(&customers, Measure::Recency, &boundaries.recency);
    let frequency = score_measure(&customers, Measure::Frequency, &boundaries.frequency);
    let monetary = score_measure(&customers, Measure::Monetary, &boundaries.monetary);

    customers
        .into_iter()
        .zip(recency)
        .zip(frequency)
        .zip(monetary)
        .map(|(((rfm, recency_score), frequency_score), monetary_score)| {
            let label = composite_label(recency_score, frequency_score, monetary_score);
            ScoredCustomer {
                rfm,
                recency_score,
                frequency_score,
                monetary_score,
                segment_name: segment_name(&label),
                label,
            }
        })
        .collect()
}
