//! Composite segment labels and per-segment profiling

use polars::prelude::*;

use crate::error::RfmError;
use crate::model::{ScoredCustomer, SegmentProfile};

/// Composite labels with a friendly name. Every other label is uncategorized.
pub const NAMED_SEGMENTS: [(&str, &str); 6] = [
    ("4-4-4", "Best Customers"),
    ("3-4-4", "Loyal Customers"),
    ("4-3-4", "Big Spenders"),
    ("3-3-3", "Almost Lost"),
    ("2-2-2", "Lost Customers"),
    ("1-1-1", "Churned Customers"),
];

/// Build the composite "R-F-M" label from three scores
pub fn composite_label(recency_score: u8, frequency_score: u8, monetary_score: u8) -> String {
    format!("{}-{}-{}", recency_score, frequency_score, monetary_score)
}

/// Friendly name for a composite label, if it is one of the named segments
pub fn segment_name(label: &str) -> Option<&'static str> {
    NAMED_SEGMENTS
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, name)| *name)
}

/// Group customers by composite label and average their raw measures.
///
/// Only labels that occur in `customers` produce a profile. Profiles are
/// ordered by label.
pub fn profile_segments(customers: &[ScoredCustomer]) -> Result<Vec<SegmentProfile>, RfmError> {
    if customers.is_empty() {
        return Ok(Vec::new());
    }

    let profile_df = scored_frame(customers)?
        .lazy()
        .group_by([col("label")])
        .agg([
            col("recency").count().alias("customer_count"),
            col("recency").mean().alias("mean_recency"),
            col("frequency").mean().alias("mean_frequency"),
            col("monetary").mean().alias("mean_monetary"),
        ])
        .sort(["label"], SortMultipleOptions::default())
        .collect()?;

    Ok(profiles_from_frame(&profile_df)?)
}

fn scored_frame(customers: &[ScoredCustomer]) -> PolarsResult<DataFrame> {
    df!(
        "label" => customers.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        "recency" => customers.iter().map(|c| c.rfm.recency).collect::<Vec<_>>(),
        "frequency" => customers.iter().map(|c| c.rfm.frequency).collect::<Vec<_>>(),
        "monetary" => customers.iter().map(|c| c.rfm.monetary).collect::<Vec<_>>()
    )
}

fn profiles_from_frame(df: &DataFrame) -> PolarsResult<Vec<SegmentProfile>> {
    let labels = df.column("label")?.str()?;
    let counts = df.column("customer_count")?.cast(&DataType::UInt64)?;
    let recency = df.column("mean_recency")?.cast(&DataType::Float64)?;
    let frequency = df.column("mean_frequency")?.cast(&DataType::Float64)?;
    let monetary = df.column("mean_monetary")?.cast(&DataType::Float64)?;

    Ok(labels
        .into_no_null_iter()
        .zip(counts.u64()?.into_no_null_iter())
        .zip(recency.f64()?.into_no_null_iter())
        .zip(frequency.f64()?.into_no_null_iter())
        .zip(monetary.f64()?.into_no_null_iter())
        .map(|((((label, count), recency), frequency), monetary)| SegmentProfile {
            label: label.to_string(),
            segment_name: segment_name(label),
            customer_count: count as usize,
            mean_recency: recency,
            mean_frequency: frequency,
            mean_monetary: monetary,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomerRfm;

    fn scored(
        id: &str,
        recency: i64,
        frequency: u64,
        monetary: f64,
        scores: (u8, u8, u8),
    ) -> ScoredCustomer {
        let label = composite_label(scores.0, scores.1, scores.2);
        ScoredCustomer {
            rfm: CustomerRfm {
                customer_id: id.to_string(),
                recency,
                frequency,
                monetary,
            },
            recency_score: scores.0,
            frequency_score: scores.1,
            monetary_score: scores.2,
            segment_name: segment_name(&label),
            label,
        }
    }

    #[test]
    fn test_composite_label_format() {
        assert_eq!(composite_label(4, 4, 4), "4-4-4");
        assert_eq!(composite_label(2, 3, 1), "2-3-1");
    }

    #[test]
    fn test_named_and_unnamed_segments() {
        assert_eq!(segment_name("4-4-4"), Some("Best Customers"));
        assert_eq!(segment_name("1-1-1"), Some("Churned Customers"));
        assert_eq!(segment_name("2-3-1"), None);
    }

    #[test]
    fn test_profile_means_and_counts() {
        let customers = vec![
            scored("A", 0, 3, 60.0, (1, 4, 4)),
            scored("B", 4, 1, 20.0, (1, 4, 4)),
            scored("C", 10, 1, 5.0, (2, 3, 1)),
        ];

        let profiles = profile_segments(&customers).unwrap();
        assert_eq!(profiles.len(), 2);

        let first = &profiles[0];
        assert_eq!(first.label, "1-4-4");
        assert_eq!(first.customer_count, 2);
        assert!((first.mean_recency - 2.0).abs() < 1e-12);
        assert!((first.mean_frequency - 2.0).abs() < 1e-12);
        assert!((first.mean_monetary - 40.0).abs() < 1e-12);

        let second = &profiles[1];
        assert_eq!(second.label, "2-3-1");
        assert_eq!(second.segment_name, None);
        assert_eq!(second.customer_count, 1);
    }

    #[test]
    fn test_profile_counts_sum_to_customers() {
        let customers: Vec<_> = (0..9)
            .map(|i| scored(&format!("C{}", i), i, 1, 1.0, ((i % 4) as u8 + 1, 1, 1)))
            .collect();

        let profiles = profile_segments(&customers).unwrap();
        assert_eq!(profiles.iter().map(|p| p.customer_count).sum::<usize>(), 9);
        assert_eq!(profiles.len(), 4);
    }

    #[test]
    fn test_profile_empty_input() {
        assert!(profile_segments(&[]).unwrap().is_empty());
    }
}
