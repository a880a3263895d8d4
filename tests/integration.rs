//! Integration tests for RfmForge

use std::io::Write;

use rfmforge::{export_report, load_transactions, run, ColumnMapping, RfmError};
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str = "from_totally_fake_account,monopoly_money_amount,\
                      to_randomly_generated_account,not_happened_yet_date";

/// Create a test CSV file with sample data
fn create_test_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

fn eight_customers() -> NamedTempFile {
    // Customer n buys n times, n days before the last date, for n * 10 each
    let mut rows = Vec::new();
    for n in 1..=8u32 {
        for _ in 0..n {
            rows.push(format!("C{},{}.00,SHOP,2025-01-{:02}", n, n * 10, 20 - n));
        }
    }
    // Anchor the reference date
    rows.push("C0,1.00,SHOP,2025-01-20".to_string());

    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    create_test_csv(&refs)
}

#[test]
fn test_scenario_two_customers() {
    let file = create_test_csv(&[
        "A,10,SHOP,2025-03-11",
        "A,20,SHOP,2025-03-11",
        "A,30,CAFE,2025-03-11",
        "B,5,SHOP,2025-03-01",
    ]);

    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    assert_eq!(report.customer_count(), 2);
    let a = &report.customers[0].rfm;
    assert_eq!((a.customer_id.as_str(), a.recency, a.frequency), ("A", 0, 3));
    assert!((a.monetary - 60.0).abs() < 1e-9);

    let b = &report.customers[1].rfm;
    assert_eq!((b.customer_id.as_str(), b.recency, b.frequency), ("B", 10, 1));
    assert!((b.monetary - 5.0).abs() < 1e-9);
}

#[test]
fn test_end_to_end_pipeline() {
    let file = eight_customers();
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    assert_eq!(report.customer_count(), 9);
    assert!(report.customers.iter().all(|c| c.rfm.recency >= 0));
    assert!(report.customers.iter().all(|c| c.rfm.frequency >= 1));

    let total: usize = report.profiles.iter().map(|p| p.customer_count).sum();
    assert_eq!(total, 9);

    // The largest, most frequent spender tops frequency and monetary
    let c8 = report
        .customers
        .iter()
        .find(|c| c.rfm.customer_id == "C8")
        .unwrap();
    assert_eq!(c8.frequency_score, 4);
    assert_eq!(c8.monetary_score, 4);
    // and, oldest last purchase, gets the highest recency score
    assert_eq!(c8.recency_score, 4);
    assert_eq!(c8.label, "4-4-4");
    assert_eq!(c8.segment_name, Some("Best Customers"));
}

#[test]
fn test_quartile_buckets_are_balanced() {
    let file = eight_customers();
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    let mut buckets = [0usize; 4];
    for c in &report.customers {
        buckets[(c.monetary_score - 1) as usize] += 1;
    }
    // 9 distinct monetary values: each quarter holds 2 or 3 customers
    assert!(buckets.iter().all(|&b| (2..=3).contains(&b)), "{:?}", buckets);
}

#[test]
fn test_single_customer_scores_one() {
    let file = create_test_csv(&["solo,12.00,SHOP,2025-01-01", "solo,3.00,SHOP,2025-01-05"]);
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    let c = &report.customers[0];
    assert_eq!((c.recency_score, c.frequency_score, c.monetary_score), (1, 1, 1));
    assert_eq!(report.boundaries.monetary.q25, 15.0);
    assert_eq!(report.boundaries.monetary.q75, 15.0);
}

#[test]
fn test_pipeline_is_idempotent() {
    let file = eight_customers();
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();

    assert_eq!(run(&records).unwrap(), run(&records).unwrap());
}

#[test]
fn test_error_handling_empty_dataset() {
    let file = create_test_csv(&[]);
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();

    assert!(matches!(run(&records), Err(RfmError::EmptyDataset)));
}

#[test]
fn test_error_handling_missing_field() {
    let file = create_test_csv(&["A,10,SHOP,2025-01-01", ",4,SHOP,2025-01-02"]);
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();

    assert!(matches!(
        run(&records),
        Err(RfmError::MissingField { row: 1, field: "customer_id" })
    ));
}

#[test]
fn test_export_tables() {
    let file = eight_customers();
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("nested");
    export_report(&report, &out).unwrap();

    let customers = std::fs::read_to_string(out.join("customers.csv")).unwrap();
    assert_eq!(customers.lines().count(), 10);
    let segments = std::fs::read_to_string(out.join("segments.csv")).unwrap();
    assert_eq!(segments.lines().count(), report.profiles.len() + 1);
    assert!(segments.contains("4-4-4,Best Customers,"));
}

#[test]
fn test_blank_amount_is_counted_but_not_summed() {
    let file = create_test_csv(&[
        "A,10,SHOP,2025-01-05",
        "A,,SHOP,2025-01-05",
        "B,5,,2025-01-04",
    ]);
    let records = load_transactions(file.path(), &ColumnMapping::default()).unwrap();
    let report = run(&records).unwrap();

    let a = &report.customers[0].rfm;
    assert_eq!(a.frequency, 2);
    assert!((a.monetary - 10.0).abs() < 1e-9);
    let b = &report.customers[1].rfm;
    assert_eq!((b.frequency, b.recency), (1, 1));
}

#[test]
fn test_error_handling_nan_amount() {
    let file = create_test_csv(&["A,10,SHOP,2025-01-01", "B,NaN,SHOP,2025-01-02"]);

    let result = load_transactions(file.path(), &ColumnMapping::default());
    assert!(matches!(
        result,
        Err(RfmError::InvalidField { row: 1, field: "amount", .. })
    ));
}
