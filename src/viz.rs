//! Chart data, Plotters rendering and console tables for RFM segments

use std::cmp::Reverse;

use plotters::prelude::*;
use tracing::info;

use crate::model::{Measure, RfmReport, SegmentProfile};

/// Line colors for recency, frequency and monetary
const MEASURE_COLORS: [RGBColor; 3] = [BLUE, RGBColor(255, 127, 14), GREEN];

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// One bar of the segment distribution chart
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBar {
    pub label: String,
    pub count: usize,
}

/// Mean measures per segment, aligned by index with `labels`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentMeanSeries {
    pub labels: Vec<String>,
    pub recency: Vec<f64>,
    pub frequency: Vec<f64>,
    pub monetary: Vec<f64>,
}

impl SegmentMeanSeries {
    pub fn values(&self, measure: Measure) -> &[f64] {
        match measure {
            Measure::Recency => &self.recency,
            Measure::Frequency => &self.frequency,
            Measure::Monetary => &self.monetary,
        }
    }
}

/// Segment counts, largest first; equal counts ordered by label
pub fn segment_count_bars(profiles: &[SegmentProfile]) -> Vec<SegmentBar> {
    let mut bars: Vec<SegmentBar> = profiles
        .iter()
        .map(|p| SegmentBar {
            label: p.label.clone(),
            count: p.customer_count,
        })
        .collect();
    bars.sort_by(|a, b| (Reverse(a.count), &a.label).cmp(&(Reverse(b.count), &b.label)));
    bars
}

/// Mean recency/frequency/monetary per segment, ordered by label ascending
pub fn segment_mean_series(profiles: &[SegmentProfile]) -> SegmentMeanSeries {
    let mut sorted: Vec<&SegmentProfile> = profiles.iter().collect();
    sorted.sort_by(|a, b| a.label.cmp(&b.label));

    SegmentMeanSeries {
        labels: sorted.iter().map(|p| p.label.clone()).collect(),
        recency: sorted.iter().map(|p| p.mean_recency).collect(),
        frequency: sorted.iter().map(|p| p.mean_frequency).collect(),
        monetary: sorted.iter().map(|p| p.mean_monetary).collect(),
    }
}

/// Axis label for a category index, empty between categories
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Bar chart of customers per segment
pub fn create_segment_count_chart(bars: &[SegmentBar], output_path: &str) -> crate::Result<()> {
    if bars.is_empty() {
        anyhow::bail!("No segments to plot");
    }

    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of RFM Segments", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(bars.len() as f64 - 0.5), 0f64..(max_count * 1.1))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("RFM Score")
        .y_desc("Number of Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.count as f64)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    info!(path = output_path, segments = bars.len(), "segment count chart saved");

    Ok(())
}

/// Line chart of mean recency, frequency and monetary per segment
pub fn create_segment_means_chart(
    series: &SegmentMeanSeries,
    output_path: &str,
) -> crate::Result<()> {
    if series.labels.is_empty() {
        anyhow::bail!("No segments to plot");
    }

    let n = series.labels.len();
    let max_value = Measure::ALL
        .iter()
        .flat_map(|m| series.values(*m).iter().copied())
        .fold(0.0f64, f64::max);
    let min_value = Measure::ALL
        .iter()
        .flat_map(|m| series.values(*m).iter().copied())
        .fold(0.0f64, f64::min);
    let padding = ((max_value - min_value) * 0.05).max(1.0);

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average RFM Scores for Each Segment", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(
            -0.5f64..(n as f64 - 0.5),
            (min_value - padding)..(max_value + padding),
        )?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(&series.labels, *x))
        .x_desc("RFM Score")
        .y_desc("Average Value")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (measure, color) in Measure::ALL.into_iter().zip(MEASURE_COLORS) {
        let points: Vec<(f64, f64)> = series
            .values(measure)
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(measure.name())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!(path = output_path, segments = n, "segment means chart saved");

    Ok(())
}

/// Render both segment charts. The line chart goes next to `base_output_path`
/// with a `_means` suffix.
pub fn generate_segment_charts(report: &RfmReport, base_output_path: &str) -> crate::Result<()> {
    create_segment_count_chart(&segment_count_bars(&report.profiles), base_output_path)?;

    let means_path = means_chart_path(base_output_path);
    create_segment_means_chart(&segment_mean_series(&report.profiles), &means_path)?;

    Ok(())
}

/// Path of the mean-measures chart derived from the base chart path
pub fn means_chart_path(base_output_path: &str) -> String {
    match base_output_path.strip_suffix(".png") {
        Some(stem) => format!("{}_means.png", stem),
        None => format!("{}_means.png", base_output_path),
    }
}

/// Print the last `rows` customers of the RFM table
pub fn print_customer_tail(report: &RfmReport, rows: usize) {
    let skip = report.customers.len().saturating_sub(rows);

    println!(
        "\n=== Customer RFM (last {} of {}) ===",
        report.customers.len() - skip,
        report.customers.len()
    );
    println!(
        "  {:>16} | {:>7} | {:>9} | {:>12} | {:>9}",
        "Customer", "Recency", "Frequency", "Monetary", "RFM Score"
    );
    println!("  {:-<16}-|-{:-<7}-|-{:-<9}-|-{:-<12}-|-{:-<9}", "", "", "", "", "");
    for c in report.customers.iter().skip(skip) {
        println!(
            "  {:>16} | {:>7} | {:>9} | {:>12.2} | {:>9}",
            c.rfm.customer_id, c.rfm.recency, c.rfm.frequency, c.rfm.monetary, c.label
        );
    }
}

/// Print quartile boundaries for each measure
pub fn print_boundaries(report: &RfmReport) {
    println!("\n=== Quartile Boundaries ===");
    println!("  {:<9} | {:>10} | {:>10} | {:>10}", "Measure", "Q25", "Q50", "Q75");
    for measure in Measure::ALL {
        let b = report.boundaries.get(measure);
        println!("  {:<9} | {:>10.2} | {:>10.2} | {:>10.2}", measure.name(), b.q25, b.q50, b.q75);
    }
}

/// Print customer counts per segment, largest first
pub fn print_segment_counts(report: &RfmReport) {
    println!("\n=== Count of customers in each segment ===");
    for bar in segment_count_bars(&report.profiles) {
        let percentage = (bar.count as f64 / report.customer_count() as f64) * 100.0;
        println!("  {}: {} customers ({:.1}%)", bar.label, bar.count, percentage);
    }
}

/// Print count and mean measures for every observed segment
pub fn print_segment_analysis(report: &RfmReport) {
    println!("\n=== RFM Segment Analysis ===");
    println!(
        "  {:<9} | {:<18} | {:>8} | {:>8} | {:>9} | {:>10}",
        "RFM Score", "Segment", "Count", "Recency", "Frequency", "Monetary"
    );
    println!("  {:-<9}-|-{:-<18}-|-{:-<8}-|-{:-<8}-|-{:-<9}-|-{:-<10}", "", "", "", "", "", "");
    for p in &report.profiles {
        println!(
            "  {:<9} | {:<18} | {:>8} | {:>8.2} | {:>9.2} | {:>10.2}",
            p.label,
            p.segment_name.unwrap_or("-"),
            p.customer_count,
            p.mean_recency,
            p.mean_frequency,
            p.mean_monetary
        );
    }
}

/// Print every console table of the report
pub fn print_report(report: &RfmReport, tail_rows: usize) {
    println!("Reference date: {}", report.reference_date);
    print_customer_tail(report, tail_rows);
    print_boundaries(report);
    print_segment_counts(report);
    print_segment_analysis(report);
}
