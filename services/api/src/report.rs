use crate::infra::load_snapshot;
use aquatac::error::AppError;
use aquatac::monitoring::aggregation::top_n;
use aquatac::monitoring::{
    InMemoryReadingStore, QualityLevel, Reading, ReadingQueryService, SafetyFlags, SafetySummary,
    WaterSample, DEFAULT_TOP_LIMIT,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Water temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) temperature: Option<f64>,
    /// pH value
    #[arg(long)]
    pub(crate) ph: Option<f64>,
    /// Turbidity in NTU
    #[arg(long)]
    pub(crate) turbidity: Option<f64>,
    /// Dissolved oxygen in mg/L
    #[arg(long)]
    pub(crate) dissolved_oxygen: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON export or CSV file (picked by extension)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Only report readings for this location (case-insensitive)
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Number of top-scoring readings to list
    #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
    pub(crate) top: usize,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreOutcome {
    pub(crate) quality_score: f64,
    pub(crate) quality_level: QualityLevel,
    #[serde(flatten)]
    pub(crate) flags: SafetyFlags,
}

impl ScoreOutcome {
    pub(crate) fn evaluate(sample: WaterSample) -> Self {
        let quality_score = sample.quality_score();
        Self {
            quality_score,
            quality_level: QualityLevel::from_score(quality_score),
            flags: sample.safety(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) location: Option<String>,
    pub(crate) history: Vec<Reading>,
    pub(crate) top_readings: Vec<SafetySummary>,
}

pub(crate) fn run_score(args: ScoreArgs) {
    let sample = WaterSample::new(
        args.temperature,
        args.ph,
        args.turbidity,
        args.dissolved_oxygen,
    );
    let outcome = ScoreOutcome::evaluate(sample);

    println!(
        "Quality score: {:.1} ({})",
        outcome.quality_score,
        outcome.quality_level.label()
    );
    println!("Safe for swimming: {}", yes_no(outcome.flags.safe_for_swimming));
    println!("Safe for fishing: {}", yes_no(outcome.flags.safe_for_fishing));
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        location,
        top,
        json,
    } = args;

    let tree = load_snapshot(&snapshot)?;
    let service = ReadingQueryService::new(Arc::new(InMemoryReadingStore::new(tree)));
    let report = build_report(&service, location, top).await?;

    if json {
        println!("{}", render_json(&report)?);
    } else {
        render_report(&report, &snapshot);
    }

    Ok(())
}

/// With a location, history and ranking cover only that location's readings.
pub(crate) async fn build_report(
    service: &ReadingQueryService<InMemoryReadingStore>,
    location: Option<String>,
    top: usize,
) -> Result<SnapshotReport, AppError> {
    let report = match location {
        Some(name) => {
            let history = service.location_history(&name).await?;
            let top_readings = top_n(history.clone(), top)
                .iter()
                .map(Reading::summary)
                .collect();
            SnapshotReport {
                location: Some(name),
                history,
                top_readings,
            }
        }
        None => SnapshotReport {
            location: None,
            history: service.history().await?,
            top_readings: service.top_readings(top).await?,
        },
    };
    Ok(report)
}

pub(crate) fn render_json(report: &SnapshotReport) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn render_report(report: &SnapshotReport, snapshot: &std::path::Path) {
    println!("Water-quality report for {}", snapshot.display());
    if let Some(location) = &report.location {
        println!("Location filter: {location}");
    }

    println!("\nHistory ({} readings)", report.history.len());
    for reading in &report.history {
        println!(
            "- [{}] {} @ {} | score {:.1} ({}) | swim {} | fish {}",
            reading.reading_id(),
            reading.location(),
            display_timestamp(reading.timestamp()),
            reading.quality_score(),
            reading.quality_level().label(),
            yes_no(reading.safe_for_swimming()),
            yes_no(reading.safe_for_fishing()),
        );
    }

    println!("\nTop readings");
    if report.top_readings.is_empty() {
        println!("- none");
    }
    for (rank, summary) in report.top_readings.iter().enumerate() {
        println!(
            "{}. {} @ {} | score {:.1}",
            rank + 1,
            summary.location,
            display_timestamp(&summary.timestamp),
            summary.quality_score,
        );
    }
}

fn display_timestamp(timestamp: &str) -> &str {
    if timestamp.is_empty() {
        "unknown time"
    } else {
        timestamp
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
