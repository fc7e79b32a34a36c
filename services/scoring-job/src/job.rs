use crate::cli::{ExplainArgs, InputArgs, RunArgs};
use crate::infra::{default_output_path, load_run_settings};
use chrono::{DateTime, SecondsFormat, Utc};
use reform_readiness::batch::{
    EventImport, EventImporter, FeatureExporter, ImportStats, ScoreExporter,
};
use reform_readiness::config::{AppConfig, JobConfig};
use reform_readiness::error::AppError;
use reform_readiness::readiness::{
    Event, FeatureRecord, ReadinessPipeline, ReadinessSettings, ScoreBreakdown,
    ScoringRunSummary,
};
use reform_readiness::telemetry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

struct ResolvedInputs {
    events_csv: PathBuf,
    settings: ReadinessSettings,
    as_of: DateTime<Utc>,
}

fn resolve_inputs(job: &JobConfig, inputs: InputArgs) -> Result<ResolvedInputs, AppError> {
    let InputArgs {
        events_csv,
        settings,
        as_of,
    } = inputs;

    let settings_path = settings.or_else(|| job.settings.clone());
    let settings = load_run_settings(settings_path.as_deref())?;

    Ok(ResolvedInputs {
        events_csv: events_csv.unwrap_or_else(|| job.events_csv.clone()),
        settings,
        as_of: as_of.unwrap_or_else(Utc::now),
    })
}

fn prepare(inputs: InputArgs) -> Result<(AppConfig, ResolvedInputs), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let resolved = resolve_inputs(&config.job, inputs)?;
    info!(
        environment = ?config.environment,
        events_csv = %resolved.events_csv.display(),
        as_of = %resolved.as_of,
        "starting readiness job"
    );
    Ok((config, resolved))
}

pub(crate) fn run_scoring(args: RunArgs) -> Result<(), AppError> {
    let RunArgs {
        inputs,
        output_csv,
        features_csv,
        top,
        json,
    } = args;

    let (config, inputs) = prepare(inputs)?;
    let pipeline = ReadinessPipeline::new(&inputs.settings)?;
    let EventImport { events, stats } = EventImporter::from_path(&inputs.events_csv)?;

    if events.is_empty() {
        warn!(
            path = %inputs.events_csv.display(),
            rows = stats.rows,
            "no usable events; nothing to score"
        );
        println!(
            "No usable events in {}; no scores written.",
            inputs.events_csv.display()
        );
        return Ok(());
    }

    let run = pipeline.run(&events, inputs.as_of);

    let output_csv =
        output_csv.unwrap_or_else(|| default_output_path(&config.job.output_dir, inputs.as_of));
    ScoreExporter::to_path(&output_csv, &run.scores)?;
    info!(path = %output_csv.display(), scores = run.scores.len(), "wrote scores");

    if let Some(features_csv) = &features_csv {
        FeatureExporter::to_path(features_csv, &run.features)?;
        info!(path = %features_csv.display(), "wrote feature records");
    }

    let summary = ScoringRunSummary::from_run(&run, top.unwrap_or(config.job.top_n));
    if json {
        print_json(&summary);
    } else {
        render_run_summary(&summary, &stats, &output_csv, features_csv.as_deref());
    }

    Ok(())
}

pub(crate) fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let ExplainArgs {
        identity,
        inputs,
        json,
    } = args;

    let (_, inputs) = prepare(inputs)?;
    let pipeline = ReadinessPipeline::new(&inputs.settings)?;
    let EventImport { events, .. } = EventImporter::from_path(&inputs.events_csv)?;

    let declared_value = declared_value(&events, &identity, inputs.as_of);
    match pipeline.explain(&events, &identity, inputs.as_of) {
        Some((features, breakdown)) if json => print_json(&ExplainView {
            features: &features,
            breakdown: &breakdown,
            declared_value,
        }),
        Some((features, breakdown)) => render_breakdown(&features, &breakdown, declared_value),
        None => println!(
            "Identity {} has no events in {}",
            identity,
            inputs.events_csv.display()
        ),
    }

    Ok(())
}

#[derive(Serialize)]
struct ExplainView<'a> {
    features: &'a FeatureRecord,
    breakdown: &'a ScoreBreakdown,
    declared_value: Option<f64>,
}

/// Sum of the `value` property over the identity's events up to `as_of`; `None` when no
/// event carries one.
fn declared_value(events: &[Event], identity: &str, as_of: DateTime<Utc>) -> Option<f64> {
    events
        .iter()
        .filter(|event| event.identity.as_str() == identity && event.event_time <= as_of)
        .filter_map(|event| event.properties.value())
        .fold(None, |total, value| Some(total.unwrap_or(0.0) + value))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("JSON output unavailable: {err}"),
    }
}

fn render_run_summary(
    summary: &ScoringRunSummary,
    stats: &ImportStats,
    output_csv: &Path,
    features_csv: Option<&Path>,
) {
    println!("Readiness scoring run for {}", summary.score_date);
    println!(
        "- {} rows read | {} events imported | {} skipped",
        stats.rows, stats.imported, stats.skipped
    );
    println!(
        "- {} identities scored | mean score {:.2}",
        summary.identities, summary.mean_score
    );
    println!("- Scores written to {}", output_csv.display());
    if let Some(path) = features_csv {
        println!("- Features written to {}", path.display());
    }

    println!("\nClass distribution");
    for entry in &summary.distribution {
        println!(
            "- {}: {} ({:.1}%)",
            entry.class_label, entry.count, entry.percentage
        );
    }

    println!("\nTop scores");
    if summary.top_scores.is_empty() {
        println!("- none");
    }
    for view in &summary.top_scores {
        println!(
            "{:>3}. {} | {:.2} | {}",
            view.rank, view.identity, view.score, view.class_label
        );
    }
}

fn render_breakdown(
    features: &FeatureRecord,
    breakdown: &ScoreBreakdown,
    declared_value: Option<f64>,
) {
    println!(
        "Readiness for {} as of {}",
        breakdown.identity,
        features
            .reference_time
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!(
        "- Score {:.2} -> {}",
        breakdown.score, breakdown.class_label
    );

    println!("\nFeatures");
    match features.recency_days {
        Some(days) => println!("- recency_days: {days:.2}"),
        None => println!("- recency_days: none within lookback"),
    }
    println!(
        "- frequency 7d/14d/30d: {}/{}/{}",
        features.freq_7d, features.freq_14d, features.freq_30d
    );
    println!("- high_intent_7d: {}", features.high_intent_7d);
    println!(
        "- category_diversity_14d: {}",
        features.category_diversity_14d
    );
    println!("- cart_abandon_7d: {}", features.cart_abandon_7d);
    println!("- reform_bundle_14d: {}", features.reform_bundle_14d);
    if let Some(total) = declared_value {
        println!("- declared value across events: {total:.2}");
    }

    println!("\nComponents");
    for component in &breakdown.components {
        println!(
            "- {}: {:.2} x {:.2} = {:.2}",
            component.component, component.normalized, component.weight, component.contribution
        );
    }
}
