//! Report generation for one run
//!
//! Walks every eligible (metric type, source) comparison in layout order,
//! runs the decision engine, writes the plots, and finishes with the summary
//! tables. Comparisons share no state: a failing one either aborts the run
//! or, with `keep_going`, is reported and skipped.

use crate::cli::OutputFormat;
use crate::decision::{decide, DecisionConfig, DecisionOutcome};
use crate::groups::{extract_groups, ComparisonGroup};
use crate::html_output::{HtmlFailure, HtmlOutput};
use crate::json_output::{JsonComparisonIssue, JsonOutput};
use crate::layout::ReportLayout;
use crate::plot::{
    overview_file_name, render_overview_plot, render_statistics_plot, statistics_file_name,
    PlotOptions,
};
use crate::record::MetricRecord;
use crate::summary::SummaryAggregator;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the consolidated summary report
pub const SUMMARY_FILE: &str = "summary.html";

/// Configuration for one report run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub decision: DecisionConfig,
    pub plot: PlotOptions,
    /// Also write the plain overview box plots
    pub overview: bool,
    /// Skip failing comparisons instead of aborting
    pub keep_going: bool,
    pub format: OutputFormat,
}

impl ReportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            decision: DecisionConfig::default(),
            plot: PlotOptions::default(),
            overview: true,
            keep_going: false,
            format: OutputFormat::Text,
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub comparisons: usize,
    pub significant: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files: Vec<PathBuf>,
}

/// Default output directory: `_output/<local timestamp>`
pub fn default_output_dir() -> PathBuf {
    Path::new("_output").join(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
}

/// Create the output directory, refusing to reuse an existing one
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        anyhow::bail!(
            "Output directory {} already exists, refusing to overwrite a previous report",
            dir.display()
        );
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

fn write_artifact(dir: &Path, name: &str, content: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    files.push(path);
    Ok(())
}

/// Decide one comparison and write its statistics plot
fn process_group(
    group: &ComparisonGroup,
    layout: &ReportLayout,
    config: &ReportConfig,
    files: &mut Vec<PathBuf>,
) -> Result<DecisionOutcome> {
    let outcome = decide(group, &config.decision)?;
    let svg = render_statistics_plot(group, &outcome, layout, &config.plot)?;
    let name = statistics_file_name(layout.labels(group.metric), &group.source);
    write_artifact(&config.output_dir, &name, &svg, files)?;
    Ok(outcome)
}

/// Generate the full report into an existing output directory
///
/// Decision reports go to `out` (text blocks or one JSON document).
pub fn run<W: Write>(
    records: &[MetricRecord],
    layout: &ReportLayout,
    config: &ReportConfig,
    out: &mut W,
) -> Result<RunSummary> {
    config.decision.validate()?;

    let mut summary = RunSummary::default();
    let mut html = HtmlOutput::new();
    let mut json = JsonOutput::new(&config.decision);

    for group in extract_groups(records, layout) {
        if group.is_empty() {
            tracing::warn!(
                "No records for {}/{}, skipping comparison",
                group.metric,
                group.source
            );
            summary.skipped += 1;
            json.add_skipped(JsonComparisonIssue {
                metric: group.metric,
                source: group.source.clone(),
                reason: "no records".to_string(),
            });
            continue;
        }

        if config.overview {
            let svg = render_overview_plot(&group, layout, &config.plot)?;
            let name = overview_file_name(layout.labels(group.metric), &group.source);
            write_artifact(&config.output_dir, &name, &svg, &mut summary.files)?;
        }

        match process_group(&group, layout, config, &mut summary.files) {
            Ok(outcome) => {
                summary.comparisons += 1;
                if outcome.significant() {
                    summary.significant += 1;
                }
                if let OutputFormat::Text = config.format {
                    writeln!(out, "{}", outcome.to_report_string())?;
                }
                html.add_outcome(outcome.clone());
                json.add_outcome(outcome);
            }
            Err(e) if config.keep_going => {
                tracing::warn!(
                    "Comparison {}/{} failed, skipping: {:#}",
                    group.metric,
                    group.source,
                    e
                );
                summary.failed += 1;
                let message = format!("{:#}", e);
                html.add_failure(HtmlFailure {
                    metric: group.metric,
                    source: group.source.clone(),
                    message: message.clone(),
                });
                json.add_failed(JsonComparisonIssue {
                    metric: group.metric,
                    source: group.source.clone(),
                    reason: message,
                });
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Comparison {}/{} failed", group.metric, group.source)
                });
            }
        }
    }

    for table in SummaryAggregator::new(records, layout).tables() {
        html.add_table(table);
    }
    write_artifact(
        &config.output_dir,
        SUMMARY_FILE,
        &html.to_html(),
        &mut summary.files,
    )?;

    match config.format {
        OutputFormat::Text => writeln!(
            out,
            "{} comparisons ({} significant), {} skipped, {} failed; report written to {}",
            summary.comparisons,
            summary.significant,
            summary.skipped,
            summary.failed,
            config.output_dir.display()
        )?,
        OutputFormat::Json => writeln!(out, "{}", json.to_json()?)?,
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricType;

    fn records() -> Vec<MetricRecord> {
        let base = [9.5, 9.8, 10.0, 10.1, 10.3, 10.6, 9.9, 10.2];
        let mut records = Vec::new();
        for v in base {
            records.push(MetricRecord::new("k3s", "edge", MetricType::NodesCpu, v));
            records.push(MetricRecord::new("kubernetes", "edge", MetricType::NodesCpu, v + 40.0));
            records.push(MetricRecord::new("k3s", "edge", MetricType::NodesMemory, v + 20.0));
            records.push(MetricRecord::new("kubeedge", "edge", MetricType::NodesMemory, v + 20.0));
        }
        // only one technology: the comparison is undefined
        for v in base {
            records.push(MetricRecord::new("k3s", "kafka-ui", MetricType::ContainersCpu, v));
        }
        records
    }

    fn config(dir: &Path) -> ReportConfig {
        ReportConfig::new(dir.join("report"))
    }

    #[test]
    fn test_prepare_output_dir_refuses_existing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(prepare_output_dir(tmp.path()).is_err());

        let fresh = tmp.path().join("a").join("b");
        prepare_output_dir(&fresh).unwrap();
        assert!(fresh.is_dir());
    }

    #[test]
    fn test_default_output_dir_is_under_output() {
        assert!(default_output_dir().starts_with("_output"));
    }

    #[test]
    fn test_run_aborts_on_failing_comparison() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        prepare_output_dir(&config.output_dir).unwrap();

        let mut out = Vec::new();
        let err = run(&records(), &ReportLayout::default(), &config, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("containers_cpu/kafka-ui"));
    }

    #[test]
    fn test_run_keep_going_writes_everything_else() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        config.keep_going = true;
        prepare_output_dir(&config.output_dir).unwrap();

        let mut out = Vec::new();
        let summary = run(&records(), &ReportLayout::default(), &config, &mut out).unwrap();

        assert_eq!(summary.comparisons, 2);
        assert_eq!(summary.significant, 1);
        assert_eq!(summary.failed, 1);
        // 22 eligible pairs, 3 of them with data
        assert_eq!(summary.skipped, 19);

        let dir = &config.output_dir;
        assert!(dir.join("statistics-node-cpu-usage-edge.svg").is_file());
        assert!(dir.join("statistics-node-memory-usage-edge.svg").is_file());
        assert!(dir.join("node-cpu-edge.svg").is_file());
        assert!(dir.join("container-cpu-kafka-ui.svg").is_file());
        assert!(!dir.join("statistics-container-cpu-usage-kafka-ui.svg").exists());
        assert!(dir.join(SUMMARY_FILE).is_file());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("nodes_cpu / edge"));
        assert!(text.contains("2 comparisons (1 significant), 19 skipped, 1 failed"));
    }

    #[test]
    fn test_run_without_overview() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        config.keep_going = true;
        config.overview = false;
        prepare_output_dir(&config.output_dir).unwrap();

        run(&records(), &ReportLayout::default(), &config, &mut Vec::new()).unwrap();
        assert!(!config.output_dir.join("node-cpu-edge.svg").exists());
        assert!(config
            .output_dir
            .join("statistics-node-cpu-usage-edge.svg")
            .is_file());
    }

    #[test]
    fn test_run_json_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config(tmp.path());
        config.keep_going = true;
        config.format = OutputFormat::Json;
        prepare_output_dir(&config.output_dir).unwrap();

        let mut out = Vec::new();
        run(&records(), &ReportLayout::default(), &config, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["summary"]["comparisons"], 2);
        assert_eq!(value["failed"][0]["source"], "kafka-ui");
    }
}
