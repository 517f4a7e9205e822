//! CLI argument parsing for clusterstat

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for decision reports on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text blocks (default)
    Text,
    /// One JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "clusterstat")]
#[command(version)]
#[command(
    about = "Statistical comparison reports of node and container metrics across cluster technologies",
    long_about = "Reads CPU and memory metrics (Technology, Source, MetricType, Value) from a CSV \
file or from the `metrics` table of a MySQL database, decides per metric type and source \
whether the technologies differ significantly (Shapiro-Wilk, Levene, ANOVA or Kruskal-Wallis, \
Tukey HSD or Dunn), and writes annotated box plots plus an HTML summary.\n\n\
Database mode reads DB_USER, DB_PASSWORD, DB_HOST, DB_PORT and DB_DATABASE."
)]
pub struct Cli {
    /// Read metrics from a CSV file instead of the database
    #[arg(short, long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Report directory (must not exist; default: _output/<timestamp>)
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML file replacing the built-in technology/source orderings and labels
    #[arg(long, value_name = "TOML")]
    pub layout: Option<PathBuf>,

    /// Significance level shared by every test
    #[arg(long, value_name = "ALPHA", default_value = "0.05")]
    pub alpha: f64,

    /// Minimum number of values per technology in a comparison
    #[arg(long = "min-samples", value_name = "N", default_value = "3")]
    pub min_samples: usize,

    /// Only annotate pairs with a p-value at or below this threshold
    #[arg(long = "annotation-threshold", value_name = "P", default_value = "0.05")]
    pub annotation_threshold: f64,

    /// Keep a white background when no significant difference was found
    #[arg(long = "plain-background")]
    pub plain_background: bool,

    /// Do not write the overview box plots
    #[arg(long = "no-overview")]
    pub no_overview: bool,

    /// Skip comparisons whose statistics are undefined instead of aborting
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Plot width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Plot height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["clusterstat"]);
        assert!(cli.input.is_none());
        assert!(cli.output_dir.is_none());
        assert!(cli.layout.is_none());
        assert_eq!(cli.alpha, 0.05);
        assert_eq!(cli.min_samples, 3);
        assert_eq!(cli.annotation_threshold, 0.05);
        assert!(!cli.plain_background);
        assert!(!cli.no_overview);
        assert!(!cli.keep_going);
        assert_eq!((cli.width, cli.height), (800, 600));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_input_and_output() {
        let cli = Cli::parse_from(["clusterstat", "-i", "metrics.csv", "-o", "report"]);
        assert_eq!(cli.input, Some(PathBuf::from("metrics.csv")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("report")));
    }

    #[test]
    fn test_cli_presentation_flags() {
        let cli = Cli::parse_from([
            "clusterstat",
            "--plain-background",
            "--no-overview",
            "--annotation-threshold",
            "0.01",
            "--width",
            "1024",
        ]);
        assert!(cli.plain_background);
        assert!(cli.no_overview);
        assert_eq!(cli.annotation_threshold, 0.01);
        assert_eq!(cli.width, 1024);
    }

    #[test]
    fn test_cli_decision_flags() {
        let cli = Cli::parse_from([
            "clusterstat",
            "--alpha",
            "0.01",
            "--min-samples",
            "5",
            "--keep-going",
        ]);
        assert_eq!(cli.alpha, 0.01);
        assert_eq!(cli.min_samples, 5);
        assert!(cli.keep_going);
    }

    #[test]
    fn test_cli_json_format() {
        let cli = Cli::parse_from(["clusterstat", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["clusterstat", "--format", "csv"]).is_err());
    }
}
