use anyhow::{Context, Result};
use clap::Parser;
use clusterstat::cli::Cli;
use clusterstat::decision::DecisionConfig;
use clusterstat::input::{self, DatabaseConfig};
use clusterstat::layout::ReportLayout;
use clusterstat::pipeline::{self, ReportConfig};
use clusterstat::plot::PlotOptions;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings by default, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Where the metrics come from
enum Input {
    Csv(std::path::PathBuf),
    Database(DatabaseConfig),
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let layout = match &args.layout {
        Some(path) => ReportLayout::from_file(path)?,
        None => ReportLayout::default(),
    };

    let decision = DecisionConfig {
        significance_level: args.alpha,
        min_sample_size: args.min_samples,
    };
    decision.validate()?;

    if !(args.annotation_threshold > 0.0 && args.annotation_threshold <= 1.0) {
        anyhow::bail!(
            "Invalid value for --annotation-threshold: {} (must be in (0, 1])",
            args.annotation_threshold
        );
    }

    // Connection settings are resolved before anything is written
    let source = match &args.input {
        Some(path) => Input::Csv(path.clone()),
        None => Input::Database(DatabaseConfig::from_env()?),
    };

    let config = ReportConfig {
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(pipeline::default_output_dir),
        decision,
        plot: PlotOptions {
            width: args.width,
            height: args.height,
            annotation_threshold: args.annotation_threshold,
            highlight_no_difference: !args.plain_background,
        },
        overview: !args.no_overview,
        keep_going: args.keep_going,
        format: args.format,
    };

    pipeline::prepare_output_dir(&config.output_dir)?;

    let records = match &source {
        Input::Csv(path) => input::load_csv(path)?,
        Input::Database(db) => input::load_database(db).context("Failed to load metrics")?,
    };
    tracing::info!("Loaded {} metric records", records.len());

    let stdout = std::io::stdout();
    pipeline::run(&records, &layout, &config, &mut stdout.lock())?;

    Ok(())
}
