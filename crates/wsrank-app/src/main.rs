// wsrank entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config
// 3. Load the databank tables
// 4. Run the analysis pipeline
// 5. Export result tables and the run summary

use wsrank_app::config;
use wsrank_app::export::{self, RunSummary};
use wsrank_baseball::lahman::LahmanTables;
use wsrank_baseball::pipeline;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("wsrank starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: data={}, output={}, percentiles={}",
        config.data_dir.display(),
        config.output_dir.display(),
        config.analysis.percentile_kind
    );

    let tables = LahmanTables::load(&config.data_dir)
        .with_context(|| format!("failed to load tables from {}", config.data_dir.display()))?;

    let options = config.pipeline_options();
    let output = pipeline::run(&tables, &options);

    let summary = RunSummary::new(&tables, &output, &options);
    let report = export::export_all(&config.output_dir, &output, &summary)
        .with_context(|| format!("failed to export results to {}", config.output_dir.display()))?;

    info!(
        "Done: {} team-seasons, {} winners, {} files written",
        summary.team_seasons,
        summary.winners,
        report.files.len()
    );
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wsrank=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
