mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use hybrid_sizing::report::{
    build_capacity_table, build_cost_table, build_dispatch_table, build_sweep_table,
    export_dispatch_csv, export_summary_json,
};
use hybrid_sizing::telemetry::init_tracing;
use hybrid_sizing::{Config, HourlyInputs, SizingEngine};
use tracing::info;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = Config::load(args.config.as_deref()).context("failed to load config")?;
    args.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    init_tracing(cfg.log.format);

    let inputs = HourlyInputs::load(&cfg.input, cfg.availability_columns())
        .context("failed to load time series")?;
    let engine = SizingEngine::from_config(&cfg);

    if args.sweep {
        let entries = engine.sweep(&inputs);
        println!("{}", build_sweep_table(&entries));
        return Ok(());
    }

    let outcome = engine
        .run_configured(&inputs)
        .await
        .context("sizing run failed")?;

    println!("{}", build_capacity_table(&outcome.report));
    println!("{}", build_cost_table(&outcome.report));
    println!("{}", build_dispatch_table(&outcome.report));

    if let Some(path) = &cfg.output.dispatch_csv {
        export_dispatch_csv(&outcome.report.table, path, cfg.output.csv_layout)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), layout = %cfg.output.csv_layout, "dispatch written");
    }
    if let Some(path) = &cfg.output.summary_json {
        export_summary_json(&outcome, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    Ok(())
}
