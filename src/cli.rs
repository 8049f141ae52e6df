use std::path::PathBuf;

use clap::Parser;
use hybrid_sizing::optimizer::SolverKind;
use hybrid_sizing::report::CsvLayout;
use hybrid_sizing::telemetry::LogFormat;
use hybrid_sizing::Config;

/// Size a hybrid generation and storage portfolio against hourly demand.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// TOML config file; `config/default.toml` when omitted.
    #[clap(long, env = "SIZING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model a battery.
    #[clap(long)]
    pub battery: bool,

    /// Model the electrolyzer, tank and fuel-cell loop.
    #[clap(long)]
    pub hydrogen: bool,

    /// Disable grid import.
    #[clap(long = "no-grid")]
    pub no_grid: bool,

    /// Use only the first N hours of the input series.
    #[clap(long)]
    pub hours: Option<usize>,

    /// Write the hourly dispatch table to this CSV file.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Write the dispatch CSV in the long layout.
    #[clap(long)]
    pub long: bool,

    /// Write the run summary to this JSON file.
    #[clap(long)]
    pub summary: Option<PathBuf>,

    /// Solve every battery/hydrogen combination and compare them.
    #[clap(long)]
    pub sweep: bool,

    /// Abandon the solve after this many seconds.
    #[clap(long = "time-limit")]
    pub time_limit_seconds: Option<u64>,

    /// Solver backend: microlp, highs or cbc.
    #[clap(long, env = "SIZING_SOLVER")]
    pub solver: Option<SolverKind>,

    /// Log format: pretty or json.
    #[clap(long = "log-format")]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Command-line flags take precedence over the config file and environment
    pub fn apply(&self, config: &mut Config) {
        let technologies = &mut config.portfolio.technologies;
        technologies.battery |= self.battery;
        technologies.hydrogen |= self.hydrogen;
        if self.no_grid {
            technologies.grid = false;
        }

        if self.hours.is_some() {
            config.input.hours = self.hours;
        }
        if let Some(path) = &self.output {
            config.output.dispatch_csv = Some(path.clone());
        }
        if self.long {
            config.output.csv_layout = CsvLayout::Long;
        }
        if let Some(path) = &self.summary {
            config.output.summary_json = Some(path.clone());
        }
        if self.time_limit_seconds.is_some() {
            config.solver.time_limit_seconds = self.time_limit_seconds;
        }
        if let Some(kind) = self.solver {
            config.solver.kind = kind;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }
}
