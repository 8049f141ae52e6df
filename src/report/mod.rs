//! Post-solve interpretation and presentation.

pub mod export;
pub mod extract;
pub mod metrics;
pub mod render;
pub mod table;

pub use export::{
    export_dispatch_csv, export_summary_json, CsvLayout, write_long_csv, write_wide_csv,
};
pub use extract::{ResultExtractor, SizingReport, TechnologySummary};
pub use metrics::{CostLedger, InstalledCapacity, SystemMetrics};
pub use render::{build_capacity_table, build_cost_table, build_dispatch_table, build_sweep_table};
pub use table::{LongRecord, ReportColumn, ReportTable};
