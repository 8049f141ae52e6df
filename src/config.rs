use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BatteryParams, CapacityBounds, GenerationUnit, GridParams, HydrogenParams};
use crate::error::ConfigurationError;
use crate::optimizer::{SolverAdapter, SolverKind, TechnologySelection};
use crate::report::CsvLayout;
use crate::telemetry::LogFormat;
use crate::timeseries::InputConfig;

/// Config schema understood by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Default location of the TOML config file
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix of environment overrides, e.g. `SIZING__SOLVER__KIND=highs`
pub const ENV_PREFIX: &str = "SIZING__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    pub log: LogConfig,
    pub solver: SolverConfig,
    pub portfolio: PortfolioConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            log: LogConfig::default(),
            solver: SolverConfig::default(),
            portfolio: PortfolioConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Wall-clock limit for one solve; unlimited when absent
    #[serde(default)]
    pub time_limit_seconds: Option<u64>,
}

impl SolverConfig {
    pub fn adapter(&self) -> SolverAdapter {
        let adapter = SolverAdapter::new(self.kind);
        match self.time_limit_seconds {
            Some(secs) => adapter.with_time_limit(Duration::from_secs(secs)),
            None => adapter,
        }
    }
}

/// Where results are written; nothing is written when a path is absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dispatch_csv: Option<PathBuf>,
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
    #[serde(default)]
    pub csv_layout: CsvLayout,
}

/// Everything the model builder needs: generation units, optional
/// technologies and their physical parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub technologies: TechnologySelection,
    pub generation: GenerationConfig,
    pub grid: GridParams,
    pub battery: BatteryParams,
    pub hydrogen: HydrogenParams,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            technologies: TechnologySelection::default(),
            generation: GenerationConfig::default(),
            grid: GridParams::default(),
            battery: BatteryParams::default(),
            hydrogen: HydrogenParams::default(),
        }
    }
}

impl PortfolioConfig {
    /// Default parameters with wind and solar switched off
    pub fn baseload_only() -> Self {
        let mut portfolio = Self::default();
        portfolio.generation.wind.enabled = false;
        portfolio.generation.solar.enabled = false;
        portfolio
    }

    pub fn with_selection(mut self, selection: TechnologySelection) -> Self {
        self.technologies = selection;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub baseload: GeneratorConfig,
    pub wind: GeneratorConfig,
    pub solar: GeneratorConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            baseload: GeneratorConfig {
                name: "baseload".to_string(),
                enabled: true,
                capacity_kw: 77_000.0,
                lcoe_per_kwh: 0.064,
                min_units: 1,
                max_units: 5,
                availability: None,
            },
            wind: GeneratorConfig {
                name: "wind".to_string(),
                enabled: true,
                capacity_kw: 2_000.0,
                lcoe_per_kwh: 0.03693,
                min_units: 1,
                max_units: 100,
                availability: Some("wind".to_string()),
            },
            solar: GeneratorConfig {
                name: "solar".to_string(),
                enabled: true,
                capacity_kw: 100.0,
                lcoe_per_kwh: 0.03043,
                min_units: 1,
                max_units: 1_000,
                availability: Some("solar".to_string()),
            },
        }
    }
}

impl GenerationConfig {
    /// Enabled units in baseload, wind, solar order
    pub fn units(&self) -> impl Iterator<Item = &GeneratorConfig> {
        [&self.baseload, &self.wind, &self.solar]
            .into_iter()
            .filter(|unit| unit.enabled)
    }
}

/// One generation unit type and the range of its installed count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub capacity_kw: f64,
    pub lcoe_per_kwh: f64,
    pub min_units: u32,
    pub max_units: u32,
    /// Capacity-factor column; full availability every hour when absent
    #[serde(default)]
    pub availability: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl GeneratorConfig {
    pub fn unit(&self) -> GenerationUnit {
        GenerationUnit::new(&self.name, self.capacity_kw, self.lcoe_per_kwh)
    }

    pub fn bounds(&self) -> CapacityBounds {
        CapacityBounds::new(self.min_units, self.max_units)
    }
}

impl Config {
    /// Load defaults, then `path` (or the default file) if it exists, then
    /// `SIZING__` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        debug!(path = %path.display(), "loading config");
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Parse a complete or partial TOML document over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigurationError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml)),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigurationError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Schema and physics checks that do not need any time series
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ConfigurationError::UnsupportedSchema {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }

        for unit in self.portfolio.generation.units() {
            unit.unit().validate()?;
            unit.bounds().validate(&unit.name)?;
        }

        let selection = &self.portfolio.technologies;
        if selection.grid {
            self.portfolio.grid.validate_physics()?;
        }
        if selection.battery {
            self.portfolio.battery.validate_physics()?;
        }
        if selection.hydrogen {
            self.portfolio.hydrogen.validate_physics()?;
        }
        Ok(())
    }

    /// Availability columns the enabled generation units read
    pub fn availability_columns(&self) -> impl Iterator<Item = &str> {
        self.portfolio
            .generation
            .units()
            .filter_map(|unit| unit.availability.as_deref())
    }
}
