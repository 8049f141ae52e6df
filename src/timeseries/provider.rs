use crate::error::ConfigurationError;

/// Hours in one day of an hourly series
pub const HOURS_PER_DAY: usize = 24;

/// Source of named numeric sequences aligned to the optimization horizon.
///
/// Implementations are data-preparation adapters; the optimizer only ever sees
/// the sequences they return.
pub trait TimeSeriesProvider {
    /// Hourly values of `column`
    fn hourly(&self, column: &str) -> Result<Vec<f64>, ConfigurationError>;

    /// Daily values of `column`
    fn daily(&self, column: &str) -> Result<Vec<f64>, ConfigurationError>;

    /// Normalize a sequence so that it sums to 1 over its period
    fn profile(&self, sequence: &[f64]) -> Result<Vec<f64>, ConfigurationError> {
        normalize_profile(sequence)
    }
}

/// Scale a non-negative sequence so its values sum to 1
pub fn normalize_profile(sequence: &[f64]) -> Result<Vec<f64>, ConfigurationError> {
    for (index, &value) in sequence.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::InvalidSeries {
                column: "profile".to_string(),
                index,
                value,
                reason: "profile values must be finite and non-negative",
            });
        }
    }

    let total: f64 = sequence.iter().sum();
    if total <= 0.0 {
        return Err(ConfigurationError::invalid(
            "input",
            "profile",
            "profile sums to zero and cannot be normalized",
        ));
    }
    Ok(sequence.iter().map(|v| v / total).collect())
}

/// Expand daily totals into an hourly series using a normalized intra-day profile.
///
/// Each day contributes `profile.len()` hours of `total * profile[h]`.
pub fn expand_daily(daily_totals: &[f64], profile: &[f64]) -> Vec<f64> {
    daily_totals
        .iter()
        .flat_map(|&total| profile.iter().map(move |share| total * share))
        .collect()
}

/// Sum an hourly series into daily totals; a trailing partial day is kept
pub fn daily_totals(hourly: &[f64]) -> Vec<f64> {
    hourly
        .chunks(HOURS_PER_DAY)
        .map(|day| day.iter().sum())
        .collect()
}
