use serde::Serialize;

use crate::error::ExtractionError;

/// One per-hour quantity of one technology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportColumn {
    pub technology: String,
    /// Quantity name including its unit suffix, e.g. `soc_kwh`
    pub quantity: String,
    pub values: Vec<f64>,
}

impl ReportColumn {
    pub fn new(technology: impl Into<String>, quantity: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            technology: technology.into(),
            quantity: quantity.into(),
            values,
        }
    }

    /// Header used by the wide layout
    pub fn header(&self) -> String {
        format!("{}.{}", self.technology, self.quantity)
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// A single cell of the long layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LongRecord<'a> {
    pub hour: usize,
    pub technology: &'a str,
    pub quantity: &'a str,
    pub value: f64,
}

/// Per-hour results: one row per hour, one column per technology quantity.
///
/// The same data is available in a long layout of
/// `(hour, technology, quantity, value)` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    hours: usize,
    columns: Vec<ReportColumn>,
}

impl ReportTable {
    pub fn new(hours: usize) -> Self {
        Self {
            hours,
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, column: ReportColumn) {
        debug_assert_eq!(column.values.len(), self.hours);
        self.columns.push(column);
    }

    pub fn hours(&self) -> usize {
        self.hours
    }

    pub fn columns(&self) -> &[ReportColumn] {
        &self.columns
    }

    /// Values of `technology.quantity`; asking for something the model never
    /// declared is an error, not an empty series
    pub fn column(&self, technology: &str, quantity: &str) -> Result<&[f64], ExtractionError> {
        self.columns
            .iter()
            .find(|c| c.technology == technology && c.quantity == quantity)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| ExtractionError::UndeclaredVariable {
                owner: technology.to_string(),
                name: quantity.to_string(),
            })
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(ReportColumn::header).collect()
    }

    /// Rows of the wide layout, in column order
    pub fn wide_rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.hours).map(move |t| self.columns.iter().map(|c| c.values[t]).collect())
    }

    /// Records of the long layout, hour-major
    pub fn long_rows(&self) -> impl Iterator<Item = LongRecord<'_>> + '_ {
        (0..self.hours).flat_map(move |hour| {
            self.columns.iter().map(move |c| LongRecord {
                hour,
                technology: &c.technology,
                quantity: &c.quantity,
                value: c.values[hour],
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportTable {
        let mut table = ReportTable::new(2);
        table.push(ReportColumn::new("wind", "generation_kw", vec![10.0, 20.0]));
        table.push(ReportColumn::new("battery", "soc_kwh", vec![5.0, 4.0]));
        table
    }

    #[test]
    fn test_wide_and_long_views_agree() {
        let table = sample();
        assert_eq!(table.headers(), vec!["wind.generation_kw", "battery.soc_kwh"]);

        let wide: Vec<Vec<f64>> = table.wide_rows().collect();
        assert_eq!(wide, vec![vec![10.0, 5.0], vec![20.0, 4.0]]);

        let long: Vec<LongRecord<'_>> = table.long_rows().collect();
        assert_eq!(long.len(), 4);
        assert_eq!(long[3].hour, 1);
        assert_eq!(long[3].technology, "battery");
        assert_eq!(long[3].value, 4.0);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let table = sample();
        assert_eq!(table.column("wind", "generation_kw").unwrap(), &[10.0, 20.0]);
        assert!(matches!(
            table.column("hydrogen", "level_kg"),
            Err(ExtractionError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn test_column_summaries() {
        let column = ReportColumn::new("grid", "import_kw", vec![1.0, 3.0, 2.0]);
        assert_eq!(column.total(), 6.0);
        assert_eq!(column.peak(), 3.0);
    }
}
