use std::fmt;

use serde::{Deserialize, Serialize};

/// Which optional technologies take part in a run.
///
/// Generation units are always present; grid import, battery and hydrogen are
/// switched independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnologySelection {
    pub grid: bool,
    pub battery: bool,
    pub hydrogen: bool,
}

impl Default for TechnologySelection {
    fn default() -> Self {
        Self {
            grid: true,
            battery: false,
            hydrogen: false,
        }
    }
}

impl TechnologySelection {
    pub fn generation_only() -> Self {
        Self {
            grid: false,
            battery: false,
            hydrogen: false,
        }
    }

    pub fn with_grid(mut self, enabled: bool) -> Self {
        self.grid = enabled;
        self
    }

    pub fn with_battery(mut self, enabled: bool) -> Self {
        self.battery = enabled;
        self
    }

    pub fn with_hydrogen(mut self, enabled: bool) -> Self {
        self.hydrogen = enabled;
        self
    }
}

impl fmt::Display for TechnologySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool| if on { "on" } else { "off" };
        write!(
            f,
            "grid={} battery={} hydrogen={}",
            flag(self.grid),
            flag(self.battery),
            flag(self.hydrogen)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_display() {
        let selection = TechnologySelection::default().with_battery(true);
        assert_eq!(selection.to_string(), "grid=on battery=on hydrogen=off");
        assert!(!TechnologySelection::generation_only().grid);
    }
}
