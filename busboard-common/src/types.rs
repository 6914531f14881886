use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chart identifier, one-to-one with a rendering container element.
pub type ChartId = &'static str;

/// The closed set of dashboard tabs. Each tab owns a fixed, ordered
/// subset of charts; a chart belongs to exactly one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Overview,
    Detailed,
    Analytics,
    Exports,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Detailed, Tab::Analytics, Tab::Exports];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Detailed => "detailed",
            Tab::Analytics => "analytics",
            Tab::Exports => "exports",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Tab::Overview),
            "detailed" => Ok(Tab::Detailed),
            "analytics" => Ok(Tab::Analytics),
            "exports" => Ok(Tab::Exports),
            other => Err(format!("unknown tab: {}", other)),
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Tab::Overview
    }
}

/// Size-class hint carried by a chart container element. Used to assign
/// deterministic fallback dimensions when the container reports 0x0
/// (typically because it sits in a non-active tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeClass {
    FullWidth,
    Large,
    Default,
}

impl SizeClass {
    /// Fallback box applied before the engine is initialized, so the
    /// engine never receives a 0x0 canvas.
    pub fn fallback_size(&self) -> (u32, u32) {
        match self {
            SizeClass::FullWidth => (1200, 500),
            SizeClass::Large => (800, 480),
            SizeClass::Default => (600, 380),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(tab.as_str().parse::<Tab>().unwrap(), tab);
        }
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn test_fallback_sizes_are_non_zero() {
        for class in [SizeClass::FullWidth, SizeClass::Large, SizeClass::Default] {
            let (w, h) = class.fallback_size();
            assert!(w > 0 && h > 0);
        }
    }
}
