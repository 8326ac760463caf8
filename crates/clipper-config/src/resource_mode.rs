use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Per-deployment tuning knob from §6 "Environment signals".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    HighPerformance,
    Balanced,
    ResourceConservative,
}

impl Default for ResourceMode {
    fn default() -> Self {
        ResourceMode::Balanced
    }
}

impl FromStr for ResourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high_performance" | "high-performance" => Ok(ResourceMode::HighPerformance),
            "balanced" => Ok(ResourceMode::Balanced),
            "resource_conservative" | "resource-conservative" => {
                Ok(ResourceMode::ResourceConservative)
            }
            other => Err(format!("unknown resource mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!(
            ResourceMode::from_str("high_performance").unwrap(),
            ResourceMode::HighPerformance
        );
        assert_eq!(
            ResourceMode::from_str("resource_conservative").unwrap(),
            ResourceMode::ResourceConservative
        );
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(ResourceMode::from_str("turbo").is_err());
    }
}
