//! chargegrid.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChargeGridConfig {
    pub server: ServerConfig,
    pub allocator: AllocatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("/var/lib/chargegrid"),
        }
    }
}

/// Tuning knobs for the allocation cycle.
///
/// Changing the factors changes who wins a contested station; the defaults
/// favour queue order, give priority requests a strong boost and push
/// people who already charged today to the back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Seconds between allocation cycles.
    pub interval_secs: u64,
    pub queue_order_factor: f64,
    pub distance_factor: f64,
    pub priority_bonus: f64,
    /// Added to the score of requesters who already charged today (negative).
    pub already_charged_penalty: f64,
    /// Pending/available ratio above which slots are shortened.
    pub high_demand_threshold: f64,
    /// Slot length in hours while demand is high.
    pub high_demand_hours_limit: u32,
    /// Local hour (0-23) at which the workday ends.
    pub end_of_workday_hour: u32,
    /// Offset of the workplace's local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            queue_order_factor: 10.0,
            distance_factor: 1.0,
            priority_bonus: 200.0,
            already_charged_penalty: -200.0,
            high_demand_threshold: 1.5,
            high_demand_hours_limit: 3,
            end_of_workday_hour: 18,
            utc_offset_minutes: 0,
        }
    }
}

impl ChargeGridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChargeGridConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the allocator cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let a = &self.allocator;
        if a.interval_secs == 0 {
            anyhow::bail!("allocator.interval_secs must be positive");
        }
        if a.end_of_workday_hour > 23 {
            anyhow::bail!(
                "allocator.end_of_workday_hour must be 0-23, got {}",
                a.end_of_workday_hour
            );
        }
        if a.utc_offset_minutes.abs() >= 24 * 60 {
            anyhow::bail!(
                "allocator.utc_offset_minutes out of range: {}",
                a.utc_offset_minutes
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = ChargeGridConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("end_of_workday_hour = 18"));
        let parsed: ChargeGridConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_partial() {
        let toml_str = r#"
[allocator]
high_demand_hours_limit = 2
utc_offset_minutes = 60
"#;
        let config: ChargeGridConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.allocator.high_demand_hours_limit, 2);
        assert_eq!(config.allocator.utc_offset_minutes, 60);
        assert_eq!(config.allocator.priority_bonus, 200.0);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_bad_hour() {
        let mut config = ChargeGridConfig::default();
        config.allocator.end_of_workday_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chargegrid.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = ChargeGridConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chargegrid.toml");
        std::fs::write(&path, "[allocator]\ninterval_secs = 0\n").unwrap();

        assert!(ChargeGridConfig::from_file(&path).is_err());
    }
}
