//! Graph-wide settings every node is evaluated against.

use serde::{Deserialize, Serialize};

/// Time unit rates are displayed and entered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    #[default]
    PerSecond,
    PerMinute,
    PerHour,
}

impl RateUnit {
    /// Factor converting a per-second rate into this unit.
    pub fn multiplier(self) -> f64 {
        match self {
            RateUnit::PerSecond => 1.0,
            RateUnit::PerMinute => 60.0,
            RateUnit::PerHour => 3600.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RateUnit::PerSecond => "sec",
            RateUnit::PerMinute => "min",
            RateUnit::PerHour => "hour",
        }
    }
}

/// Bounds and display settings shared by all nodes of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub rate_unit: RateUnit,
    /// Upper bound for a recipe node's assembler count.
    pub max_factories: f64,
    /// Upper bound for a plant node's farming tiles.
    pub max_tiles: f64,
    /// Upper bound for a spoil node's inventory slots.
    pub max_inventory_slots: f64,
    /// Upper bound for supplier, consumer and passthrough rates.
    pub max_set_value: f64,
    /// Number of quality tiers an output may cascade through, counting its own.
    pub max_quality_steps: u32,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            rate_unit: RateUnit::PerSecond,
            max_factories: 10_000_000.0,
            max_tiles: 10_000_000.0,
            max_inventory_slots: 10_000_000.0,
            max_set_value: 10_000_000.0,
            max_quality_steps: 3,
        }
    }
}

impl GraphSettings {
    pub fn rate_multiplier(&self) -> f64 {
        self.rate_unit.multiplier()
    }

    pub fn rate_name(&self) -> &'static str {
        self.rate_unit.name()
    }

    /// Reject bounds no node can be clamped against.
    pub fn check_bounds(&self) -> Result<(), String> {
        let bounds = [
            ("max_factories", self.max_factories),
            ("max_tiles", self.max_tiles),
            ("max_inventory_slots", self.max_inventory_slots),
            ("max_set_value", self.max_set_value),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite non-negative number, got {value}"));
            }
        }
        if self.max_quality_steps == 0 {
            return Err("max_quality_steps must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_unit_multipliers() {
        assert_eq!(RateUnit::PerSecond.multiplier(), 1.0);
        assert_eq!(RateUnit::PerMinute.multiplier(), 60.0);
        assert_eq!(RateUnit::PerHour.multiplier(), 3600.0);
        assert_eq!(RateUnit::PerMinute.name(), "min");
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: GraphSettings =
            serde_json::from_str(r#"{ "rate_unit": "per_minute", "max_quality_steps": 5 }"#)
                .unwrap();
        assert_eq!(settings.rate_multiplier(), 60.0);
        assert_eq!(settings.max_quality_steps, 5);
        assert_eq!(settings.max_factories, 10_000_000.0);
    }

    #[test]
    fn bounds_must_be_finite_and_non_negative() {
        assert!(GraphSettings::default().check_bounds().is_ok());

        let mut settings = GraphSettings::default();
        settings.max_tiles = -1.0;
        assert!(settings.check_bounds().unwrap_err().contains("max_tiles"));

        let mut settings = GraphSettings::default();
        settings.max_set_value = f64::NAN;
        assert!(settings.check_bounds().unwrap_err().contains("max_set_value"));

        let mut settings = GraphSettings::default();
        settings.max_quality_steps = 0;
        assert!(settings.check_bounds().is_err());
    }
}
