//! On-disk shapes of preset files.
//!
//! Every definition refers to other definitions by name. The preset builder
//! resolves those names into catalog keys; quality-dependent values are
//! keyed by quality name.

use std::collections::BTreeMap;

use chainplan_core::entity::{EnergySource, EntityType, FluidProperties};
use chainplan_core::settings::GraphSettings;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

// ===========================================================================
// Qualities
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QualityData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub level: u32,
    /// The tier this one upgrades into.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub next_probability: f64,
    #[serde(default = "default_one")]
    pub beacon_power_multiplier: f64,
    #[serde(default = "default_one")]
    pub mining_drill_resource_drain_multiplier: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

// ===========================================================================
// Items
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub stack_size: Option<u32>,
    #[serde(default)]
    pub fuel_value: Option<f64>,
    #[serde(default)]
    pub burn_result: Option<String>,
    #[serde(default)]
    pub spoil_result: Option<String>,
    /// Name of the plant process this item grows through when planted.
    #[serde(default)]
    pub plant_result: Option<String>,
    /// Seconds until spoilage, by quality name.
    #[serde(default)]
    pub spoil_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub fluid: Option<FluidProperties>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

// ===========================================================================
// Modules
// ===========================================================================

/// Module bonuses at normal quality.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub productivity: f64,
    #[serde(default)]
    pub consumption: f64,
    #[serde(default)]
    pub pollution: f64,
    #[serde(default)]
    pub quality: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

// ===========================================================================
// Entities
// ===========================================================================

/// Stats shared by assemblers and beacons.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityStatsData {
    pub entity_type: EntityType,
    pub energy_source: EnergySource,
    #[serde(default)]
    pub module_slots: usize,
    /// Names of the modules the entity accepts.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Names of the items a burner accepts.
    #[serde(default)]
    pub fuels: Vec<String>,
    /// Crafting speed by quality name.
    #[serde(default)]
    pub speed: BTreeMap<String, f64>,
    /// Watts by quality name.
    #[serde(default)]
    pub energy_consumption: BTreeMap<String, f64>,
    #[serde(default)]
    pub energy_production: BTreeMap<String, f64>,
    #[serde(default)]
    pub energy_drain: f64,
    #[serde(default = "default_one")]
    pub consumption_effectivity: f64,
    #[serde(default)]
    pub operation_temperature: Option<f64>,
    #[serde(default)]
    pub neighbour_bonus: f64,
    #[serde(default)]
    pub temperature_fluid_burner: bool,
    #[serde(default)]
    pub pollution: BTreeMap<String, f64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssemblerData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub stats: EntityStatsData,
    #[serde(default)]
    pub base_productivity_bonus: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeaconData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub stats: EntityStatsData,
    #[serde(default)]
    pub distribution_effectivity: Option<f64>,
    #[serde(default)]
    pub distribution_effectivity_quality_boost: f64,
    /// Per-beacon multipliers by beacon count, starting at one beacon.
    /// Absent means the flat default profile.
    #[serde(default)]
    pub profile: Option<Vec<f64>>,
}

// ===========================================================================
// Recipes
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientData {
    pub item: String,
    pub amount: f64,
    #[serde(default)]
    pub min_temperature: Option<f64>,
    #[serde(default)]
    pub max_temperature: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductData {
    pub item: String,
    pub amount: f64,
    /// Part of `amount` productivity applies to; defaults to all of it.
    #[serde(default)]
    pub productivity_amount: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub time: f64,
    #[serde(default)]
    pub max_productivity_bonus: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<IngredientData>,
    #[serde(default)]
    pub products: Vec<ProductData>,
    pub assemblers: Vec<String>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

// ===========================================================================
// Plant processes
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PlantProductData {
    pub item: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantProcessData {
    pub name: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub grow_time: f64,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub products: Vec<PlantProductData>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// ===========================================================================
// Settings
// ===========================================================================

/// Graph settings shipped with a preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresetSettings {
    /// Quality new nodes start at. Defaults to the lowest level tier.
    pub default_quality: Option<String>,
    pub graph: GraphSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_take_defaults() {
        let item: ItemData = ron::from_str(r#"(name: "coal")"#).unwrap();
        assert!(item.enabled && item.available);
        assert!(item.fuel_value.is_none());
        assert!(item.spoil_times.is_empty());

        let quality: QualityData = serde_json::from_str(r#"{"name": "rare", "level": 2}"#).unwrap();
        assert_eq!(quality.beacon_power_multiplier, 1.0);
        assert!(quality.next.is_none());
    }

    #[test]
    fn entity_stats_read_enums_and_quality_maps() {
        let assembler: AssemblerData = toml::from_str(
            r#"
            name = "assembler"
            [stats]
            entity_type = "Assembler"
            energy_source = "Electric"
            module_slots = 2
            modules = ["speed"]
            [stats.speed]
            normal = 0.75
            rare = 0.975
            "#,
        )
        .unwrap();
        assert_eq!(assembler.stats.entity_type, EntityType::Assembler);
        assert_eq!(assembler.stats.speed.get("rare"), Some(&0.975));
        assert_eq!(assembler.stats.consumption_effectivity, 1.0);
    }

    #[test]
    fn settings_default_when_empty() {
        let settings: PresetSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.default_quality.is_none());
        assert_eq!(settings.graph, GraphSettings::default());
    }
}
