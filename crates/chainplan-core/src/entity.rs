//! Catalog entity definitions: qualities, items, recipes, assemblers and
//! plant processes.
//!
//! Definitions are plain data. They are loaded once per preset and only read
//! by the node layer; every numeric accessor falls back to a neutral default
//! so that a placeholder (missing) definition never poisons rate math.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::id::{AssemblerId, ItemId, ModuleId, PlantProcessId, QualityId};

/// Energy consumption (watts) used when an entity has no value for a quality.
pub const DEFAULT_ENERGY_CONSUMPTION: f64 = 1000.0;

/// Nominal fuel rate handed to the solver when the real one cannot be computed.
pub const MIN_FUEL_CONSUMPTION_RATE: f64 = 0.01;

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

/// How an entity is powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergySource {
    Burner,
    FluidBurner,
    Electric,
    Heat,
    Void,
}

/// The role an entity plays in the production chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Miner,
    OffshorePump,
    Assembler,
    Beacon,
    Boiler,
    Generator,
    BurnerGenerator,
    Reactor,
    Rocket,
}

impl EntityType {
    /// Human readable name of the entity category.
    pub fn display_name(self, plural: bool) -> &'static str {
        match (self, plural) {
            (EntityType::Miner, false) => "Miner",
            (EntityType::Miner, true) => "Miners",
            (EntityType::OffshorePump, false) => "Offshore Pump",
            (EntityType::OffshorePump, true) => "Offshore Pumps",
            (EntityType::Assembler, false) => "Assembler",
            (EntityType::Assembler, true) => "Assemblers",
            (EntityType::Beacon, false) => "Beacon",
            (EntityType::Beacon, true) => "Beacons",
            (EntityType::Boiler, false) => "Boiler",
            (EntityType::Boiler, true) => "Boilers",
            (EntityType::Generator, false) => "Generator",
            (EntityType::Generator, true) => "Generators",
            (EntityType::BurnerGenerator, false) => "Burner Generator",
            (EntityType::BurnerGenerator, true) => "Burner Generators",
            (EntityType::Reactor, false) => "Reactor",
            (EntityType::Reactor, true) => "Reactors",
            (EntityType::Rocket, false) => "Rocket Launch",
            (EntityType::Rocket, true) => "Rocket Launches",
        }
    }

    /// Whether this entity type consumes a hot fluid to produce electricity.
    pub fn is_generator(self) -> bool {
        matches!(self, EntityType::Generator)
    }
}

/// An inclusive temperature interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn point(temperature: f64) -> Self {
        Self {
            min: temperature,
            max: temperature,
        }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &TemperatureRange) -> TemperatureRange {
        TemperatureRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// A quality tier. Tiers form an acyclic chain through `next`, with `level`
/// strictly increasing along it.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityDef {
    pub name: String,
    pub friendly_name: String,
    pub level: u32,
    pub next: Option<QualityId>,
    pub prev: Option<QualityId>,
    /// Chance that an output of this tier upgrades to `next`.
    pub next_probability: f64,
    pub beacon_power_multiplier: f64,
    pub mining_drill_resource_drain_multiplier: f64,
    pub enabled: bool,
    pub available: bool,
}

impl QualityDef {
    pub fn new(name: &str, level: u32) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            level,
            next: None,
            prev: None,
            next_probability: 0.0,
            beacon_power_multiplier: 1.0,
            mining_drill_resource_drain_multiplier: 1.0,
            enabled: true,
            available: true,
        }
    }
}

impl CatalogEntry for QualityDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name, 0)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Extra data carried by fluids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    pub default_temperature: f64,
    pub specific_heat_capacity: f64,
    pub temperature_dependent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub name: String,
    pub friendly_name: String,
    pub enabled: bool,
    pub available: bool,
    pub stack_size: u32,
    /// Energy (joules) released when burnt as fuel.
    pub fuel_value: f64,
    pub burn_result: Option<ItemId>,
    pub spoil_result: Option<ItemId>,
    pub plant_result: Option<PlantProcessId>,
    /// Seconds until spoilage, per quality.
    pub spoil_times: HashMap<QualityId, f64>,
    pub fluid: Option<FluidProperties>,
}

impl ItemDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            enabled: true,
            available: true,
            stack_size: 1,
            fuel_value: 1.0,
            burn_result: None,
            spoil_result: None,
            plant_result: None,
            spoil_times: HashMap::new(),
            fluid: None,
        }
    }

    pub fn is_fluid(&self) -> bool {
        self.fluid.is_some()
    }

    pub fn spoilage_time(&self, quality: QualityId) -> f64 {
        self.spoil_times.get(&quality).copied().unwrap_or(1.0)
    }

    pub fn stack_size(&self) -> f64 {
        f64::from(self.stack_size.max(1))
    }
}

impl CatalogEntry for ItemDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub item: ItemId,
    pub amount: f64,
    /// Accepted fluid temperatures, if constrained.
    pub temperature: Option<TemperatureRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeProduct {
    pub item: ItemId,
    pub amount: f64,
    /// Part of `amount` affected by productivity bonuses.
    pub productivity_amount: f64,
    /// Output temperature for fluid products.
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDef {
    pub name: String,
    pub friendly_name: String,
    pub enabled: bool,
    pub available: bool,
    /// Seconds per craft at speed 1.
    pub time: f64,
    pub max_productivity_bonus: f64,
    pub ingredients: Vec<RecipeIngredient>,
    pub products: Vec<RecipeProduct>,
    pub assemblers: Vec<AssemblerId>,
    pub modules: Vec<ModuleId>,
}

impl RecipeDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            enabled: true,
            available: true,
            time: 0.5,
            max_productivity_bonus: 1000.0,
            ingredients: Vec::new(),
            products: Vec::new(),
            assemblers: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn ingredient(&self, item: ItemId) -> Option<&RecipeIngredient> {
        self.ingredients.iter().find(|i| i.item == item)
    }

    pub fn product(&self, item: ItemId) -> Option<&RecipeProduct> {
        self.products.iter().find(|p| p.item == item)
    }
}

impl CatalogEntry for RecipeDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// Entity stats (assemblers and beacons)
// ---------------------------------------------------------------------------

/// Errors from asking an entity for a fuel rate it cannot provide.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FuelRateError {
    #[error("entity is not a burner")]
    NotABurner,
    #[error("item {0:?} is not an accepted fuel")]
    InvalidFuel(ItemId),
}

/// Stats shared by every placeable entity (assemblers and beacons).
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStats {
    pub entity_type: EntityType,
    pub energy_source: EnergySource,
    pub enabled: bool,
    pub available: bool,
    pub module_slots: usize,
    pub modules: Vec<ModuleId>,
    pub fuels: Vec<ItemId>,
    pub speed: HashMap<QualityId, f64>,
    pub energy_consumption: HashMap<QualityId, f64>,
    pub energy_production: HashMap<QualityId, f64>,
    pub energy_drain: f64,
    pub consumption_effectivity: f64,
    pub operation_temperature: f64,
    pub neighbour_bonus: f64,
    /// Burns a hot fluid by its temperature instead of its fuel value.
    pub temperature_fluid_burner: bool,
    pub pollution: BTreeMap<String, f64>,
}

impl EntityStats {
    pub fn new(entity_type: EntityType, energy_source: EnergySource) -> Self {
        Self {
            entity_type,
            energy_source,
            enabled: true,
            available: true,
            module_slots: 0,
            modules: Vec::new(),
            fuels: Vec::new(),
            speed: HashMap::new(),
            energy_consumption: HashMap::new(),
            energy_production: HashMap::new(),
            energy_drain: 0.0,
            consumption_effectivity: 1.0,
            operation_temperature: f64::MAX,
            neighbour_bonus: 0.0,
            temperature_fluid_burner: false,
            pollution: BTreeMap::new(),
        }
    }

    /// Crafting speed at the given quality; non-positive values count as 1.
    pub fn speed(&self, quality: QualityId) -> f64 {
        match self.speed.get(&quality) {
            Some(&s) if s > 0.0 => s,
            _ => 1.0,
        }
    }

    pub fn energy_consumption(&self, quality: QualityId) -> f64 {
        self.energy_consumption
            .get(&quality)
            .copied()
            .unwrap_or(DEFAULT_ENERGY_CONSUMPTION)
    }

    pub fn energy_production(&self, quality: QualityId) -> f64 {
        self.energy_production.get(&quality).copied().unwrap_or(0.0)
    }

    pub fn is_burner(&self) -> bool {
        matches!(
            self.energy_source,
            EnergySource::Burner | EnergySource::FluidBurner | EnergySource::Heat
        )
    }

    pub fn accepts_module(&self, module: ModuleId) -> bool {
        self.modules.contains(&module)
    }

    pub fn accepts_fuel(&self, item: ItemId) -> bool {
        self.fuels.contains(&item)
    }

    /// Fuel items burnt per second by one entity running at speed 1.
    ///
    /// `temperature` is the inlet temperature for temperature-consuming fluid
    /// burners and is ignored otherwise.
    pub fn fuel_consumption_rate(
        &self,
        fuel_id: ItemId,
        fuel: &ItemDef,
        quality: QualityId,
        temperature: Option<f64>,
    ) -> Result<f64, FuelRateError> {
        if !self.is_burner() {
            return Err(FuelRateError::NotABurner);
        }
        if !self.accepts_fuel(fuel_id) {
            return Err(FuelRateError::InvalidFuel(fuel_id));
        }

        let energy = self.energy_consumption(quality);
        if !self.temperature_fluid_burner {
            return Ok(energy / (fuel.fuel_value * self.consumption_effectivity));
        }

        if let (Some(temperature), Some(fluid)) = (temperature, fuel.fluid) {
            if temperature > fluid.default_temperature && fluid.specific_heat_capacity > 0.0 {
                return Ok(energy
                    / ((temperature - fluid.default_temperature)
                        * fluid.specific_heat_capacity
                        * self.consumption_effectivity));
            }
        }
        Ok(MIN_FUEL_CONSUMPTION_RATE)
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerDef {
    pub name: String,
    pub friendly_name: String,
    pub stats: EntityStats,
    pub base_productivity_bonus: f64,
}

impl AssemblerDef {
    pub fn new(name: &str, entity_type: EntityType, energy_source: EnergySource) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            stats: EntityStats::new(entity_type, energy_source),
            base_productivity_bonus: 0.0,
        }
    }
}

impl CatalogEntry for AssemblerDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name, EntityType::Assembler, EnergySource::Void)
    }
}

// ---------------------------------------------------------------------------
// Plant process
// ---------------------------------------------------------------------------

/// Growing a seed on a farming tile into weighted products.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantProcessDef {
    pub name: String,
    pub friendly_name: String,
    pub enabled: bool,
    /// Seconds from planting to harvest.
    pub grow_time: f64,
    pub seed: Option<ItemId>,
    pub products: Vec<(ItemId, f64)>,
}

impl PlantProcessDef {
    pub fn new(name: &str, seed: Option<ItemId>) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            enabled: true,
            grow_time: 1.0,
            seed,
            products: Vec::new(),
        }
    }

    pub fn product_amount(&self, item: ItemId) -> Option<f64> {
        self.products
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, amount)| *amount)
    }
}

impl CatalogEntry for PlantProcessDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name, None)
    }
}
