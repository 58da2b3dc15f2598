//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the fixture
//! catalog is available in this crate's unit tests and, through the
//! `test-utils` feature, in downstream crates' tests.

use crate::beacon::BeaconDef;
use crate::catalog::Catalog;
use crate::entity::*;
use crate::graph::ProductionGraph;
use crate::id::*;
use crate::module::ModuleDef;
use crate::node::{NodeContext, NodeCore};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

// ===========================================================================
// Fixture catalog
// ===========================================================================

/// A small but complete catalog: a quality chain, solid and fluid items,
/// electric and burner assemblers, a reactor, a generator, modules of every
/// kind, one beacon and one plant process.
pub struct Fixture {
    pub catalog: Catalog,
    pub settings: GraphSettings,

    // Qualities
    pub normal_q: QualityId,
    pub uncommon: QualityId,
    pub rare: QualityId,
    pub epic: QualityId,
    pub legendary: QualityId,

    // Items
    pub iron_ore: ItemId,
    pub iron_plate: ItemId,
    pub gear: ItemId,
    pub coal: ItemId,
    pub coke: ItemId,
    pub fuel_cell: ItemId,
    pub spent_cell: ItemId,
    pub heat: ItemId,
    pub water: ItemId,
    pub steam: ItemId,
    pub yumako: ItemId,
    pub yumako_seed: ItemId,
    pub spoilage: ItemId,

    // Modules and beacon
    pub speed_module: ModuleId,
    pub productivity_module: ModuleId,
    pub efficiency_module: ModuleId,
    pub quality_module: ModuleId,
    pub beacon: BeaconId,

    // Assemblers
    pub assembler_1: AssemblerId,
    pub assembler_2: AssemblerId,
    pub stone_furnace: AssemblerId,
    pub mining_drill: AssemblerId,
    pub boiler: AssemblerId,
    pub steam_engine: AssemblerId,
    pub fluid_heater: AssemblerId,
    pub nuclear_reactor: AssemblerId,

    // Recipes
    pub gear_recipe: RecipeId,
    pub smelting_recipe: RecipeId,
    pub coke_recipe: RecipeId,
    pub coal_mining: RecipeId,
    pub boiling_recipe: RecipeId,
    pub steam_power_recipe: RecipeId,
    pub heating_recipe: RecipeId,
    pub reactor_recipe: RecipeId,

    pub yumako_process: PlantProcessId,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        let mut catalog = Catalog::new();

        // -- qualities ------------------------------------------------------
        let normal_q = catalog.default_quality();
        let uncommon = catalog.qualities.insert(QualityDef::new("uncommon", 1));
        let rare = catalog.qualities.insert(QualityDef::new("rare", 2));
        let epic = catalog.qualities.insert(QualityDef::new("epic", 3));
        let legendary = catalog.qualities.insert(QualityDef::new("legendary", 5));
        let chain = [normal_q, uncommon, rare, epic, legendary];
        for (i, &quality) in chain.iter().enumerate() {
            let Some(def) = catalog.qualities.get_mut(quality) else {
                continue;
            };
            def.prev = i.checked_sub(1).map(|p| chain[p]);
            def.next = chain.get(i + 1).copied();
            def.next_probability = if def.next.is_some() { 0.1 } else { 0.0 };
        }

        // -- items ----------------------------------------------------------
        let iron_ore = catalog.items.insert(stacked("iron-ore", 50));
        let iron_plate = catalog.items.insert(stacked("iron-plate", 100));
        let gear = catalog.items.insert(stacked("iron-gear-wheel", 100));
        let coke = catalog.items.insert(stacked("coke", 50));
        let spent_cell = catalog.items.insert(stacked("depleted-fuel-cell", 50));
        let heat = catalog.items.insert(ItemDef::new("heat"));
        let spoilage = catalog.items.insert(stacked("spoilage", 50));

        let mut coal = stacked("coal", 50);
        coal.fuel_value = 4_000_000.0;
        let coal = catalog.items.insert(coal);

        let mut fuel_cell = stacked("fuel-cell", 50);
        fuel_cell.fuel_value = 8_000_000_000.0;
        fuel_cell.burn_result = Some(spent_cell);
        let fuel_cell = catalog.items.insert(fuel_cell);

        let water = catalog.items.insert(fluid("water", false));
        let steam = catalog.items.insert(fluid("steam", true));

        let yumako_process = catalog.plant_processes.intern("yumako-process");

        let mut yumako = stacked("yumako", 50);
        yumako.spoil_result = Some(spoilage);
        yumako.spoil_times.insert(normal_q, 3600.0);
        let yumako = catalog.items.insert(yumako);

        let mut yumako_seed = stacked("yumako-seed", 10);
        yumako_seed.plant_result = Some(yumako_process);
        let yumako_seed = catalog.items.insert(yumako_seed);

        let mut process = PlantProcessDef::new("yumako-process", Some(yumako_seed));
        process.grow_time = 300.0;
        process.products.push((yumako, 50.0));
        catalog.plant_processes.insert(process);

        // -- modules --------------------------------------------------------
        let mut speed = module("speed-module", "speed");
        speed.speed_bonus = 0.5;
        speed.consumption_bonus = 0.7;
        let speed_module = catalog.modules.insert(speed);

        let mut productivity = module("productivity-module", "productivity");
        productivity.productivity_bonus = 0.1;
        productivity.speed_bonus = -0.15;
        productivity.consumption_bonus = 0.8;
        productivity.pollution_bonus = 0.1;
        let productivity_module = catalog.modules.insert(productivity);

        let mut efficiency = module("efficiency-module", "efficiency");
        efficiency.consumption_bonus = -0.5;
        let efficiency_module = catalog.modules.insert(efficiency);

        let mut quality = module("quality-module", "quality");
        quality.quality_bonus = 0.1;
        quality.speed_bonus = -0.05;
        let quality_module = catalog.modules.insert(quality);

        let all_modules = vec![
            speed_module,
            productivity_module,
            efficiency_module,
            quality_module,
        ];

        let mut beacon = BeaconDef::new("beacon");
        beacon.stats.module_slots = 2;
        beacon.stats.modules = vec![speed_module, efficiency_module];
        beacon.stats.energy_consumption.insert(normal_q, 480_000.0);
        let beacon = catalog.beacons.insert(beacon);

        // -- assemblers -----------------------------------------------------
        let mut asm1 = AssemblerDef::new("assembling-machine-1", EntityType::Assembler, EnergySource::Electric);
        asm1.stats.speed.insert(normal_q, 0.5);
        asm1.stats.energy_consumption.insert(normal_q, 75_000.0);
        asm1.stats.energy_drain = 2_500.0;
        let assembler_1 = catalog.assemblers.insert(asm1);

        let mut asm2 = AssemblerDef::new("assembling-machine-2", EntityType::Assembler, EnergySource::Electric);
        for (quality, speed) in [(normal_q, 0.75), (uncommon, 0.975), (rare, 1.2)] {
            asm2.stats.speed.insert(quality, speed);
        }
        asm2.stats.energy_consumption.insert(normal_q, 150_000.0);
        asm2.stats.energy_drain = 5_000.0;
        asm2.stats.module_slots = 2;
        asm2.stats.modules = all_modules.clone();
        let assembler_2 = catalog.assemblers.insert(asm2);

        let mut furnace = AssemblerDef::new("stone-furnace", EntityType::Assembler, EnergySource::Burner);
        furnace.stats.fuels = vec![coal, fuel_cell];
        furnace.stats.energy_consumption.insert(normal_q, 90_000.0);
        let stone_furnace = catalog.assemblers.insert(furnace);

        let mut drill = AssemblerDef::new("electric-mining-drill", EntityType::Miner, EnergySource::Electric);
        drill.stats.speed.insert(normal_q, 0.5);
        drill.stats.energy_consumption.insert(normal_q, 90_000.0);
        let mining_drill = catalog.assemblers.insert(drill);

        let mut boiler = AssemblerDef::new("boiler", EntityType::Boiler, EnergySource::Burner);
        boiler.stats.fuels = vec![coal];
        boiler.stats.energy_consumption.insert(normal_q, 1_800_000.0);
        let boiler = catalog.assemblers.insert(boiler);

        let mut engine = AssemblerDef::new("steam-engine", EntityType::Generator, EnergySource::Void);
        engine.stats.operation_temperature = 165.0;
        engine.stats.energy_production.insert(normal_q, 900_000.0);
        let steam_engine = catalog.assemblers.insert(engine);

        let mut heater = AssemblerDef::new("fluid-heater", EntityType::Assembler, EnergySource::FluidBurner);
        heater.stats.temperature_fluid_burner = true;
        heater.stats.fuels = vec![steam];
        heater.stats.energy_consumption.insert(normal_q, 1_800_000.0);
        let fluid_heater = catalog.assemblers.insert(heater);

        let mut reactor = AssemblerDef::new("nuclear-reactor", EntityType::Reactor, EnergySource::Burner);
        reactor.stats.fuels = vec![fuel_cell];
        reactor.stats.neighbour_bonus = 1.0;
        reactor.stats.energy_consumption.insert(normal_q, 40_000_000.0);
        let nuclear_reactor = catalog.assemblers.insert(reactor);

        // -- recipes --------------------------------------------------------
        let mut r = RecipeDef::new("iron-gear-wheel");
        r.ingredients.push(ingredient(iron_plate, 2.0));
        r.products.push(product(gear, 1.0));
        r.assemblers = vec![assembler_1, assembler_2];
        r.modules = all_modules.clone();
        let gear_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("iron-plate");
        r.time = 3.2;
        r.ingredients.push(ingredient(iron_ore, 1.0));
        r.products.push(product(iron_plate, 1.0));
        r.assemblers = vec![stone_furnace];
        r.modules = all_modules.clone();
        let smelting_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("coke");
        r.time = 2.0;
        r.ingredients.push(ingredient(coal, 2.0));
        r.products.push(product(coke, 1.0));
        r.assemblers = vec![stone_furnace];
        let coke_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("coal");
        r.time = 1.0;
        r.products.push(product(coal, 1.0));
        r.assemblers = vec![mining_drill];
        r.modules = all_modules;
        let coal_mining = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("steam");
        r.time = 1.0;
        r.ingredients.push(ingredient(water, 60.0));
        let mut out = product(steam, 60.0);
        out.temperature = Some(165.0);
        r.products.push(out);
        r.assemblers = vec![boiler];
        let boiling_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("steam-engine-power");
        r.time = 1.0;
        let mut steam_in = ingredient(steam, 30.0);
        steam_in.temperature = Some(TemperatureRange::new(15.0, 165.0));
        r.ingredients.push(steam_in);
        r.assemblers = vec![steam_engine];
        let steam_power_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("fluid-heating");
        r.time = 1.0;
        r.products.push(product(heat, 1.0));
        r.assemblers = vec![fluid_heater];
        let heating_recipe = catalog.recipes.insert(r);

        let mut r = RecipeDef::new("nuclear-heat");
        r.time = 200.0;
        r.products.push(product(heat, 1.0));
        r.assemblers = vec![nuclear_reactor];
        let reactor_recipe = catalog.recipes.insert(r);

        Self {
            catalog,
            settings: GraphSettings::default(),
            normal_q,
            uncommon,
            rare,
            epic,
            legendary,
            iron_ore,
            iron_plate,
            gear,
            coal,
            coke,
            fuel_cell,
            spent_cell,
            heat,
            water,
            steam,
            yumako,
            yumako_seed,
            spoilage,
            speed_module,
            productivity_module,
            efficiency_module,
            quality_module,
            beacon,
            assembler_1,
            assembler_2,
            stone_furnace,
            mining_drill,
            boiler,
            steam_engine,
            fluid_heater,
            nuclear_reactor,
            gear_recipe,
            smelting_recipe,
            coke_recipe,
            coal_mining,
            boiling_recipe,
            steam_power_recipe,
            heating_recipe,
            reactor_recipe,
            yumako_process,
        }
    }

    pub fn ctx(&self) -> NodeContext<'_> {
        NodeContext {
            catalog: &self.catalog,
            settings: &self.settings,
        }
    }

    /// `item` at the default quality.
    pub fn normal(&self, item: ItemId) -> ItemQualityPair {
        ItemQualityPair::new(item, self.normal_q)
    }

    pub fn pair(&self, item: ItemId, quality: QualityId) -> ItemQualityPair {
        ItemQualityPair::new(item, quality)
    }

    /// An empty graph over a copy of the fixture catalog and settings.
    pub fn graph(&self) -> ProductionGraph {
        ProductionGraph::new(self.catalog.clone(), self.settings.clone())
    }
}

// ===========================================================================
// Constructors
// ===========================================================================

/// A node core whose solver-assigned rate is `per_sec`.
pub fn core_with_rate(per_sec: f64) -> NodeCore {
    let mut core = NodeCore::new(NodeId(0));
    core.actual_rate_per_sec = per_sec;
    core
}

fn stacked(name: &str, stack_size: u32) -> ItemDef {
    let mut item = ItemDef::new(name);
    item.stack_size = stack_size;
    item
}

fn fluid(name: &str, temperature_dependent: bool) -> ItemDef {
    let mut item = ItemDef::new(name);
    item.fluid = Some(FluidProperties {
        default_temperature: 15.0,
        specific_heat_capacity: 200.0,
        temperature_dependent,
    });
    item
}

fn module(name: &str, category: &str) -> ModuleDef {
    let mut module = ModuleDef::new(name);
    module.category = category.to_string();
    module.tier = 1;
    module
}

fn ingredient(item: ItemId, amount: f64) -> RecipeIngredient {
    RecipeIngredient {
        item,
        amount,
        temperature: None,
    }
}

fn product(item: ItemId, amount: f64) -> RecipeProduct {
    RecipeProduct {
        item,
        amount,
        productivity_amount: amount,
        temperature: None,
    }
}
