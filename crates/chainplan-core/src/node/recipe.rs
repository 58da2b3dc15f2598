//! Recipe nodes: a recipe crafted in a selected assembler, optionally fuelled,
//! moduled and beaconed.
//!
//! Input and output rates depend on nearly every selection of the node, so
//! they are cached behind a dirty flag and recomputed on the next read.

use std::cell::RefCell;

use bitflags::bitflags;

use crate::catalog::Catalog;
use crate::controller::Resolution;
use crate::entity::{EnergySource, EntityType, MIN_FUEL_CONSUMPTION_RATE, TemperatureRange};
use crate::id::ItemId;
use crate::module::ModuleDef;
use crate::node::{LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType, RateSet};
use crate::quality_pair::{
    AssemblerQualityPair, BeaconQualityPair, ItemQualityPair, ModuleQualityPair, RecipeQualityPair,
};
use crate::settings::GraphSettings;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecipeErrors: u32 {
        const RECIPE_MISSING = 1 << 0;
        const ASSEMBLER_MISSING = 1 << 1;
        const BURNER_NO_FUEL_SET = 1 << 2;
        const FUEL_MISSING = 1 << 3;
        const INVALID_FUEL = 1 << 4;
        const INVALID_FUEL_REMAINS = 1 << 5;
        const ASSEMBLER_MODULE_MISSING = 1 << 6;
        const ASSEMBLER_MODULE_LIMIT_EXCEEDED = 1 << 7;
        const BEACON_MISSING = 1 << 8;
        const BEACON_MODULE_MISSING = 1 << 9;
        const BEACON_MODULE_LIMIT_EXCEEDED = 1 << 10;
        const RECIPE_QUALITY_MISSING = 1 << 11;
        const ASSEMBLER_QUALITY_MISSING = 1 << 12;
        const BEACON_QUALITY_MISSING = 1 << 13;
        const ASSEMBLER_MODULE_QUALITY_MISSING = 1 << 14;
        const BEACON_MODULE_QUALITY_MISSING = 1 << 15;
        const INVALID_LINKS = 1 << 16;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecipeWarnings: u32 {
        const RECIPE_DISABLED = 1 << 0;
        const RECIPE_UNAVAILABLE = 1 << 1;
        const ASSEMBLER_DISABLED = 1 << 2;
        const ASSEMBLER_UNAVAILABLE = 1 << 3;
        const NO_AVAILABLE_ASSEMBLERS = 1 << 4;
        const FUEL_UNAVAILABLE = 1 << 5;
        const FUEL_UNCRAFTABLE = 1 << 6;
        const NO_AVAILABLE_FUELS = 1 << 7;
        const ASSEMBLER_MODULE_DISABLED = 1 << 8;
        const ASSEMBLER_MODULE_UNAVAILABLE = 1 << 9;
        const BEACON_DISABLED = 1 << 10;
        const BEACON_UNAVAILABLE = 1 << 11;
        const BEACON_MODULE_DISABLED = 1 << 12;
        const BEACON_MODULE_UNAVAILABLE = 1 << 13;
        const TEMPERATURE_FLUID_BURNER_INVALID_LINKS = 1 << 14;
        const ASSEMBLER_QUALITY_DISABLED = 1 << 15;
        const BEACON_QUALITY_DISABLED = 1 << 16;
        const ASSEMBLER_MODULE_QUALITY_DISABLED = 1 << 17;
        const BEACON_MODULE_QUALITY_DISABLED = 1 << 18;
    }
}

/// Lower bound of the speed, consumption and pollution multipliers.
pub const MIN_MULTIPLIER: f64 = 0.2;

/// Cached per-craft inputs and outputs.
#[derive(Debug, Clone)]
struct RecipeIo {
    dirty: bool,
    inputs: RateSet,
    outputs: RateSet,
    fuel_in_recipe_inputs: bool,
    remains_in_recipe_outputs: bool,
}

impl Default for RecipeIo {
    fn default() -> Self {
        Self {
            dirty: true,
            inputs: RateSet::new(),
            outputs: RateSet::new(),
            fuel_in_recipe_inputs: false,
            remains_in_recipe_outputs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipeNode {
    recipe: RecipeQualityPair,
    assembler: AssemblerQualityPair,
    assembler_modules: Vec<ModuleQualityPair>,
    fuel: Option<ItemId>,
    fuel_remains_override: Option<ItemId>,
    beacon: Option<BeaconQualityPair>,
    beacon_modules: Vec<ModuleQualityPair>,
    beacon_count: f64,
    beacons_per_assembler: f64,
    beacons_const: f64,
    neighbour_count: f64,
    extra_productivity_bonus: f64,
    low_priority: bool,
    max_quality_steps: u32,
    fuel_temperature: Option<TemperatureRange>,
    errors: RecipeErrors,
    warnings: RecipeWarnings,
    io: RefCell<RecipeIo>,
}

impl RecipeNode {
    pub(crate) fn new(
        recipe: RecipeQualityPair,
        assembler: AssemblerQualityPair,
        max_quality_steps: u32,
    ) -> Self {
        Self {
            recipe,
            assembler,
            assembler_modules: Vec::new(),
            fuel: None,
            fuel_remains_override: None,
            beacon: None,
            beacon_modules: Vec::new(),
            beacon_count: 0.0,
            beacons_per_assembler: 0.0,
            beacons_const: 0.0,
            neighbour_count: 0.0,
            extra_productivity_bonus: 0.0,
            low_priority: false,
            max_quality_steps,
            fuel_temperature: None,
            errors: RecipeErrors::empty(),
            warnings: RecipeWarnings::empty(),
            io: RefCell::new(RecipeIo::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn recipe(&self) -> RecipeQualityPair {
        self.recipe
    }

    pub fn assembler(&self) -> AssemblerQualityPair {
        self.assembler
    }

    pub fn assembler_modules(&self) -> &[ModuleQualityPair] {
        &self.assembler_modules
    }

    pub fn fuel(&self) -> Option<ItemId> {
        self.fuel
    }

    /// The burnt result of the fuel: the imported override if one is set,
    /// otherwise the fuel's catalog burn result.
    pub fn fuel_remains(&self, catalog: &Catalog) -> Option<ItemId> {
        self.fuel_remains_override
            .or_else(|| self.fuel.and_then(|fuel| catalog.items.get(fuel).burn_result))
    }

    pub fn fuel_remains_override(&self) -> Option<ItemId> {
        self.fuel_remains_override
    }

    pub fn beacon(&self) -> Option<BeaconQualityPair> {
        self.beacon
    }

    pub fn beacon_modules(&self) -> &[ModuleQualityPair] {
        &self.beacon_modules
    }

    pub fn beacon_count(&self) -> f64 {
        self.beacon_count
    }

    pub fn beacons_per_assembler(&self) -> f64 {
        self.beacons_per_assembler
    }

    pub fn beacons_const(&self) -> f64 {
        self.beacons_const
    }

    pub fn neighbour_count(&self) -> f64 {
        self.neighbour_count
    }

    pub fn extra_productivity_bonus(&self) -> f64 {
        self.extra_productivity_bonus
    }

    pub fn low_priority(&self) -> bool {
        self.low_priority
    }

    pub fn max_quality_steps(&self) -> u32 {
        self.max_quality_steps
    }

    /// Inlet temperature range of the fuel, for temperature fluid burners.
    pub fn fuel_temperature(&self) -> Option<TemperatureRange> {
        self.fuel_temperature
    }

    pub fn errors(&self) -> RecipeErrors {
        self.errors
    }

    pub fn warnings(&self) -> RecipeWarnings {
        self.warnings
    }

    /// Whether the fuel also appears as a recipe ingredient.
    pub fn is_fuel_part_of_recipe_inputs(&self, ctx: &NodeContext<'_>) -> bool {
        self.ensure_io(ctx);
        self.io.borrow().fuel_in_recipe_inputs
    }

    /// Whether the fuel's burnt result also appears as a recipe product.
    pub fn is_fuel_remains_part_of_recipe_outputs(&self, ctx: &NodeContext<'_>) -> bool {
        self.ensure_io(ctx);
        self.io.borrow().remains_in_recipe_outputs
    }

    // -----------------------------------------------------------------------
    // Setters. Each one only marks the IO cache dirty; re-evaluation is the
    // graph's job.
    // -----------------------------------------------------------------------

    fn mark_dirty(&self) {
        self.io.borrow_mut().dirty = true;
    }

    /// Force the IO cache to be rebuilt, e.g. after the catalog or the rate
    /// unit changed underneath the node.
    pub(crate) fn invalidate_io(&self) {
        self.mark_dirty();
    }

    pub(crate) fn set_assembler(&mut self, assembler: AssemblerQualityPair) {
        if self.assembler != assembler {
            self.assembler = assembler;
            self.mark_dirty();
        }
    }

    /// Select a fuel. Any burnt-result override is dropped.
    pub(crate) fn set_fuel(&mut self, fuel: Option<ItemId>) {
        if self.fuel != fuel || self.fuel_remains_override.is_some() {
            self.fuel = fuel;
            self.fuel_remains_override = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_fuel_remains_override(&mut self, remains: Option<ItemId>) {
        if self.fuel_remains_override != remains {
            self.fuel_remains_override = remains;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_beacon(&mut self, beacon: Option<BeaconQualityPair>) {
        if self.beacon != beacon {
            self.beacon = beacon;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_beacon_count(&mut self, count: f64) {
        if self.beacon_count != count {
            self.beacon_count = count;
            self.mark_dirty();
        }
    }

    // Per-assembler and constant beacon counts only feed the totals.
    pub(crate) fn set_beacons_per_assembler(&mut self, beacons: f64) {
        self.beacons_per_assembler = beacons;
    }

    pub(crate) fn set_beacons_const(&mut self, beacons: f64) {
        self.beacons_const = beacons;
    }

    pub(crate) fn set_neighbour_count(&mut self, count: f64) {
        if self.neighbour_count != count {
            self.neighbour_count = count;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_extra_productivity_bonus(&mut self, bonus: f64) {
        if self.extra_productivity_bonus != bonus {
            self.extra_productivity_bonus = bonus;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_low_priority(&mut self, low_priority: bool) {
        self.low_priority = low_priority;
    }

    pub(crate) fn set_max_quality_steps(&mut self, steps: u32) {
        if self.max_quality_steps != steps {
            self.max_quality_steps = steps;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_fuel_temperature(&mut self, range: Option<TemperatureRange>) {
        if self.fuel_temperature != range {
            self.fuel_temperature = range;
            self.mark_dirty();
        }
    }

    pub(crate) fn assembler_modules_mut(&mut self) -> &mut Vec<ModuleQualityPair> {
        self.mark_dirty();
        &mut self.assembler_modules
    }

    pub(crate) fn beacon_modules_mut(&mut self) -> &mut Vec<ModuleQualityPair> {
        self.mark_dirty();
        &mut self.beacon_modules
    }

    // -----------------------------------------------------------------------
    // Multipliers
    // -----------------------------------------------------------------------

    /// Sum of a module bonus over the assembler modules and the (effectivity
    /// weighted) beacon modules.
    fn module_bonus_sum(&self, catalog: &Catalog, bonus: impl Fn(&ModuleDef, u32) -> f64) -> f64 {
        let mut sum = 0.0;
        for module in &self.assembler_modules {
            let level = catalog.quality_level(module.quality);
            sum += bonus(catalog.modules.get(module.entity), level);
        }
        let weight = self.beacon_weight(catalog);
        for module in &self.beacon_modules {
            let level = catalog.quality_level(module.quality);
            sum += bonus(catalog.modules.get(module.entity), level) * weight;
        }
        sum
    }

    fn beacon_weight(&self, catalog: &Catalog) -> f64 {
        match self.beacon {
            Some(beacon) => {
                let level = catalog.quality_level(beacon.quality);
                catalog
                    .beacons
                    .get(beacon.entity)
                    .effectivity(level, self.beacon_count)
                    * self.beacon_count
            }
            None => 0.0,
        }
    }

    /// Crafting speed multiplier. Rocket silos report `1 / rate multiplier`
    /// so that their set value counts launches per display time unit.
    pub fn speed_multiplier(&self, ctx: &NodeContext<'_>) -> f64 {
        let assembler = ctx.catalog.assemblers.get(self.assembler.entity);
        if assembler.stats.entity_type == EntityType::Rocket {
            return 1.0 / ctx.rate_multiplier();
        }
        let sum = self.module_bonus_sum(ctx.catalog, ModuleDef::speed_bonus);
        (1.0 + sum).max(MIN_MULTIPLIER)
    }

    /// Additive productivity bonus, clamped to the recipe's maximum.
    pub fn productivity_bonus(&self, catalog: &Catalog) -> f64 {
        let base = catalog
            .assemblers
            .get(self.assembler.entity)
            .base_productivity_bonus
            + self.extra_productivity_bonus;
        let sum = base + self.module_bonus_sum(catalog, ModuleDef::productivity_bonus);
        sum.max(0.0)
            .min(catalog.recipes.get(self.recipe.entity).max_productivity_bonus)
    }

    pub fn consumption_multiplier(&self, catalog: &Catalog) -> f64 {
        let sum = self.module_bonus_sum(catalog, ModuleDef::consumption_bonus);
        (1.0 + sum).max(MIN_MULTIPLIER)
    }

    pub fn pollution_multiplier(&self, catalog: &Catalog) -> f64 {
        let sum = self.module_bonus_sum(catalog, ModuleDef::pollution_bonus);
        (1.0 + sum).max(MIN_MULTIPLIER)
    }

    /// Chance per craft that an output moves up one quality tier.
    pub fn quality_multiplier(&self, catalog: &Catalog) -> f64 {
        self.module_bonus_sum(catalog, ModuleDef::quality_bonus).max(0.0)
    }

    /// Seconds one assembler spends per craft.
    pub fn factory_rate(&self, ctx: &NodeContext<'_>) -> f64 {
        let recipe = ctx.catalog.recipes.get(self.recipe.entity);
        let assembler = ctx.catalog.assemblers.get(self.assembler.entity);
        recipe.time / (assembler.stats.speed(self.assembler.quality) * self.speed_multiplier(ctx))
    }

    /// Fuel items burnt per craft.
    pub fn input_rate_for_fuel(&self, ctx: &NodeContext<'_>) -> f64 {
        let Some(fuel) = self.fuel else {
            return 0.0;
        };
        let assembler = ctx.catalog.assemblers.get(self.assembler.entity);
        let temperature = if assembler.stats.temperature_fluid_burner {
            self.fuel_temperature.map(|range| range.min)
        } else {
            None
        };
        let base = assembler
            .stats
            .fuel_consumption_rate(
                fuel,
                ctx.catalog.items.get(fuel),
                self.assembler.quality,
                temperature,
            )
            .unwrap_or_else(|err| {
                tracing::debug!(assembler = %assembler.name, %err, "falling back to nominal fuel rate");
                MIN_FUEL_CONSUMPTION_RATE
            });
        self.factory_rate(ctx) * base * self.consumption_multiplier(ctx.catalog)
    }

    /// Smallest per-craft output amount, or `None` without outputs.
    pub fn min_output_ratio(&self, ctx: &NodeContext<'_>) -> Option<f64> {
        self.ensure_io(ctx);
        self.io
            .borrow()
            .outputs
            .iter()
            .map(|(_, amount)| amount)
            .reduce(f64::min)
    }

    // -----------------------------------------------------------------------
    // Input / output computation
    // -----------------------------------------------------------------------

    fn ensure_io(&self, ctx: &NodeContext<'_>) {
        if self.io.borrow().dirty {
            let io = self.compute_io(ctx);
            *self.io.borrow_mut() = io;
        }
    }

    fn compute_io(&self, ctx: &NodeContext<'_>) -> RecipeIo {
        let catalog = ctx.catalog;
        let default_quality = catalog.default_quality();
        let recipe = catalog.recipes.get(self.recipe.entity);
        let assembler = catalog.assemblers.get(self.assembler.entity);
        let mut io = RecipeIo {
            dirty: false,
            ..RecipeIo::default()
        };

        for ingredient in &recipe.ingredients {
            let quality = if catalog.items.get(ingredient.item).is_fluid() {
                default_quality
            } else {
                self.recipe.quality
            };
            io.inputs
                .add(ItemQualityPair::new(ingredient.item, quality), ingredient.amount);
        }

        let fuel_rate = self.fuel.map(|_| self.input_rate_for_fuel(ctx));
        if let (Some(fuel), Some(rate)) = (self.fuel, fuel_rate) {
            let fuel = ItemQualityPair::new(fuel, default_quality);
            io.fuel_in_recipe_inputs = io.inputs.contains(fuel);
            io.inputs.add(fuel, rate);
        }

        let productivity = self.productivity_bonus(catalog);
        let quality_multiplier = self.quality_multiplier(catalog);
        for product in &recipe.products {
            if assembler.stats.entity_type == EntityType::Reactor {
                let amount =
                    product.amount + assembler.stats.neighbour_bonus * self.neighbour_count;
                io.outputs
                    .add(ItemQualityPair::new(product.item, default_quality), amount);
                continue;
            }

            let amount = product.amount + product.productivity_amount * productivity;
            if catalog.items.get(product.item).is_fluid() {
                io.outputs
                    .add(ItemQualityPair::new(product.item, default_quality), amount);
                continue;
            }

            let mut current = ItemQualityPair::new(product.item, self.recipe.quality);
            io.outputs.add(current, amount);
            let mut multiplier = quality_multiplier;
            let mut step = 1;
            while step < self.max_quality_steps {
                let tier = catalog.qualities.get(current.quality);
                let Some(next) = tier.next else {
                    break;
                };
                step += 1;
                let last = current;
                multiplier *= tier.next_probability;
                current = ItemQualityPair::new(product.item, next);
                let next_tier = catalog.qualities.get(next);
                if multiplier == 0.0 || !next_tier.enabled || !next_tier.available {
                    break;
                }

                let upgraded = multiplier.min(1.0) * amount;
                io.outputs.set(current, upgraded);
                if let Some(remaining) = io.outputs.get(last) {
                    let remaining = remaining - upgraded;
                    if remaining <= 0.0 {
                        io.outputs.remove(last);
                    } else {
                        io.outputs.set(last, remaining);
                    }
                }
            }
        }

        if let (Some(remains), Some(rate)) = (self.fuel_remains(catalog), fuel_rate) {
            let remains = ItemQualityPair::new(remains, default_quality);
            io.remains_in_recipe_outputs = io.outputs.contains(remains);
            io.outputs.add(remains, rate);
        }

        tracing::trace!(
            recipe = %recipe.name,
            inputs = io.inputs.len(),
            outputs = io.outputs.len(),
            "recomputed recipe io"
        );
        io
    }

    // -----------------------------------------------------------------------
    // Messages and resolutions
    // -----------------------------------------------------------------------

    pub(crate) fn error_messages(&self, catalog: &Catalog) -> Vec<String> {
        let errors = self.errors;
        let mut out = Vec::new();
        if errors.contains(RecipeErrors::RECIPE_MISSING) {
            out.push(format!(
                "> Recipe \"{}\" doesnt exist in preset!",
                catalog.recipes.get(self.recipe.entity).friendly_name
            ));
            return out;
        }
        if errors.contains(RecipeErrors::RECIPE_QUALITY_MISSING) {
            out.push(format!(
                "> Recipe's Quality \"{}\" doesnt exist in preset!",
                catalog.qualities.get(self.recipe.quality).friendly_name
            ));
        }
        if errors.contains(RecipeErrors::ASSEMBLER_MISSING) {
            out.push(format!(
                "> Assembler \"{}\" doesnt exist in preset!",
                catalog.assemblers.get(self.assembler.entity).friendly_name
            ));
        }
        if errors.contains(RecipeErrors::ASSEMBLER_QUALITY_MISSING) {
            out.push(format!(
                "> Assembler's Quality \"{}\" doesnt exist in preset!",
                catalog.qualities.get(self.assembler.quality).friendly_name
            ));
        }
        if errors.contains(RecipeErrors::BURNER_NO_FUEL_SET) {
            out.push("> Burner Assembler has no fuel set!".to_string());
        }
        if errors.contains(RecipeErrors::FUEL_MISSING) {
            out.push("> Burner Assembler's fuel doesnt exist in preset!".to_string());
        }
        if errors.contains(RecipeErrors::INVALID_FUEL) {
            out.push("> Burner Assembler has an invalid fuel set!".to_string());
        }
        if errors.contains(RecipeErrors::INVALID_FUEL_REMAINS) {
            out.push("> Burning result doesnt match fuel's burn result!".to_string());
        }
        if errors.contains(RecipeErrors::ASSEMBLER_MODULE_MISSING) {
            out.push("> Some of the assembler modules dont exist in preset!".to_string());
        }
        if errors.contains(RecipeErrors::ASSEMBLER_MODULE_LIMIT_EXCEEDED) {
            out.push(format!(
                "> Assembler has too many modules ({}/{})!",
                self.assembler_modules.len(),
                catalog.assemblers.get(self.assembler.entity).stats.module_slots
            ));
        }
        if errors.contains(RecipeErrors::ASSEMBLER_MODULE_QUALITY_MISSING) {
            if let Some(module) = first_missing_quality(catalog, &self.assembler_modules) {
                out.push(format!(
                    "> Assembler's Module's Quality \"{}\" doesnt exist in preset!",
                    catalog.qualities.get(module.quality).friendly_name
                ));
            }
        }
        if let Some(beacon) = self.beacon {
            if errors.contains(RecipeErrors::BEACON_MISSING) {
                out.push(format!(
                    "> Beacon \"{}\" doesnt exist in preset!",
                    catalog.beacons.get(beacon.entity).friendly_name
                ));
            }
            if errors.contains(RecipeErrors::BEACON_QUALITY_MISSING) {
                out.push(format!(
                    "> Beacon's Quality \"{}\" doesnt exist in preset!",
                    catalog.qualities.get(beacon.quality).friendly_name
                ));
            }
        }
        if errors.contains(RecipeErrors::BEACON_MODULE_MISSING) {
            out.push("> Some of the beacon modules dont exist in preset!".to_string());
        }
        if errors.contains(RecipeErrors::BEACON_MODULE_LIMIT_EXCEEDED) {
            out.push("> Beacon has too many modules!".to_string());
        }
        if errors.contains(RecipeErrors::BEACON_MODULE_QUALITY_MISSING) {
            if let Some(module) = first_missing_quality(catalog, &self.beacon_modules) {
                out.push(format!(
                    "> Beacon's Module's Quality \"{}\" doesnt exist in preset!",
                    catalog.qualities.get(module.quality).friendly_name
                ));
            }
        }
        if errors.contains(RecipeErrors::INVALID_LINKS) {
            out.push("> Some links are invalid!".to_string());
        }
        out
    }

    pub(crate) fn warning_messages(&self) -> Vec<String> {
        let warnings = self.warnings;
        let mut out = Vec::new();
        let mut push = |flag: RecipeWarnings, text: &str| {
            if warnings.contains(flag) {
                out.push(text.to_string());
            }
        };

        push(RecipeWarnings::RECIPE_DISABLED, "X> Selected recipe is disabled.");
        push(
            RecipeWarnings::RECIPE_UNAVAILABLE,
            "X> Selected recipe is unavailable in regular play.",
        );

        if warnings.contains(RecipeWarnings::NO_AVAILABLE_ASSEMBLERS) {
            push(
                RecipeWarnings::NO_AVAILABLE_ASSEMBLERS,
                "X> No enabled assemblers for this recipe.",
            );
        } else {
            push(RecipeWarnings::ASSEMBLER_DISABLED, "> Selected assembler is disabled.");
            push(
                RecipeWarnings::ASSEMBLER_UNAVAILABLE,
                "> Selected assembler is unavailable in regular play.",
            );
        }
        push(
            RecipeWarnings::ASSEMBLER_QUALITY_DISABLED,
            "> Selected assembler quality is disabled.",
        );

        if warnings.contains(RecipeWarnings::NO_AVAILABLE_FUELS) {
            push(RecipeWarnings::NO_AVAILABLE_FUELS, "X> No fuel can be produced.");
        } else {
            push(
                RecipeWarnings::FUEL_UNAVAILABLE,
                "> Selected fuel is unavailable in regular play.",
            );
            push(RecipeWarnings::FUEL_UNCRAFTABLE, "> Selected fuel cant be produced.");
        }
        push(
            RecipeWarnings::TEMPERATURE_FLUID_BURNER_INVALID_LINKS,
            "> Temperature based fuel uses multiple incoming temperatures (fuel use # might be wrong).",
        );

        push(
            RecipeWarnings::ASSEMBLER_MODULE_DISABLED,
            "> Some selected assembler modules are disabled.",
        );
        push(
            RecipeWarnings::ASSEMBLER_MODULE_UNAVAILABLE,
            "> Some selected assembler modules are unavailable in regular play.",
        );
        push(
            RecipeWarnings::ASSEMBLER_MODULE_QUALITY_DISABLED,
            "> Some selected assembler modules have a disabled quality.",
        );
        push(RecipeWarnings::BEACON_DISABLED, "> Selected beacon is disabled.");
        push(
            RecipeWarnings::BEACON_UNAVAILABLE,
            "> Selected beacon is unavailable in regular play.",
        );
        push(
            RecipeWarnings::BEACON_QUALITY_DISABLED,
            "> Selected beacon quality is disabled.",
        );
        push(
            RecipeWarnings::BEACON_MODULE_DISABLED,
            "> Some selected beacon modules are disabled.",
        );
        push(
            RecipeWarnings::BEACON_MODULE_UNAVAILABLE,
            "> Some selected beacon modules are unavailable in regular play.",
        );
        push(
            RecipeWarnings::BEACON_MODULE_QUALITY_DISABLED,
            "> Some selected beacon modules have a disabled quality.",
        );
        out
    }

    pub(crate) fn error_resolutions(&self, catalog: &Catalog) -> Vec<Resolution> {
        let errors = self.errors;
        if errors.contains(RecipeErrors::RECIPE_MISSING) {
            return vec![Resolution::DeleteNode];
        }

        let mut resolutions = Vec::new();
        if errors.intersects(RecipeErrors::ASSEMBLER_MISSING | RecipeErrors::ASSEMBLER_QUALITY_MISSING) {
            resolutions.push(Resolution::AutoSelectAssembler);
        }

        let stats = &catalog.assemblers.get(self.assembler.entity).stats;
        let fuel_errors =
            RecipeErrors::BURNER_NO_FUEL_SET | RecipeErrors::FUEL_MISSING | RecipeErrors::INVALID_FUEL;
        if errors.intersects(fuel_errors)
            && stats.fuels.iter().any(|&f| !catalog.items.is_missing(f))
        {
            resolutions.push(Resolution::AutoSelectFuel);
        }
        if errors.contains(RecipeErrors::INVALID_FUEL_REMAINS)
            && self.fuel.is_some_and(|fuel| stats.accepts_fuel(fuel))
        {
            resolutions.push(Resolution::UpdateBurnResult);
        }

        if errors.intersects(
            RecipeErrors::ASSEMBLER_MODULE_MISSING
                | RecipeErrors::ASSEMBLER_MODULE_LIMIT_EXCEEDED
                | RecipeErrors::ASSEMBLER_MODULE_QUALITY_MISSING,
        ) {
            resolutions.push(Resolution::FixAssemblerModules);
        }
        if errors.intersects(RecipeErrors::BEACON_MISSING | RecipeErrors::BEACON_QUALITY_MISSING) {
            resolutions.push(Resolution::RemoveBeacon);
        }
        if errors.intersects(
            RecipeErrors::BEACON_MODULE_MISSING
                | RecipeErrors::BEACON_MODULE_LIMIT_EXCEEDED
                | RecipeErrors::BEACON_MODULE_QUALITY_MISSING,
        ) {
            resolutions.push(Resolution::FixBeaconModules);
        }
        if errors.contains(RecipeErrors::INVALID_LINKS) {
            resolutions.push(Resolution::DeleteInvalidLinks);
        }
        resolutions
    }

    pub(crate) fn warning_resolutions(&self) -> Vec<Resolution> {
        let warnings = self.warnings;
        let mut resolutions = Vec::new();

        if warnings.intersects(
            RecipeWarnings::ASSEMBLER_DISABLED
                | RecipeWarnings::ASSEMBLER_UNAVAILABLE
                | RecipeWarnings::ASSEMBLER_QUALITY_DISABLED,
        ) && !warnings.contains(RecipeWarnings::NO_AVAILABLE_ASSEMBLERS)
        {
            resolutions.push(Resolution::SwitchToEnabledAssembler);
        }
        if warnings.intersects(RecipeWarnings::FUEL_UNAVAILABLE | RecipeWarnings::FUEL_UNCRAFTABLE)
            && !warnings.contains(RecipeWarnings::NO_AVAILABLE_FUELS)
        {
            resolutions.push(Resolution::SwitchToValidFuel);
        }
        if warnings.intersects(
            RecipeWarnings::ASSEMBLER_MODULE_DISABLED
                | RecipeWarnings::ASSEMBLER_MODULE_UNAVAILABLE
                | RecipeWarnings::ASSEMBLER_MODULE_QUALITY_DISABLED,
        ) {
            resolutions.push(Resolution::RemoveDisabledAssemblerModules);
        }
        if warnings.intersects(
            RecipeWarnings::BEACON_DISABLED
                | RecipeWarnings::BEACON_UNAVAILABLE
                | RecipeWarnings::BEACON_QUALITY_DISABLED,
        ) {
            resolutions.push(Resolution::TurnOffBeacon);
        }
        if warnings.intersects(
            RecipeWarnings::BEACON_MODULE_DISABLED
                | RecipeWarnings::BEACON_MODULE_UNAVAILABLE
                | RecipeWarnings::BEACON_MODULE_QUALITY_DISABLED,
        ) {
            resolutions.push(Resolution::RemoveDisabledBeaconModules);
        }
        if warnings.contains(RecipeWarnings::TEMPERATURE_FLUID_BURNER_INVALID_LINKS) {
            resolutions.push(Resolution::RemoveFuelLinks);
        }
        resolutions
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn compute_errors(&self, catalog: &Catalog, links: LinkReport) -> RecipeErrors {
        let mut errors = RecipeErrors::empty();
        if catalog.recipes.is_missing(self.recipe.entity) {
            errors |= RecipeErrors::RECIPE_MISSING;
        }
        if catalog.qualities.is_missing(self.recipe.quality) {
            errors |= RecipeErrors::RECIPE_QUALITY_MISSING;
        }
        if catalog.assemblers.is_missing(self.assembler.entity) {
            errors |= RecipeErrors::ASSEMBLER_MISSING;
        }
        if catalog.qualities.is_missing(self.assembler.quality) {
            errors |= RecipeErrors::ASSEMBLER_QUALITY_MISSING;
        }

        let stats = &catalog.assemblers.get(self.assembler.entity).stats;
        if stats.is_burner() {
            match self.fuel {
                None => errors |= RecipeErrors::BURNER_NO_FUEL_SET,
                Some(fuel) => {
                    if catalog.items.is_missing(fuel) {
                        errors |= RecipeErrors::FUEL_MISSING;
                    }
                    if !stats.accepts_fuel(fuel) {
                        errors |= RecipeErrors::INVALID_FUEL;
                    }
                    if catalog.items.get(fuel).burn_result != self.fuel_remains(catalog) {
                        errors |= RecipeErrors::INVALID_FUEL_REMAINS;
                    }
                }
            }
        }

        if self
            .assembler_modules
            .iter()
            .any(|m| catalog.modules.is_missing(m.entity))
        {
            errors |= RecipeErrors::ASSEMBLER_MODULE_MISSING;
        }
        if self.assembler_modules.len() > stats.module_slots {
            errors |= RecipeErrors::ASSEMBLER_MODULE_LIMIT_EXCEEDED;
        }
        if first_missing_quality(catalog, &self.assembler_modules).is_some() {
            errors |= RecipeErrors::ASSEMBLER_MODULE_QUALITY_MISSING;
        }

        match self.beacon {
            Some(beacon) => {
                if catalog.beacons.is_missing(beacon.entity) {
                    errors |= RecipeErrors::BEACON_MISSING;
                }
                if catalog.qualities.is_missing(beacon.quality) {
                    errors |= RecipeErrors::BEACON_QUALITY_MISSING;
                }
                if self
                    .beacon_modules
                    .iter()
                    .any(|m| catalog.modules.is_missing(m.entity))
                {
                    errors |= RecipeErrors::BEACON_MODULE_MISSING;
                }
                if self.beacon_modules.len() > catalog.beacons.get(beacon.entity).stats.module_slots {
                    errors |= RecipeErrors::BEACON_MODULE_LIMIT_EXCEEDED;
                }
                if first_missing_quality(catalog, &self.beacon_modules).is_some() {
                    errors |= RecipeErrors::BEACON_MODULE_QUALITY_MISSING;
                }
            }
            None if !self.beacon_modules.is_empty() => {
                errors |= RecipeErrors::BEACON_MODULE_LIMIT_EXCEEDED;
            }
            None => {}
        }

        if !links.all_valid {
            errors |= RecipeErrors::INVALID_LINKS;
        }
        errors
    }

    // Only called when there are no errors, so every reference is loaded.
    fn compute_warnings(&self, catalog: &Catalog) -> RecipeWarnings {
        let mut warnings = RecipeWarnings::empty();
        let recipe = catalog.recipes.get(self.recipe.entity);
        if !recipe.enabled {
            warnings |= RecipeWarnings::RECIPE_DISABLED;
        }
        if !recipe.available {
            warnings |= RecipeWarnings::RECIPE_UNAVAILABLE;
        }

        let stats = &catalog.assemblers.get(self.assembler.entity).stats;
        if !stats.enabled {
            warnings |= RecipeWarnings::ASSEMBLER_DISABLED;
        }
        if !stats.available {
            warnings |= RecipeWarnings::ASSEMBLER_UNAVAILABLE;
        }
        if !catalog.qualities.get(self.assembler.quality).enabled {
            warnings |= RecipeWarnings::ASSEMBLER_QUALITY_DISABLED;
        }
        let any_assembler_enabled = recipe.assemblers.iter().any(|&a| {
            catalog
                .assemblers
                .lookup(a)
                .is_some_and(|assembler| assembler.stats.enabled)
        });
        if !any_assembler_enabled {
            warnings |= RecipeWarnings::NO_AVAILABLE_ASSEMBLERS;
        }

        if let Some(fuel) = self.fuel {
            if !catalog.items.get(fuel).available {
                warnings |= RecipeWarnings::FUEL_UNAVAILABLE;
            }
            if !catalog.is_craftable(fuel) {
                warnings |= RecipeWarnings::FUEL_UNCRAFTABLE;
            }
            let any_fuel_viable = stats.fuels.iter().any(|&f| {
                catalog.items.lookup(f).is_some_and(|item| item.enabled) && catalog.is_craftable(f)
            });
            if !any_fuel_viable {
                warnings |= RecipeWarnings::NO_AVAILABLE_FUELS;
            }
        }

        warnings |= module_warnings(
            catalog,
            &self.assembler_modules,
            RecipeWarnings::ASSEMBLER_MODULE_DISABLED,
            RecipeWarnings::ASSEMBLER_MODULE_UNAVAILABLE,
            RecipeWarnings::ASSEMBLER_MODULE_QUALITY_DISABLED,
        );

        if let Some(beacon) = self.beacon {
            let beacon_def = catalog.beacons.get(beacon.entity);
            if !beacon_def.stats.enabled {
                warnings |= RecipeWarnings::BEACON_DISABLED;
            }
            if !beacon_def.stats.available {
                warnings |= RecipeWarnings::BEACON_UNAVAILABLE;
            }
            if !catalog.qualities.get(beacon.quality).enabled {
                warnings |= RecipeWarnings::BEACON_QUALITY_DISABLED;
            }
        }
        warnings |= module_warnings(
            catalog,
            &self.beacon_modules,
            RecipeWarnings::BEACON_MODULE_DISABLED,
            RecipeWarnings::BEACON_MODULE_UNAVAILABLE,
            RecipeWarnings::BEACON_MODULE_QUALITY_DISABLED,
        );

        if stats.temperature_fluid_burner && self.fuel_temperature.is_some_and(|r| !r.is_point()) {
            warnings |= RecipeWarnings::TEMPERATURE_FLUID_BURNER_INVALID_LINKS;
        }
        warnings
    }

    /// Whether the selected assembler draws from the electric network.
    pub fn is_electric(&self, catalog: &Catalog) -> bool {
        catalog.assemblers.get(self.assembler.entity).stats.energy_source == EnergySource::Electric
    }
}

fn first_missing_quality(catalog: &Catalog, modules: &[ModuleQualityPair]) -> Option<ModuleQualityPair> {
    modules
        .iter()
        .copied()
        .find(|m| catalog.qualities.is_missing(m.quality))
}

fn module_warnings(
    catalog: &Catalog,
    modules: &[ModuleQualityPair],
    disabled: RecipeWarnings,
    unavailable: RecipeWarnings,
    quality_disabled: RecipeWarnings,
) -> RecipeWarnings {
    let mut warnings = RecipeWarnings::empty();
    for module in modules {
        let def = catalog.modules.get(module.entity);
        if !def.enabled {
            warnings |= disabled;
        }
        if !def.available {
            warnings |= unavailable;
        }
        if !catalog.qualities.get(module.quality).enabled {
            warnings |= quality_disabled;
        }
    }
    warnings
}

impl NodeBehavior for RecipeNode {
    fn node_type(&self) -> NodeType {
        NodeType::Recipe
    }

    fn inputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        self.ensure_io(ctx);
        self.io.borrow().inputs.items().collect()
    }

    fn outputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        self.ensure_io(ctx);
        self.io.borrow().outputs.items().collect()
    }

    fn input_rate_for(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        self.ensure_io(ctx);
        self.io.borrow().inputs.get(item)
    }

    fn output_rate_for(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        self.ensure_io(ctx);
        self.io.borrow().outputs.get(item)
    }

    // Set value is the number of assemblers.
    fn actual_set_value(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.actual_rate_per_sec * self.factory_rate(ctx)
    }

    fn desired_rate_per_sec(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.desired_set_value / self.factory_rate(ctx)
    }

    fn max_desired_set_value(&self, settings: &GraphSettings) -> f64 {
        settings.max_factories
    }

    fn set_value_description(&self) -> &'static str {
        "# of Assemblers:"
    }

    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        self.errors = self.compute_errors(ctx.catalog, links);
        self.warnings = RecipeWarnings::empty();
        if !self.errors.is_empty() {
            return NodeState::Error;
        }

        self.warnings = self.compute_warnings(ctx.catalog);
        if !self.warnings.is_empty() {
            return NodeState::Warning;
        }
        links.settled_state()
    }

    fn has_invalid_links(&self) -> bool {
        self.errors.contains(RecipeErrors::INVALID_LINKS)
    }
}
