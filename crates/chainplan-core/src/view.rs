//! Read-only projections of graph nodes.
//!
//! A [`NodeView`] borrows the graph immutably and forwards accessors; it is
//! what a UI or serializer reads. Error and warning text is rendered here as
//! one short line per set bit, so each cause can be acted on separately.

use std::collections::HashSet;

use crate::copy_options::NodeCopyOptions;
use crate::entity::{EnergySource, EntityType, FluidProperties, TemperatureRange};
use crate::graph::{NodeLink, ProductionGraph};
use crate::id::{ItemId, NodeId};
use crate::node::recipe::{RecipeErrors, RecipeWarnings};
use crate::node::{Node, NodeContext, NodeKind, NodeState, NodeType, RateError, RateType, RecipeNode};
use crate::quality_pair::{
    AssemblerQualityPair, BeaconQualityPair, ItemQualityPair, ModuleQualityPair, RecipeQualityPair,
};

/// A partially used assembler counts as running (full drain) once more
/// than this fraction of it is needed.
const PARTIAL_ASSEMBLER_THRESHOLD: f64 = 0.05;

/// Fraction of an assembler above which a full row of beacons is placed.
const BEACON_ROW_ROUNDING: f64 = 0.8;

/// Generators refuse fluid at exactly its default temperature.
const GENERATOR_MIN_TEMPERATURE_MARGIN: f64 = 0.1;

// ---------------------------------------------------------------------------
// NodeView
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct NodeView<'g> {
    graph: &'g ProductionGraph,
    node: &'g Node,
}

impl<'g> NodeView<'g> {
    pub(crate) fn new(graph: &'g ProductionGraph, node: &'g Node) -> Self {
        Self { graph, node }
    }

    fn ctx(&self) -> NodeContext<'g> {
        self.graph.context()
    }

    pub fn node(&self) -> &'g Node {
        self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn node_type(&self) -> NodeType {
        self.node.node_type()
    }

    pub fn state(&self) -> NodeState {
        self.node.state()
    }

    pub fn rate_type(&self) -> RateType {
        self.node.core.rate_type
    }

    pub fn desired_set_value(&self) -> f64 {
        self.node.core.desired_set_value
    }

    pub fn desired_rate_per_sec(&self) -> f64 {
        self.node.desired_rate_per_sec(&self.ctx())
    }

    pub fn max_desired_set_value(&self) -> f64 {
        self.node.max_desired_set_value(self.graph.settings())
    }

    pub fn set_value_description(&self) -> &'static str {
        self.node.behavior().set_value_description()
    }

    pub fn actual_rate_per_sec(&self) -> f64 {
        self.node.core.actual_rate_per_sec
    }

    /// Actual rate in the graph's display time unit.
    pub fn actual_rate(&self) -> f64 {
        self.node.core.actual_rate(&self.ctx())
    }

    pub fn actual_set_value(&self) -> f64 {
        self.node.actual_set_value(&self.ctx())
    }

    pub fn inputs(&self) -> Vec<ItemQualityPair> {
        self.node.inputs(&self.ctx())
    }

    pub fn outputs(&self) -> Vec<ItemQualityPair> {
        self.node.outputs(&self.ctx())
    }

    pub fn input_links(self) -> impl Iterator<Item = &'g NodeLink> + 'g {
        let graph = self.graph;
        self.node
            .core
            .input_links
            .iter()
            .filter_map(move |&id| graph.link(id))
    }

    pub fn output_links(self) -> impl Iterator<Item = &'g NodeLink> + 'g {
        let graph = self.graph;
        self.node
            .core
            .output_links
            .iter()
            .filter_map(move |&id| graph.link(id))
    }

    pub fn consume_rate(&self, item: ItemQualityPair) -> Result<f64, RateError> {
        self.node.consume_rate(&self.ctx(), item)
    }

    pub fn supply_rate(&self, item: ItemQualityPair) -> Result<f64, RateError> {
        self.node.supply_rate(&self.ctx(), item)
    }

    /// One line per error bit.
    pub fn errors(&self) -> Vec<String> {
        let catalog = self.graph.catalog();
        match &self.node.kind {
            NodeKind::Supplier(n) => n.checks.error_messages(catalog, n.item()),
            NodeKind::Consumer(n) => n.checks.error_messages(catalog, n.item()),
            NodeKind::Passthrough(n) => n.error_messages(),
            NodeKind::Spoil(n) => n.error_messages(catalog),
            NodeKind::Plant(n) => n.error_messages(catalog),
            NodeKind::Recipe(n) => n.error_messages(catalog),
        }
    }

    /// One line per warning bit. Empty while the node has errors.
    pub fn warnings(&self) -> Vec<String> {
        let catalog = self.graph.catalog();
        match &self.node.kind {
            NodeKind::Supplier(n) => n.checks.warning_messages(catalog, n.item()),
            NodeKind::Consumer(n) => n.checks.warning_messages(catalog, n.item()),
            NodeKind::Passthrough(_) | NodeKind::Spoil(_) => Vec::new(),
            NodeKind::Plant(n) => n.warning_messages(catalog),
            NodeKind::Recipe(n) => n.warning_messages(),
        }
    }

    pub fn describe(&self) -> String {
        let catalog = self.graph.catalog();
        let item = |pair: ItemQualityPair| {
            format!(
                "{} ({})",
                catalog.items.get(pair.entity).name,
                catalog.qualities.get(pair.quality).name
            )
        };
        match &self.node.kind {
            NodeKind::Supplier(n) => format!("Supply node for: {}", item(n.item())),
            NodeKind::Consumer(n) => format!("Consumption node for: {}", item(n.item())),
            NodeKind::Passthrough(n) => format!("Passthrough node for: {}", item(n.item())),
            NodeKind::Spoil(n) => format!(
                "Spoil node for: {} to {}",
                item(n.input_item()),
                item(n.output_item())
            ),
            NodeKind::Plant(n) => format!("Plant Growth node for: {}", item(n.seed())),
            NodeKind::Recipe(n) => {
                let recipe = n.recipe();
                format!(
                    "Recipe node for: {} ({})",
                    catalog.recipes.get(recipe.entity).name,
                    catalog.qualities.get(recipe.quality).name
                )
            }
        }
    }

    pub fn as_recipe(&self) -> Option<RecipeView<'g>> {
        match &self.node.kind {
            NodeKind::Recipe(recipe) => Some(RecipeView {
                base: *self,
                recipe,
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

// ---------------------------------------------------------------------------
// RecipeView
// ---------------------------------------------------------------------------

/// Recipe-specific projection: selections, multipliers and the per-assembler
/// and total figures shown in the node editor.
#[derive(Clone, Copy)]
pub struct RecipeView<'g> {
    base: NodeView<'g>,
    recipe: &'g RecipeNode,
}

impl<'g> RecipeView<'g> {
    pub fn node(&self) -> NodeView<'g> {
        self.base
    }

    fn ctx(&self) -> NodeContext<'g> {
        self.base.ctx()
    }

    pub fn recipe(&self) -> RecipeQualityPair {
        self.recipe.recipe()
    }

    pub fn assembler(&self) -> AssemblerQualityPair {
        self.recipe.assembler()
    }

    pub fn assembler_modules(&self) -> &'g [ModuleQualityPair] {
        self.recipe.assembler_modules()
    }

    pub fn fuel(&self) -> Option<ItemId> {
        self.recipe.fuel()
    }

    pub fn fuel_remains(&self) -> Option<ItemId> {
        self.recipe.fuel_remains(self.base.graph.catalog())
    }

    pub fn beacon(&self) -> Option<BeaconQualityPair> {
        self.recipe.beacon()
    }

    pub fn beacon_modules(&self) -> &'g [ModuleQualityPair] {
        self.recipe.beacon_modules()
    }

    pub fn beacon_count(&self) -> f64 {
        self.recipe.beacon_count()
    }

    pub fn beacons_per_assembler(&self) -> f64 {
        self.recipe.beacons_per_assembler()
    }

    pub fn beacons_const(&self) -> f64 {
        self.recipe.beacons_const()
    }

    pub fn neighbour_count(&self) -> f64 {
        self.recipe.neighbour_count()
    }

    pub fn extra_productivity_bonus(&self) -> f64 {
        self.recipe.extra_productivity_bonus()
    }

    pub fn low_priority(&self) -> bool {
        self.recipe.low_priority()
    }

    pub fn max_quality_steps(&self) -> u32 {
        self.recipe.max_quality_steps()
    }

    pub fn error_set(&self) -> RecipeErrors {
        self.recipe.errors()
    }

    pub fn warning_set(&self) -> RecipeWarnings {
        self.recipe.warnings()
    }

    pub fn copy_options(&self) -> NodeCopyOptions {
        NodeCopyOptions::from_recipe(self.recipe)
    }

    // -----------------------------------------------------------------------
    // Multipliers
    // -----------------------------------------------------------------------

    pub fn speed_multiplier(&self) -> f64 {
        self.recipe.speed_multiplier(&self.ctx())
    }

    /// `1 + productivity bonus`.
    pub fn productivity_multiplier(&self) -> f64 {
        1.0 + self.recipe.productivity_bonus(self.base.graph.catalog())
    }

    pub fn consumption_multiplier(&self) -> f64 {
        self.recipe.consumption_multiplier(self.base.graph.catalog())
    }

    pub fn pollution_multiplier(&self) -> f64 {
        self.recipe.pollution_multiplier(self.base.graph.catalog())
    }

    pub fn quality_multiplier(&self) -> f64 {
        self.recipe.quality_multiplier(self.base.graph.catalog())
    }

    // -----------------------------------------------------------------------
    // Generators
    // -----------------------------------------------------------------------

    /// The consumed fluid and its accepted temperature range, if the
    /// assembler is a generator burning a fluid.
    fn generator_fluid(&self) -> Result<(ItemId, FluidProperties, Option<TemperatureRange>), RateError> {
        let catalog = self.base.graph.catalog();
        let assembler = catalog.assemblers.get(self.recipe.assembler().entity);
        if assembler.stats.entity_type != EntityType::Generator {
            return Err(RateError::NotAGenerator);
        }
        let ingredient = catalog
            .recipes
            .get(self.recipe.recipe().entity)
            .ingredients
            .first()
            .ok_or(RateError::NotAGenerator)?;
        let fluid = catalog
            .items
            .get(ingredient.item)
            .fluid
            .ok_or(RateError::NotAGenerator)?;
        Ok((ingredient.item, fluid, ingredient.temperature))
    }

    fn operation_temperature(&self) -> f64 {
        self.base
            .graph
            .catalog()
            .assemblers
            .get(self.recipe.assembler().entity)
            .stats
            .operation_temperature
    }

    /// Lowest fluid temperature the generator accepts.
    pub fn generator_min_temperature(&self) -> Result<f64, RateError> {
        let (_, fluid, range) = self.generator_fluid()?;
        let floor = fluid.default_temperature + GENERATOR_MIN_TEMPERATURE_MARGIN;
        Ok(range.map_or(floor, |r| floor.max(r.min)))
    }

    pub fn generator_max_temperature(&self) -> Result<f64, RateError> {
        let (_, _, range) = self.generator_fluid()?;
        Ok(range.map_or(f64::MAX, |r| r.max))
    }

    /// Flow-weighted temperature of the incoming fluid, traced back through
    /// passthrough nodes. Suppliers are assumed to deliver at the operating
    /// temperature; so is an unconnected generator.
    pub fn generator_average_temperature(&self) -> Result<f64, RateError> {
        let (fluid, _, _) = self.generator_fluid()?;
        let mut visited = HashSet::new();
        Ok(self.average_temperature(self.base.node, fluid, &mut visited))
    }

    fn average_temperature(&self, node: &Node, item: ItemId, visited: &mut HashSet<NodeId>) -> f64 {
        let graph = self.base.graph;
        let operating = self.operation_temperature();
        if !visited.insert(node.id()) {
            return operating;
        }
        match &node.kind {
            NodeKind::Recipe(recipe) if node.id() != self.base.id() => {
                graph.product_temperature(recipe, item).unwrap_or(operating)
            }
            NodeKind::Recipe(_) | NodeKind::Passthrough(_) => {
                let mut count = 0usize;
                let mut flow = 0.0;
                let mut weighted = 0.0;
                let mut sum = 0.0;
                for &link_id in &node.core.input_links {
                    let Some(link) = graph.link(link_id) else {
                        continue;
                    };
                    let temperature = match graph.node(link.supplier()) {
                        Some(supplier) => self.average_temperature(supplier, item, visited),
                        None => operating,
                    };
                    count += 1;
                    flow += link.throughput();
                    weighted += temperature * link.throughput();
                    sum += temperature;
                }
                if flow > 0.0 {
                    weighted / flow
                } else if count > 0 {
                    sum / count as f64
                } else {
                    operating
                }
            }
            _ => operating,
        }
    }

    /// Fraction of the rated output reached at the incoming temperature.
    pub fn generator_effectivity(&self) -> Result<f64, RateError> {
        let (_, fluid, _) = self.generator_fluid()?;
        let average = self.generator_average_temperature()?;
        let span = self.operation_temperature() - fluid.default_temperature;
        Ok(((average - fluid.default_temperature) / span).min(1.0))
    }

    /// Output of one entity in watts. Generators are scaled by their
    /// effectivity; other entities report their nominal production.
    pub fn generator_electrical_production(&self) -> f64 {
        let catalog = self.base.graph.catalog();
        let assembler = self.recipe.assembler();
        let nominal = catalog
            .assemblers
            .get(assembler.entity)
            .stats
            .energy_production(assembler.quality);
        match self.generator_effectivity() {
            Ok(effectivity) => nominal * effectivity,
            Err(_) => nominal,
        }
    }

    // -----------------------------------------------------------------------
    // Single assembler / beacon
    // -----------------------------------------------------------------------

    pub fn assembler_speed(&self) -> f64 {
        let assembler = self.recipe.assembler();
        self.base
            .graph
            .catalog()
            .assemblers
            .get(assembler.entity)
            .stats
            .speed(assembler.quality)
            * self.speed_multiplier()
    }

    /// Watts drawn by one assembler.
    pub fn assembler_energy_consumption(&self) -> f64 {
        let assembler = self.recipe.assembler();
        let stats = &self.base.graph.catalog().assemblers.get(assembler.entity).stats;
        stats.energy_drain + stats.energy_consumption(assembler.quality) * self.consumption_multiplier()
    }

    /// Pollution is not modelled per entity yet.
    pub fn assembler_pollution(&self) -> f64 {
        0.0
    }

    /// Watts drawn by one beacon; zero without an electric beacon.
    pub fn beacon_energy_consumption(&self) -> f64 {
        let Some(beacon) = self.recipe.beacon() else {
            return 0.0;
        };
        let catalog = self.base.graph.catalog();
        let def = catalog.beacons.get(beacon.entity);
        if def.stats.energy_source != EnergySource::Electric {
            return 0.0;
        }
        def.energy_consumption(beacon.quality, catalog.qualities.get(beacon.quality))
    }

    pub fn beacon_pollution(&self) -> f64 {
        0.0
    }

    // -----------------------------------------------------------------------
    // Totals
    // -----------------------------------------------------------------------

    /// Crafts per display time unit of one assembler.
    pub fn total_crafts(&self) -> f64 {
        let time = self
            .base
            .graph
            .catalog()
            .recipes
            .get(self.recipe.recipe().entity)
            .time;
        self.assembler_speed() * self.base.graph.rate_multiplier() / time
    }

    /// Fuel items per display time unit of one assembler.
    pub fn total_fuel_consumption(&self) -> f64 {
        if self.recipe.fuel().is_none() {
            return 0.0;
        }
        self.base.graph.rate_multiplier() * self.recipe.input_rate_for_fuel(&self.ctx())
    }

    /// Electric draw of all assemblers in watts. A trailing partial
    /// assembler draws its full idle drain once it is needed more than 5% of
    /// the time.
    pub fn total_electrical_consumption(&self) -> f64 {
        let catalog = self.base.graph.catalog();
        if !self.recipe.is_electric(catalog) {
            return 0.0;
        }
        let assembler = self.recipe.assembler();
        let stats = &catalog.assemblers.get(assembler.entity).stats;
        let set_value = self.base.actual_set_value();
        let partial = set_value % 1.0;
        let whole = set_value - partial;
        let running = whole + if partial < PARTIAL_ASSEMBLER_THRESHOLD { 0.0 } else { 1.0 };
        running * stats.energy_drain
            + set_value * stats.energy_consumption(assembler.quality) * self.consumption_multiplier()
    }

    pub fn total_generator_production(&self) -> f64 {
        self.generator_electrical_production() * self.base.actual_set_value()
    }

    /// Beacons needed: one row of `beacons_per_assembler` per started
    /// assembler (0.2 of an assembler starts a row) plus the constant.
    pub fn total_beacons(&self) -> u32 {
        if self.recipe.beacon().is_none() {
            return 0;
        }
        let rows = (self.base.actual_set_value() + BEACON_ROW_ROUNDING).floor();
        let beacons = (rows * self.recipe.beacons_per_assembler() + self.recipe.beacons_const()).ceil();
        beacons.max(0.0) as u32
    }

    pub fn total_beacon_electrical_consumption(&self) -> f64 {
        if self.recipe.beacon().is_none() {
            return 0.0;
        }
        f64::from(self.total_beacons()) * self.beacon_energy_consumption()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RecipeDef;
    use crate::quality_pair::RecipeQualityPair;
    use crate::test_utils::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    fn gear_node(fx: &Fixture, graph: &mut ProductionGraph) -> NodeId {
        graph.add_recipe_with_assembler(
            RecipeQualityPair::new(fx.gear_recipe, fx.normal_q),
            AssemblerQualityPair::new(fx.assembler_2, fx.normal_q),
        )
    }

    #[test]
    fn descriptions_name_item_and_quality() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let supplier = graph.add_supplier(fx.pair(fx.iron_ore, fx.rare));
        let consumer = graph.add_consumer(fx.normal(fx.gear));
        let passthrough = graph.add_passthrough(fx.normal(fx.iron_plate));
        let spoil = graph.add_spoil(fx.normal(fx.yumako)).unwrap();
        let plant = graph.add_plant(fx.normal(fx.yumako_seed)).unwrap();
        let recipe = gear_node(&fx, &mut graph);

        let describe = |id| graph.view(id).unwrap().describe();
        assert_eq!(describe(supplier), "Supply node for: iron-ore (rare)");
        assert_eq!(describe(consumer), "Consumption node for: iron-gear-wheel (normal)");
        assert_eq!(describe(passthrough), "Passthrough node for: iron-plate (normal)");
        assert_eq!(
            describe(spoil),
            "Spoil node for: yumako (normal) to spoilage (normal)"
        );
        assert_eq!(describe(plant), "Plant Growth node for: yumako-seed (normal)");
        assert_eq!(describe(recipe), "Recipe node for: iron-gear-wheel (normal)");
    }

    #[test]
    fn recipe_errors_render_one_line_per_bit() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = graph
            .add_recipe(RecipeQualityPair::new(fx.smelting_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        let view = graph.view(id).unwrap();
        assert_eq!(view.errors(), vec!["> Burner Assembler has no fuel set!"]);
        assert!(view.warnings().is_empty());
        assert!(view.as_recipe().unwrap().error_set().contains(RecipeErrors::BURNER_NO_FUEL_SET));
    }

    #[test]
    fn missing_recipe_is_the_only_message() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = graph
            .add_recipe(RecipeQualityPair::new(fx.smelting_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        graph.modify_catalog(|c| c.recipes.mark_missing(fx.smelting_recipe));
        let errors = graph.view(id).unwrap().errors();
        assert_eq!(errors, vec!["> Recipe \"iron-plate\" doesnt exist in preset!"]);
    }

    #[test]
    fn non_recipe_nodes_have_no_recipe_view() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = graph.add_supplier(fx.normal(fx.coal));
        let view = graph.view(id).unwrap();
        assert!(view.as_recipe().is_none());
        assert_eq!(view.set_value_description(), "Item supply rate");
        assert!(matches!(
            view.consume_rate(fx.normal(fx.coal)),
            Err(RateError::NotAConsumer(NodeType::Supplier))
        ));
    }

    #[test]
    fn multipliers_and_single_assembler_figures() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);
        let module = ModuleQualityPair::new(fx.productivity_module, fx.normal_q);
        graph.recipe_controller(id).unwrap().fill_assembler_modules(module);

        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        assert!(approx(recipe.productivity_multiplier(), 1.2));
        assert!(approx(recipe.speed_multiplier(), 0.7));
        assert!(approx(recipe.consumption_multiplier(), 2.6));
        assert!(approx(recipe.assembler_speed(), 0.75 * 0.7));
        assert!(approx(recipe.assembler_energy_consumption(), 5_000.0 + 150_000.0 * 2.6));
        assert_eq!(recipe.assembler_pollution(), 0.0);
        assert_eq!(recipe.beacon_energy_consumption(), 0.0);
        let expected_crafts = 0.75 * 0.7 * graph.rate_multiplier() / 0.5;
        assert!(approx(recipe.total_crafts(), expected_crafts));
    }

    #[test]
    fn partial_assembler_drain_rule() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);

        // 0.5 s / 0.75 speed: 1.5 crafts per second per assembler.
        graph.set_actual_rate(id, 3.75).unwrap();
        let total = graph.view(id).unwrap().as_recipe().unwrap().total_electrical_consumption();
        assert!(approx(total, 3.0 * 5_000.0 + 2.5 * 150_000.0));

        graph.set_actual_rate(id, 3.03).unwrap();
        let total = graph.view(id).unwrap().as_recipe().unwrap().total_electrical_consumption();
        assert!(approx(total, 2.0 * 5_000.0 + 2.02 * 150_000.0));
    }

    #[test]
    fn beacon_totals() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);
        let mut controller = graph.recipe_controller(id).unwrap();
        controller.set_beacon(Some(BeaconQualityPair::new(fx.beacon, fx.normal_q)));
        controller.set_beacons_per_assembler(8.0);
        controller.set_beacons_const(2.0);
        graph.set_actual_rate(id, 3.75).unwrap();

        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        // 2.5 assemblers round up to 3 rows.
        assert_eq!(recipe.total_beacons(), 26);
        assert!(approx(recipe.beacon_energy_consumption(), 480_000.0));
        assert!(approx(recipe.total_beacon_electrical_consumption(), 26.0 * 480_000.0));

        graph.set_actual_rate(id, 1.5 * 2.1).unwrap();
        let view = graph.view(id).unwrap();
        assert_eq!(view.as_recipe().unwrap().total_beacons(), 18);
    }

    #[test]
    fn burner_fuel_totals() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = graph
            .add_recipe(RecipeQualityPair::new(fx.smelting_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        let view = graph.view(id).unwrap();
        assert_eq!(view.as_recipe().unwrap().total_fuel_consumption(), 0.0);

        graph.recipe_controller(id).unwrap().set_fuel(Some(fx.coal));
        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        // 3.2 s per craft at speed 1, 90 kW from 4 MJ coal.
        let per_craft = 3.2 * 90_000.0 / 4_000_000.0;
        assert!(approx(recipe.total_fuel_consumption(), graph.rate_multiplier() * per_craft));
        assert_eq!(recipe.total_electrical_consumption(), 0.0);
    }

    #[test]
    fn generator_queries_reject_other_assemblers() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);
        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        assert_eq!(recipe.generator_min_temperature(), Err(RateError::NotAGenerator));
        assert_eq!(recipe.generator_average_temperature(), Err(RateError::NotAGenerator));
        assert_eq!(recipe.generator_electrical_production(), 0.0);
    }

    #[test]
    fn unconnected_generator_runs_at_operating_temperature() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = graph
            .add_recipe(RecipeQualityPair::new(fx.steam_power_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        assert!(approx(recipe.generator_min_temperature().unwrap(), 15.1));
        assert!(approx(recipe.generator_max_temperature().unwrap(), 165.0));
        assert!(approx(recipe.generator_average_temperature().unwrap(), 165.0));
        assert!(approx(recipe.generator_effectivity().unwrap(), 1.0));
        assert!(approx(recipe.generator_electrical_production(), 900_000.0));
    }

    #[test]
    fn generator_mixes_incoming_temperatures_by_flow() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let low_steam = graph.modify_catalog(|c| {
            let mut recipe = RecipeDef::new("low-pressure-steam");
            recipe.time = 1.0;
            recipe.products.push(crate::entity::RecipeProduct {
                item: fx.steam,
                amount: 60.0,
                productivity_amount: 60.0,
                temperature: Some(90.0),
            });
            recipe.assemblers = vec![fx.boiler];
            c.recipes.insert(recipe)
        });

        let hot = graph
            .add_recipe(RecipeQualityPair::new(fx.boiling_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        let warm = graph
            .add_recipe(RecipeQualityPair::new(low_steam, fx.normal_q), fx.normal_q)
            .unwrap();
        let junction = graph.add_passthrough(fx.normal(fx.steam));
        let engine = graph
            .add_recipe(RecipeQualityPair::new(fx.steam_power_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        let steam = fx.normal(fx.steam);
        let hot_link = graph.connect(hot, junction, steam).unwrap();
        let warm_link = graph.connect(warm, junction, steam).unwrap();
        graph.connect(junction, engine, steam).unwrap();

        // No flow yet: plain average of the two sources.
        let view = graph.view(engine).unwrap();
        assert!(approx(
            view.as_recipe().unwrap().generator_average_temperature().unwrap(),
            127.5
        ));

        graph.set_link_throughput(hot_link, 30.0).unwrap();
        graph.set_link_throughput(warm_link, 10.0).unwrap();
        let view = graph.view(engine).unwrap();
        let recipe = view.as_recipe().unwrap();
        assert!(approx(recipe.generator_average_temperature().unwrap(), 146.25));
        assert!(approx(recipe.generator_effectivity().unwrap(), 0.875));
        assert!(approx(recipe.generator_electrical_production(), 787_500.0));

        graph.set_actual_rate(engine, 2.0).unwrap();
        let view = graph.view(engine).unwrap();
        let recipe = view.as_recipe().unwrap();
        // One craft per second per engine.
        assert!(approx(recipe.total_generator_production(), 2.0 * 787_500.0));
    }
}
