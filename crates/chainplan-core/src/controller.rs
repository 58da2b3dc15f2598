//! Mutation API over graph nodes.
//!
//! A controller borrows the graph mutably for one node. Every public
//! operation leaves the node refreshed (IO, links, state) and raises a solve
//! request; the private `assign_*` helpers do not, so batches such as an
//! assembler switch refresh once at the end.
//!
//! Error and warning bits map to named [`Resolution`]s. The lists a node
//! offers are produced by the node itself; [`NodeController::apply`] runs one.

use crate::catalog::Catalog;
use crate::copy_options::NodeCopyOptions;
use crate::graph::{GraphError, ProductionGraph};
use crate::id::{ItemId, NodeId};
use crate::node::{Node, NodeBehavior, NodeKind, RateType, RecipeNode};
use crate::quality_pair::{AssemblerQualityPair, BeaconQualityPair, ItemQualityPair, ModuleQualityPair};
use crate::selector::{AssemblerStyle, ModuleStyle};
use crate::view::NodeView;

// ---------------------------------------------------------------------------
// Resolutions
// ---------------------------------------------------------------------------

/// A named fix for one or more error or warning bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    DeleteNode,
    DeleteInvalidLinks,
    AutoSelectAssembler,
    AutoSelectFuel,
    UpdateBurnResult,
    FixAssemblerModules,
    RemoveBeacon,
    FixBeaconModules,
    SwitchToEnabledAssembler,
    SwitchToValidFuel,
    RemoveDisabledAssemblerModules,
    TurnOffBeacon,
    RemoveDisabledBeaconModules,
    RemoveFuelLinks,
    UpdateSpoilResult,
    UpdatePlantResult,
}

impl Resolution {
    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Resolution::DeleteNode => "Delete node",
            Resolution::DeleteInvalidLinks => "Delete invalid links",
            Resolution::AutoSelectAssembler => "Auto-select assembler & quality",
            Resolution::AutoSelectFuel => "Auto-select fuel",
            Resolution::UpdateBurnResult => "Update burn result",
            Resolution::FixAssemblerModules => "Fix assembler modules",
            Resolution::RemoveBeacon => "Remove Beacon",
            Resolution::FixBeaconModules => "Fix beacon modules",
            Resolution::SwitchToEnabledAssembler => "Switch to enabled assembler",
            Resolution::SwitchToValidFuel => "Switch to valid fuel",
            Resolution::RemoveDisabledAssemblerModules => "Remove error modules from assembler",
            Resolution::TurnOffBeacon => "Turn off beacon",
            Resolution::RemoveDisabledBeaconModules => "Remove error modules from beacon",
            Resolution::RemoveFuelLinks => "Remove fuel links",
            Resolution::UpdateSpoilResult => "Update spoil result",
            Resolution::UpdatePlantResult => "Update plant results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("\"{}\" does not apply to {node}", .resolution.label())]
    NotApplicable { node: NodeId, resolution: Resolution },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Any node
// ---------------------------------------------------------------------------

/// Operations every node kind supports.
pub struct NodeController<'g> {
    graph: &'g mut ProductionGraph,
    id: NodeId,
}

impl<'g> NodeController<'g> {
    pub(crate) fn new(graph: &'g mut ProductionGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn view(&self) -> Option<NodeView<'_>> {
        self.graph.view(self.id)
    }

    pub fn set_rate_type(&mut self, rate_type: RateType) {
        let Some(node) = self.graph.node_mut(self.id) else {
            return;
        };
        if node.core.rate_type != rate_type {
            node.core.rate_type = rate_type;
            self.graph.update_node_values();
        }
    }

    /// Set the desired set value, clamped to `[0, max_desired_set_value]`.
    pub fn set_desired_set_value(&mut self, value: f64) {
        let max = match self.graph.node(self.id) {
            Some(node) => node.max_desired_set_value(&self.graph.settings),
            None => return,
        };
        let value = value.max(0.0).min(max.max(0.0));
        let Some(node) = self.graph.node_mut(self.id) else {
            return;
        };
        if node.core.desired_set_value != value {
            node.core.desired_set_value = value;
            self.graph.update_node_values();
        }
    }

    pub fn delete(self) -> Result<(), GraphError> {
        self.graph.remove_node(self.id)
    }

    pub fn delete_invalid_links(&mut self) {
        self.graph.delete_invalid_links(self.id);
        self.graph.refresh_node(self.id);
        self.graph.update_node_values();
    }

    pub fn error_resolutions(&self) -> Vec<Resolution> {
        let Some(node) = self.graph.node(self.id) else {
            return Vec::new();
        };
        let catalog = &self.graph.catalog;
        match &node.kind {
            NodeKind::Supplier(n) => n.checks.error_resolutions(),
            NodeKind::Consumer(n) => n.checks.error_resolutions(),
            NodeKind::Passthrough(n) => {
                if n.has_invalid_links() {
                    vec![Resolution::DeleteInvalidLinks]
                } else {
                    Vec::new()
                }
            }
            NodeKind::Spoil(n) => n.error_resolutions(catalog),
            NodeKind::Plant(n) => n.error_resolutions(catalog),
            NodeKind::Recipe(n) => n.error_resolutions(catalog),
        }
    }

    pub fn warning_resolutions(&self) -> Vec<Resolution> {
        match self.graph.node(self.id).map(Node::kind) {
            Some(NodeKind::Recipe(n)) => n.warning_resolutions(),
            _ => Vec::new(),
        }
    }

    /// Run one of the node's currently offered resolutions.
    pub fn apply(mut self, resolution: Resolution) -> Result<(), ControllerError> {
        let offered = self.error_resolutions().contains(&resolution)
            || self.warning_resolutions().contains(&resolution);
        if !offered {
            return Err(ControllerError::NotApplicable {
                node: self.id,
                resolution,
            });
        }
        tracing::debug!(node = %self.id, resolution = resolution.label(), "applying resolution");

        let id = self.id;
        match resolution {
            Resolution::DeleteNode => return Ok(self.delete()?),
            Resolution::DeleteInvalidLinks => self.delete_invalid_links(),
            Resolution::UpdateSpoilResult => SpoilController::new(self.graph, id).update_spoil_result(),
            Resolution::UpdatePlantResult => PlantController::new(self.graph, id).update_plant_result(),
            Resolution::AutoSelectAssembler | Resolution::SwitchToEnabledAssembler => {
                RecipeController::new(self.graph, id).auto_set_assembler()
            }
            Resolution::AutoSelectFuel | Resolution::SwitchToValidFuel => {
                RecipeController::new(self.graph, id).auto_set_fuel()
            }
            Resolution::UpdateBurnResult => RecipeController::new(self.graph, id).update_burn_result(),
            Resolution::FixAssemblerModules => {
                RecipeController::new(self.graph, id).fix_assembler_modules()
            }
            Resolution::RemoveBeacon | Resolution::TurnOffBeacon => {
                RecipeController::new(self.graph, id).clear_beacon()
            }
            Resolution::FixBeaconModules => RecipeController::new(self.graph, id).fix_beacon_modules(),
            Resolution::RemoveDisabledAssemblerModules => {
                RecipeController::new(self.graph, id).remove_disabled_assembler_modules()
            }
            Resolution::RemoveDisabledBeaconModules => {
                RecipeController::new(self.graph, id).remove_disabled_beacon_modules()
            }
            Resolution::RemoveFuelLinks => RecipeController::new(self.graph, id).remove_fuel_links(),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recipe nodes
// ---------------------------------------------------------------------------

pub struct RecipeController<'g> {
    graph: &'g mut ProductionGraph,
    id: NodeId,
}

impl<'g> RecipeController<'g> {
    pub(crate) fn new(graph: &'g mut ProductionGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn view(&self) -> Option<NodeView<'_>> {
        self.graph.view(self.id)
    }

    fn node(&self) -> Option<&RecipeNode> {
        self.graph.recipe_node(self.id)
    }

    /// The catalog alongside the node, borrowed from disjoint graph fields.
    fn split(&mut self) -> Option<(&Catalog, &mut RecipeNode)> {
        let catalog = &self.graph.catalog;
        let node = self.graph.nodes.get_mut(&self.id)?.as_recipe_mut()?;
        Some((catalog, node))
    }

    fn edit(&mut self, f: impl FnOnce(&mut RecipeNode)) {
        if let Some(node) = self.graph.recipe_node_mut(self.id) {
            f(node);
        }
    }

    fn finish(&mut self) {
        self.graph.refresh_node(self.id);
        self.graph.update_node_values();
    }

    // -----------------------------------------------------------------------
    // Scalar tuning
    // -----------------------------------------------------------------------

    pub fn set_priority(&mut self, low_priority: bool) {
        self.edit(|n| n.set_low_priority(low_priority));
        self.finish();
    }

    pub fn set_neighbour_count(&mut self, count: f64) {
        self.edit(|n| n.set_neighbour_count(count));
        self.finish();
    }

    pub fn set_extra_productivity_bonus(&mut self, bonus: f64) {
        self.edit(|n| n.set_extra_productivity_bonus(bonus));
        self.finish();
    }

    pub fn set_beacon_count(&mut self, count: f64) {
        self.edit(|n| n.set_beacon_count(count));
        self.finish();
    }

    pub fn set_beacons_per_assembler(&mut self, beacons: f64) {
        self.edit(|n| n.set_beacons_per_assembler(beacons));
        self.finish();
    }

    pub fn set_beacons_const(&mut self, beacons: f64) {
        self.edit(|n| n.set_beacons_const(beacons));
        self.finish();
    }

    pub fn set_max_quality_steps(&mut self, steps: u32) {
        self.edit(|n| n.set_max_quality_steps(steps));
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Assembler and fuel
    // -----------------------------------------------------------------------

    /// Switch assembler. The fuel is kept if the new assembler burns it,
    /// modules it no longer accepts are dropped, and the beacon is cleared
    /// when no module can apply at all.
    pub fn set_assembler(&mut self, assembler: AssemblerQualityPair) {
        self.assign_assembler(assembler);
        self.finish();
    }

    /// Pick an assembler with the graph's assembler selector, keeping the
    /// current quality unless it is missing or disabled.
    pub fn auto_set_assembler(&mut self) {
        let style = self.graph.selectors.assembler.style;
        self.auto_set_assembler_with(style);
    }

    pub fn auto_set_assembler_with(&mut self, style: AssemblerStyle) {
        let Some(node) = self.node() else {
            return;
        };
        let catalog = &self.graph.catalog;
        let current = node.assembler();
        let quality = if catalog.qualities.lookup(current.quality).is_some_and(|q| q.enabled) {
            current.quality
        } else {
            catalog.default_quality()
        };
        let Some(assembler) = self
            .graph
            .selectors
            .assembler
            .select_with(catalog, node.recipe().entity, style)
        else {
            tracing::debug!(node = %self.id, "no assembler available for recipe");
            return;
        };
        self.assign_assembler(AssemblerQualityPair::new(assembler, quality));
        self.assign_auto_fuel();
        self.finish();
    }

    /// Select a fuel. Links carrying the previous fuel or its burnt result
    /// are deleted unless those items are also part of the recipe itself.
    pub fn set_fuel(&mut self, fuel: Option<ItemId>) {
        self.assign_fuel(fuel);
        self.finish();
    }

    pub fn auto_set_fuel(&mut self) {
        self.assign_auto_fuel();
        self.finish();
    }

    /// Re-derive the burnt result from the selected fuel.
    pub fn update_burn_result(&mut self) {
        let fuel = self.node().and_then(RecipeNode::fuel);
        self.assign_fuel(fuel);
        self.finish();
    }

    /// Record a burnt result that disagrees with the catalog (imported
    /// graphs). Matching the fuel's own burn result clears the override.
    pub fn set_burnt_override(&mut self, item: Option<ItemId>) {
        let Some((catalog, node)) = self.split() else {
            return;
        };
        let natural = node.fuel().and_then(|f| catalog.items.get(f).burn_result);
        let over = if node.fuel().is_some() && natural == item {
            None
        } else {
            item
        };
        node.set_fuel_remains_override(over);
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Beacon
    // -----------------------------------------------------------------------

    /// Remove the beacon together with its modules and counts.
    pub fn clear_beacon(&mut self) {
        self.assign_clear_beacon();
        self.finish();
    }

    pub fn set_beacon(&mut self, beacon: Option<BeaconQualityPair>) {
        self.assign_beacon(beacon);
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Assembler modules
    // -----------------------------------------------------------------------

    pub fn add_assembler_module(&mut self, module: ModuleQualityPair) {
        self.edit(|n| n.assembler_modules_mut().push(module));
        self.finish();
    }

    /// Fill every free assembler slot with `module`.
    pub fn fill_assembler_modules(&mut self, module: ModuleQualityPair) {
        if let Some((catalog, node)) = self.split() {
            let slots = catalog.assemblers.get(node.assembler().entity).stats.module_slots;
            let modules = node.assembler_modules_mut();
            while modules.len() < slots {
                modules.push(module);
            }
        }
        self.finish();
    }

    pub fn remove_assembler_module(&mut self, index: usize) {
        self.edit(|n| {
            if index < n.assembler_modules().len() {
                n.assembler_modules_mut().remove(index);
            }
        });
        self.finish();
    }

    /// Remove every copy of `module`.
    pub fn remove_assembler_modules(&mut self, module: ModuleQualityPair) {
        self.edit(|n| n.assembler_modules_mut().retain(|&m| m != module));
        self.finish();
    }

    pub fn clear_assembler_modules(&mut self) {
        self.edit(|n| n.assembler_modules_mut().clear());
        self.finish();
    }

    /// Replace the assembler modules. With `filter`, modules the recipe or
    /// assembler rejects are skipped and the list is capped at the slot count.
    pub fn set_assembler_modules(&mut self, modules: &[ModuleQualityPair], filter: bool) {
        self.assign_assembler_modules(modules, filter);
        self.finish();
    }

    pub fn auto_set_assembler_modules(&mut self) {
        let style = self.graph.selectors.module.style;
        self.auto_set_assembler_modules_with(style);
    }

    pub fn auto_set_assembler_modules_with(&mut self, style: ModuleStyle) {
        let Some(node) = self.node() else {
            return;
        };
        let catalog = &self.graph.catalog;
        let quality = catalog.default_quality();
        let modules: Vec<ModuleQualityPair> = self
            .graph
            .selectors
            .module
            .select_with(catalog, node.assembler().entity, node.recipe().entity, style)
            .into_iter()
            .map(|m| ModuleQualityPair::new(m, quality))
            .collect();
        self.edit(|n| *n.assembler_modules_mut() = modules);
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Beacon modules
    // -----------------------------------------------------------------------

    pub fn add_beacon_module(&mut self, module: ModuleQualityPair) {
        self.edit(|n| n.beacon_modules_mut().push(module));
        self.finish();
    }

    /// Fill every free beacon slot with `module`. Does nothing without a beacon.
    pub fn fill_beacon_modules(&mut self, module: ModuleQualityPair) {
        if let Some((catalog, node)) = self.split() {
            if let Some(beacon) = node.beacon() {
                let slots = catalog.beacons.get(beacon.entity).stats.module_slots;
                let modules = node.beacon_modules_mut();
                while modules.len() < slots {
                    modules.push(module);
                }
            }
        }
        self.finish();
    }

    pub fn remove_beacon_module(&mut self, index: usize) {
        self.edit(|n| {
            if index < n.beacon_modules().len() {
                n.beacon_modules_mut().remove(index);
            }
        });
        self.finish();
    }

    pub fn remove_beacon_modules(&mut self, module: ModuleQualityPair) {
        self.edit(|n| n.beacon_modules_mut().retain(|&m| m != module));
        self.finish();
    }

    pub fn clear_beacon_modules(&mut self) {
        self.edit(|n| n.beacon_modules_mut().clear());
        self.finish();
    }

    /// Replace the beacon modules. With `filter`, modules the recipe,
    /// assembler or beacon rejects are skipped and the list is capped at the
    /// beacon's slot count.
    pub fn set_beacon_modules(&mut self, modules: &[ModuleQualityPair], filter: bool) {
        self.assign_beacon_modules(modules, filter);
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Fix actions
    // -----------------------------------------------------------------------

    /// Drop missing or unacceptable assembler modules, then any beyond the
    /// slot count.
    pub fn fix_assembler_modules(&mut self) {
        if let Some((catalog, node)) = self.split() {
            let recipe = catalog.recipes.get(node.recipe().entity);
            let stats = &catalog.assemblers.get(node.assembler().entity).stats;
            let modules = node.assembler_modules_mut();
            modules.retain(|m| {
                !catalog.modules.is_missing(m.entity)
                    && stats.accepts_module(m.entity)
                    && recipe.modules.contains(&m.entity)
                    && !catalog.qualities.is_missing(m.quality)
            });
            modules.truncate(stats.module_slots);
        }
        self.finish();
    }

    /// Drop missing or unacceptable beacon modules, then any beyond the
    /// beacon's slot count. Without a beacon every module goes.
    pub fn fix_beacon_modules(&mut self) {
        if let Some((catalog, node)) = self.split() {
            let recipe = catalog.recipes.get(node.recipe().entity);
            let stats = &catalog.assemblers.get(node.assembler().entity).stats;
            let beacon = node.beacon().map(|b| &catalog.beacons.get(b.entity).stats);
            let modules = node.beacon_modules_mut();
            match beacon {
                Some(beacon) => {
                    modules.retain(|m| {
                        !catalog.modules.is_missing(m.entity)
                            && stats.accepts_module(m.entity)
                            && recipe.modules.contains(&m.entity)
                            && beacon.accepts_module(m.entity)
                            && !catalog.qualities.is_missing(m.quality)
                    });
                    modules.truncate(beacon.module_slots);
                }
                None => modules.clear(),
            }
        }
        self.finish();
    }

    pub fn remove_disabled_assembler_modules(&mut self) {
        if let Some((catalog, node)) = self.split() {
            node.assembler_modules_mut()
                .retain(|m| module_is_usable(catalog, m));
        }
        self.finish();
    }

    pub fn remove_disabled_beacon_modules(&mut self) {
        if let Some((catalog, node)) = self.split() {
            node.beacon_modules_mut()
                .retain(|m| module_is_usable(catalog, m));
        }
        self.finish();
    }

    /// Delete every input link carrying the fuel.
    pub fn remove_fuel_links(&mut self) {
        let Some(fuel) = self.node().and_then(RecipeNode::fuel) else {
            return;
        };
        let fuel = ItemQualityPair::new(fuel, self.graph.catalog.default_quality());
        for link in self.graph.links_for_item(self.id, fuel, true) {
            self.graph.unlink(link);
        }
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Copy options
    // -----------------------------------------------------------------------

    /// Apply copied settings from another recipe node. The assembler is only
    /// taken if this recipe can use it, the fuel only if the assembler burns
    /// it, and modules are filtered against this node.
    pub fn apply_copy_options(&mut self, options: &NodeCopyOptions) {
        let Some(node) = self.node() else {
            return;
        };
        let catalog = &self.graph.catalog;
        let recipe = catalog.recipes.get(node.recipe().entity);
        let assembler = options.assembler.filter(|a| {
            recipe.assemblers.contains(&a.entity) && !catalog.assemblers.is_missing(a.entity)
        });
        if let Some(assembler) = assembler {
            self.assign_assembler(assembler);
        }

        self.assign_assembler_modules(&options.assembler_modules, true);

        if let Some(fuel) = options.fuel {
            let accepted = self.node().is_some_and(|n| {
                self.graph
                    .catalog
                    .assemblers
                    .get(n.assembler().entity)
                    .stats
                    .accepts_fuel(fuel)
            });
            if accepted {
                self.assign_fuel(Some(fuel));
            }
        }

        self.edit(|n| {
            n.set_neighbour_count(options.neighbour_count);
            n.set_extra_productivity_bonus(options.extra_productivity_bonus);
        });

        match options.beacon {
            Some(beacon) if self.beacon_applies() => {
                self.assign_beacon(Some(beacon));
                self.assign_beacon_modules(&options.beacon_modules, true);
                self.edit(|n| {
                    n.set_beacon_count(options.beacon_count);
                    n.set_beacons_per_assembler(options.beacons_per_assembler);
                    n.set_beacons_const(options.beacons_const);
                });
            }
            _ => self.assign_clear_beacon(),
        }
        self.finish();
    }

    /// Write saved selections back as-is. Nothing is filtered, so a record
    /// that no longer fits the catalog shows up in the node's error state.
    pub fn restore_options(&mut self, options: &NodeCopyOptions) {
        self.edit(|n| {
            if let Some(assembler) = options.assembler {
                n.set_assembler(assembler);
            }
            *n.assembler_modules_mut() = options.assembler_modules.clone();
            n.set_fuel(options.fuel);
            n.set_neighbour_count(options.neighbour_count);
            n.set_extra_productivity_bonus(options.extra_productivity_bonus);
            n.set_beacon(options.beacon);
            *n.beacon_modules_mut() = options.beacon_modules.clone();
            n.set_beacon_count(options.beacon_count);
            n.set_beacons_per_assembler(options.beacons_per_assembler);
            n.set_beacons_const(options.beacons_const);
        });
        self.graph.selectors.fuel.record_use(options.fuel);
        self.finish();
    }

    // -----------------------------------------------------------------------
    // Unrefreshed building blocks
    // -----------------------------------------------------------------------

    fn assign_assembler(&mut self, assembler: AssemblerQualityPair) {
        self.edit(|n| n.set_assembler(assembler));

        let Some(node) = self.node() else {
            return;
        };
        let catalog = &self.graph.catalog;
        let stats = &catalog.assemblers.get(assembler.entity).stats;
        let current_fuel = node.fuel();
        if !stats.is_burner() {
            self.assign_fuel(None);
        } else if current_fuel.is_some_and(|f| stats.accepts_fuel(f)) {
            self.assign_fuel(current_fuel);
        } else {
            self.assign_auto_fuel();
        }

        if let Some((catalog, node)) = self.split() {
            let recipe = catalog.recipes.get(node.recipe().entity);
            let stats = &catalog.assemblers.get(assembler.entity).stats;
            let modules = node.assembler_modules_mut();
            modules.retain(|m| {
                !catalog.modules.is_missing(m.entity)
                    && stats.accepts_module(m.entity)
                    && recipe.modules.contains(&m.entity)
                    && catalog.qualities.lookup(m.quality).is_some_and(|q| q.available)
            });
            modules.truncate(stats.module_slots);
        }

        if self.beacon_applies() {
            let beacon = self.node().and_then(RecipeNode::beacon);
            self.assign_beacon(beacon);
        } else {
            self.assign_clear_beacon();
        }
    }

    /// Beacons only matter if both the assembler and the recipe take modules.
    fn beacon_applies(&self) -> bool {
        let Some(node) = self.node() else {
            return false;
        };
        let catalog = &self.graph.catalog;
        !catalog.assemblers.get(node.assembler().entity).stats.modules.is_empty()
            && !catalog.recipes.get(node.recipe().entity).modules.is_empty()
    }

    fn assign_fuel(&mut self, fuel: Option<ItemId>) {
        let ctx = self.graph.context();
        let Some(node) = self.graph.recipe_node(self.id) else {
            return;
        };
        let catalog = ctx.catalog;
        let current = node.fuel();
        let remains = node.fuel_remains(catalog);
        let natural_remains = current.and_then(|f| catalog.items.get(f).burn_result);
        let changed = current != fuel
            || (current.is_none() && remains.is_some())
            || (current.is_some() && natural_remains != remains);
        if !changed {
            return;
        }

        let default_quality = catalog.default_quality();
        let mut stale = Vec::new();
        if let Some(old) = current {
            if !node.is_fuel_part_of_recipe_inputs(&ctx) {
                let item = ItemQualityPair::new(old, default_quality);
                stale.extend(self.graph.links_for_item(self.id, item, true));
            }
        }
        if let Some(old) = remains {
            if !node.is_fuel_remains_part_of_recipe_outputs(&ctx) {
                let item = ItemQualityPair::new(old, default_quality);
                stale.extend(self.graph.links_for_item(self.id, item, false));
            }
        }
        for link in stale {
            self.graph.unlink(link);
        }

        self.edit(|n| n.set_fuel(fuel));
        self.graph.selectors.fuel.record_use(fuel);
    }

    fn assign_auto_fuel(&mut self) {
        let Some(node) = self.node() else {
            return;
        };
        let fuel = self
            .graph
            .selectors
            .fuel
            .select(&self.graph.catalog, node.assembler().entity);
        self.assign_fuel(fuel);
    }

    fn assign_clear_beacon(&mut self) {
        self.edit(|n| {
            n.set_beacon(None);
            n.beacon_modules_mut().clear();
            n.set_beacon_count(0.0);
            n.set_beacons_per_assembler(0.0);
            n.set_beacons_const(0.0);
        });
    }

    fn assign_beacon(&mut self, beacon: Option<BeaconQualityPair>) {
        let Some(beacon) = beacon else {
            self.assign_clear_beacon();
            return;
        };
        let Some((catalog, node)) = self.split() else {
            return;
        };
        node.set_beacon(Some(beacon));
        let recipe = catalog.recipes.get(node.recipe().entity);
        let stats = &catalog.assemblers.get(node.assembler().entity).stats;
        let beacon = &catalog.beacons.get(beacon.entity).stats;
        let modules = node.beacon_modules_mut();
        modules.retain(|m| {
            !catalog.modules.is_missing(m.entity)
                && stats.accepts_module(m.entity)
                && recipe.modules.contains(&m.entity)
                && beacon.accepts_module(m.entity)
                && catalog.qualities.lookup(m.quality).is_some_and(|q| q.available)
        });
        modules.truncate(beacon.module_slots);
    }

    fn assign_assembler_modules(&mut self, modules: &[ModuleQualityPair], filter: bool) {
        let Some((catalog, node)) = self.split() else {
            return;
        };
        let recipe = catalog.recipes.get(node.recipe().entity);
        let stats = &catalog.assemblers.get(node.assembler().entity).stats;
        let target = node.assembler_modules_mut();
        target.clear();
        if !filter {
            target.extend_from_slice(modules);
            return;
        }
        for &m in modules {
            if target.len() < stats.module_slots
                && recipe.modules.contains(&m.entity)
                && stats.accepts_module(m.entity)
            {
                target.push(m);
            }
        }
    }

    fn assign_beacon_modules(&mut self, modules: &[ModuleQualityPair], filter: bool) {
        let Some((catalog, node)) = self.split() else {
            return;
        };
        let recipe = catalog.recipes.get(node.recipe().entity);
        let stats = &catalog.assemblers.get(node.assembler().entity).stats;
        let beacon = node.beacon().map(|b| &catalog.beacons.get(b.entity).stats);
        let target = node.beacon_modules_mut();
        target.clear();
        if !filter {
            target.extend_from_slice(modules);
            return;
        }
        let Some(beacon) = beacon else {
            return;
        };
        for &m in modules {
            if target.len() < beacon.module_slots
                && recipe.modules.contains(&m.entity)
                && stats.accepts_module(m.entity)
                && beacon.accepts_module(m.entity)
            {
                target.push(m);
            }
        }
    }
}

/// Module and its quality are enabled and available.
fn module_is_usable(catalog: &Catalog, module: &ModuleQualityPair) -> bool {
    let def = catalog.modules.get(module.entity);
    def.enabled && def.available && catalog.qualities.get(module.quality).enabled
}

// ---------------------------------------------------------------------------
// Spoil, plant and passthrough nodes
// ---------------------------------------------------------------------------

pub struct SpoilController<'g> {
    graph: &'g mut ProductionGraph,
    id: NodeId,
}

impl<'g> SpoilController<'g> {
    pub(crate) fn new(graph: &'g mut ProductionGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// Resync the output with the input's current spoil result.
    pub fn update_spoil_result(&mut self) {
        let catalog = &self.graph.catalog;
        if let Some(Node {
            kind: NodeKind::Spoil(spoil),
            ..
        }) = self.graph.nodes.get_mut(&self.id)
        {
            if let Some(expected) = spoil.expected_output(catalog) {
                spoil.set_output(expected);
            }
        }
        self.graph.refresh_node(self.id);
        self.graph.update_node_values();
    }
}

pub struct PlantController<'g> {
    graph: &'g mut ProductionGraph,
    id: NodeId,
}

impl<'g> PlantController<'g> {
    pub(crate) fn new(graph: &'g mut ProductionGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// Resync the growth process with the seed's current plant result.
    pub fn update_plant_result(&mut self) {
        let catalog = &self.graph.catalog;
        if let Some(Node {
            kind: NodeKind::Plant(plant),
            ..
        }) = self.graph.nodes.get_mut(&self.id)
        {
            if let Some(process) = catalog.items.get(plant.seed().entity).plant_result {
                plant.set_process(process);
            }
        }
        self.graph.refresh_node(self.id);
        self.graph.update_node_values();
    }
}

pub struct PassthroughController<'g> {
    graph: &'g mut ProductionGraph,
    id: NodeId,
}

impl<'g> PassthroughController<'g> {
    pub(crate) fn new(graph: &'g mut ProductionGraph, id: NodeId) -> Self {
        Self { graph, id }
    }

    pub fn set_simple_draw(&mut self, simple_draw: bool) {
        if let Some(Node {
            kind: NodeKind::Passthrough(passthrough),
            ..
        }) = self.graph.node_mut(self.id)
        {
            passthrough.set_simple_draw(simple_draw);
        }
    }
}
