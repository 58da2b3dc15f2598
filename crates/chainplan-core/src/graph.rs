//! The production graph: nodes, the item links between them, and the
//! catalog and settings every node is evaluated against.
//!
//! The graph does not solve rates itself. An external flow engine reads
//! node IO through [`NodeView`] and writes results back with
//! [`ProductionGraph::set_actual_rate`] and
//! [`ProductionGraph::set_link_throughput`]. Every structural change raises
//! a solve request that the engine drains with
//! [`ProductionGraph::take_solve_request`].

use std::collections::{BTreeMap, HashSet};

use slotmap::SlotMap;

use crate::catalog::Catalog;
use crate::controller::{
    NodeController, PassthroughController, PlantController, RecipeController, SpoilController,
};
use crate::entity::TemperatureRange;
use crate::id::{ItemId, LinkId, NodeId, PlantProcessId, QualityId};
use crate::node::{
    ConsumerNode, LinkReport, Node, NodeContext, NodeKind, NodeState, NodeType, PassthroughNode,
    PlantNode, RecipeNode, SpoilNode, SupplierNode,
};
use crate::quality_pair::{AssemblerQualityPair, ItemQualityPair, RecipeQualityPair};
use crate::selector::Selectors;
use crate::settings::{GraphSettings, RateUnit};
use crate::view::NodeView;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("link not found: {0:?}")]
    LinkNotFound(LinkId),
    #[error("node id already in use: {0}")]
    DuplicateNodeId(NodeId),
    #[error("{supplier} cannot feed {consumer} with item {item:?}")]
    InvalidLink {
        supplier: NodeId,
        consumer: NodeId,
        item: ItemQualityPair,
    },
    #[error("{supplier} already feeds {consumer} with item {item:?}")]
    DuplicateLink {
        supplier: NodeId,
        consumer: NodeId,
        item: ItemQualityPair,
    },
    #[error("recipe \"{0}\" has no assembler")]
    RecipeHasNoAssembler(String),
    #[error("item \"{0}\" doesnt spoil")]
    ItemDoesntSpoil(String),
    #[error("item \"{0}\" cant be planted")]
    ItemDoesntGrow(String),
    #[error("plant process \"{0}\" has no seed")]
    ProcessHasNoSeed(String),
    #[error("{node} is a {actual:?} node, expected {expected:?}")]
    WrongNodeType {
        node: NodeId,
        expected: NodeType,
        actual: NodeType,
    },
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// An item flow from a supplier node's output to a consumer node's input.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLink {
    pub(crate) supplier: NodeId,
    pub(crate) consumer: NodeId,
    pub(crate) item: ItemQualityPair,
    pub(crate) throughput: f64,
}

impl NodeLink {
    pub fn supplier(&self) -> NodeId {
        self.supplier
    }

    pub fn consumer(&self) -> NodeId {
        self.consumer
    }

    pub fn item(&self) -> ItemQualityPair {
        self.item
    }

    /// Items per second, as written back by the flow engine.
    pub fn throughput(&self) -> f64 {
        self.throughput
    }
}

// ---------------------------------------------------------------------------
// ProductionGraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProductionGraph {
    pub(crate) catalog: Catalog,
    pub(crate) settings: GraphSettings,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) links: SlotMap<LinkId, NodeLink>,
    next_node_id: u32,
    pub(crate) selectors: Selectors,
    solve_requested: bool,
}

impl ProductionGraph {
    pub fn new(catalog: Catalog, settings: GraphSettings) -> Self {
        Self {
            catalog,
            settings,
            nodes: BTreeMap::new(),
            links: SlotMap::with_key(),
            next_node_id: 0,
            selectors: Selectors::default(),
            solve_requested: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn context(&self) -> NodeContext<'_> {
        NodeContext {
            catalog: &self.catalog,
            settings: &self.settings,
        }
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn selectors_mut(&mut self) -> &mut Selectors {
        &mut self.selectors
    }

    pub fn rate_multiplier(&self) -> f64 {
        self.settings.rate_multiplier()
    }

    pub fn rate_name(&self) -> &'static str {
        self.settings.rate_name()
    }

    /// Change the display time unit. Rocket silo rates depend on it, so
    /// every recipe node recomputes its IO.
    pub fn set_rate_unit(&mut self, unit: RateUnit) {
        if self.settings.rate_unit == unit {
            return;
        }
        self.settings.rate_unit = unit;
        self.revalidate();
    }

    /// Change the default cascade depth for recipe nodes created from now
    /// on. Existing nodes keep their own setting.
    pub fn set_default_max_quality_steps(&mut self, steps: u32) {
        self.settings.max_quality_steps = steps;
    }

    /// Mutate the catalog (reload a preset, toggle entities) and revalidate
    /// every node against the result.
    pub fn modify_catalog<R>(&mut self, f: impl FnOnce(&mut Catalog) -> R) -> R {
        let result = f(&mut self.catalog);
        self.revalidate();
        result
    }

    /// Recompute the IO and state of every node.
    pub fn revalidate(&mut self) {
        for node in self.nodes.values() {
            if let Some(recipe) = node.as_recipe() {
                recipe.invalidate_io();
            }
        }
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for &id in &ids {
            self.refresh_node(id);
        }
        let errors = self
            .nodes
            .values()
            .filter(|n| n.state() == NodeState::Error)
            .count();
        tracing::info!(nodes = ids.len(), errors, "revalidated graph against catalog");
        self.update_node_values();
    }

    // -----------------------------------------------------------------------
    // Node creation
    // -----------------------------------------------------------------------

    /// Make the next created node use `id`. Used when restoring a saved
    /// graph; ids already taken are rejected.
    pub fn set_next_node_id(&mut self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.next_node_id = id.0;
        Ok(())
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        while self.nodes.contains_key(&NodeId(self.next_node_id)) {
            self.next_node_id += 1;
        }
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        self.refresh_node(id);
        self.update_node_values();
        id
    }

    pub fn add_supplier(&mut self, item: ItemQualityPair) -> NodeId {
        self.insert_node(NodeKind::Supplier(SupplierNode::new(item)))
    }

    pub fn add_consumer(&mut self, item: ItemQualityPair) -> NodeId {
        self.insert_node(NodeKind::Consumer(ConsumerNode::new(item)))
    }

    pub fn add_passthrough(&mut self, item: ItemQualityPair) -> NodeId {
        self.insert_node(NodeKind::Passthrough(PassthroughNode::new(item)))
    }

    /// A spoil node turning `input` into its catalog spoil result.
    pub fn add_spoil(&mut self, input: ItemQualityPair) -> Result<NodeId, GraphError> {
        let def = self.catalog.items.get(input.entity);
        let output = def
            .spoil_result
            .ok_or_else(|| GraphError::ItemDoesntSpoil(def.name.clone()))?;
        Ok(self.add_spoil_with_output(input, output))
    }

    /// A spoil node with an explicit output, e.g. restored from a save.
    pub fn add_spoil_with_output(&mut self, input: ItemQualityPair, output: ItemId) -> NodeId {
        self.insert_node(NodeKind::Spoil(SpoilNode::new(input, output)))
    }

    /// A plant node growing `seed` through its catalog plant process.
    pub fn add_plant(&mut self, seed: ItemQualityPair) -> Result<NodeId, GraphError> {
        let def = self.catalog.items.get(seed.entity);
        let process = def
            .plant_result
            .ok_or_else(|| GraphError::ItemDoesntGrow(def.name.clone()))?;
        Ok(self.insert_node(NodeKind::Plant(PlantNode::new(seed, process))))
    }

    /// A plant node for an explicit process; the seed comes from the process.
    pub fn add_plant_process(
        &mut self,
        process: PlantProcessId,
        quality: QualityId,
    ) -> Result<NodeId, GraphError> {
        let def = self.catalog.plant_processes.get(process);
        let seed = def
            .seed
            .ok_or_else(|| GraphError::ProcessHasNoSeed(def.name.clone()))?;
        let seed = ItemQualityPair::new(seed, quality);
        Ok(self.insert_node(NodeKind::Plant(PlantNode::new(seed, process))))
    }

    /// A plant node with an explicit seed, e.g. restored from a save whose
    /// process is no longer loaded.
    pub fn add_plant_with_seed(&mut self, seed: ItemQualityPair, process: PlantProcessId) -> NodeId {
        self.insert_node(NodeKind::Plant(PlantNode::new(seed, process)))
    }

    /// A recipe node using the recipe's first assembler at `assembler_quality`.
    pub fn add_recipe(
        &mut self,
        recipe: RecipeQualityPair,
        assembler_quality: QualityId,
    ) -> Result<NodeId, GraphError> {
        let def = self.catalog.recipes.get(recipe.entity);
        let assembler = def
            .assemblers
            .first()
            .copied()
            .ok_or_else(|| GraphError::RecipeHasNoAssembler(def.name.clone()))?;
        Ok(self.add_recipe_with_assembler(
            recipe,
            AssemblerQualityPair::new(assembler, assembler_quality),
        ))
    }

    pub fn add_recipe_with_assembler(
        &mut self,
        recipe: RecipeQualityPair,
        assembler: AssemblerQualityPair,
    ) -> NodeId {
        let node = RecipeNode::new(recipe, assembler, self.settings.max_quality_steps);
        self.insert_node(NodeKind::Recipe(Box::new(node)))
    }

    /// Remove a node together with all of its links.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
        let attached: Vec<LinkId> = node
            .core
            .input_links
            .iter()
            .chain(&node.core.output_links)
            .copied()
            .collect();

        let mut neighbours = Vec::new();
        for link in attached {
            if let Some(removed) = self.disconnect_immediate(link) {
                neighbours.push(if removed.supplier == id {
                    removed.consumer
                } else {
                    removed.supplier
                });
            }
        }
        self.nodes.remove(&id);
        for neighbour in neighbours {
            self.update_state(neighbour);
        }
        tracing::debug!(node = %id, "removed node");
        self.update_node_values();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Links
    // -----------------------------------------------------------------------

    /// Link `supplier`'s output of `item` to `consumer`'s input.
    pub fn connect(
        &mut self,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemQualityPair,
    ) -> Result<LinkId, GraphError> {
        let ctx = self.context();
        let supplier_node = self
            .nodes
            .get(&supplier)
            .ok_or(GraphError::NodeNotFound(supplier))?;
        let consumer_node = self
            .nodes
            .get(&consumer)
            .ok_or(GraphError::NodeNotFound(consumer))?;

        if !supplier_node.outputs(&ctx).contains(&item) || !consumer_node.inputs(&ctx).contains(&item)
        {
            return Err(GraphError::InvalidLink {
                supplier,
                consumer,
                item,
            });
        }
        let duplicate = supplier_node.core.output_links.iter().any(|&l| {
            self.links
                .get(l)
                .is_some_and(|link| link.consumer == consumer && link.item == item)
        });
        if duplicate {
            return Err(GraphError::DuplicateLink {
                supplier,
                consumer,
                item,
            });
        }

        let link = self.connect_immediate(supplier, consumer, item);
        self.refresh_node(supplier);
        self.refresh_node(consumer);
        self.update_node_values();
        Ok(link)
    }

    pub fn delete_link(&mut self, link: LinkId) -> Result<(), GraphError> {
        let removed = self
            .disconnect_immediate(link)
            .ok_or(GraphError::LinkNotFound(link))?;
        self.refresh_node(removed.supplier);
        self.refresh_node(removed.consumer);
        self.update_node_values();
        Ok(())
    }

    pub fn link(&self, link: LinkId) -> Option<&NodeLink> {
        self.links.get(link)
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &NodeLink)> {
        self.links.iter()
    }

    /// Whether `link` carries an item its supplier outputs and its consumer
    /// inputs, at a temperature the consumer accepts.
    pub fn is_link_valid(&self, link: LinkId) -> bool {
        let Some(link) = self.links.get(link) else {
            return false;
        };
        let ctx = self.context();
        let (Some(supplier), Some(consumer)) =
            (self.nodes.get(&link.supplier), self.nodes.get(&link.consumer))
        else {
            return false;
        };
        supplier.outputs(&ctx).contains(&link.item)
            && consumer.inputs(&ctx).contains(&link.item)
            && self.link_temperature_ok(link, consumer)
    }

    /// A fluid ingredient with a temperature range only accepts suppliers
    /// whose temperature falls inside the range.
    fn link_temperature_ok(&self, link: &NodeLink, consumer: &Node) -> bool {
        let Some(recipe) = consumer.as_recipe() else {
            return true;
        };
        let def = self.catalog.recipes.get(recipe.recipe().entity);
        let Some(accepted) = def
            .ingredient(link.item.entity)
            .and_then(|ingredient| ingredient.temperature)
        else {
            return true;
        };
        let mut visited = HashSet::new();
        match self.supplied_temperature(link.supplier, link.item.entity, &mut visited) {
            Some(range) => accepted.contains(range.min) && accepted.contains(range.max),
            None => true,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn view(&self, id: NodeId) -> Option<NodeView<'_>> {
        self.nodes.get(&id).map(|node| NodeView::new(self, node))
    }

    /// Temperature range of `item` flowing into `node`, followed back
    /// through passthrough nodes to the recipes producing it. Suppliers and
    /// untraceable sources contribute nothing.
    pub fn incoming_temperature_range(&self, node: NodeId, item: ItemId) -> Option<TemperatureRange> {
        let mut visited = HashSet::new();
        self.incoming_temperature(node, item, &mut visited)
    }

    fn incoming_temperature(
        &self,
        node: NodeId,
        item: ItemId,
        visited: &mut HashSet<NodeId>,
    ) -> Option<TemperatureRange> {
        if !visited.insert(node) {
            return None;
        }
        let node = self.nodes.get(&node)?;
        let mut range: Option<TemperatureRange> = None;
        for &link_id in &node.core.input_links {
            let Some(link) = self.links.get(link_id) else {
                continue;
            };
            if link.item.entity != item {
                continue;
            }
            let incoming = self.supplied_temperature(link.supplier, item, visited);
            range = match (range, incoming) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            };
        }
        range
    }

    fn supplied_temperature(
        &self,
        supplier: NodeId,
        item: ItemId,
        visited: &mut HashSet<NodeId>,
    ) -> Option<TemperatureRange> {
        let node = self.nodes.get(&supplier)?;
        match &node.kind {
            NodeKind::Passthrough(_) => self.incoming_temperature(supplier, item, visited),
            NodeKind::Recipe(recipe) => self
                .product_temperature(recipe, item)
                .map(TemperatureRange::point),
            _ => None,
        }
    }

    /// Temperature a recipe node's product leaves at: the recipe's own
    /// product temperature, else the fluid's default temperature.
    pub(crate) fn product_temperature(&self, recipe: &RecipeNode, item: ItemId) -> Option<f64> {
        let def = self.catalog.recipes.get(recipe.recipe().entity);
        def.product(item)
            .and_then(|product| product.temperature)
            .or_else(|| {
                self.catalog
                    .items
                    .get(item)
                    .fluid
                    .as_ref()
                    .map(|fluid| fluid.default_temperature)
            })
    }

    // -----------------------------------------------------------------------
    // Solver write-back
    // -----------------------------------------------------------------------

    pub fn set_actual_rate(&mut self, id: NodeId, per_sec: f64) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.core.actual_rate_per_sec = per_sec;
        Ok(())
    }

    pub fn set_link_throughput(&mut self, link: LinkId, per_sec: f64) -> Result<(), GraphError> {
        let link_data = self
            .links
            .get_mut(link)
            .ok_or(GraphError::LinkNotFound(link))?;
        link_data.throughput = per_sec;
        Ok(())
    }

    /// Flag that rates need to be solved again.
    pub fn update_node_values(&mut self) {
        if !self.solve_requested {
            tracing::trace!("solve requested");
        }
        self.solve_requested = true;
    }

    /// Drain the pending solve request.
    pub fn take_solve_request(&mut self) -> bool {
        std::mem::take(&mut self.solve_requested)
    }

    // -----------------------------------------------------------------------
    // Controllers
    // -----------------------------------------------------------------------

    pub fn controller(&mut self, id: NodeId) -> Result<NodeController<'_>, GraphError> {
        self.require(id)?;
        Ok(NodeController::new(self, id))
    }

    pub fn recipe_controller(&mut self, id: NodeId) -> Result<RecipeController<'_>, GraphError> {
        self.require_type(id, NodeType::Recipe)?;
        Ok(RecipeController::new(self, id))
    }

    pub fn spoil_controller(&mut self, id: NodeId) -> Result<SpoilController<'_>, GraphError> {
        self.require_type(id, NodeType::Spoil)?;
        Ok(SpoilController::new(self, id))
    }

    pub fn plant_controller(&mut self, id: NodeId) -> Result<PlantController<'_>, GraphError> {
        self.require_type(id, NodeType::Plant)?;
        Ok(PlantController::new(self, id))
    }

    pub fn passthrough_controller(
        &mut self,
        id: NodeId,
    ) -> Result<PassthroughController<'_>, GraphError> {
        self.require_type(id, NodeType::Passthrough)?;
        Ok(PassthroughController::new(self, id))
    }

    fn require(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    fn require_type(&self, id: NodeId, expected: NodeType) -> Result<(), GraphError> {
        let actual = self.require(id)?.node_type();
        if actual != expected {
            return Err(GraphError::WrongNodeType {
                node: id,
                expected,
                actual,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal node access for controllers
    // -----------------------------------------------------------------------

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn recipe_node(&self, id: NodeId) -> Option<&RecipeNode> {
        self.nodes.get(&id).and_then(Node::as_recipe)
    }

    pub(crate) fn recipe_node_mut(&mut self, id: NodeId) -> Option<&mut RecipeNode> {
        self.nodes.get_mut(&id).and_then(Node::as_recipe_mut)
    }

    /// Links attached to `id` whose item matches `item`, on the input side
    /// or the output side.
    pub(crate) fn links_for_item(&self, id: NodeId, item: ItemQualityPair, inputs: bool) -> Vec<LinkId> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let side = if inputs {
            &node.core.input_links
        } else {
            &node.core.output_links
        };
        side.iter()
            .copied()
            .filter(|&l| self.links.get(l).is_some_and(|link| link.item == item))
            .collect()
    }

    /// Delete every invalid link attached to `id`.
    pub(crate) fn delete_invalid_links(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let invalid: Vec<LinkId> = node
            .core
            .input_links
            .iter()
            .chain(&node.core.output_links)
            .copied()
            .filter(|&l| !self.is_link_valid(l))
            .collect();
        for link in invalid {
            self.unlink(link);
        }
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Bring a node up to date after a change: refresh the fuel inlet
    /// temperature, drop recipe links whose item left the node's IO, and
    /// re-evaluate its state.
    pub(crate) fn refresh_node(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.update_fuel_temperature(id);
        self.prune_recipe_links(id);
        self.update_state(id);
    }

    fn update_fuel_temperature(&mut self, id: NodeId) {
        let Some(recipe) = self.recipe_node(id) else {
            return;
        };
        let stats = &self.catalog.assemblers.get(recipe.assembler().entity).stats;
        let range = match recipe.fuel() {
            Some(fuel) if stats.temperature_fluid_burner => {
                self.incoming_temperature_range(id, fuel)
            }
            _ => None,
        };
        if let Some(recipe) = self.recipe_node_mut(id) {
            recipe.set_fuel_temperature(range);
        }
    }

    fn prune_recipe_links(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.as_recipe().is_none() {
            return;
        }
        let ctx = self.context();
        let inputs = node.inputs(&ctx);
        let outputs = node.outputs(&ctx);
        let stale: Vec<LinkId> = node
            .core
            .input_links
            .iter()
            .filter(|&&l| self.links.get(l).is_some_and(|link| !inputs.contains(&link.item)))
            .chain(
                node.core
                    .output_links
                    .iter()
                    .filter(|&&l| self.links.get(l).is_some_and(|link| !outputs.contains(&link.item))),
            )
            .copied()
            .collect();

        for link in stale {
            if let Some(removed) = self.disconnect_immediate(link) {
                tracing::debug!(node = %id, item = ?removed.item, "dropped link to item no longer in node io");
                let other = if removed.supplier == id {
                    removed.consumer
                } else {
                    removed.supplier
                };
                self.update_state(other);
            }
        }
    }

    fn link_report(&self, node: &Node) -> LinkReport {
        let ctx = self.context();
        let all_valid = node
            .core
            .input_links
            .iter()
            .chain(&node.core.output_links)
            .all(|&l| self.is_link_valid(l));
        let linked = |links: &[LinkId], item: ItemQualityPair| {
            links
                .iter()
                .any(|&l| self.links.get(l).is_some_and(|link| link.item == item))
        };
        let all_connected = node
            .inputs(&ctx)
            .into_iter()
            .all(|item| linked(&node.core.input_links, item))
            && node
                .outputs(&ctx)
                .into_iter()
                .all(|item| linked(&node.core.output_links, item));
        LinkReport {
            all_valid,
            all_connected,
        }
    }

    /// Re-evaluate a node's error, warning and link state.
    pub(crate) fn update_state(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let report = self.link_report(node);
        let ctx = NodeContext {
            catalog: &self.catalog,
            settings: &self.settings,
        };
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let previous = node.core.state;
        let state = node.behavior_mut().evaluate(&ctx, report);
        node.core.state = state;
        if previous != state {
            tracing::debug!(node = %id, ?previous, ?state, "node state changed");
        }
    }

    // -----------------------------------------------------------------------
    // Immediate link mutations
    // -----------------------------------------------------------------------

    fn connect_immediate(&mut self, supplier: NodeId, consumer: NodeId, item: ItemQualityPair) -> LinkId {
        let link = self.links.insert(NodeLink {
            supplier,
            consumer,
            item,
            throughput: 0.0,
        });
        if let Some(node) = self.nodes.get_mut(&supplier) {
            node.core.output_links.push(link);
        }
        if let Some(node) = self.nodes.get_mut(&consumer) {
            node.core.input_links.push(link);
        }
        link
    }

    /// Restore a link without validating it. Used when loading saved graphs
    /// so that invalid links surface as node errors.
    pub fn restore_link(
        &mut self,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemQualityPair,
    ) -> Result<LinkId, GraphError> {
        self.require(supplier)?;
        self.require(consumer)?;
        let link = self.connect_immediate(supplier, consumer, item);
        self.refresh_node(supplier);
        self.refresh_node(consumer);
        self.update_node_values();
        Ok(link)
    }

    fn disconnect_immediate(&mut self, link: LinkId) -> Option<NodeLink> {
        let removed = self.links.remove(link)?;
        if let Some(node) = self.nodes.get_mut(&removed.supplier) {
            node.core.output_links.retain(|&l| l != link);
        }
        if let Some(node) = self.nodes.get_mut(&removed.consumer) {
            node.core.input_links.retain(|&l| l != link);
        }
        Some(removed)
    }

    /// Remove a link and re-evaluate both endpoints, without requesting a
    /// solve. Controllers batch these and request the solve once.
    pub(crate) fn unlink(&mut self, link: LinkId) -> Option<NodeLink> {
        let removed = self.disconnect_immediate(link)?;
        self.update_state(removed.supplier);
        self.update_state(removed.consumer);
        Some(removed)
    }
}
