//! Production nodes.
//!
//! Every node is a shared [`NodeCore`] (identity, rates, links, state) plus
//! a kind-specific payload in [`NodeKind`]. Per-kind rate and validation
//! rules live behind the [`NodeBehavior`] trait, implemented once per kind.

pub mod consumer;
pub mod endpoint;
pub mod passthrough;
pub mod plant;
pub mod recipe;
pub mod spoil;
pub mod supplier;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::id::{LinkId, NodeId};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

pub use consumer::ConsumerNode;
pub use passthrough::PassthroughNode;
pub use plant::PlantNode;
pub use recipe::RecipeNode;
pub use spoil::SpoilNode;
pub use supplier::SupplierNode;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Supplier,
    Consumer,
    Passthrough,
    Spoil,
    Plant,
    Recipe,
}

/// Whether the solver picks the node's rate or the user pins it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateType {
    #[default]
    Auto,
    Manual,
}

/// Coarse validation state derived from a node's error and warning sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    #[default]
    Clean,
    Warning,
    Error,
    /// Valid, but some input or output has no link yet.
    MissingLink,
}

// ---------------------------------------------------------------------------
// RateSet
// ---------------------------------------------------------------------------

/// Insertion-ordered map from item to amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSet {
    entries: Vec<(ItemQualityPair, f64)>,
}

impl RateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: ItemQualityPair) -> Option<f64> {
        self.entries
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, amount)| *amount)
    }

    pub fn contains(&self, item: ItemQualityPair) -> bool {
        self.entries.iter().any(|(i, _)| *i == item)
    }

    /// Add `amount` to `item`, inserting it if absent.
    pub fn add(&mut self, item: ItemQualityPair, amount: f64) {
        match self.entries.iter_mut().find(|(i, _)| *i == item) {
            Some((_, existing)) => *existing += amount,
            None => self.entries.push((item, amount)),
        }
    }

    pub fn set(&mut self, item: ItemQualityPair, amount: f64) {
        match self.entries.iter_mut().find(|(i, _)| *i == item) {
            Some((_, existing)) => *existing = amount,
            None => self.entries.push((item, amount)),
        }
    }

    pub fn remove(&mut self, item: ItemQualityPair) {
        self.entries.retain(|(i, _)| *i != item);
    }

    pub fn items(&self) -> impl Iterator<Item = ItemQualityPair> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemQualityPair, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Core record
// ---------------------------------------------------------------------------

/// State shared by every node kind.
#[derive(Debug, Clone)]
pub struct NodeCore {
    pub(crate) id: NodeId,
    pub(crate) rate_type: RateType,
    pub(crate) desired_set_value: f64,
    pub(crate) actual_rate_per_sec: f64,
    pub(crate) input_links: Vec<LinkId>,
    pub(crate) output_links: Vec<LinkId>,
    pub(crate) state: NodeState,
}

impl NodeCore {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            rate_type: RateType::Auto,
            desired_set_value: 1.0,
            actual_rate_per_sec: 0.0,
            input_links: Vec::new(),
            output_links: Vec::new(),
            state: NodeState::Clean,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn rate_type(&self) -> RateType {
        self.rate_type
    }

    pub fn desired_set_value(&self) -> f64 {
        self.desired_set_value
    }

    pub fn actual_rate_per_sec(&self) -> f64 {
        self.actual_rate_per_sec
    }

    /// Actual rate in the graph's display unit.
    pub fn actual_rate(&self, ctx: &NodeContext<'_>) -> f64 {
        self.actual_rate_per_sec * ctx.rate_multiplier()
    }

    pub fn input_links(&self) -> &[LinkId] {
        &self.input_links
    }

    pub fn output_links(&self) -> &[LinkId] {
        &self.output_links
    }

    pub fn state(&self) -> NodeState {
        self.state
    }
}

// ---------------------------------------------------------------------------
// Evaluation context
// ---------------------------------------------------------------------------

/// Read-only context a node is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    pub catalog: &'a Catalog,
    pub settings: &'a GraphSettings,
}

impl NodeContext<'_> {
    pub fn rate_multiplier(&self) -> f64 {
        self.settings.rate_multiplier()
    }
}

/// Link health of one node, computed by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkReport {
    /// Every attached link carries an item both endpoints handle.
    pub all_valid: bool,
    /// Every input and output item has at least one link.
    pub all_connected: bool,
}

impl Default for LinkReport {
    fn default() -> Self {
        Self {
            all_valid: true,
            all_connected: true,
        }
    }
}

impl LinkReport {
    /// State of a node without errors or warnings.
    pub(crate) fn settled_state(self) -> NodeState {
        if self.all_connected {
            NodeState::Clean
        } else {
            NodeState::MissingLink
        }
    }
}

/// A rate query that the node kind cannot answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("{0:?} nodes do not consume items")]
    NotAConsumer(NodeType),
    #[error("{0:?} nodes do not supply items")]
    NotASupplier(NodeType),
    #[error("item {0:?} is not an input of this node")]
    UnknownInput(ItemQualityPair),
    #[error("item {0:?} is not an output of this node")]
    UnknownOutput(ItemQualityPair),
    #[error("assembler is not a generator")]
    NotAGenerator,
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

/// Rate and validation rules of one node kind.
pub trait NodeBehavior {
    fn node_type(&self) -> NodeType;

    fn inputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair>;

    fn outputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair>;

    /// Items consumed per unit of node rate, or `None` if `item` is not an input.
    fn input_rate_for(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64>;

    /// Items produced per unit of node rate, or `None` if `item` is not an output.
    fn output_rate_for(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64>;

    /// Consumption of `item` at the node's actual rate, in display units.
    fn consume_rate(
        &self,
        core: &NodeCore,
        ctx: &NodeContext<'_>,
        item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        let per_unit = self
            .input_rate_for(ctx, item)
            .ok_or(RateError::UnknownInput(item))?;
        Ok(core.actual_rate(ctx) * per_unit)
    }

    /// Production of `item` at the node's actual rate, in display units.
    fn supply_rate(
        &self,
        core: &NodeCore,
        ctx: &NodeContext<'_>,
        item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        let per_unit = self
            .output_rate_for(ctx, item)
            .ok_or(RateError::UnknownOutput(item))?;
        Ok(core.actual_rate(ctx) * per_unit)
    }

    /// The node's actual rate expressed in its set-value unit.
    fn actual_set_value(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64;

    /// The desired set value converted back into a per-second rate.
    fn desired_rate_per_sec(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64;

    fn max_desired_set_value(&self, settings: &GraphSettings) -> f64;

    fn set_value_description(&self) -> &'static str;

    /// Recompute the error and warning sets and derive the node state.
    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState;

    fn has_invalid_links(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum NodeKind {
    Supplier(SupplierNode),
    Consumer(ConsumerNode),
    Passthrough(PassthroughNode),
    Spoil(SpoilNode),
    Plant(PlantNode),
    Recipe(Box<RecipeNode>),
}

/// A vertex of the production graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) core: NodeCore,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            core: NodeCore::new(id),
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.core.id
    }

    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn state(&self) -> NodeState {
        self.core.state
    }

    pub fn node_type(&self) -> NodeType {
        self.behavior().node_type()
    }

    pub fn behavior(&self) -> &dyn NodeBehavior {
        match &self.kind {
            NodeKind::Supplier(n) => n,
            NodeKind::Consumer(n) => n,
            NodeKind::Passthrough(n) => n,
            NodeKind::Spoil(n) => n,
            NodeKind::Plant(n) => n,
            NodeKind::Recipe(n) => n.as_ref(),
        }
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn NodeBehavior {
        match &mut self.kind {
            NodeKind::Supplier(n) => n,
            NodeKind::Consumer(n) => n,
            NodeKind::Passthrough(n) => n,
            NodeKind::Spoil(n) => n,
            NodeKind::Plant(n) => n,
            NodeKind::Recipe(n) => n.as_mut(),
        }
    }

    pub fn as_recipe(&self) -> Option<&RecipeNode> {
        match &self.kind {
            NodeKind::Recipe(n) => Some(n.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn as_recipe_mut(&mut self) -> Option<&mut RecipeNode> {
        match &mut self.kind {
            NodeKind::Recipe(n) => Some(n.as_mut()),
            _ => None,
        }
    }

    pub fn inputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        self.behavior().inputs(ctx)
    }

    pub fn outputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        self.behavior().outputs(ctx)
    }

    pub fn consume_rate(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Result<f64, RateError> {
        self.behavior().consume_rate(&self.core, ctx, item)
    }

    pub fn supply_rate(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Result<f64, RateError> {
        self.behavior().supply_rate(&self.core, ctx, item)
    }

    pub fn actual_set_value(&self, ctx: &NodeContext<'_>) -> f64 {
        self.behavior().actual_set_value(&self.core, ctx)
    }

    pub fn desired_rate_per_sec(&self, ctx: &NodeContext<'_>) -> f64 {
        self.behavior().desired_rate_per_sec(&self.core, ctx)
    }

    pub fn max_desired_set_value(&self, settings: &GraphSettings) -> f64 {
        self.behavior().max_desired_set_value(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ItemId, QualityId};

    fn pair(item: u32) -> ItemQualityPair {
        ItemQualityPair::new(ItemId(item), QualityId(0))
    }

    #[test]
    fn rate_set_add_merges() {
        let mut set = RateSet::new();
        set.add(pair(1), 2.0);
        set.add(pair(2), 1.0);
        set.add(pair(1), 0.5);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(pair(1)), Some(2.5));
        assert_eq!(set.items().collect::<Vec<_>>(), vec![pair(1), pair(2)]);
    }

    #[test]
    fn rate_set_set_and_remove() {
        let mut set = RateSet::new();
        set.set(pair(3), 4.0);
        set.set(pair(3), 1.0);
        assert_eq!(set.get(pair(3)), Some(1.0));
        set.remove(pair(3));
        assert!(set.is_empty());
        assert!(!set.contains(pair(3)));
    }

    #[test]
    fn link_report_settles_state() {
        let connected = LinkReport::default();
        assert_eq!(connected.settled_state(), NodeState::Clean);
        let dangling = LinkReport {
            all_valid: true,
            all_connected: false,
        };
        assert_eq!(dangling.settled_state(), NodeState::MissingLink);
    }
}
