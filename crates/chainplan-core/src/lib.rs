//! Chainplan Core -- the node model of a production-chain planner.
//!
//! A [`graph::ProductionGraph`] owns a catalog of game data, a set of nodes
//! and the links between them. Nodes describe where items come from and go
//! to: suppliers, consumers, passthroughs, spoiling, plant growth and
//! recipes run in assemblers. An external solver reads node IO through
//! [`view::NodeView`] and writes the rates it settles on back into the graph.
//!
//! # Node Lifecycle
//!
//! 1. **Create** -- `ProductionGraph::add_*` inserts a node and validates it.
//! 2. **Link** -- `connect` joins an output of one node to an input of
//!    another; both ends are revalidated.
//! 3. **Mutate** -- controllers (`graph.recipe_controller(id)` and friends)
//!    change selections. Each operation refreshes the node and raises a
//!    solve request.
//! 4. **Validate** -- every refresh recomputes the node's error and warning
//!    bit sets and its coarse [`node::NodeState`]. Warnings are skipped
//!    while errors are present.
//! 5. **Fix** -- each set bit maps to a named [`controller::Resolution`]
//!    that the controller can apply.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Interned game data with `is_missing` tracking.
//! - [`quality_pair::QualityPair`] -- An (entity, quality) selection key.
//! - [`beacon::BeaconDef`] -- Fractional beacon-count effectivity model.
//! - [`node::RecipeNode`] -- Assembler, fuel, module and beacon selection,
//!   multipliers and the quality cascade.
//! - [`controller::RecipeController`] -- Mutation API and auto-fixes.
//! - [`view::RecipeView`] -- Read-only figures and message text.
//! - [`copy_options::NodeCopyOptions`] -- Copy/paste between recipe nodes.

pub mod beacon;
pub mod catalog;
pub mod controller;
pub mod copy_options;
pub mod entity;
pub mod graph;
pub mod id;
pub mod module;
pub mod node;
pub mod quality_pair;
pub mod selector;
pub mod settings;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
