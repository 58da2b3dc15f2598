//! Saved production graphs.
//!
//! Nodes and links are stored by name so a graph survives preset changes.
//! Names the current catalog does not know are interned as missing entries
//! and the affected nodes come back in an error state. Only records that
//! cannot be turned into a node at all fail to load.

use std::collections::HashSet;

use chainplan_core::catalog::{Catalog, CatalogRef};
use chainplan_core::copy_options::NodeCopyOptions;
use chainplan_core::graph::{GraphError, ProductionGraph};
use chainplan_core::id::{ItemId, NodeId, PlantProcessId, QualityId};
use chainplan_core::node::{Node, NodeKind, NodeState, RateType};
use chainplan_core::quality_pair::{
    AssemblerQualityPair, BeaconQualityPair, ItemQualityPair, ModuleQualityPair, RecipeQualityPair,
};
use chainplan_core::settings::{GraphSettings, RateUnit};
use serde::{Deserialize, Serialize};

use crate::FORMAT_VERSION;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("node {node} is missing required field '{field}'")]
    MissingField { node: u32, field: &'static str },

    #[error("link refers to unknown node {0}")]
    UnknownNode(u32),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("invalid save JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ===========================================================================
// Records
// ===========================================================================

/// A module entry: module name and quality name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedModule {
    pub name: String,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNode {
    #[serde(rename = "NodeID")]
    pub id: u32,
    #[serde(rename = "RateType")]
    pub rate_type: RateType,
    /// Only stored for manually rated nodes.
    #[serde(rename = "DesiredRate", default, skip_serializing_if = "Option::is_none")]
    pub desired_rate: Option<f64>,
    #[serde(flatten)]
    pub kind: SavedNodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "NodeType")]
pub enum SavedNodeKind {
    #[serde(rename_all = "PascalCase")]
    Supplier { item: String, base_quality: String },
    #[serde(rename_all = "PascalCase")]
    Consumer { item: String, base_quality: String },
    #[serde(rename_all = "PascalCase")]
    Passthrough {
        item: String,
        base_quality: String,
        #[serde(rename = "SDraw", default)]
        simple_draw: bool,
    },
    #[serde(rename_all = "PascalCase")]
    Spoil {
        input_item: String,
        output_item: String,
        base_quality: String,
    },
    #[serde(rename_all = "PascalCase")]
    Plant {
        #[serde(rename = "PlantProcessID")]
        process: String,
        base_quality: String,
        /// Lets the node come back when its process is no longer loaded.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<String>,
    },
    Recipe(Box<SavedRecipe>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedRecipe {
    #[serde(rename = "RecipeID")]
    pub recipe: String,
    pub recipe_quality: String,
    #[serde(default)]
    pub neighbours: f64,
    #[serde(default)]
    pub extra_productivity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_priority: Option<u8>,
    /// Every recipe node has an assembler; a record without one is rejected.
    #[serde(default)]
    pub assembler: Option<String>,
    #[serde(default)]
    pub assembler_quality: Option<String>,
    #[serde(default)]
    pub assembler_modules: Vec<SavedModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burnt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beacon_modules: Vec<SavedModule>,
    #[serde(default)]
    pub beacon_count: f64,
    #[serde(default)]
    pub beacons_per_assembler: f64,
    #[serde(default)]
    pub beacons_const: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedLink {
    pub supplier: u32,
    pub consumer: u32,
    pub item: String,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedGraph {
    pub version: u32,
    #[serde(default)]
    pub rate_unit: RateUnit,
    pub nodes: Vec<SavedNode>,
    #[serde(default)]
    pub links: Vec<SavedLink>,
}

// ===========================================================================
// Saving
// ===========================================================================

pub(crate) fn save_modules(catalog: &Catalog, modules: &[ModuleQualityPair]) -> Vec<SavedModule> {
    modules
        .iter()
        .map(|m| SavedModule {
            name: m.entity.name(catalog).to_string(),
            quality: m.quality.name(catalog).to_string(),
        })
        .collect()
}

fn save_node(catalog: &Catalog, node: &Node) -> SavedNode {
    let core = node.core();
    let quality = |q: QualityId| q.name(catalog).to_string();
    let item = |i: ItemId| i.name(catalog).to_string();

    let kind = match node.kind() {
        NodeKind::Supplier(n) => SavedNodeKind::Supplier {
            item: item(n.item().entity),
            base_quality: quality(n.item().quality),
        },
        NodeKind::Consumer(n) => SavedNodeKind::Consumer {
            item: item(n.item().entity),
            base_quality: quality(n.item().quality),
        },
        NodeKind::Passthrough(n) => SavedNodeKind::Passthrough {
            item: item(n.item().entity),
            base_quality: quality(n.item().quality),
            simple_draw: n.simple_draw(),
        },
        NodeKind::Spoil(n) => SavedNodeKind::Spoil {
            input_item: item(n.input_item().entity),
            output_item: item(n.output_item().entity),
            base_quality: quality(n.input_item().quality),
        },
        NodeKind::Plant(n) => SavedNodeKind::Plant {
            process: n.process().name(catalog).to_string(),
            base_quality: quality(n.seed().quality),
            seed: Some(item(n.seed().entity)),
        },
        NodeKind::Recipe(n) => {
            let beacon = n.beacon();
            SavedNodeKind::Recipe(Box::new(SavedRecipe {
                recipe: n.recipe().entity.name(catalog).to_string(),
                recipe_quality: quality(n.recipe().quality),
                neighbours: n.neighbour_count(),
                extra_productivity: n.extra_productivity_bonus(),
                low_priority: n.low_priority().then_some(1),
                assembler: Some(n.assembler().entity.name(catalog).to_string()),
                assembler_quality: Some(quality(n.assembler().quality)),
                assembler_modules: save_modules(catalog, n.assembler_modules()),
                fuel: n.fuel().map(item),
                burnt: n.fuel_remains(catalog).map(item),
                beacon: beacon.map(|b| b.entity.name(catalog).to_string()),
                beacon_quality: beacon.map(|b| quality(b.quality)),
                beacon_modules: if beacon.is_some() {
                    save_modules(catalog, n.beacon_modules())
                } else {
                    Vec::new()
                },
                beacon_count: n.beacon_count(),
                beacons_per_assembler: n.beacons_per_assembler(),
                beacons_const: n.beacons_const(),
            }))
        }
    };

    SavedNode {
        id: core.id().0,
        rate_type: core.rate_type(),
        desired_rate: (core.rate_type() == RateType::Manual).then_some(core.desired_set_value()),
        kind,
    }
}

/// Snapshot a graph as name-based records.
pub fn save_graph(graph: &ProductionGraph) -> SavedGraph {
    let catalog = graph.catalog();
    let nodes = graph.nodes().map(|n| save_node(catalog, n)).collect();
    let links = graph
        .links()
        .map(|(_, link)| SavedLink {
            supplier: link.supplier().0,
            consumer: link.consumer().0,
            item: link.item().entity.name(catalog).to_string(),
            quality: link.item().quality.name(catalog).to_string(),
        })
        .collect();
    SavedGraph {
        version: FORMAT_VERSION,
        rate_unit: graph.settings().rate_unit,
        nodes,
        links,
    }
}

pub fn save_graph_json(graph: &ProductionGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&save_graph(graph))
}

// ===========================================================================
// Loading
// ===========================================================================

/// A saved node with every name interned into the catalog.
enum Restored {
    Supplier(ItemQualityPair),
    Consumer(ItemQualityPair),
    Passthrough(ItemQualityPair, bool),
    Spoil(ItemQualityPair, ItemId),
    Plant(ItemQualityPair, PlantProcessId),
    Recipe {
        recipe: RecipeQualityPair,
        assembler: AssemblerQualityPair,
        options: NodeCopyOptions,
        burnt: Option<ItemId>,
        low_priority: bool,
    },
}

fn intern_modules(catalog: &mut Catalog, modules: &[SavedModule]) -> Vec<ModuleQualityPair> {
    modules
        .iter()
        .map(|m| {
            ModuleQualityPair::new(
                catalog.modules.intern(&m.name),
                catalog.qualities.intern(&m.quality),
            )
        })
        .collect()
}

fn item(catalog: &mut Catalog, name: &str, quality: &str) -> ItemQualityPair {
    ItemQualityPair::new(catalog.items.intern(name), catalog.qualities.intern(quality))
}

fn intern_node(catalog: &mut Catalog, node: &SavedNode) -> Result<Restored, LoadError> {
    Ok(match &node.kind {
        SavedNodeKind::Supplier { item: name, base_quality } => {
            Restored::Supplier(item(catalog, name, base_quality))
        }
        SavedNodeKind::Consumer { item: name, base_quality } => {
            Restored::Consumer(item(catalog, name, base_quality))
        }
        SavedNodeKind::Passthrough {
            item: name,
            base_quality,
            simple_draw,
        } => Restored::Passthrough(item(catalog, name, base_quality), *simple_draw),
        SavedNodeKind::Spoil {
            input_item,
            output_item,
            base_quality,
        } => Restored::Spoil(
            item(catalog, input_item, base_quality),
            catalog.items.intern(output_item),
        ),
        SavedNodeKind::Plant {
            process,
            base_quality,
            seed,
        } => {
            let process = catalog.plant_processes.intern(process);
            let quality = catalog.qualities.intern(base_quality);
            let seed = match catalog.plant_processes.lookup(process).and_then(|p| p.seed) {
                Some(seed) => seed,
                None => {
                    let name = seed.as_deref().ok_or(LoadError::MissingField {
                        node: node.id,
                        field: "Seed",
                    })?;
                    catalog.items.intern(name)
                }
            };
            Restored::Plant(ItemQualityPair::new(seed, quality), process)
        }
        SavedNodeKind::Recipe(saved) => {
            let (Some(assembler), Some(assembler_quality)) =
                (&saved.assembler, &saved.assembler_quality)
            else {
                return Err(LoadError::MissingField {
                    node: node.id,
                    field: "Assembler",
                });
            };
            let recipe = RecipeQualityPair::new(
                catalog.recipes.intern(&saved.recipe),
                catalog.qualities.intern(&saved.recipe_quality),
            );
            let assembler = AssemblerQualityPair::new(
                catalog.assemblers.intern(assembler),
                catalog.qualities.intern(assembler_quality),
            );
            let beacon = match &saved.beacon {
                Some(beacon) => {
                    let quality = match &saved.beacon_quality {
                        Some(q) => catalog.qualities.intern(q),
                        None => catalog.default_quality(),
                    };
                    Some(BeaconQualityPair::new(catalog.beacons.intern(beacon), quality))
                }
                None => None,
            };
            let options = NodeCopyOptions {
                assembler: Some(assembler),
                assembler_modules: intern_modules(catalog, &saved.assembler_modules),
                fuel: saved.fuel.as_deref().map(|f| catalog.items.intern(f)),
                neighbour_count: saved.neighbours,
                extra_productivity_bonus: saved.extra_productivity,
                beacon,
                beacon_modules: if beacon.is_some() {
                    intern_modules(catalog, &saved.beacon_modules)
                } else {
                    Vec::new()
                },
                beacon_count: if beacon.is_some() { saved.beacon_count } else { 0.0 },
                beacons_per_assembler: if beacon.is_some() {
                    saved.beacons_per_assembler
                } else {
                    0.0
                },
                beacons_const: if beacon.is_some() { saved.beacons_const } else { 0.0 },
            };
            Restored::Recipe {
                recipe,
                assembler,
                options,
                burnt: saved.burnt.as_deref().map(|b| catalog.items.intern(b)),
                low_priority: saved.low_priority.is_some_and(|p| p != 0),
            }
        }
    })
}

fn restore_node(graph: &mut ProductionGraph, restored: Restored) -> Result<NodeId, GraphError> {
    let id = match restored {
        Restored::Supplier(item) => graph.add_supplier(item),
        Restored::Consumer(item) => graph.add_consumer(item),
        Restored::Passthrough(item, simple_draw) => {
            let id = graph.add_passthrough(item);
            graph.passthrough_controller(id)?.set_simple_draw(simple_draw);
            id
        }
        Restored::Spoil(input, output) => graph.add_spoil_with_output(input, output),
        Restored::Plant(seed, process) => graph.add_plant_with_seed(seed, process),
        Restored::Recipe {
            recipe,
            assembler,
            options,
            burnt,
            low_priority,
        } => {
            let id = graph.add_recipe_with_assembler(recipe, assembler);
            let mut controller = graph.recipe_controller(id)?;
            controller.restore_options(&options);
            controller.set_priority(low_priority);
            if burnt.is_some() || options.fuel.is_some() {
                controller.set_burnt_override(burnt);
            }
            id
        }
    };
    Ok(id)
}

/// Rebuild a graph from saved records against `catalog`.
pub fn load_graph(
    saved: SavedGraph,
    mut catalog: Catalog,
    mut settings: GraphSettings,
) -> Result<ProductionGraph, LoadError> {
    if saved.version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: saved.version,
            expected: FORMAT_VERSION,
        });
    }

    let mut seen = HashSet::new();
    let mut restored = Vec::with_capacity(saved.nodes.len());
    for node in &saved.nodes {
        if !seen.insert(node.id) {
            return Err(GraphError::DuplicateNodeId(NodeId(node.id)).into());
        }
        restored.push((node, intern_node(&mut catalog, node)?));
    }
    for link in &saved.links {
        for end in [link.supplier, link.consumer] {
            if !seen.contains(&end) {
                return Err(LoadError::UnknownNode(end));
            }
        }
    }
    let links: Vec<_> = saved
        .links
        .iter()
        .map(|link| {
            let item = ItemQualityPair::new(
                catalog.items.intern(&link.item),
                catalog.qualities.intern(&link.quality),
            );
            (NodeId(link.supplier), NodeId(link.consumer), item)
        })
        .collect();

    settings.rate_unit = saved.rate_unit;
    let mut graph = ProductionGraph::new(catalog, settings);
    for (node, record) in restored {
        graph.set_next_node_id(NodeId(node.id))?;
        let id = restore_node(&mut graph, record)?;
        let mut controller = graph.controller(id)?;
        controller.set_rate_type(node.rate_type);
        if let Some(rate) = node.desired_rate {
            controller.set_desired_set_value(rate);
        }
    }
    for (supplier, consumer, item) in links {
        graph.restore_link(supplier, consumer, item)?;
    }

    let errors = graph
        .nodes()
        .filter(|n| n.state() == NodeState::Error)
        .count();
    tracing::info!(nodes = graph.node_count(), errors, "loaded saved graph");
    Ok(graph)
}

pub fn load_graph_json(
    text: &str,
    catalog: Catalog,
    settings: GraphSettings,
) -> Result<ProductionGraph, LoadError> {
    let saved: SavedGraph = serde_json::from_str(text)?;
    load_graph(saved, catalog, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainplan_core::test_utils::*;

    fn saved_recipe(recipe: &str) -> SavedRecipe {
        SavedRecipe {
            recipe: recipe.to_string(),
            recipe_quality: "normal".to_string(),
            neighbours: 0.0,
            extra_productivity: 0.0,
            low_priority: None,
            assembler: Some("assembling-machine-2".to_string()),
            assembler_quality: Some("normal".to_string()),
            assembler_modules: Vec::new(),
            fuel: None,
            burnt: None,
            beacon: None,
            beacon_quality: None,
            beacon_modules: Vec::new(),
            beacon_count: 0.0,
            beacons_per_assembler: 0.0,
            beacons_const: 0.0,
        }
    }

    fn graph_with(nodes: Vec<SavedNode>, links: Vec<SavedLink>) -> SavedGraph {
        SavedGraph {
            version: FORMAT_VERSION,
            rate_unit: RateUnit::PerMinute,
            nodes,
            links,
        }
    }

    fn node(id: u32, kind: SavedNodeKind) -> SavedNode {
        SavedNode {
            id,
            rate_type: RateType::Auto,
            desired_rate: None,
            kind,
        }
    }

    #[test]
    fn node_json_uses_persisted_field_names() {
        let record = SavedNode {
            id: 4,
            rate_type: RateType::Manual,
            desired_rate: Some(2.5),
            kind: SavedNodeKind::Passthrough {
                item: "iron-gear-wheel".to_string(),
                base_quality: "normal".to_string(),
                simple_draw: true,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["NodeType"], "Passthrough");
        assert_eq!(json["NodeID"], 4);
        assert_eq!(json["RateType"], "Manual");
        assert_eq!(json["DesiredRate"], 2.5);
        assert_eq!(json["Item"], "iron-gear-wheel");
        assert_eq!(json["BaseQuality"], "normal");
        assert_eq!(json["SDraw"], true);

        let back: SavedNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn recipe_json_omits_absent_beacon_block() {
        let record = node(1, SavedNodeKind::Recipe(Box::new(saved_recipe("iron-gear-wheel"))));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["NodeType"], "Recipe");
        assert_eq!(json["RecipeID"], "iron-gear-wheel");
        assert_eq!(json["Assembler"], "assembling-machine-2");
        assert!(json.get("Beacon").is_none());
        assert!(json.get("BeaconModules").is_none());
        assert!(json.get("LowPriority").is_none());
        assert!(json.get("DesiredRate").is_none());
    }

    #[test]
    fn unknown_names_load_as_missing_entries() {
        let fx = Fixture::new();
        let saved = graph_with(
            vec![
                node(
                    3,
                    SavedNodeKind::Supplier {
                        item: "unobtainium".to_string(),
                        base_quality: "normal".to_string(),
                    },
                ),
                node(7, SavedNodeKind::Recipe(Box::new(saved_recipe("warp_drive")))),
            ],
            Vec::new(),
        );
        let graph = load_graph(saved, fx.catalog.clone(), fx.settings.clone()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.settings().rate_unit, RateUnit::PerMinute);
        assert_eq!(graph.node(NodeId(3)).unwrap().state(), NodeState::Error);
        assert_eq!(graph.node(NodeId(7)).unwrap().state(), NodeState::Error);
        let item = graph.catalog().items.id("unobtainium").unwrap();
        assert!(item.is_missing(graph.catalog()));
    }

    #[test]
    fn recipe_without_assembler_is_rejected() {
        let fx = Fixture::new();
        let mut recipe = saved_recipe("iron-gear-wheel");
        recipe.assembler = None;
        let saved = graph_with(vec![node(0, SavedNodeKind::Recipe(Box::new(recipe)))], Vec::new());
        let err = load_graph(saved, fx.catalog.clone(), fx.settings.clone()).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { node: 0, field: "Assembler" }));
    }

    #[test]
    fn duplicate_ids_and_dangling_links_are_rejected() {
        let fx = Fixture::new();
        let supplier = || SavedNodeKind::Supplier {
            item: "iron-gear-wheel".to_string(),
            base_quality: "normal".to_string(),
        };
        let saved = graph_with(vec![node(1, supplier()), node(1, supplier())], Vec::new());
        assert!(matches!(
            load_graph(saved, fx.catalog.clone(), fx.settings.clone()),
            Err(LoadError::Graph(GraphError::DuplicateNodeId(NodeId(1))))
        ));

        let link = SavedLink {
            supplier: 1,
            consumer: 9,
            item: "iron-gear-wheel".to_string(),
            quality: "normal".to_string(),
        };
        let saved = graph_with(vec![node(1, supplier())], vec![link]);
        assert!(matches!(
            load_graph(saved, fx.catalog.clone(), fx.settings.clone()),
            Err(LoadError::UnknownNode(9))
        ));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let fx = Fixture::new();
        let mut saved = graph_with(Vec::new(), Vec::new());
        saved.version = FORMAT_VERSION + 1;
        assert!(matches!(
            load_graph(saved, fx.catalog.clone(), fx.settings.clone()),
            Err(LoadError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn plant_with_unloaded_process_needs_seed() {
        let fx = Fixture::new();
        let plant = |seed: Option<&str>| SavedNodeKind::Plant {
            process: "moon_garden".to_string(),
            base_quality: "normal".to_string(),
            seed: seed.map(str::to_string),
        };
        let saved = graph_with(vec![node(2, plant(None))], Vec::new());
        assert!(matches!(
            load_graph(saved, fx.catalog.clone(), fx.settings.clone()),
            Err(LoadError::MissingField { node: 2, field: "Seed" })
        ));

        let saved = graph_with(vec![node(2, plant(Some("yumako-seed")))], Vec::new());
        let graph = load_graph(saved, fx.catalog.clone(), fx.settings.clone()).unwrap();
        assert_eq!(graph.node(NodeId(2)).unwrap().state(), NodeState::Error);
    }
}
