//! Text form of copied recipe-node settings.
//!
//! The payload is a JSON object tagged with the format version and the
//! object kind. Decoding is lenient about content and strict about the
//! envelope: a foreign or outdated payload is rejected as a whole, while
//! names the current catalog cannot resolve are dropped one by one.

use chainplan_core::catalog::{Catalog, CatalogRef};
use chainplan_core::copy_options::NodeCopyOptions;
use chainplan_core::graph::{GraphError, ProductionGraph};
use chainplan_core::id::{NodeId, QualityId};
use chainplan_core::node::NodeType;
use chainplan_core::quality_pair::{AssemblerQualityPair, BeaconQualityPair, ModuleQualityPair};
use serde::{Deserialize, Serialize};

use crate::FORMAT_VERSION;
use crate::saved::{SavedModule, save_modules};

/// Value of the payload's `Object` tag.
pub const OBJECT_TAG: &str = "NodeCopyOptions";

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("copied settings have no assembler")]
    NoAssembler,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClipboardPayload {
    pub version: u32,
    pub object: String,
    pub assembler: String,
    pub assembler_quality: String,
    pub neighbours: f64,
    pub extra_productivity: f64,
    #[serde(rename = "AModules")]
    pub assembler_modules: Vec<SavedModule>,
    #[serde(rename = "BModules")]
    pub beacon_modules: Vec<SavedModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beacon_count: Option<f64>,
    #[serde(rename = "BeaconsPA", default, skip_serializing_if = "Option::is_none")]
    pub beacons_per_assembler: Option<f64>,
    #[serde(rename = "BeaconsC", default, skip_serializing_if = "Option::is_none")]
    pub beacons_const: Option<f64>,
}

// ===========================================================================
// Encoding
// ===========================================================================

pub fn encode_payload(
    catalog: &Catalog,
    options: &NodeCopyOptions,
) -> Result<ClipboardPayload, ClipboardError> {
    let assembler = options.assembler.ok_or(ClipboardError::NoAssembler)?;
    let beacon = options.beacon;
    Ok(ClipboardPayload {
        version: FORMAT_VERSION,
        object: OBJECT_TAG.to_string(),
        assembler: assembler.entity.name(catalog).to_string(),
        assembler_quality: assembler.quality.name(catalog).to_string(),
        neighbours: options.neighbour_count,
        extra_productivity: options.extra_productivity_bonus,
        assembler_modules: save_modules(catalog, &options.assembler_modules),
        beacon_modules: save_modules(catalog, &options.beacon_modules),
        fuel: options.fuel.map(|f| f.name(catalog).to_string()),
        beacon: beacon.map(|b| b.entity.name(catalog).to_string()),
        beacon_quality: beacon.map(|b| b.quality.name(catalog).to_string()),
        beacon_count: beacon.map(|_| options.beacon_count),
        beacons_per_assembler: beacon.map(|_| options.beacons_per_assembler),
        beacons_const: beacon.map(|_| options.beacons_const),
    })
}

pub fn encode_copy_options(
    catalog: &Catalog,
    options: &NodeCopyOptions,
) -> Result<String, ClipboardError> {
    Ok(serde_json::to_string(&encode_payload(catalog, options)?)?)
}

// ===========================================================================
// Decoding
// ===========================================================================

fn quality_or_default(catalog: &Catalog, name: Option<&str>) -> QualityId {
    name.and_then(|n| catalog.qualities.resolve(n))
        .unwrap_or_else(|| catalog.default_quality())
}

fn resolve_modules(catalog: &Catalog, modules: &[SavedModule]) -> Vec<ModuleQualityPair> {
    modules
        .iter()
        .filter_map(|m| {
            let Some(module) = catalog.modules.resolve(&m.name) else {
                tracing::warn!(module = %m.name, "dropping unknown module from pasted settings");
                return None;
            };
            Some(ModuleQualityPair::new(
                module,
                quality_or_default(catalog, Some(&m.quality)),
            ))
        })
        .collect()
}

/// Resolve a payload against `catalog`. Names that do not resolve are
/// dropped; unknown qualities fall back to the default quality.
pub fn resolve_payload(catalog: &Catalog, payload: &ClipboardPayload) -> NodeCopyOptions {
    let assembler = catalog.assemblers.resolve(&payload.assembler).map(|a| {
        AssemblerQualityPair::new(
            a,
            quality_or_default(catalog, Some(&payload.assembler_quality)),
        )
    });
    if assembler.is_none() {
        tracing::warn!(assembler = %payload.assembler, "dropping unknown assembler from pasted settings");
    }

    let fuel = payload.fuel.as_deref().and_then(|name| {
        let fuel = catalog.items.resolve(name);
        if fuel.is_none() {
            tracing::warn!(fuel = %name, "dropping unknown fuel from pasted settings");
        }
        fuel
    });

    let beacon = payload.beacon.as_deref().and_then(|name| {
        let Some(beacon) = catalog.beacons.resolve(name) else {
            tracing::warn!(beacon = %name, "dropping unknown beacon from pasted settings");
            return None;
        };
        let quality = quality_or_default(catalog, payload.beacon_quality.as_deref());
        Some(BeaconQualityPair::new(beacon, quality))
    });
    let beacon_value = |value: Option<f64>| {
        if beacon.is_some() {
            value.unwrap_or(0.0)
        } else {
            0.0
        }
    };

    NodeCopyOptions {
        assembler,
        assembler_modules: resolve_modules(catalog, &payload.assembler_modules),
        fuel,
        neighbour_count: payload.neighbours,
        extra_productivity_bonus: payload.extra_productivity,
        beacon,
        beacon_modules: if beacon.is_some() {
            resolve_modules(catalog, &payload.beacon_modules)
        } else {
            Vec::new()
        },
        beacon_count: beacon_value(payload.beacon_count),
        beacons_per_assembler: beacon_value(payload.beacons_per_assembler),
        beacons_const: beacon_value(payload.beacons_const),
    }
}

/// Decode clipboard text. `None` if the text is not a copy-options payload
/// of the current version.
pub fn decode_copy_options(catalog: &Catalog, text: &str) -> Option<NodeCopyOptions> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "clipboard text is not JSON");
            return None;
        }
    };

    let version = value.get("Version").and_then(serde_json::Value::as_u64);
    let object = value.get("Object").and_then(serde_json::Value::as_str);
    if version != Some(u64::from(FORMAT_VERSION)) || object != Some(OBJECT_TAG) {
        tracing::warn!(?version, ?object, "rejecting clipboard payload");
        return None;
    }

    match serde_json::from_value::<ClipboardPayload>(value) {
        Ok(payload) => Some(resolve_payload(catalog, &payload)),
        Err(e) => {
            tracing::warn!(error = %e, "malformed clipboard payload");
            None
        }
    }
}

// ===========================================================================
// Graph helpers
// ===========================================================================

fn wrong_type(node: NodeId, actual: NodeType) -> GraphError {
    GraphError::WrongNodeType {
        node,
        expected: NodeType::Recipe,
        actual,
    }
}

/// Copy the settings of recipe node `id` as clipboard text.
pub fn copy_node(graph: &ProductionGraph, id: NodeId) -> Result<String, ClipboardError> {
    let view = graph.view(id).ok_or(GraphError::NodeNotFound(id))?;
    let recipe = view
        .as_recipe()
        .ok_or_else(|| wrong_type(id, view.node_type()))?;
    encode_copy_options(graph.catalog(), &recipe.copy_options())
}

/// Paste clipboard text onto recipe node `id`. Returns `false` if the text
/// was rejected and nothing changed.
pub fn paste_onto_node(
    graph: &mut ProductionGraph,
    id: NodeId,
    text: &str,
) -> Result<bool, ClipboardError> {
    let Some(options) = decode_copy_options(graph.catalog(), text) else {
        return Ok(false);
    };
    graph.recipe_controller(id)?.apply_copy_options(&options);
    Ok(true)
}
