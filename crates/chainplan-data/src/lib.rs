//! Files and text formats around the chainplan node model.
//!
//! - [`preset`]: build a catalog and graph settings from a preset directory
//!   (RON, JSON or TOML files, see [`loader`] and [`schema`]).
//! - [`saved`]: name-based graph snapshots that survive preset changes.
//! - [`clipboard`]: the versioned copy/paste payload for recipe-node settings.

pub mod clipboard;
pub mod loader;
pub mod preset;
pub mod saved;
pub mod schema;

/// Version tag written into saved graphs and clipboard payloads.
pub const FORMAT_VERSION: u32 = 1;

pub use clipboard::{ClipboardError, copy_node, decode_copy_options, encode_copy_options, paste_onto_node};
pub use loader::DataLoadError;
pub use preset::{Preset, load_preset, reload_preset};
pub use saved::{LoadError, SavedGraph, load_graph, load_graph_json, save_graph, save_graph_json};
