use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a link (item flow) between two nodes in the production graph.
    pub struct LinkId;
}

/// Identifies a node within its owning graph. Stable for the node's lifetime
/// and persisted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

/// A typed index into one of the catalog tables.
pub trait CatalogKey: Copy + Eq + std::hash::Hash + std::fmt::Debug {
    fn from_index(index: u32) -> Self;
    fn index(self) -> usize;
}

macro_rules! catalog_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl CatalogKey for $name {
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

catalog_key!(
    /// Identifies a quality tier in the catalog.
    QualityId
);
catalog_key!(
    /// Identifies an item (or fluid) in the catalog. Cheap to copy and compare.
    ItemId
);
catalog_key!(
    /// Identifies a recipe in the catalog.
    RecipeId
);
catalog_key!(
    /// Identifies an assembler (any crafting or generating entity).
    AssemblerId
);
catalog_key!(
    /// Identifies a module.
    ModuleId
);
catalog_key!(
    /// Identifies a beacon.
    BeaconId
);
catalog_key!(
    /// Identifies a plant (growth) process.
    PlantProcessId
);
