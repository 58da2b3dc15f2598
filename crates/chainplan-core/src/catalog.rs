//! The catalog: every entity definition the production graph refers to.
//!
//! Entries are interned by name into one [`Table`] per entity kind and keep
//! their key for the table's lifetime. An entry is either loaded or missing:
//! missing entries are names that something (usually a saved graph)
//! referenced but the current preset does not define. Nodes keep working
//! against missing entries and report them through their error state.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::beacon::BeaconDef;
use crate::entity::{AssemblerDef, ItemDef, PlantProcessDef, QualityDef, RecipeDef};
use crate::id::*;
use crate::module::ModuleDef;

/// Name of the quality tier every new catalog starts with.
pub const DEFAULT_QUALITY_NAME: &str = "normal";

/// Implemented by every catalog definition type.
pub trait CatalogEntry {
    fn name(&self) -> &str;
    fn friendly_name(&self) -> &str;
    /// Definition used for a name that is referenced but not loaded.
    fn placeholder(name: &str) -> Self;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    def: T,
    loaded: bool,
}

/// Interned definitions of one entity kind.
#[derive(Debug, Clone)]
pub struct Table<K, T> {
    slots: Vec<Slot<T>>,
    by_name: HashMap<String, u32>,
    fallback: T,
    _key: PhantomData<K>,
}

impl<K: CatalogKey, T: CatalogEntry> Default for Table<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: CatalogKey, T: CatalogEntry> Table<K, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
            fallback: T::placeholder(""),
            _key: PhantomData,
        }
    }

    /// Load a definition, replacing (and reviving) any entry with the same name.
    pub fn insert(&mut self, def: T) -> K {
        if let Some(&index) = self.by_name.get(def.name()) {
            self.slots[index as usize] = Slot { def, loaded: true };
            return K::from_index(index);
        }
        let index = self.slots.len() as u32;
        self.by_name.insert(def.name().to_string(), index);
        self.slots.push(Slot { def, loaded: true });
        K::from_index(index)
    }

    /// Key for `name`, creating a missing placeholder entry if needed.
    pub fn intern(&mut self, name: &str) -> K {
        if let Some(&index) = self.by_name.get(name) {
            return K::from_index(index);
        }
        let index = self.slots.len() as u32;
        self.by_name.insert(name.to_string(), index);
        self.slots.push(Slot {
            def: T::placeholder(name),
            loaded: false,
        });
        K::from_index(index)
    }

    /// Key for `name`, whether loaded or missing.
    pub fn id(&self, name: &str) -> Option<K> {
        self.by_name.get(name).map(|&index| K::from_index(index))
    }

    /// Key for `name` only if the entry is loaded.
    pub fn resolve(&self, name: &str) -> Option<K> {
        self.id(name).filter(|&key| !self.is_missing(key))
    }

    /// The definition for `key`. Missing entries yield their placeholder.
    pub fn get(&self, key: K) -> &T {
        self.slots
            .get(key.index())
            .map(|slot| &slot.def)
            .unwrap_or(&self.fallback)
    }

    /// The definition for `key`, or `None` when the entry is missing.
    pub fn lookup(&self, key: K) -> Option<&T> {
        self.slots
            .get(key.index())
            .filter(|slot| slot.loaded)
            .map(|slot| &slot.def)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key.index()).map(|slot| &mut slot.def)
    }

    pub fn is_missing(&self, key: K) -> bool {
        !self.slots.get(key.index()).is_some_and(|slot| slot.loaded)
    }

    /// Mark an entry missing, keeping its last definition as the placeholder.
    pub fn mark_missing(&mut self, key: K) {
        if let Some(slot) = self.slots.get_mut(key.index()) {
            slot.loaded = false;
        }
    }

    pub fn mark_all_missing(&mut self) {
        for slot in &mut self.slots {
            slot.loaded = false;
        }
    }

    /// Loaded entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.loaded)
            .map(|(index, slot)| (K::from_index(index as u32), &slot.def))
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.loaded).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// All entity tables of one preset.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub qualities: Table<QualityId, QualityDef>,
    pub items: Table<ItemId, ItemDef>,
    pub recipes: Table<RecipeId, RecipeDef>,
    pub assemblers: Table<AssemblerId, AssemblerDef>,
    pub modules: Table<ModuleId, ModuleDef>,
    pub beacons: Table<BeaconId, BeaconDef>,
    pub plant_processes: Table<PlantProcessId, PlantProcessDef>,
    default_quality: QualityId,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// An empty catalog holding only the default quality tier.
    pub fn new() -> Self {
        let mut qualities = Table::new();
        let default_quality = qualities.insert(QualityDef::new(DEFAULT_QUALITY_NAME, 0));
        Self {
            qualities,
            items: Table::new(),
            recipes: Table::new(),
            assemblers: Table::new(),
            modules: Table::new(),
            beacons: Table::new(),
            plant_processes: Table::new(),
            default_quality,
        }
    }

    pub fn default_quality(&self) -> QualityId {
        self.default_quality
    }

    pub fn set_default_quality(&mut self, quality: QualityId) {
        self.default_quality = quality;
    }

    /// Level of a quality tier; missing tiers count as level 0.
    pub fn quality_level(&self, quality: QualityId) -> u32 {
        self.qualities.lookup(quality).map_or(0, |q| q.level)
    }

    /// Mark every entry missing ahead of re-inserting a preset. Entries the
    /// new preset does not define stay missing.
    pub fn begin_reload(&mut self) {
        self.qualities.mark_all_missing();
        self.items.mark_all_missing();
        self.recipes.mark_all_missing();
        self.assemblers.mark_all_missing();
        self.modules.mark_all_missing();
        self.beacons.mark_all_missing();
        self.plant_processes.mark_all_missing();
    }

    /// Loaded recipes listing `item` among their products.
    pub fn recipes_producing(&self, item: ItemId) -> impl Iterator<Item = (RecipeId, &RecipeDef)> {
        self.recipes
            .iter()
            .filter(move |(_, recipe)| recipe.product(item).is_some())
    }

    /// Whether some enabled recipe, made in an enabled and loaded assembler,
    /// produces `item`.
    pub fn is_craftable(&self, item: ItemId) -> bool {
        self.recipes_producing(item).any(|(_, recipe)| {
            recipe.enabled
                && recipe.assemblers.iter().any(|&a| {
                    self.assemblers
                        .lookup(a)
                        .is_some_and(|assembler| assembler.stats.enabled)
                })
        })
    }
}

// ---------------------------------------------------------------------------
// Typed access by key
// ---------------------------------------------------------------------------

/// Keys that can be looked up in a [`Catalog`] without naming the table.
pub trait CatalogRef: CatalogKey {
    fn name(self, catalog: &Catalog) -> &str;
    fn friendly_name(self, catalog: &Catalog) -> &str;
    fn is_missing(self, catalog: &Catalog) -> bool;
}

macro_rules! catalog_ref {
    ($key:ty, $table:ident) => {
        impl CatalogRef for $key {
            fn name(self, catalog: &Catalog) -> &str {
                catalog.$table.get(self).name()
            }

            fn friendly_name(self, catalog: &Catalog) -> &str {
                catalog.$table.get(self).friendly_name()
            }

            fn is_missing(self, catalog: &Catalog) -> bool {
                catalog.$table.is_missing(self)
            }
        }
    };
}

catalog_ref!(QualityId, qualities);
catalog_ref!(ItemId, items);
catalog_ref!(RecipeId, recipes);
catalog_ref!(AssemblerId, assemblers);
catalog_ref!(ModuleId, modules);
catalog_ref!(BeaconId, beacons);
catalog_ref!(PlantProcessId, plant_processes);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EnergySource, EntityType, RecipeProduct};

    #[test]
    fn new_catalog_has_default_quality() {
        let catalog = Catalog::new();
        let q = catalog.default_quality();
        assert_eq!(catalog.qualities.get(q).name, DEFAULT_QUALITY_NAME);
        assert!(!catalog.qualities.is_missing(q));
        assert_eq!(catalog.quality_level(q), 0);
    }

    #[test]
    fn insert_and_resolve_by_name() {
        let mut catalog = Catalog::new();
        let iron = catalog.items.insert(ItemDef::new("iron-plate"));
        assert_eq!(catalog.items.id("iron-plate"), Some(iron));
        assert_eq!(catalog.items.resolve("iron-plate"), Some(iron));
        assert_eq!(catalog.items.resolve("copper-plate"), None);
        assert_eq!(catalog.items.len(), 1);
    }

    #[test]
    fn interned_names_are_missing_until_inserted() {
        let mut catalog = Catalog::new();
        let ghost = catalog.items.intern("ghost");
        assert!(catalog.items.is_missing(ghost));
        assert!(catalog.items.lookup(ghost).is_none());
        assert_eq!(catalog.items.get(ghost).name, "ghost");
        assert_eq!(catalog.items.resolve("ghost"), None);

        let revived = catalog.items.insert(ItemDef::new("ghost"));
        assert_eq!(revived, ghost);
        assert!(!catalog.items.is_missing(ghost));
    }

    #[test]
    fn foreign_keys_fall_back_to_placeholder() {
        let catalog = Catalog::new();
        let bogus = ItemId(42);
        assert!(catalog.items.is_missing(bogus));
        assert_eq!(catalog.items.get(bogus).stack_size, 1);
    }

    #[test]
    fn reload_keeps_keys_and_drops_undefined_entries() {
        let mut catalog = Catalog::new();
        let iron = catalog.items.insert(ItemDef::new("iron-plate"));
        let copper = catalog.items.insert(ItemDef::new("copper-plate"));

        catalog.begin_reload();
        catalog.items.insert(ItemDef::new("iron-plate"));

        assert!(!catalog.items.is_missing(iron));
        assert!(catalog.items.is_missing(copper));
        assert_eq!(catalog.items.get(copper).name, "copper-plate");
        assert_eq!(catalog.items.iter().count(), 1);
    }

    #[test]
    fn craftable_requires_enabled_recipe_and_assembler() {
        let mut catalog = Catalog::new();
        let gear = catalog.items.insert(ItemDef::new("gear"));
        let mut assembler = AssemblerDef::new("asm", EntityType::Assembler, EnergySource::Electric);
        let asm = catalog.assemblers.insert(assembler.clone());
        let mut recipe = RecipeDef::new("gear");
        recipe.products.push(RecipeProduct {
            item: gear,
            amount: 1.0,
            productivity_amount: 1.0,
            temperature: None,
        });
        recipe.assemblers.push(asm);
        catalog.recipes.insert(recipe);
        assert!(catalog.is_craftable(gear));

        assembler.stats.enabled = false;
        catalog.assemblers.insert(assembler);
        assert!(!catalog.is_craftable(gear));
    }

    #[test]
    fn catalog_ref_names() {
        let mut catalog = Catalog::new();
        let mut def = ItemDef::new("iron-plate");
        def.friendly_name = "Iron plate".to_string();
        let iron = catalog.items.insert(def);
        assert_eq!(iron.name(&catalog), "iron-plate");
        assert_eq!(iron.friendly_name(&catalog), "Iron plate");
        assert!(!iron.is_missing(&catalog));
    }
}
