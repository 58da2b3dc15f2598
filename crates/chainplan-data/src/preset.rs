//! Building a [`Catalog`] and [`GraphSettings`] from a preset directory.
//!
//! Required files: `qualities`, `items`, `assemblers`, `recipes`. Optional:
//! `modules`, `beacons`, `plant_processes`, `settings`. Every file is RON,
//! JSON or TOML; TOML lists live under a key named after the file.
//!
//! Names are interned into the catalog before any definition is built, so
//! definitions may refer to each other in any order. Reloading into an
//! existing catalog keeps the keys of names it already knew; names the new
//! preset drops stay behind as missing entries.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chainplan_core::beacon::{BeaconDef, default_profile};
use chainplan_core::catalog::{Catalog, CatalogEntry, Table};
use chainplan_core::entity::{
    AssemblerDef, EntityStats, ItemDef, PlantProcessDef, QualityDef, RecipeDef, RecipeIngredient,
    RecipeProduct, TemperatureRange,
};
use chainplan_core::id::{
    AssemblerId, BeaconId, CatalogKey, ItemId, ModuleId, PlantProcessId, QualityId, RecipeId,
};
use chainplan_core::module::ModuleDef;
use chainplan_core::settings::GraphSettings;
use serde::de::DeserializeOwned;

use crate::loader::{
    DataLoadError, check_duplicate, deserialize_file, deserialize_list, find_data_file,
    require_data_file, resolve_name, resolve_names,
};
use crate::schema::*;

/// A loaded preset: the catalog and the settings graphs start from.
#[derive(Debug, Clone)]
pub struct Preset {
    pub catalog: Catalog,
    pub settings: GraphSettings,
}

/// Load the preset in `dir` into a fresh catalog.
pub fn load_preset(dir: &Path) -> Result<Preset, DataLoadError> {
    let mut catalog = Catalog::new();
    let settings = reload_preset(&mut catalog, dir)?;
    Ok(Preset { catalog, settings })
}

/// Re-apply the preset in `dir` to an existing catalog.
///
/// Either the whole preset applies or the catalog is left untouched. Wrap
/// the call in `ProductionGraph::modify_catalog` so nodes are revalidated.
pub fn reload_preset(catalog: &mut Catalog, dir: &Path) -> Result<GraphSettings, DataLoadError> {
    let files = PresetFiles::read(dir)?;
    let mut next = catalog.clone();
    next.begin_reload();
    let settings = files.apply(&mut next)?;
    tracing::info!(
        dir = %dir.display(),
        qualities = next.qualities.len(),
        items = next.items.len(),
        recipes = next.recipes.len(),
        assemblers = next.assemblers.len(),
        modules = next.modules.len(),
        beacons = next.beacons.len(),
        "loaded preset"
    );
    *catalog = next;
    Ok(settings)
}

// ===========================================================================
// Reading
// ===========================================================================

/// A parsed list together with the file it came from.
struct Listed<T> {
    path: PathBuf,
    entries: Vec<T>,
}

fn read_required<T: DeserializeOwned>(dir: &Path, base: &str) -> Result<Listed<T>, DataLoadError> {
    let path = require_data_file(dir, base)?;
    let entries = deserialize_list(&path, base)?;
    Ok(Listed { path, entries })
}

fn read_optional<T: DeserializeOwned>(dir: &Path, base: &str) -> Result<Listed<T>, DataLoadError> {
    match find_data_file(dir, base)? {
        Some(path) => {
            let entries = deserialize_list(&path, base)?;
            Ok(Listed { path, entries })
        }
        None => Ok(Listed {
            path: dir.join(base),
            entries: Vec::new(),
        }),
    }
}

struct PresetFiles {
    qualities: Listed<QualityData>,
    items: Listed<ItemData>,
    modules: Listed<ModuleData>,
    beacons: Listed<BeaconData>,
    assemblers: Listed<AssemblerData>,
    recipes: Listed<RecipeData>,
    plant_processes: Listed<PlantProcessData>,
    settings: Option<(PathBuf, PresetSettings)>,
}

/// Catalog keys of every name the preset defines.
#[derive(Default)]
struct Names {
    qualities: HashMap<String, QualityId>,
    items: HashMap<String, ItemId>,
    modules: HashMap<String, ModuleId>,
    beacons: HashMap<String, BeaconId>,
    assemblers: HashMap<String, AssemblerId>,
    recipes: HashMap<String, RecipeId>,
    plant_processes: HashMap<String, PlantProcessId>,
}

fn intern_all<K: CatalogKey, T: CatalogEntry, D>(
    table: &mut Table<K, T>,
    listed: &Listed<D>,
    name_of: impl Fn(&D) -> &str,
) -> Result<HashMap<String, K>, DataLoadError> {
    let mut names = HashMap::new();
    for entry in &listed.entries {
        let name = name_of(entry);
        check_duplicate(&names, name, &listed.path)?;
        names.insert(name.to_string(), table.intern(name));
    }
    Ok(names)
}

impl PresetFiles {
    fn read(dir: &Path) -> Result<Self, DataLoadError> {
        let settings = match find_data_file(dir, "settings")? {
            Some(path) => {
                let settings = deserialize_file(&path)?;
                Some((path, settings))
            }
            None => None,
        };
        Ok(Self {
            qualities: read_required(dir, "qualities")?,
            items: read_required(dir, "items")?,
            modules: read_optional(dir, "modules")?,
            beacons: read_optional(dir, "beacons")?,
            assemblers: read_required(dir, "assemblers")?,
            recipes: read_required(dir, "recipes")?,
            plant_processes: read_optional(dir, "plant_processes")?,
            settings,
        })
    }

    fn intern(&self, catalog: &mut Catalog) -> Result<Names, DataLoadError> {
        Ok(Names {
            qualities: intern_all(&mut catalog.qualities, &self.qualities, |d| &d.name)?,
            items: intern_all(&mut catalog.items, &self.items, |d| &d.name)?,
            modules: intern_all(&mut catalog.modules, &self.modules, |d| &d.name)?,
            beacons: intern_all(&mut catalog.beacons, &self.beacons, |d| &d.name)?,
            assemblers: intern_all(&mut catalog.assemblers, &self.assemblers, |d| &d.name)?,
            recipes: intern_all(&mut catalog.recipes, &self.recipes, |d| &d.name)?,
            plant_processes: intern_all(&mut catalog.plant_processes, &self.plant_processes, |d| {
                &d.name
            })?,
        })
    }

    fn apply(&self, catalog: &mut Catalog) -> Result<GraphSettings, DataLoadError> {
        let names = self.intern(catalog)?;

        for def in self.build_qualities(&names)? {
            catalog.qualities.insert(def);
        }
        for data in &self.items.entries {
            catalog.items.insert(build_item(data, &names, &self.items.path)?);
        }
        for data in &self.modules.entries {
            catalog.modules.insert(build_module(data));
        }
        for data in &self.beacons.entries {
            catalog.beacons.insert(build_beacon(data, &names, &self.beacons.path)?);
        }
        for data in &self.assemblers.entries {
            let path = &self.assemblers.path;
            let mut def = AssemblerDef::new(
                &data.name,
                data.stats.entity_type,
                data.stats.energy_source,
            );
            def.friendly_name = friendly(&data.name, &data.friendly_name);
            def.stats = build_stats(&data.stats, &names, path)?;
            def.base_productivity_bonus = data.base_productivity_bonus;
            catalog.assemblers.insert(def);
        }
        for data in &self.recipes.entries {
            catalog.recipes.insert(build_recipe(data, &names, &self.recipes.path)?);
        }
        for data in &self.plant_processes.entries {
            let path = &self.plant_processes.path;
            catalog.plant_processes.insert(build_plant_process(data, &names, path)?);
        }

        let (default_quality, graph) = match &self.settings {
            Some((path, settings)) => {
                let default = match &settings.default_quality {
                    Some(name) => Some(resolve_name(&names.qualities, name, path, "quality")?),
                    None => None,
                };
                settings.graph.check_bounds().map_err(|detail| DataLoadError::Parse {
                    file: path.clone(),
                    detail,
                })?;
                (default, settings.graph.clone())
            }
            None => (None, GraphSettings::default()),
        };
        let default_quality = default_quality.or_else(|| {
            let current = catalog.default_quality();
            if catalog.qualities.lookup(current).is_some() {
                return Some(current);
            }
            catalog
                .qualities
                .iter()
                .min_by_key(|(_, q)| q.level)
                .map(|(id, _)| id)
        });
        if let Some(quality) = default_quality {
            catalog.set_default_quality(quality);
        }
        Ok(graph)
    }

    /// Quality tiers with `next` resolved and `prev` linked back.
    fn build_qualities(&self, names: &Names) -> Result<Vec<QualityDef>, DataLoadError> {
        let path = &self.qualities.path;
        let mut defs = Vec::with_capacity(self.qualities.entries.len());
        for data in &self.qualities.entries {
            let mut def = QualityDef::new(&data.name, data.level);
            def.friendly_name = friendly(&data.name, &data.friendly_name);
            def.next = match &data.next {
                Some(next) => Some(resolve_name(&names.qualities, next, path, "quality")?),
                None => None,
            };
            def.next_probability = data.next_probability;
            def.beacon_power_multiplier = data.beacon_power_multiplier;
            def.mining_drill_resource_drain_multiplier = data.mining_drill_resource_drain_multiplier;
            def.enabled = data.enabled;
            def.available = data.available;
            defs.push(def);
        }

        // Levels must strictly increase along the upgrade chain, which also
        // rules out cycles.
        let level_of: HashMap<&str, u32> = self
            .qualities
            .entries
            .iter()
            .map(|d| (d.name.as_str(), d.level))
            .collect();
        for data in &self.qualities.entries {
            let Some(next) = &data.next else {
                continue;
            };
            if level_of.get(next.as_str()).is_none_or(|&level| level <= data.level) {
                return Err(DataLoadError::Parse {
                    file: path.clone(),
                    detail: format!(
                        "quality '{}' upgrades to '{next}', which is not of a higher level",
                        data.name
                    ),
                });
            }
        }

        for i in 0..defs.len() {
            let Some(next) = defs[i].next else {
                continue;
            };
            let this = names.qualities[&self.qualities.entries[i].name];
            if let Some(target) = defs.iter_mut().find(|d| names.qualities[&d.name] == next) {
                target.prev = Some(this);
            }
        }
        Ok(defs)
    }
}

// ===========================================================================
// Builders
// ===========================================================================

fn friendly(name: &str, friendly_name: &Option<String>) -> String {
    friendly_name.clone().unwrap_or_else(|| name.to_string())
}

fn optional_ref<K: Copy>(
    map: &HashMap<String, K>,
    name: &Option<String>,
    file: &Path,
    kind: &'static str,
) -> Result<Option<K>, DataLoadError> {
    name.as_deref()
        .map(|name| resolve_name(map, name, file, kind))
        .transpose()
}

fn by_quality(
    values: &BTreeMap<String, f64>,
    names: &Names,
    file: &Path,
) -> Result<HashMap<QualityId, f64>, DataLoadError> {
    values
        .iter()
        .map(|(quality, &value)| {
            let quality = resolve_name(&names.qualities, quality, file, "quality")?;
            Ok((quality, value))
        })
        .collect()
}

fn build_item(data: &ItemData, names: &Names, file: &Path) -> Result<ItemDef, DataLoadError> {
    let mut def = ItemDef::new(&data.name);
    def.friendly_name = friendly(&data.name, &data.friendly_name);
    def.enabled = data.enabled;
    def.available = data.available;
    if let Some(stack_size) = data.stack_size {
        def.stack_size = stack_size;
    }
    if let Some(fuel_value) = data.fuel_value {
        def.fuel_value = fuel_value;
    }
    def.burn_result = optional_ref(&names.items, &data.burn_result, file, "item")?;
    def.spoil_result = optional_ref(&names.items, &data.spoil_result, file, "item")?;
    def.plant_result =
        optional_ref(&names.plant_processes, &data.plant_result, file, "plant process")?;
    def.spoil_times = by_quality(&data.spoil_times, names, file)?;
    if let Some(time) = data.spoil_times.values().find(|t| !(t.is_finite() && **t > 0.0)) {
        return Err(DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: format!("item '{}' has spoil time {time}, expected a positive number", data.name),
        });
    }
    def.fluid = data.fluid;
    Ok(def)
}

fn build_module(data: &ModuleData) -> ModuleDef {
    let mut def = ModuleDef::new(&data.name);
    def.friendly_name = friendly(&data.name, &data.friendly_name);
    def.enabled = data.enabled;
    def.available = data.available;
    def.category = data.category.clone();
    def.tier = data.tier;
    def.speed_bonus = data.speed;
    def.productivity_bonus = data.productivity;
    def.consumption_bonus = data.consumption;
    def.pollution_bonus = data.pollution;
    def.quality_bonus = data.quality;
    def
}

fn build_stats(
    data: &EntityStatsData,
    names: &Names,
    file: &Path,
) -> Result<EntityStats, DataLoadError> {
    let mut stats = EntityStats::new(data.entity_type, data.energy_source);
    stats.enabled = data.enabled;
    stats.available = data.available;
    stats.module_slots = data.module_slots;
    stats.modules = resolve_names(&names.modules, &data.modules, file, "module")?;
    stats.fuels = resolve_names(&names.items, &data.fuels, file, "item")?;
    stats.speed = by_quality(&data.speed, names, file)?;
    stats.energy_consumption = by_quality(&data.energy_consumption, names, file)?;
    stats.energy_production = by_quality(&data.energy_production, names, file)?;
    stats.energy_drain = data.energy_drain;
    stats.consumption_effectivity = data.consumption_effectivity;
    if let Some(temperature) = data.operation_temperature {
        stats.operation_temperature = temperature;
    }
    stats.neighbour_bonus = data.neighbour_bonus;
    stats.temperature_fluid_burner = data.temperature_fluid_burner;
    stats.pollution = data.pollution.clone();
    Ok(stats)
}

fn build_beacon(data: &BeaconData, names: &Names, file: &Path) -> Result<BeaconDef, DataLoadError> {
    let mut def = BeaconDef::new(&data.name);
    def.friendly_name = friendly(&data.name, &data.friendly_name);
    def.stats = build_stats(&data.stats, names, file)?;
    if let Some(effectivity) = data.distribution_effectivity {
        def.distribution_effectivity = effectivity;
    }
    def.distribution_effectivity_quality_boost = data.distribution_effectivity_quality_boost;
    def.profile = match &data.profile {
        Some(profile) => std::iter::once(0.0).chain(profile.iter().copied()).collect(),
        None => default_profile(),
    };
    Ok(def)
}

fn build_recipe(data: &RecipeData, names: &Names, file: &Path) -> Result<RecipeDef, DataLoadError> {
    let mut def = RecipeDef::new(&data.name);
    def.friendly_name = friendly(&data.name, &data.friendly_name);
    def.enabled = data.enabled;
    def.available = data.available;
    def.time = data.time;
    if let Some(bonus) = data.max_productivity_bonus {
        def.max_productivity_bonus = bonus;
    }
    for ingredient in &data.ingredients {
        let temperature = match (ingredient.min_temperature, ingredient.max_temperature) {
            (None, None) => None,
            (min, max) => Some(TemperatureRange::new(
                min.unwrap_or(f64::MIN),
                max.unwrap_or(f64::MAX),
            )),
        };
        def.ingredients.push(RecipeIngredient {
            item: resolve_name(&names.items, &ingredient.item, file, "item")?,
            amount: ingredient.amount,
            temperature,
        });
    }
    for product in &data.products {
        def.products.push(RecipeProduct {
            item: resolve_name(&names.items, &product.item, file, "item")?,
            amount: product.amount,
            productivity_amount: product.productivity_amount.unwrap_or(product.amount),
            temperature: product.temperature,
        });
    }
    def.assemblers = resolve_names(&names.assemblers, &data.assemblers, file, "assembler")?;
    def.modules = resolve_names(&names.modules, &data.modules, file, "module")?;
    Ok(def)
}

fn build_plant_process(
    data: &PlantProcessData,
    names: &Names,
    file: &Path,
) -> Result<PlantProcessDef, DataLoadError> {
    let seed = optional_ref(&names.items, &data.seed, file, "item")?;
    let mut def = PlantProcessDef::new(&data.name, seed);
    def.friendly_name = friendly(&data.name, &data.friendly_name);
    def.enabled = data.enabled;
    if !(data.grow_time.is_finite() && data.grow_time > 0.0) {
        return Err(DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: format!(
                "plant process '{}' has grow time {}, expected a positive number",
                data.name, data.grow_time
            ),
        });
    }
    def.grow_time = data.grow_time;
    for product in &data.products {
        let item = resolve_name(&names.items, &product.item, file, "item")?;
        def.products.push((item, product.amount));
    }
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainplan_core::catalog::CatalogRef;
    use chainplan_core::entity::EntityType;
    use chainplan_core::settings::RateUnit;
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chainplan_preset_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const QUALITIES: &str = r#"[
        (name: "normal", level: 0, next: Some("uncommon"), next_probability: 0.1),
        (name: "uncommon", level: 1, beacon_power_multiplier: 0.83),
    ]"#;

    const ITEMS: &str = r#"[
        {"name": "coal", "fuel_value": 4000000.0},
        {"name": "iron_ore"},
        {"name": "iron_plate", "stack_size": 100}
    ]"#;

    const ASSEMBLERS: &str = r#"
        [[assemblers]]
        name = "furnace"
        [assemblers.stats]
        entity_type = "Assembler"
        energy_source = "Burner"
        fuels = ["coal"]
        [assemblers.stats.speed]
        normal = 1.0
        uncommon = 1.3
    "#;

    const RECIPES: &str = r#"[
        (
            name: "smelting",
            time: 3.2,
            ingredients: [(item: "iron_ore", amount: 1.0)],
            products: [(item: "iron_plate", amount: 1.0)],
            assemblers: ["furnace"],
        ),
    ]"#;

    fn write_basic_preset(dir: &Path) {
        fs::write(dir.join("qualities.ron"), QUALITIES).unwrap();
        fs::write(dir.join("items.json"), ITEMS).unwrap();
        fs::write(dir.join("assemblers.toml"), ASSEMBLERS).unwrap();
        fs::write(dir.join("recipes.ron"), RECIPES).unwrap();
    }

    #[test]
    fn loads_mixed_format_preset() {
        let dir = make_test_dir("basic");
        write_basic_preset(&dir);
        let preset = load_preset(&dir).unwrap();
        let catalog = &preset.catalog;

        let normal = catalog.qualities.resolve("normal").unwrap();
        let uncommon = catalog.qualities.resolve("uncommon").unwrap();
        assert_eq!(catalog.default_quality(), normal);
        assert_eq!(catalog.qualities.get(normal).next, Some(uncommon));
        assert_eq!(catalog.qualities.get(uncommon).prev, Some(normal));

        let coal = catalog.items.resolve("coal").unwrap();
        assert_eq!(catalog.items.get(coal).fuel_value, 4_000_000.0);

        let furnace = catalog.assemblers.resolve("furnace").unwrap();
        let stats = &catalog.assemblers.get(furnace).stats;
        assert_eq!(stats.entity_type, EntityType::Assembler);
        assert!(stats.is_burner() && stats.accepts_fuel(coal));
        assert_eq!(stats.speed(uncommon), 1.3);

        let smelting = catalog.recipes.resolve("smelting").unwrap();
        let recipe = catalog.recipes.get(smelting);
        assert_eq!(recipe.time, 3.2);
        assert_eq!(recipe.assemblers, vec![furnace]);
        assert_eq!(recipe.products[0].productivity_amount, 1.0);
        assert_eq!(preset.settings, GraphSettings::default());
        cleanup(&dir);
    }

    #[test]
    fn settings_file_sets_default_quality_and_graph_settings() {
        let dir = make_test_dir("settings");
        write_basic_preset(&dir);
        fs::write(
            dir.join("settings.json"),
            r#"{"default_quality": "uncommon", "graph": {"rate_unit": "per_minute", "max_quality_steps": 2}}"#,
        )
        .unwrap();
        let preset = load_preset(&dir).unwrap();
        let uncommon = preset.catalog.qualities.resolve("uncommon").unwrap();
        assert_eq!(preset.catalog.default_quality(), uncommon);
        assert_eq!(preset.settings.rate_unit, RateUnit::PerMinute);
        assert_eq!(preset.settings.max_quality_steps, 2);
        assert_eq!(preset.settings.max_factories, GraphSettings::default().max_factories);
        cleanup(&dir);
    }

    #[test]
    fn malformed_graph_settings_fail() {
        for (suffix, file, text) in [
            ("settings_negative", "settings.json", r#"{"graph": {"max_factories": -5.0}}"#),
            ("settings_nan", "settings.ron", "(graph: (max_tiles: NaN))"),
            ("settings_steps", "settings.toml", "[graph]\nmax_quality_steps = 0\n"),
        ] {
            let dir = make_test_dir(suffix);
            write_basic_preset(&dir);
            fs::write(dir.join(file), text).unwrap();
            assert!(
                matches!(load_preset(&dir), Err(DataLoadError::Parse { .. })),
                "{file}: {text}"
            );
            cleanup(&dir);
        }
    }

    #[test]
    fn non_positive_spoil_and_grow_times_fail() {
        let dir = make_test_dir("spoil_time");
        write_basic_preset(&dir);
        fs::write(
            dir.join("items.json"),
            r#"[{"name": "coal"}, {"name": "iron_ore", "spoil_times": {"normal": 0.0}}, {"name": "iron_plate"}]"#,
        )
        .unwrap();
        let err = load_preset(&dir).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { detail, .. } if detail.contains("iron_ore")));
        cleanup(&dir);

        let dir = make_test_dir("grow_time");
        write_basic_preset(&dir);
        fs::write(
            dir.join("plant_processes.ron"),
            r#"[(name: "ore-growth", grow_time: -1.0)]"#,
        )
        .unwrap();
        let err = load_preset(&dir).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { detail, .. } if detail.contains("ore-growth")));
        cleanup(&dir);
    }

    #[test]
    fn unknown_reference_fails() {
        let dir = make_test_dir("unresolved");
        write_basic_preset(&dir);
        fs::write(
            dir.join("recipes.ron"),
            r#"[(name: "smelting", time: 1.0, assemblers: ["crusher"])]"#,
        )
        .unwrap();
        let err = load_preset(&dir).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnresolvedRef { name, expected_kind: "assembler", .. } if name == "crusher"
        ));
        cleanup(&dir);
    }

    #[test]
    fn duplicate_item_fails() {
        let dir = make_test_dir("duplicate");
        write_basic_preset(&dir);
        fs::write(dir.join("items.json"), r#"[{"name": "coal"}, {"name": "coal"}]"#).unwrap();
        assert!(matches!(
            load_preset(&dir),
            Err(DataLoadError::DuplicateName { name, .. }) if name == "coal"
        ));
        cleanup(&dir);
    }

    #[test]
    fn quality_chain_must_climb() {
        let dir = make_test_dir("quality_chain");
        write_basic_preset(&dir);
        fs::write(
            dir.join("qualities.ron"),
            r#"[(name: "normal", level: 1, next: Some("low")), (name: "low", level: 0)]"#,
        )
        .unwrap();
        assert!(matches!(load_preset(&dir), Err(DataLoadError::Parse { .. })));
        cleanup(&dir);
    }

    #[test]
    fn missing_required_file_fails() {
        let dir = make_test_dir("missing_required");
        write_basic_preset(&dir);
        fs::remove_file(dir.join("recipes.ron")).unwrap();
        assert!(matches!(
            load_preset(&dir),
            Err(DataLoadError::MissingRequired { file, .. }) if file == "recipes"
        ));
        cleanup(&dir);
    }

    #[test]
    fn reload_keeps_keys_and_marks_dropped_entries_missing() {
        let dir = make_test_dir("reload");
        write_basic_preset(&dir);
        let mut catalog = load_preset(&dir).unwrap().catalog;
        let coal = catalog.items.resolve("coal").unwrap();
        let plate = catalog.items.resolve("iron_plate").unwrap();

        fs::write(
            dir.join("items.json"),
            r#"[{"name": "iron_plate"}, {"name": "iron_ore"}, {"name": "coal", "enabled": false}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("assemblers.toml"),
            ASSEMBLERS.replace("fuels = [\"coal\"]", "fuels = []"),
        )
        .unwrap();
        reload_preset(&mut catalog, &dir).unwrap();
        assert_eq!(catalog.items.resolve("coal"), Some(coal));
        assert_eq!(catalog.items.resolve("iron_plate"), Some(plate));
        assert!(!catalog.items.get(coal).enabled);

        fs::write(dir.join("items.json"), r#"[{"name": "iron_plate"}, {"name": "iron_ore"}]"#)
            .unwrap();
        reload_preset(&mut catalog, &dir).unwrap();
        assert!(coal.is_missing(&catalog));
        assert_eq!(coal.name(&catalog), "coal");
        cleanup(&dir);
    }

    #[test]
    fn failed_reload_leaves_catalog_untouched() {
        let dir = make_test_dir("failed_reload");
        write_basic_preset(&dir);
        let mut catalog = load_preset(&dir).unwrap().catalog;
        fs::write(dir.join("items.json"), r#"[{"name": "iron_ore"}]"#).unwrap();
        assert!(reload_preset(&mut catalog, &dir).is_err());
        let coal = catalog.items.resolve("coal").unwrap();
        assert!(!coal.is_missing(&catalog));
        cleanup(&dir);
    }
}
