//! Heuristics behind the auto-fix actions: which assembler, fuel and modules
//! a recipe node should fall back to.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::id::{AssemblerId, ItemId, ModuleId, RecipeId};

/// Number of recently used fuels remembered.
const RECENT_FUEL_LIMIT: usize = 16;

// ---------------------------------------------------------------------------
// Assemblers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblerStyle {
    /// Fastest assembler.
    #[default]
    Best,
    /// Slowest assembler.
    Worst,
    /// Most module slots, then fastest.
    MostModules,
}

#[derive(Debug, Clone, Default)]
pub struct AssemblerSelector {
    pub style: AssemblerStyle,
}

impl AssemblerSelector {
    pub fn select(&self, catalog: &Catalog, recipe: RecipeId) -> Option<AssemblerId> {
        self.select_with(catalog, recipe, self.style)
    }

    /// Pick an assembler for `recipe`. Enabled assemblers are preferred; if
    /// none is enabled any loaded one will do.
    pub fn select_with(
        &self,
        catalog: &Catalog,
        recipe: RecipeId,
        style: AssemblerStyle,
    ) -> Option<AssemblerId> {
        let loaded: Vec<AssemblerId> = catalog
            .recipes
            .get(recipe)
            .assemblers
            .iter()
            .copied()
            .filter(|&a| !catalog.assemblers.is_missing(a))
            .collect();
        let enabled: Vec<AssemblerId> = loaded
            .iter()
            .copied()
            .filter(|&a| catalog.assemblers.get(a).stats.enabled)
            .collect();
        let candidates = if enabled.is_empty() { loaded } else { enabled };

        let quality = catalog.default_quality();
        let speed = |a: AssemblerId| catalog.assemblers.get(a).stats.speed(quality);
        let slots = |a: AssemblerId| catalog.assemblers.get(a).stats.module_slots;

        let mut best: Option<AssemblerId> = None;
        for candidate in candidates {
            let better = match best {
                None => true,
                Some(current) => match style {
                    AssemblerStyle::Best => speed(candidate) > speed(current),
                    AssemblerStyle::Worst => speed(candidate) < speed(current),
                    AssemblerStyle::MostModules => {
                        (slots(candidate), speed(candidate)) > (slots(current), speed(current))
                    }
                },
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Fuels
// ---------------------------------------------------------------------------

/// Picks fuels, favouring the ones the user chose most recently.
#[derive(Debug, Clone, Default)]
pub struct FuelSelector {
    recent: Vec<ItemId>,
}

impl FuelSelector {
    /// Fuels in most-recently-used order.
    pub fn recent(&self) -> &[ItemId] {
        &self.recent
    }

    pub fn record_use(&mut self, fuel: Option<ItemId>) {
        let Some(fuel) = fuel else {
            return;
        };
        self.recent.retain(|&f| f != fuel);
        self.recent.insert(0, fuel);
        self.recent.truncate(RECENT_FUEL_LIMIT);
    }

    /// Pick a fuel the assembler accepts. Enabled, craftable fuels come
    /// first, then any enabled fuel, then any loaded fuel.
    pub fn select(&self, catalog: &Catalog, assembler: AssemblerId) -> Option<ItemId> {
        let stats = &catalog.assemblers.get(assembler).stats;
        if !stats.is_burner() {
            return None;
        }
        let loaded: Vec<ItemId> = stats
            .fuels
            .iter()
            .copied()
            .filter(|&f| !catalog.items.is_missing(f))
            .collect();
        let enabled = |f: ItemId| catalog.items.get(f).enabled;
        let tiers: [&dyn Fn(ItemId) -> bool; 3] = [
            &|f| enabled(f) && catalog.is_craftable(f),
            &|f| enabled(f),
            &|_| true,
        ];

        for accept in tiers {
            let recent = self
                .recent
                .iter()
                .copied()
                .find(|f| loaded.contains(f) && accept(*f));
            if let Some(fuel) = recent.or_else(|| loaded.iter().copied().find(|&f| accept(f))) {
                return Some(fuel);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleStyle {
    /// Leave module slots empty.
    #[default]
    None,
    Speed,
    Productivity,
    Efficiency,
    Quality,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleSelector {
    pub style: ModuleStyle,
}

impl ModuleSelector {
    pub fn select(&self, catalog: &Catalog, assembler: AssemblerId, recipe: RecipeId) -> Vec<ModuleId> {
        self.select_with(catalog, assembler, recipe, self.style)
    }

    /// Fill every module slot of `assembler` with the enabled module that
    /// both the assembler and the recipe accept and that scores highest for
    /// `style`. Modules that do not help at all are never chosen.
    pub fn select_with(
        &self,
        catalog: &Catalog,
        assembler: AssemblerId,
        recipe: RecipeId,
        style: ModuleStyle,
    ) -> Vec<ModuleId> {
        let stats = &catalog.assemblers.get(assembler).stats;
        let recipe = catalog.recipes.get(recipe);

        let score = |m: ModuleId| {
            let module = catalog.modules.get(m);
            match style {
                ModuleStyle::None => 0.0,
                ModuleStyle::Speed => module.speed_bonus,
                ModuleStyle::Productivity => module.productivity_bonus,
                ModuleStyle::Efficiency => -module.consumption_bonus,
                ModuleStyle::Quality => module.quality_bonus,
            }
        };

        let mut best: Option<(ModuleId, f64)> = None;
        for &module in &stats.modules {
            let usable = recipe.modules.contains(&module)
                && catalog
                    .modules
                    .lookup(module)
                    .is_some_and(|def| def.enabled);
            let value = score(module);
            if usable && value > 0.0 && best.is_none_or(|(_, top)| value > top) {
                best = Some((module, value));
            }
        }

        best.map(|(module, _)| vec![module; stats.module_slots])
            .unwrap_or_default()
    }
}

/// The selector services a graph hands to its auto-fix actions.
#[derive(Debug, Clone, Default)]
pub struct Selectors {
    pub assembler: AssemblerSelector,
    pub fuel: FuelSelector,
    pub module: ModuleSelector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn best_assembler_is_fastest_enabled() {
        let mut fx = Fixture::new();
        let selector = AssemblerSelector::default();
        assert_eq!(
            selector.select(&fx.catalog, fx.gear_recipe),
            Some(fx.assembler_2)
        );
        assert_eq!(
            selector.select_with(&fx.catalog, fx.gear_recipe, AssemblerStyle::Worst),
            Some(fx.assembler_1)
        );

        fx.catalog
            .assemblers
            .get_mut(fx.assembler_2)
            .unwrap()
            .stats
            .enabled = false;
        assert_eq!(
            selector.select(&fx.catalog, fx.gear_recipe),
            Some(fx.assembler_1)
        );
    }

    #[test]
    fn missing_assemblers_are_never_selected() {
        let mut fx = Fixture::new();
        fx.catalog.assemblers.mark_missing(fx.stone_furnace);
        let selector = AssemblerSelector::default();
        assert_eq!(selector.select(&fx.catalog, fx.smelting_recipe), None);
    }

    #[test]
    fn fuel_selection_prefers_recent_use() {
        let fx = Fixture::new();
        let mut selector = FuelSelector::default();
        // Only coal is craftable in the fixture.
        assert_eq!(selector.select(&fx.catalog, fx.stone_furnace), Some(fx.coal));

        selector.record_use(Some(fx.fuel_cell));
        assert_eq!(selector.recent(), &[fx.fuel_cell]);
        // An uncraftable recent fuel still loses to a craftable one.
        assert_eq!(selector.select(&fx.catalog, fx.stone_furnace), Some(fx.coal));
        assert_eq!(selector.select(&fx.catalog, fx.assembler_2), None);
    }

    #[test]
    fn module_selection_fills_slots() {
        let fx = Fixture::new();
        let selector = ModuleSelector::default();
        assert!(selector
            .select(&fx.catalog, fx.assembler_2, fx.gear_recipe)
            .is_empty());
        assert_eq!(
            selector.select_with(&fx.catalog, fx.assembler_2, fx.gear_recipe, ModuleStyle::Productivity),
            vec![fx.productivity_module; 2]
        );
        assert_eq!(
            selector.select_with(&fx.catalog, fx.assembler_2, fx.gear_recipe, ModuleStyle::Efficiency),
            vec![fx.efficiency_module; 2]
        );
        assert!(selector
            .select_with(&fx.catalog, fx.assembler_1, fx.gear_recipe, ModuleStyle::Speed)
            .is_empty());
    }
}
