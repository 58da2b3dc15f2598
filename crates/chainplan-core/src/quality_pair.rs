//! Entity × quality selection keys.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogRef};
use crate::id::{AssemblerId, BeaconId, ItemId, ModuleId, QualityId, RecipeId};

/// An entity selected at a specific quality tier. Equality and hashing use
/// both keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityPair<K> {
    pub entity: K,
    pub quality: QualityId,
}

pub type ItemQualityPair = QualityPair<ItemId>;
pub type RecipeQualityPair = QualityPair<RecipeId>;
pub type AssemblerQualityPair = QualityPair<AssemblerId>;
pub type ModuleQualityPair = QualityPair<ModuleId>;
pub type BeaconQualityPair = QualityPair<BeaconId>;

impl<K: CatalogRef> QualityPair<K> {
    pub fn new(entity: K, quality: QualityId) -> Self {
        Self { entity, quality }
    }

    /// Either half of the pair is a missing catalog entry.
    pub fn is_missing(&self, catalog: &Catalog) -> bool {
        self.entity.is_missing(catalog) || self.quality.is_missing(catalog)
    }

    /// Entity name, with the quality appended unless it is the default tier.
    pub fn friendly_name(&self, catalog: &Catalog) -> String {
        let entity = self.entity.friendly_name(catalog);
        if self.quality == catalog.default_quality() {
            entity.to_string()
        } else {
            format!("{entity} ({})", self.quality.friendly_name(catalog))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ItemDef, QualityDef};
    use std::collections::HashSet;

    #[test]
    fn equality_uses_both_halves() {
        let a = ItemQualityPair::new(ItemId(1), QualityId(0));
        let b = ItemQualityPair::new(ItemId(1), QualityId(0));
        let c = ItemQualityPair::new(ItemId(1), QualityId(1));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn friendly_name_appends_non_default_quality() {
        let mut catalog = Catalog::new();
        let mut iron = ItemDef::new("iron-plate");
        iron.friendly_name = "Iron plate".to_string();
        let iron = catalog.items.insert(iron);
        let mut rare = QualityDef::new("rare", 2);
        rare.friendly_name = "Rare".to_string();
        let rare = catalog.qualities.insert(rare);

        let normal_pair = ItemQualityPair::new(iron, catalog.default_quality());
        let rare_pair = ItemQualityPair::new(iron, rare);
        assert_eq!(normal_pair.friendly_name(&catalog), "Iron plate");
        assert_eq!(rare_pair.friendly_name(&catalog), "Iron plate (Rare)");
    }

    #[test]
    fn missing_quality_makes_pair_missing() {
        let mut catalog = Catalog::new();
        let iron = catalog.items.insert(ItemDef::new("iron-plate"));
        let ghost = catalog.qualities.intern("mythic");
        assert!(ItemQualityPair::new(iron, ghost).is_missing(&catalog));
        assert!(!ItemQualityPair::new(iron, catalog.default_quality()).is_missing(&catalog));
    }
}
