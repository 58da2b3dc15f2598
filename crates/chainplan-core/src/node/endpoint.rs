//! Validation shared by supplier and consumer nodes, which are both built
//! around a single item.

use bitflags::bitflags;

use crate::catalog::Catalog;
use crate::controller::Resolution;
use crate::node::{LinkReport, NodeState};
use crate::quality_pair::ItemQualityPair;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemErrors: u32 {
        const ITEM_MISSING = 1 << 0;
        const QUALITY_MISSING = 1 << 1;
        const INVALID_LINKS = 1 << 11;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemWarnings: u32 {
        const ITEM_UNAVAILABLE = 1 << 0;
        const ITEM_DISABLED = 1 << 1;
        const QUALITY_UNAVAILABLE = 1 << 2;
        const QUALITY_DISABLED = 1 << 3;
    }
}

/// Error and warning sets of a single-item node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemChecks {
    pub errors: ItemErrors,
    pub warnings: ItemWarnings,
}

impl Default for ItemChecks {
    fn default() -> Self {
        Self {
            errors: ItemErrors::empty(),
            warnings: ItemWarnings::empty(),
        }
    }
}

impl ItemChecks {
    pub(crate) fn evaluate(&mut self, catalog: &Catalog, item: ItemQualityPair, links: LinkReport) -> NodeState {
        self.errors = ItemErrors::empty();
        self.warnings = ItemWarnings::empty();

        if catalog.items.is_missing(item.entity) {
            self.errors |= ItemErrors::ITEM_MISSING;
        }
        if catalog.qualities.is_missing(item.quality) {
            self.errors |= ItemErrors::QUALITY_MISSING;
        }
        if !links.all_valid {
            self.errors |= ItemErrors::INVALID_LINKS;
        }
        if !self.errors.is_empty() {
            return NodeState::Error;
        }

        let quality = catalog.qualities.get(item.quality);
        if !quality.available {
            self.warnings |= ItemWarnings::QUALITY_UNAVAILABLE;
        }
        if !quality.enabled {
            self.warnings |= ItemWarnings::QUALITY_DISABLED;
        }
        let def = catalog.items.get(item.entity);
        if !def.available {
            self.warnings |= ItemWarnings::ITEM_UNAVAILABLE;
        }
        if !def.enabled {
            self.warnings |= ItemWarnings::ITEM_DISABLED;
        }
        if !self.warnings.is_empty() {
            return NodeState::Warning;
        }
        links.settled_state()
    }

    pub(crate) fn error_messages(&self, catalog: &Catalog, item: ItemQualityPair) -> Vec<String> {
        let mut errors = Vec::new();
        if self.errors.contains(ItemErrors::ITEM_MISSING) {
            errors.push(format!(
                "> Item \"{}\" doesnt exist in preset!",
                catalog.items.get(item.entity).friendly_name
            ));
        }
        if self.errors.contains(ItemErrors::QUALITY_MISSING) {
            errors.push(format!(
                "> Quality \"{}\" doesnt exist in preset!",
                catalog.qualities.get(item.quality).friendly_name
            ));
        }
        if self.errors.contains(ItemErrors::INVALID_LINKS) {
            errors.push("> Some links are invalid!".to_string());
        }
        errors
    }

    pub(crate) fn warning_messages(&self, catalog: &Catalog, item: ItemQualityPair) -> Vec<String> {
        let mut warnings = Vec::new();
        let quality = &catalog.qualities.get(item.quality).friendly_name;
        if self.warnings.contains(ItemWarnings::QUALITY_UNAVAILABLE) {
            warnings.push(format!("> Quality \"{quality}\" isnt available in regular gameplay."));
        } else if self.warnings.contains(ItemWarnings::QUALITY_DISABLED) {
            warnings.push(format!("> Quality \"{quality}\" isnt currently enabled."));
        }
        let name = &catalog.items.get(item.entity).friendly_name;
        if self.warnings.contains(ItemWarnings::ITEM_DISABLED) {
            warnings.push(format!("> Item \"{name}\" isnt currently enabled."));
        }
        if self.warnings.contains(ItemWarnings::ITEM_UNAVAILABLE) {
            warnings.push(format!("> Item \"{name}\" is unavailable in regular play."));
        }
        warnings
    }

    pub(crate) fn error_resolutions(&self) -> Vec<Resolution> {
        if self
            .errors
            .intersects(ItemErrors::ITEM_MISSING | ItemErrors::QUALITY_MISSING)
        {
            vec![Resolution::DeleteNode]
        } else if self.errors.contains(ItemErrors::INVALID_LINKS) {
            vec![Resolution::DeleteInvalidLinks]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ItemDef;

    fn setup() -> (Catalog, ItemQualityPair) {
        let mut catalog = Catalog::new();
        let iron = catalog.items.insert(ItemDef::new("iron-plate"));
        let q = catalog.default_quality();
        (catalog, ItemQualityPair::new(iron, q))
    }

    #[test]
    fn clean_item_follows_link_report() {
        let (catalog, item) = setup();
        let mut checks = ItemChecks::default();
        assert_eq!(
            checks.evaluate(&catalog, item, LinkReport::default()),
            NodeState::Clean
        );
        let dangling = LinkReport {
            all_valid: true,
            all_connected: false,
        };
        assert_eq!(checks.evaluate(&catalog, item, dangling), NodeState::MissingLink);
    }

    #[test]
    fn missing_item_is_an_error_with_delete_fix() {
        let mut catalog = Catalog::new();
        let ghost = catalog.items.intern("ghost");
        let item = ItemQualityPair::new(ghost, catalog.default_quality());
        let mut checks = ItemChecks::default();
        assert_eq!(
            checks.evaluate(&catalog, item, LinkReport::default()),
            NodeState::Error
        );
        assert_eq!(
            checks.error_messages(&catalog, item),
            vec!["> Item \"ghost\" doesnt exist in preset!".to_string()]
        );
        assert_eq!(checks.error_resolutions(), vec![Resolution::DeleteNode]);
    }

    #[test]
    fn invalid_links_offer_link_cleanup() {
        let (catalog, item) = setup();
        let mut checks = ItemChecks::default();
        let broken = LinkReport {
            all_valid: false,
            all_connected: true,
        };
        assert_eq!(checks.evaluate(&catalog, item, broken), NodeState::Error);
        assert_eq!(checks.error_resolutions(), vec![Resolution::DeleteInvalidLinks]);
    }

    #[test]
    fn errors_skip_warnings() {
        let mut catalog = Catalog::new();
        let mut def = ItemDef::new("iron-plate");
        def.enabled = false;
        let iron = catalog.items.insert(def);
        let ghost_quality = catalog.qualities.intern("mythic");
        let mut checks = ItemChecks::default();
        checks.evaluate(&catalog, ItemQualityPair::new(iron, ghost_quality), LinkReport::default());
        assert!(checks.warnings.is_empty());
    }

    #[test]
    fn unavailable_quality_hides_disabled_text() {
        let (mut catalog, item) = setup();
        let quality = catalog.qualities.get_mut(item.quality).unwrap();
        quality.available = false;
        quality.enabled = false;
        let mut checks = ItemChecks::default();
        assert_eq!(
            checks.evaluate(&catalog, item, LinkReport::default()),
            NodeState::Warning
        );
        let warnings = checks.warning_messages(&catalog, item);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("isnt available"));
    }
}
