//! Spoil nodes: items left in storage until they turn into their spoil result.

use bitflags::bitflags;

use crate::catalog::Catalog;
use crate::controller::Resolution;
use crate::id::ItemId;
use crate::node::{LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpoilErrors: u32 {
        const ITEM_DOESNT_SPOIL = 1 << 0;
        const INVALID_SPOIL_RESULT = 1 << 1;
        const INPUT_ITEM_MISSING = 1 << 2;
        const OUTPUT_ITEM_MISSING = 1 << 3;
        const QUALITY_MISSING = 1 << 4;
        const INVALID_LINKS = 1 << 11;
    }
}

#[derive(Debug, Clone)]
pub struct SpoilNode {
    input: ItemQualityPair,
    output: ItemQualityPair,
    errors: SpoilErrors,
}

impl SpoilNode {
    /// Spoil `input` into `output` (at the input's quality).
    pub(crate) fn new(input: ItemQualityPair, output: ItemId) -> Self {
        Self {
            input,
            output: ItemQualityPair::new(output, input.quality),
            errors: SpoilErrors::empty(),
        }
    }

    pub fn input_item(&self) -> ItemQualityPair {
        self.input
    }

    pub fn output_item(&self) -> ItemQualityPair {
        self.output
    }

    pub fn errors(&self) -> SpoilErrors {
        self.errors
    }

    /// The output the catalog currently prescribes, if the input spoils.
    pub fn expected_output(&self, catalog: &Catalog) -> Option<ItemQualityPair> {
        catalog
            .items
            .get(self.input.entity)
            .spoil_result
            .map(|item| ItemQualityPair::new(item, self.input.quality))
    }

    pub(crate) fn set_output(&mut self, output: ItemQualityPair) {
        self.output = output;
    }

    fn spoil_time(&self, catalog: &Catalog) -> f64 {
        let time = catalog
            .items
            .get(self.input.entity)
            .spoilage_time(self.input.quality);
        if time > 0.0 { time } else { 1.0 }
    }

    pub(crate) fn error_messages(&self, catalog: &Catalog) -> Vec<String> {
        let input = &catalog.items.get(self.input.entity).friendly_name;
        let output = &catalog.items.get(self.output.entity).friendly_name;
        let mut errors = Vec::new();
        if self.errors.contains(SpoilErrors::INPUT_ITEM_MISSING) {
            errors.push(format!("> Item \"{input}\" doesnt exist in preset!"));
        }
        if self.errors.contains(SpoilErrors::OUTPUT_ITEM_MISSING) {
            errors.push(format!("> Spoilage Item \"{output}\" doesnt exist in preset!"));
        }
        if self.errors.contains(SpoilErrors::ITEM_DOESNT_SPOIL) {
            errors.push(format!("> Item \"{input}\" doesnt spoil!"));
        }
        if self.errors.contains(SpoilErrors::INVALID_SPOIL_RESULT) {
            errors.push(format!(
                "> Spoilage Item \"{output}\" doesnt match the spoil result of \"{input}\"!"
            ));
        }
        if self.errors.contains(SpoilErrors::QUALITY_MISSING) {
            errors.push(format!(
                "> Quality \"{}\" doesnt exist in preset!",
                catalog.qualities.get(self.input.quality).friendly_name
            ));
        }
        if self.errors.contains(SpoilErrors::INVALID_LINKS) {
            errors.push("> Some links are invalid!".to_string());
        }
        errors
    }

    pub(crate) fn error_resolutions(&self, catalog: &Catalog) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        if self.errors.intersects(
            SpoilErrors::INPUT_ITEM_MISSING
                | SpoilErrors::OUTPUT_ITEM_MISSING
                | SpoilErrors::ITEM_DOESNT_SPOIL
                | SpoilErrors::QUALITY_MISSING,
        ) {
            resolutions.push(Resolution::DeleteNode);
        }
        if self.errors.contains(SpoilErrors::INVALID_SPOIL_RESULT) {
            if self.expected_output(catalog).is_some() {
                resolutions.push(Resolution::UpdateSpoilResult);
            }
        } else if self.errors.contains(SpoilErrors::INVALID_LINKS) {
            resolutions.push(Resolution::DeleteInvalidLinks);
        }
        resolutions
    }
}

impl NodeBehavior for SpoilNode {
    fn node_type(&self) -> NodeType {
        NodeType::Spoil
    }

    fn inputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.input]
    }

    fn outputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.output]
    }

    fn input_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.input).then_some(1.0)
    }

    fn output_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.output).then_some(1.0)
    }

    // Set value is the number of inventory slots holding spoiling items.
    fn actual_set_value(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        let stack = ctx.catalog.items.get(self.input.entity).stack_size();
        core.actual_rate_per_sec * self.spoil_time(ctx.catalog) / stack
    }

    fn desired_rate_per_sec(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        let stack = ctx.catalog.items.get(self.input.entity).stack_size();
        core.desired_set_value * stack / self.spoil_time(ctx.catalog)
    }

    fn max_desired_set_value(&self, settings: &GraphSettings) -> f64 {
        settings.max_inventory_slots
    }

    fn set_value_description(&self) -> &'static str {
        "Number of inventory slots"
    }

    // Spoil nodes never warn.
    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        let catalog = ctx.catalog;
        let mut errors = SpoilErrors::empty();
        let spoil_result = catalog.items.get(self.input.entity).spoil_result;

        if spoil_result.is_none() {
            errors |= SpoilErrors::ITEM_DOESNT_SPOIL;
        }
        if spoil_result != Some(self.output.entity) {
            errors |= SpoilErrors::INVALID_SPOIL_RESULT;
        }
        if catalog.items.is_missing(self.input.entity) {
            errors |= SpoilErrors::INPUT_ITEM_MISSING;
        }
        if catalog.items.is_missing(self.output.entity) {
            errors |= SpoilErrors::OUTPUT_ITEM_MISSING;
        }
        if catalog.qualities.is_missing(self.input.quality)
            || catalog.qualities.is_missing(self.output.quality)
        {
            errors |= SpoilErrors::QUALITY_MISSING;
        }
        if !links.all_valid {
            errors |= SpoilErrors::INVALID_LINKS;
        }

        self.errors = errors;
        if !errors.is_empty() {
            return NodeState::Error;
        }
        links.settled_state()
    }

    fn has_invalid_links(&self) -> bool {
        self.errors.contains(SpoilErrors::INVALID_LINKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn set_value_counts_inventory_slots() {
        let fx = Fixture::new();
        let node = SpoilNode::new(fx.normal(fx.yumako), fx.spoilage);
        let mut core = core_with_rate(2.0);
        // yumako: stack 50, spoils after 3600s at normal quality
        assert!((node.actual_set_value(&core, &fx.ctx()) - 2.0 * 3600.0 / 50.0).abs() < 1e-9);

        core.desired_set_value = 10.0;
        assert!((node.desired_rate_per_sec(&core, &fx.ctx()) - 10.0 * 50.0 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn output_keeps_input_quality() {
        let fx = Fixture::new();
        let node = SpoilNode::new(fx.pair(fx.yumako, fx.rare), fx.spoilage);
        assert_eq!(node.output_item(), fx.pair(fx.spoilage, fx.rare));
    }

    #[test]
    fn consistent_node_is_clean() {
        let fx = Fixture::new();
        let mut node = SpoilNode::new(fx.normal(fx.yumako), fx.spoilage);
        assert_eq!(node.evaluate(&fx.ctx(), LinkReport::default()), NodeState::Clean);
    }

    #[test]
    fn changed_spoil_result_offers_resync() {
        let mut fx = Fixture::new();
        let mut node = SpoilNode::new(fx.normal(fx.yumako), fx.spoilage);
        fx.catalog.items.get_mut(fx.yumako).unwrap().spoil_result = Some(fx.iron_ore);

        assert_eq!(node.evaluate(&fx.ctx(), LinkReport::default()), NodeState::Error);
        assert_eq!(node.errors(), SpoilErrors::INVALID_SPOIL_RESULT);
        assert_eq!(
            node.error_resolutions(&fx.catalog),
            vec![Resolution::UpdateSpoilResult]
        );
        assert_eq!(
            node.expected_output(&fx.catalog),
            Some(fx.normal(fx.iron_ore))
        );
    }

    #[test]
    fn non_spoiling_input_must_be_deleted() {
        let fx = Fixture::new();
        let mut node = SpoilNode::new(fx.normal(fx.iron_plate), fx.spoilage);
        assert_eq!(node.evaluate(&fx.ctx(), LinkReport::default()), NodeState::Error);
        assert!(node.errors().contains(SpoilErrors::ITEM_DOESNT_SPOIL));
        assert_eq!(node.error_resolutions(&fx.catalog), vec![Resolution::DeleteNode]);
        let messages = node.error_messages(&fx.catalog);
        assert!(messages.iter().any(|m| m.contains("doesnt spoil")));
    }
}
