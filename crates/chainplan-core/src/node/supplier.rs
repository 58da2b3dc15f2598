//! Supplier nodes: an unconstrained source of one item.

use crate::node::endpoint::{ItemChecks, ItemErrors, ItemWarnings};
use crate::node::{
    LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType, RateError, RateType,
};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

#[derive(Debug, Clone)]
pub struct SupplierNode {
    item: ItemQualityPair,
    pub(crate) checks: ItemChecks,
}

impl SupplierNode {
    pub(crate) fn new(item: ItemQualityPair) -> Self {
        Self {
            item,
            checks: ItemChecks::default(),
        }
    }

    pub fn item(&self) -> ItemQualityPair {
        self.item
    }

    pub fn errors(&self) -> ItemErrors {
        self.checks.errors
    }

    pub fn warnings(&self) -> ItemWarnings {
        self.checks.warnings
    }
}

impl NodeBehavior for SupplierNode {
    fn node_type(&self) -> NodeType {
        NodeType::Supplier
    }

    fn inputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        Vec::new()
    }

    fn outputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.item]
    }

    fn input_rate_for(&self, _ctx: &NodeContext<'_>, _item: ItemQualityPair) -> Option<f64> {
        None
    }

    fn output_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.item).then_some(1.0)
    }

    fn consume_rate(
        &self,
        _core: &NodeCore,
        _ctx: &NodeContext<'_>,
        _item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        Err(RateError::NotAConsumer(NodeType::Supplier))
    }

    fn supply_rate(
        &self,
        core: &NodeCore,
        ctx: &NodeContext<'_>,
        item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        if item != self.item {
            return Err(RateError::UnknownOutput(item));
        }
        Ok(match core.rate_type {
            RateType::Manual => self.desired_rate_per_sec(core, ctx) * ctx.rate_multiplier(),
            RateType::Auto => core.actual_rate(ctx),
        })
    }

    fn actual_set_value(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.actual_rate(ctx)
    }

    fn desired_rate_per_sec(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.desired_set_value / ctx.rate_multiplier()
    }

    fn max_desired_set_value(&self, settings: &GraphSettings) -> f64 {
        settings.max_set_value
    }

    fn set_value_description(&self) -> &'static str {
        "Item supply rate"
    }

    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        self.checks.evaluate(ctx.catalog, self.item, links)
    }

    fn has_invalid_links(&self) -> bool {
        self.checks.errors.contains(ItemErrors::INVALID_LINKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn supplies_desired_rate_when_manual() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let node = SupplierNode::new(fx.normal(fx.iron_plate));
        let mut core = core_with_rate(2.0);
        core.desired_set_value = 7.0;

        assert_eq!(node.supply_rate(&core, &ctx, fx.normal(fx.iron_plate)), Ok(2.0));
        core.rate_type = RateType::Manual;
        assert_eq!(node.supply_rate(&core, &ctx, fx.normal(fx.iron_plate)), Ok(7.0));
    }

    #[test]
    fn consume_rate_is_a_contract_error() {
        let fx = Fixture::new();
        let node = SupplierNode::new(fx.normal(fx.iron_plate));
        let core = core_with_rate(1.0);
        assert_eq!(
            node.consume_rate(&core, &fx.ctx(), fx.normal(fx.iron_plate)),
            Err(RateError::NotAConsumer(NodeType::Supplier))
        );
    }

    #[test]
    fn output_rate_is_one_for_own_item_only() {
        let fx = Fixture::new();
        let node = SupplierNode::new(fx.normal(fx.iron_plate));
        assert_eq!(node.output_rate_for(&fx.ctx(), fx.normal(fx.iron_plate)), Some(1.0));
        assert_eq!(node.output_rate_for(&fx.ctx(), fx.normal(fx.coal)), None);
    }
}
