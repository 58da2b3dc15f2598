//! Consumer nodes: an unconstrained sink for one item.

use crate::node::endpoint::{ItemChecks, ItemErrors, ItemWarnings};
use crate::node::{
    LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType, RateError, RateType,
};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

#[derive(Debug, Clone)]
pub struct ConsumerNode {
    item: ItemQualityPair,
    pub(crate) checks: ItemChecks,
}

impl ConsumerNode {
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

impl NodeBehavior for ConsumerNode {
    fn node_type(&self) -> NodeType {
        NodeType::Consumer
    }

    fn inputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.item]
    }

    fn outputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        Vec::new()
    }

    fn input_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.item).then_some(1.0)
    }

    fn output_rate_for(&self, _ctx: &NodeContext<'_>, _item: ItemQualityPair) -> Option<f64> {
        None
    }

    fn consume_rate(
        &self,
        core: &NodeCore,
        ctx: &NodeContext<'_>,
        item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        if item != self.item {
            return Err(RateError::UnknownInput(item));
        }
        Ok(match core.rate_type {
            RateType::Manual => self.desired_rate_per_sec(core, ctx) * ctx.rate_multiplier(),
            RateType::Auto => core.actual_rate(ctx),
        })
    }

    fn supply_rate(
        &self,
        _core: &NodeCore,
        _ctx: &NodeContext<'_>,
        _item: ItemQualityPair,
    ) -> Result<f64, RateError> {
        Err(RateError::NotASupplier(NodeType::Consumer))
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
        "Item consumption rate"
    }

    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        self.checks.evaluate(ctx.catalog, self.item, links)
    }

    fn has_invalid_links(&self) -> bool {
        self.checks.errors.contains(ItemErrors::INVALID_LINKS)
    }
}
