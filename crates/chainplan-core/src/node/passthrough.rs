//! Passthrough nodes: one item flows in and out unchanged.

use bitflags::bitflags;

use crate::node::{LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PassthroughErrors: u32 {
        const INVALID_LINKS = 1 << 11;
    }
}

#[derive(Debug, Clone)]
pub struct PassthroughNode {
    item: ItemQualityPair,
    /// Render as a plain junction instead of a full node.
    simple_draw: bool,
    errors: PassthroughErrors,
}

impl PassthroughNode {
    pub(crate) fn new(item: ItemQualityPair) -> Self {
        Self {
            item,
            simple_draw: true,
            errors: PassthroughErrors::empty(),
        }
    }

    pub fn item(&self) -> ItemQualityPair {
        self.item
    }

    pub fn simple_draw(&self) -> bool {
        self.simple_draw
    }

    pub(crate) fn set_simple_draw(&mut self, simple_draw: bool) {
        self.simple_draw = simple_draw;
    }

    pub fn errors(&self) -> PassthroughErrors {
        self.errors
    }

    pub(crate) fn error_messages(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.errors.contains(PassthroughErrors::INVALID_LINKS) {
            errors.push("> Some links are invalid!".to_string());
        }
        errors
    }
}

impl NodeBehavior for PassthroughNode {
    fn node_type(&self) -> NodeType {
        NodeType::Passthrough
    }

    fn inputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.item]
    }

    fn outputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.item]
    }

    fn input_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.item).then_some(1.0)
    }

    fn output_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.item).then_some(1.0)
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
        "Item throughput"
    }

    // Passthrough nodes never warn.
    fn evaluate(&mut self, _ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        self.errors = PassthroughErrors::empty();
        if !links.all_valid {
            self.errors |= PassthroughErrors::INVALID_LINKS;
            return NodeState::Error;
        }
        links.settled_state()
    }

    fn has_invalid_links(&self) -> bool {
        self.errors.contains(PassthroughErrors::INVALID_LINKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn identity_flow() {
        let fx = Fixture::new();
        let item = fx.normal(fx.iron_plate);
        let node = PassthroughNode::new(item);
        let core = core_with_rate(3.0);
        assert_eq!(node.inputs(&fx.ctx()), node.outputs(&fx.ctx()));
        assert_eq!(node.consume_rate(&core, &fx.ctx(), item), Ok(3.0));
        assert_eq!(node.supply_rate(&core, &fx.ctx(), item), Ok(3.0));
        assert!(node.simple_draw());
    }

    #[test]
    fn missing_item_is_not_an_error() {
        let mut fx = Fixture::new();
        let ghost = fx.catalog.items.intern("ghost");
        let mut node = PassthroughNode::new(fx.normal(ghost));
        assert_eq!(node.evaluate(&fx.ctx(), LinkReport::default()), NodeState::Clean);
    }

    #[test]
    fn invalid_links_error() {
        let fx = Fixture::new();
        let mut node = PassthroughNode::new(fx.normal(fx.iron_plate));
        let broken = LinkReport {
            all_valid: false,
            all_connected: true,
        };
        assert_eq!(node.evaluate(&fx.ctx(), broken), NodeState::Error);
        assert_eq!(node.error_messages(), vec!["> Some links are invalid!".to_string()]);
    }
}
