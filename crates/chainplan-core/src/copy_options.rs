//! Settings copied from one recipe node and pasted onto another.
//!
//! The keys here are already resolved against the catalog; the clipboard
//! text format and its name resolution live in the data crate.

use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::node::RecipeNode;
use crate::quality_pair::{AssemblerQualityPair, BeaconQualityPair, ModuleQualityPair};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCopyOptions {
    /// `None` when the source assembler could not be resolved.
    pub assembler: Option<AssemblerQualityPair>,
    pub assembler_modules: Vec<ModuleQualityPair>,
    pub fuel: Option<ItemId>,
    pub neighbour_count: f64,
    pub extra_productivity_bonus: f64,
    pub beacon: Option<BeaconQualityPair>,
    pub beacon_modules: Vec<ModuleQualityPair>,
    pub beacon_count: f64,
    pub beacons_per_assembler: f64,
    pub beacons_const: f64,
}

impl NodeCopyOptions {
    pub fn from_recipe(node: &RecipeNode) -> Self {
        Self {
            assembler: Some(node.assembler()),
            assembler_modules: node.assembler_modules().to_vec(),
            fuel: node.fuel(),
            neighbour_count: node.neighbour_count(),
            extra_productivity_bonus: node.extra_productivity_bonus(),
            beacon: node.beacon(),
            beacon_modules: node.beacon_modules().to_vec(),
            beacon_count: node.beacon_count(),
            beacons_per_assembler: node.beacons_per_assembler(),
            beacons_const: node.beacons_const(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality_pair::RecipeQualityPair;
    use crate::test_utils::*;

    #[test]
    fn paste_filters_against_target() {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let source = graph.add_recipe_with_assembler(
            RecipeQualityPair::new(fx.gear_recipe, fx.normal_q),
            AssemblerQualityPair::new(fx.assembler_2, fx.rare),
        );
        let speed = ModuleQualityPair::new(fx.speed_module, fx.normal_q);
        let mut controller = graph.recipe_controller(source).unwrap();
        controller.fill_assembler_modules(speed);
        controller.set_beacon(Some(BeaconQualityPair::new(fx.beacon, fx.normal_q)));
        controller.fill_beacon_modules(speed);
        controller.set_beacon_count(3.5);
        controller.set_beacons_per_assembler(4.0);
        controller.set_extra_productivity_bonus(0.25);

        let options = graph.view(source).unwrap().as_recipe().unwrap().copy_options();
        assert_eq!(options.assembler_modules, vec![speed, speed]);
        assert_eq!(options.beacon_count, 3.5);

        // Same recipe: everything carries over.
        let same = graph
            .add_recipe(RecipeQualityPair::new(fx.gear_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        graph.recipe_controller(same).unwrap().apply_copy_options(&options);
        let pasted = NodeCopyOptions::from_recipe(graph.node(same).unwrap().as_recipe().unwrap());
        assert_eq!(pasted, options);

        // Coke only runs in the furnace, which takes neither the assembler
        // nor any module; the beacon is dropped with them.
        let coke = graph
            .add_recipe(RecipeQualityPair::new(fx.coke_recipe, fx.normal_q), fx.normal_q)
            .unwrap();
        graph.recipe_controller(coke).unwrap().apply_copy_options(&options);
        let node = graph.node(coke).unwrap().as_recipe().unwrap();
        assert_eq!(node.assembler().entity, fx.stone_furnace);
        assert!(node.assembler_modules().is_empty());
        assert_eq!(node.beacon(), None);
        assert_eq!(node.beacon_count(), 0.0);
        assert_eq!(node.extra_productivity_bonus(), 0.25);
    }
}
