//! Integration test: copying recipe-node settings between graphs.
//!
//! The clipboard carries names, so settings copied in one graph can be
//! pasted into another graph running on a different catalog. Whatever the
//! target catalog cannot resolve is dropped; the rest applies.

use chainplan_core::quality_pair::*;
use chainplan_core::test_utils::Fixture;
use chainplan_data::{copy_node, decode_copy_options, paste_onto_node};

#[test]
fn paste_into_catalog_without_beacons() {
    let fx = Fixture::new();
    let q = fx.normal_q;

    let mut source = fx.graph();
    let gears = source.add_recipe_with_assembler(
        RecipeQualityPair::new(fx.gear_recipe, q),
        AssemblerQualityPair::new(fx.assembler_2, q),
    );
    let mut controller = source.recipe_controller(gears).unwrap();
    controller.fill_assembler_modules(ModuleQualityPair::new(fx.productivity_module, q));
    controller.set_beacon(Some(BeaconQualityPair::new(fx.beacon, q)));
    controller.fill_beacon_modules(ModuleQualityPair::new(fx.speed_module, q));
    controller.set_beacon_count(6.0);
    controller.set_extra_productivity_bonus(0.2);
    let text = copy_node(&source, gears).unwrap();

    let mut catalog = fx.catalog.clone();
    catalog.beacons.mark_missing(fx.beacon);
    let mut target = chainplan_core::graph::ProductionGraph::new(catalog, fx.settings.clone());
    let node = target
        .add_recipe(RecipeQualityPair::new(fx.gear_recipe, q), q)
        .unwrap();

    assert!(paste_onto_node(&mut target, node, &text).unwrap());
    let recipe = target.node(node).unwrap().as_recipe().unwrap();
    assert_eq!(recipe.assembler().entity, fx.assembler_2);
    assert_eq!(recipe.assembler_modules().len(), 2);
    assert_eq!(recipe.extra_productivity_bonus(), 0.2);
    assert_eq!(recipe.beacon(), None);
    assert!(recipe.beacon_modules().is_empty());
    assert_eq!(recipe.beacon_count(), 0.0);
}

#[test]
fn paste_onto_recipe_with_other_assemblers_keeps_scalars_only() {
    let fx = Fixture::new();
    let q = fx.normal_q;
    let mut graph = fx.graph();
    let gears = graph.add_recipe_with_assembler(
        RecipeQualityPair::new(fx.gear_recipe, q),
        AssemblerQualityPair::new(fx.assembler_2, q),
    );
    let mut controller = graph.recipe_controller(gears).unwrap();
    controller.fill_assembler_modules(ModuleQualityPair::new(fx.speed_module, q));
    controller.set_neighbour_count(3.0);
    let text = copy_node(&graph, gears).unwrap();

    let smelter = graph
        .add_recipe(RecipeQualityPair::new(fx.smelting_recipe, q), q)
        .unwrap();
    graph.recipe_controller(smelter).unwrap().set_fuel(Some(fx.coal));
    assert_eq!(graph.node(smelter).unwrap().as_recipe().unwrap().fuel(), Some(fx.coal));
    assert!(paste_onto_node(&mut graph, smelter, &text).unwrap());
    let recipe = graph.node(smelter).unwrap().as_recipe().unwrap();
    assert_eq!(recipe.assembler().entity, fx.stone_furnace);
    assert!(recipe.assembler_modules().is_empty());
    assert_eq!(recipe.neighbour_count(), 3.0);
    // The payload carries no fuel the furnace accepts, so coal stays.
    assert_eq!(recipe.fuel(), Some(fx.coal));
}

#[test]
fn foreign_text_is_ignored() {
    let fx = Fixture::new();
    let mut graph = fx.graph();
    let gears = graph
        .add_recipe(RecipeQualityPair::new(fx.gear_recipe, fx.normal_q), fx.normal_q)
        .unwrap();
    let before = graph.node(gears).unwrap().as_recipe().unwrap().assembler();

    for text in ["", "[1, 2, 3]", r#"{"Version": 1, "Object": "Node"}"#] {
        assert_eq!(decode_copy_options(graph.catalog(), text), None);
        assert!(!paste_onto_node(&mut graph, gears, text).unwrap());
    }
    assert_eq!(graph.node(gears).unwrap().as_recipe().unwrap().assembler(), before);
}
