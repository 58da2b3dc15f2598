//! Property-based tests for the chainplan node model.
//!
//! Uses proptest to generate beacon counts, module loadouts and controller
//! operation sequences, then verify the numeric and state invariants hold.

use chainplan_core::beacon::{BeaconDef, MAX_BEACON_COUNT};
use chainplan_core::controller::Resolution;
use chainplan_core::graph::ProductionGraph;
use chainplan_core::id::NodeId;
use chainplan_core::node::recipe::MIN_MULTIPLIER;
use chainplan_core::node::{NodeBehavior, NodeState};
use chainplan_core::quality_pair::*;
use chainplan_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Up to four modules drawn from the fixture's module kinds.
fn arb_modules() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0..4u8, 0..=4)
}

fn module_pair(fx: &Fixture, kind: u8) -> ModuleQualityPair {
    let module = match kind {
        0 => fx.speed_module,
        1 => fx.productivity_module,
        2 => fx.efficiency_module,
        _ => fx.quality_module,
    };
    ModuleQualityPair::new(module, fx.normal_q)
}

fn gear_node(fx: &Fixture, graph: &mut ProductionGraph) -> NodeId {
    graph.add_recipe_with_assembler(
        RecipeQualityPair::new(fx.gear_recipe, fx.normal_q),
        AssemblerQualityPair::new(fx.assembler_2, fx.normal_q),
    )
}

#[derive(Debug, Clone)]
enum Op {
    SetAssembler(bool),
    AddModule(u8),
    ClearModules,
    SetBeacon(bool),
    AddBeaconModule(u8),
    SetBeaconCount(f64),
    DisableModule(u8),
    MissingBeacon,
    ApplyFirstResolution,
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            any::<bool>().prop_map(Op::SetAssembler),
            (0..4u8).prop_map(Op::AddModule),
            Just(Op::ClearModules),
            any::<bool>().prop_map(Op::SetBeacon),
            (0..4u8).prop_map(Op::AddBeaconModule),
            (0.0..20.0f64).prop_map(Op::SetBeaconCount),
            (0..4u8).prop_map(Op::DisableModule),
            Just(Op::MissingBeacon),
            Just(Op::ApplyFirstResolution),
        ],
        1..=max_ops,
    )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The total beacon bonus (count x average effectivity) has no jumps
    /// between neighbouring fractional counts.
    #[test]
    fn beacon_bonus_is_continuous(count in 0.01..50.0f64, level in 0u32..5) {
        let mut beacon = BeaconDef::new("beacon");
        beacon.distribution_effectivity_quality_boost = 0.1;
        for (i, p) in beacon.profile.iter_mut().enumerate().skip(1) {
            *p = 1.0 / (i as f64).sqrt();
        }
        let step = 1e-6;
        let here = beacon.effectivity(level, count) * count;
        let next = beacon.effectivity(level, count + step) * (count + step);
        prop_assert!((here - next).abs() < 1e-4);
    }

    /// Non-positive counts give nothing; huge counts clamp to the maximum.
    #[test]
    fn beacon_count_is_clamped(count in -100.0..0.0f64, big in 1_000.0..1e9f64) {
        let beacon = BeaconDef::new("beacon");
        prop_assert_eq!(beacon.effectivity(0, count), 0.0);
        prop_assert_eq!(
            beacon.effectivity(0, big),
            beacon.effectivity(0, MAX_BEACON_COUNT)
        );
    }

    /// Whatever the modules, multipliers stay on their floors and the
    /// productivity bonus stays within the recipe's range.
    #[test]
    fn multipliers_respect_floors(modules in arb_modules(), beacon_modules in arb_modules(), count in 0.0..12.0f64) {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);
        let assembler_modules: Vec<_> = modules.iter().map(|&k| module_pair(&fx, k)).collect();
        let beacon_modules: Vec<_> = beacon_modules.iter().map(|&k| module_pair(&fx, k)).collect();
        let mut controller = graph.recipe_controller(id).unwrap();
        controller.set_assembler_modules(&assembler_modules, false);
        controller.set_beacon(Some(BeaconQualityPair::new(fx.beacon, fx.normal_q)));
        controller.set_beacon_modules(&beacon_modules, false);
        controller.set_beacon_count(count);

        let view = graph.view(id).unwrap();
        let recipe = view.as_recipe().unwrap();
        prop_assert!(recipe.speed_multiplier() >= MIN_MULTIPLIER);
        prop_assert!(recipe.consumption_multiplier() >= MIN_MULTIPLIER);
        prop_assert!(recipe.pollution_multiplier() >= MIN_MULTIPLIER);
        prop_assert!(recipe.quality_multiplier() >= 0.0);
        prop_assert!(recipe.productivity_multiplier() >= 1.0);
    }

    /// Moving output up the quality chain never creates or destroys items.
    #[test]
    fn quality_cascade_conserves_output(quality_modules in 0usize..=2, steps in 1u32..6) {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);
        let modules = vec![module_pair(&fx, 3); quality_modules];
        let mut controller = graph.recipe_controller(id).unwrap();
        controller.set_assembler_modules(&modules, true);
        controller.set_max_quality_steps(steps);

        let ctx = graph.context();
        let node = graph.node(id).unwrap();
        let outputs = node.outputs(&ctx);
        prop_assert!(outputs.len() <= steps as usize);
        let total: f64 = outputs
            .iter()
            .filter_map(|&item| node.behavior().output_rate_for(&ctx, item))
            .sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    /// Random edits never leave a node in an error state without a way out,
    /// and the node state always agrees with its bit sets.
    #[test]
    fn every_error_has_a_resolution(ops in arb_ops(30)) {
        let fx = Fixture::new();
        let mut graph = fx.graph();
        let id = gear_node(&fx, &mut graph);

        for op in ops {
            match op {
                Op::SetAssembler(fast) => {
                    let assembler = if fast { fx.assembler_2 } else { fx.assembler_1 };
                    graph
                        .recipe_controller(id)
                        .unwrap()
                        .set_assembler(AssemblerQualityPair::new(assembler, fx.normal_q));
                }
                Op::AddModule(k) => graph.recipe_controller(id).unwrap().add_assembler_module(module_pair(&fx, k)),
                Op::ClearModules => graph.recipe_controller(id).unwrap().clear_assembler_modules(),
                Op::SetBeacon(on) => {
                    let beacon = on.then(|| BeaconQualityPair::new(fx.beacon, fx.normal_q));
                    graph.recipe_controller(id).unwrap().set_beacon(beacon);
                }
                Op::AddBeaconModule(k) => graph.recipe_controller(id).unwrap().add_beacon_module(module_pair(&fx, k)),
                Op::SetBeaconCount(count) => graph.recipe_controller(id).unwrap().set_beacon_count(count),
                Op::DisableModule(k) => {
                    let module = module_pair(&fx, k).entity;
                    graph.modify_catalog(|c| {
                        if let Some(def) = c.modules.get_mut(module) {
                            def.enabled = false;
                        }
                    });
                }
                Op::MissingBeacon => graph.modify_catalog(|c| c.beacons.mark_missing(fx.beacon)),
                Op::ApplyFirstResolution => {
                    let controller = graph.controller(id).unwrap();
                    let first = controller
                        .error_resolutions()
                        .into_iter()
                        .chain(controller.warning_resolutions())
                        .find(|&r| r != Resolution::DeleteNode);
                    if let Some(resolution) = first {
                        controller.apply(resolution).unwrap();
                    }
                }
            }

            let node = graph.node(id).unwrap();
            let state = node.state();
            let recipe = node.as_recipe().unwrap();
            let (errors, warnings) = (recipe.errors(), recipe.warnings());
            let resolutions = graph.controller(id).unwrap().error_resolutions();
            if !errors.is_empty() {
                prop_assert_eq!(state, NodeState::Error);
                prop_assert!(!resolutions.is_empty());
                prop_assert!(warnings.is_empty());
            } else if !warnings.is_empty() {
                prop_assert_eq!(state, NodeState::Warning);
            }
        }
    }
}
