//! Plant nodes: seeds grown on farming tiles into weighted products.

use bitflags::bitflags;

use crate::catalog::Catalog;
use crate::controller::Resolution;
use crate::id::PlantProcessId;
use crate::node::{LinkReport, NodeBehavior, NodeContext, NodeCore, NodeState, NodeType};
use crate::quality_pair::ItemQualityPair;
use crate::settings::GraphSettings;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlantErrors: u32 {
        const ITEM_DOESNT_GROW = 1 << 0;
        const INVALID_GROW_RESULT = 1 << 1;
        const INPUT_ITEM_MISSING = 1 << 2;
        const PLANT_PROCESS_MISSING = 1 << 3;
        const QUALITY_MISSING = 1 << 4;
        const INVALID_LINKS = 1 << 11;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlantWarnings: u32 {
        const QUALITY_DISABLED = 1 << 15;
    }
}

#[derive(Debug, Clone)]
pub struct PlantNode {
    seed: ItemQualityPair,
    process: PlantProcessId,
    errors: PlantErrors,
    warnings: PlantWarnings,
}

impl PlantNode {
    pub(crate) fn new(seed: ItemQualityPair, process: PlantProcessId) -> Self {
        Self {
            seed,
            process,
            errors: PlantErrors::empty(),
            warnings: PlantWarnings::empty(),
        }
    }

    pub fn seed(&self) -> ItemQualityPair {
        self.seed
    }

    pub fn process(&self) -> PlantProcessId {
        self.process
    }

    pub fn errors(&self) -> PlantErrors {
        self.errors
    }

    pub fn warnings(&self) -> PlantWarnings {
        self.warnings
    }

    pub(crate) fn set_process(&mut self, process: PlantProcessId) {
        self.process = process;
    }

    fn grow_time(&self, catalog: &Catalog) -> f64 {
        let time = catalog.plant_processes.get(self.process).grow_time;
        if time > 0.0 { time } else { 1.0 }
    }

    pub(crate) fn error_messages(&self, catalog: &Catalog) -> Vec<String> {
        let seed = &catalog.items.get(self.seed.entity).friendly_name;
        let mut errors = Vec::new();
        if self.errors.contains(PlantErrors::INPUT_ITEM_MISSING) {
            errors.push(format!("> Item \"{seed}\" doesnt exist in preset!"));
        }
        if self.errors.contains(PlantErrors::PLANT_PROCESS_MISSING) {
            errors.push(format!("> Growth process for item \"{seed}\" doesnt exist in preset!"));
        }
        if self.errors.contains(PlantErrors::ITEM_DOESNT_GROW) {
            errors.push(format!("> Item \"{seed}\" cant be planted!"));
        }
        if self.errors.contains(PlantErrors::INVALID_GROW_RESULT) {
            errors.push(format!("> Growth result for item \"{seed}\" doesnt match preset!"));
        }
        if self.errors.contains(PlantErrors::QUALITY_MISSING) {
            errors.push(format!(
                "> Quality \"{}\" doesnt exist in preset!",
                catalog.qualities.get(self.seed.quality).friendly_name
            ));
        }
        if self.errors.contains(PlantErrors::INVALID_LINKS) {
            errors.push("> Some links are invalid!".to_string());
        }
        errors
    }

    pub(crate) fn warning_messages(&self, catalog: &Catalog) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.warnings.contains(PlantWarnings::QUALITY_DISABLED) {
            warnings.push(format!(
                "> Quality \"{}\" isnt currently enabled.",
                catalog.qualities.get(self.seed.quality).friendly_name
            ));
        }
        warnings
    }

    pub(crate) fn error_resolutions(&self, catalog: &Catalog) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        if self.errors.intersects(
            PlantErrors::INPUT_ITEM_MISSING
                | PlantErrors::PLANT_PROCESS_MISSING
                | PlantErrors::ITEM_DOESNT_GROW,
        ) {
            resolutions.push(Resolution::DeleteNode);
        }
        if self.errors.contains(PlantErrors::INVALID_GROW_RESULT) {
            if catalog.items.get(self.seed.entity).plant_result.is_some() {
                resolutions.push(Resolution::UpdatePlantResult);
            }
        } else if self.errors.contains(PlantErrors::INVALID_LINKS) {
            resolutions.push(Resolution::DeleteInvalidLinks);
        }
        resolutions
    }
}

impl NodeBehavior for PlantNode {
    fn node_type(&self) -> NodeType {
        NodeType::Plant
    }

    fn inputs(&self, _ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        vec![self.seed]
    }

    // Harvests always come out at the default quality.
    fn outputs(&self, ctx: &NodeContext<'_>) -> Vec<ItemQualityPair> {
        let quality = ctx.catalog.default_quality();
        ctx.catalog
            .plant_processes
            .get(self.process)
            .products
            .iter()
            .map(|(item, _)| ItemQualityPair::new(*item, quality))
            .collect()
    }

    fn input_rate_for(&self, _ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        (item == self.seed).then_some(1.0)
    }

    fn output_rate_for(&self, ctx: &NodeContext<'_>, item: ItemQualityPair) -> Option<f64> {
        if item.quality != ctx.catalog.default_quality() {
            return None;
        }
        ctx.catalog
            .plant_processes
            .get(self.process)
            .product_amount(item.entity)
    }

    // Set value is the number of farming tiles.
    fn actual_set_value(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.actual_rate_per_sec * self.grow_time(ctx.catalog)
    }

    fn desired_rate_per_sec(&self, core: &NodeCore, ctx: &NodeContext<'_>) -> f64 {
        core.desired_set_value / self.grow_time(ctx.catalog)
    }

    fn max_desired_set_value(&self, settings: &GraphSettings) -> f64 {
        settings.max_tiles
    }

    fn set_value_description(&self) -> &'static str {
        "Number of farming tiles"
    }

    fn evaluate(&mut self, ctx: &NodeContext<'_>, links: LinkReport) -> NodeState {
        let catalog = ctx.catalog;
        let plant_result = catalog.items.get(self.seed.entity).plant_result;
        let mut errors = PlantErrors::empty();

        if plant_result.is_none() {
            errors |= PlantErrors::ITEM_DOESNT_GROW;
        }
        if plant_result != Some(self.process) {
            errors |= PlantErrors::INVALID_GROW_RESULT;
        }
        if catalog.items.is_missing(self.seed.entity) {
            errors |= PlantErrors::INPUT_ITEM_MISSING;
        }
        if catalog.plant_processes.is_missing(self.process) {
            errors |= PlantErrors::PLANT_PROCESS_MISSING;
        }
        if catalog.qualities.is_missing(self.seed.quality) {
            errors |= PlantErrors::QUALITY_MISSING;
        }
        if !links.all_valid {
            errors |= PlantErrors::INVALID_LINKS;
        }

        self.errors = errors;
        self.warnings = PlantWarnings::empty();
        if !errors.is_empty() {
            return NodeState::Error;
        }

        if !catalog.qualities.get(self.seed.quality).enabled {
            self.warnings |= PlantWarnings::QUALITY_DISABLED;
            return NodeState::Warning;
        }
        links.settled_state()
    }

    fn has_invalid_links(&self) -> bool {
        self.errors.contains(PlantErrors::INVALID_LINKS)
    }
}
