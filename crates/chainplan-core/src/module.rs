//! Modules and their quality-scaled bonuses.
//!
//! A module's raw bonuses are stored at normal quality. Higher quality tiers
//! scale a bonus by `1 + 0.3 * level`, truncated to two decimals, but only
//! when the bonus points in the favourable direction: speed, productivity
//! and quality bonuses scale when positive, consumption and pollution
//! bonuses scale when negative.

use crate::catalog::CatalogEntry;

/// Per-level gain applied to favourable module bonuses.
pub const QUALITY_LEVEL_SCALING: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    pub name: String,
    pub friendly_name: String,
    pub enabled: bool,
    pub available: bool,
    pub category: String,
    pub tier: u32,
    pub speed_bonus: f64,
    pub productivity_bonus: f64,
    pub consumption_bonus: f64,
    pub pollution_bonus: f64,
    pub quality_bonus: f64,
}

impl ModuleDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            enabled: true,
            available: true,
            category: String::new(),
            tier: 0,
            speed_bonus: 0.0,
            productivity_bonus: 0.0,
            consumption_bonus: 0.0,
            pollution_bonus: 0.0,
            quality_bonus: 0.0,
        }
    }

    pub fn speed_bonus(&self, level: u32) -> f64 {
        scale_bonus(self.speed_bonus, level, self.speed_bonus > 0.0)
    }

    pub fn productivity_bonus(&self, level: u32) -> f64 {
        scale_bonus(self.productivity_bonus, level, self.productivity_bonus > 0.0)
    }

    pub fn consumption_bonus(&self, level: u32) -> f64 {
        scale_bonus(self.consumption_bonus, level, self.consumption_bonus < 0.0)
    }

    pub fn pollution_bonus(&self, level: u32) -> f64 {
        scale_bonus(self.pollution_bonus, level, self.pollution_bonus < 0.0)
    }

    pub fn quality_bonus(&self, level: u32) -> f64 {
        scale_bonus(self.quality_bonus, level, self.quality_bonus > 0.0)
    }
}

impl CatalogEntry for ModuleDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    fn placeholder(name: &str) -> Self {
        Self::new(name)
    }
}

/// Truncate toward zero at two decimals. The small nudge keeps values such
/// as `0.8` (stored as `0.7999...`) from dropping a hundredth.
fn truncate_hundredths(value: f64) -> f64 {
    const NUDGE: f64 = 1e-9;
    let scaled = value * 100.0;
    let nudged = if scaled >= 0.0 { scaled + NUDGE } else { scaled - NUDGE };
    nudged.trunc() / 100.0
}

fn scale_bonus(bonus: f64, level: u32, favourable: bool) -> f64 {
    if level == 0 || !favourable {
        return bonus;
    }
    truncate_hundredths(bonus * (1.0 + f64::from(level) * QUALITY_LEVEL_SCALING))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_module() -> ModuleDef {
        let mut m = ModuleDef::new("speed-module");
        m.speed_bonus = 0.5;
        m.consumption_bonus = 0.7;
        m.quality_bonus = -0.025;
        m
    }

    fn efficiency_module() -> ModuleDef {
        let mut m = ModuleDef::new("efficiency-module");
        m.consumption_bonus = -0.2;
        m
    }

    #[test]
    fn speed_bonus_scales_with_level() {
        let m = speed_module();
        assert_eq!(m.speed_bonus(2), 0.8);
        assert_eq!(m.speed_bonus(1), 0.65);
    }

    #[test]
    fn level_zero_is_unscaled() {
        let m = speed_module();
        assert_eq!(m.speed_bonus(0), 0.5);
        assert_eq!(m.quality_bonus(0), -0.025);
    }

    #[test]
    fn unfavourable_bonuses_never_scale() {
        let m = speed_module();
        assert_eq!(m.consumption_bonus(3), 0.7);
        assert_eq!(m.quality_bonus(5), -0.025);
    }

    #[test]
    fn negative_consumption_scales_more_negative() {
        let m = efficiency_module();
        let scaled = m.consumption_bonus(1);
        assert!(scaled < -0.2);
        assert_eq!(scaled, -0.26);
    }

    #[test]
    fn truncation_is_toward_zero() {
        // 0.25 * 1.9 = 0.475 -> 0.47; -0.25 * 1.9 = -0.475 -> -0.47
        let mut m = ModuleDef::new("m");
        m.productivity_bonus = 0.25;
        m.pollution_bonus = -0.25;
        assert_eq!(m.productivity_bonus(3), 0.47);
        assert_eq!(m.pollution_bonus(3), -0.47);
    }
}
