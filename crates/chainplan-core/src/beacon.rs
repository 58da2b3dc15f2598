//! Beacons and the fractional beacon-count effectivity model.
//!
//! A beacon count of `1.6` means 60% of the assemblers see two beacons and
//! 40% see one. Effectivity is non-linear in the beacon count, so the
//! average per-beacon effectivity is interpolated between the two integer
//! neighbours rather than evaluated at the fractional count.

use crate::catalog::CatalogEntry;
use crate::entity::{EnergySource, EntityStats, EntityType, QualityDef};
use crate::id::QualityId;

/// Beacon counts above this are treated as this value.
pub const MAX_BEACON_COUNT: f64 = 999.0;

/// Length of the default profile table.
pub const DEFAULT_PROFILE_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct BeaconDef {
    pub name: String,
    pub friendly_name: String,
    pub stats: EntityStats,
    pub distribution_effectivity: f64,
    /// Extra distribution effectivity per quality level.
    pub distribution_effectivity_quality_boost: f64,
    /// Per-beacon multiplier indexed by the number of beacons affecting an
    /// assembler. Index 0 is unused.
    pub profile: Vec<f64>,
}

impl BeaconDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            friendly_name: name.to_string(),
            stats: EntityStats::new(EntityType::Beacon, EnergySource::Electric),
            distribution_effectivity: 0.5,
            distribution_effectivity_quality_boost: 0.0,
            profile: default_profile(),
        }
    }

    /// Average effectivity of one beacon when `beacon_count` beacons (possibly
    /// fractional) affect an assembler.
    pub fn effectivity(&self, quality_level: u32, beacon_count: f64) -> f64 {
        if beacon_count.is_nan() || beacon_count <= 0.0 {
            return 0.0;
        }
        let count = beacon_count.min(MAX_BEACON_COUNT);
        let whole = count.trunc();
        let fraction = count - whole;

        let at_whole = whole * self.effectivity_at(quality_level, whole as usize);
        let at_next = (whole + 1.0) * self.effectivity_at(quality_level, whole as usize + 1);
        ((1.0 - fraction) * at_whole + fraction * at_next) / count
    }

    /// Effectivity with exactly `count` beacons.
    fn effectivity_at(&self, quality_level: u32, count: usize) -> f64 {
        let profile = match self.profile.get(count) {
            Some(&p) => p,
            None => self.profile.last().copied().unwrap_or(0.0),
        };
        profile
            * (self.distribution_effectivity
                + f64::from(quality_level) * self.distribution_effectivity_quality_boost)
    }

    /// Power draw of one beacon at the given quality.
    pub fn energy_consumption(&self, quality_id: QualityId, quality: &QualityDef) -> f64 {
        quality.beacon_power_multiplier * self.stats.energy_consumption(quality_id)
            + self.stats.energy_drain
    }
}

impl CatalogEntry for BeaconDef {
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

/// Flat profile: every beacon beyond the zeroth counts at 0.5.
pub fn default_profile() -> Vec<f64> {
    let mut profile = vec![0.5; DEFAULT_PROFILE_LEN];
    profile[0] = 0.0;
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon() -> BeaconDef {
        let mut b = BeaconDef::new("beacon");
        b.distribution_effectivity = 1.5;
        b.distribution_effectivity_quality_boost = 0.2;
        b
    }

    /// Profile that falls off as 1/sqrt(n).
    fn sqrt_beacon() -> BeaconDef {
        let mut b = beacon();
        b.profile = (0..DEFAULT_PROFILE_LEN)
            .map(|n| if n == 0 { 0.0 } else { 1.0 / (n as f64).sqrt() })
            .collect();
        b
    }

    #[test]
    fn zero_and_negative_counts_have_no_effect() {
        let b = beacon();
        assert_eq!(b.effectivity(0, 0.0), 0.0);
        assert_eq!(b.effectivity(0, -3.0), 0.0);
    }

    #[test]
    fn integer_count_uses_profile_entry() {
        let b = beacon();
        assert!((b.effectivity(0, 2.0) - 0.5 * 1.5).abs() < 1e-12);
        assert!((b.effectivity(2, 2.0) - 0.5 * (1.5 + 0.4)).abs() < 1e-12);
    }

    #[test]
    fn fractional_count_interpolates_average() {
        let b = sqrt_beacon();
        let n1 = 1.0 * b.effectivity_at(0, 1);
        let n2 = 2.0 * b.effectivity_at(0, 2);
        let expected = (0.4 * n1 + 0.6 * n2) / 1.6;
        assert!((b.effectivity(0, 1.6) - expected).abs() < 1e-12);
    }

    #[test]
    fn counts_above_cap_are_clamped() {
        let b = sqrt_beacon();
        assert_eq!(b.effectivity(1, 2000.0), b.effectivity(1, 999.0));
    }

    #[test]
    fn short_profile_reuses_last_entry() {
        let mut b = beacon();
        b.profile = vec![0.0, 1.0, 0.8];
        assert!((b.effectivity(0, 5.0) - 0.8 * 1.5).abs() < 1e-12);
    }

    #[test]
    fn energy_consumption_scales_with_quality() {
        let mut b = beacon();
        b.stats.energy_consumption.insert(QualityId(1), 480_000.0);
        b.stats.energy_drain = 10_000.0;
        let mut q = QualityDef::new("rare", 2);
        q.beacon_power_multiplier = 0.5;
        assert_eq!(b.energy_consumption(QualityId(1), &q), 250_000.0);
    }
}
