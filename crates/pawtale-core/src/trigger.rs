use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::stats::PetStats;

/// Tunables for when a new story event fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerConfig {
    pub normal_chance: f64,
    pub critical_chance: f64,
    pub critical_threshold: u8,
    pub cooldown_min: u32,
    pub cooldown_max: u32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            normal_chance: 0.2,
            critical_chance: 0.4,
            critical_threshold: 3,
            cooldown_min: 3,
            cooldown_max: 5,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TriggerPolicy {
    config: TriggerConfig,
}

impl TriggerPolicy {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Decide whether an event fires after an action.
    ///
    /// Returns the decision and the cooldown to store. While the cooldown is
    /// positive it is decremented and nothing fires. Otherwise a single draw
    /// against the normal or critical chance decides, and a fresh cooldown in
    /// `[cooldown_min, cooldown_max]` is drawn when it fires.
    pub fn should_trigger<R: Rng + ?Sized>(
        &self,
        stats: &PetStats,
        cooldown: u32,
        rng: &mut R,
    ) -> (bool, u32) {
        if cooldown > 0 {
            return (false, cooldown - 1);
        }

        let chance = if self.is_critical(stats) {
            self.config.critical_chance
        } else {
            self.config.normal_chance
        };

        let draw: f64 = rng.gen();
        if draw < chance {
            let lo = self.config.cooldown_min;
            let hi = self.config.cooldown_max.max(lo);
            (true, rng.gen_range(lo..=hi))
        } else {
            (false, 0)
        }
    }

    fn is_critical(&self, stats: &PetStats) -> bool {
        let t = self.config.critical_threshold;
        stats.hunger() < t || stats.energy() < t || stats.happiness() < t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn frequency(stats: PetStats, seed: u64) -> f64 {
        let policy = TriggerPolicy::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let trials = 20_000;
        let hits = (0..trials)
            .filter(|_| policy.should_trigger(&stats, 0, &mut rng).0)
            .count();
        hits as f64 / trials as f64
    }

    #[test]
    fn normal_chance_converges() {
        let f = frequency(PetStats::new(8, 8, 8), 1);
        assert!((f - 0.2).abs() < 0.02, "got {f}");
    }

    #[test]
    fn critical_chance_converges() {
        let f = frequency(PetStats::new(1, 8, 8), 2);
        assert!((f - 0.4).abs() < 0.02, "got {f}");
    }

    #[test]
    fn cooldown_decrements_without_drawing() {
        let policy = TriggerPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(policy.should_trigger(&PetStats::default(), 4, &mut rng), (false, 3));
        assert_eq!(policy.should_trigger(&PetStats::default(), 1, &mut rng), (false, 0));
    }

    #[test]
    fn refractory_period_after_trigger() {
        let policy = TriggerPolicy::new(TriggerConfig {
            normal_chance: 1.0,
            critical_chance: 1.0,
            ..TriggerConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(4);
        let stats = PetStats::default();

        for _ in 0..200 {
            let (fired, mut cooldown) = policy.should_trigger(&stats, 0, &mut rng);
            assert!(fired);
            assert!((3..=5).contains(&cooldown));

            let mut quiet = 0;
            loop {
                let (fired, next) = policy.should_trigger(&stats, cooldown, &mut rng);
                cooldown = next;
                if fired {
                    break;
                }
                quiet += 1;
            }
            assert!((3..=5).contains(&quiet), "quiet for {quiet} calls");
        }
    }

    #[test]
    fn zero_chance_never_fires() {
        let policy = TriggerPolicy::new(TriggerConfig {
            normal_chance: 0.0,
            critical_chance: 0.0,
            ..TriggerConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            assert_eq!(policy.should_trigger(&PetStats::new(0, 0, 0), 0, &mut rng), (false, 0));
        }
    }
}
