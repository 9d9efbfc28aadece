//! Workload generation policies
//!
//! Every policy is a pure function of `(count, trial, parameters)` producing the
//! ordered values dispatched in one trial. Randomized policies only touch
//! process state when no seed is configured.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 15-digit prime used by the fixed and alternating presets
pub const LARGE_PRIME: i64 = 100_000_000_000_031;

/// One value to classify and its position within the trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadItem {
    pub index: usize,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum WorkloadPolicy {
    /// Independent uniform draws from `low..=high`
    Uniform {
        low: i64,
        high: i64,
        #[serde(default)]
        seed: Option<u64>,
        /// Offset the seed by the trial number instead of replaying it
        #[serde(default)]
        reseed_per_trial: bool,
    },
    /// Every value equals `value`
    Fixed { value: i64 },
    /// `first` at even positions, `second` at odd positions
    Alternating { first: i64, second: i64 },
    /// (expensive, cheap) pairs drawn independently and concatenated
    HeavyLight {
        heavy_low: i64,
        heavy_high: i64,
        light_low: i64,
        light_high: i64,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        reseed_per_trial: bool,
    },
}

impl Default for WorkloadPolicy {
    fn default() -> Self {
        Self::fixed_prime()
    }
}

impl WorkloadPolicy {
    /// 15-16 digit numbers, unseeded
    pub fn random_large() -> Self {
        Self::Uniform {
            low: 100_000_000_000_000,
            high: 1_000_000_000_000_000,
            seed: None,
            reseed_per_trial: false,
        }
    }

    /// 10-11 digit numbers replayed from `seed` every trial
    pub fn seeded(seed: u64) -> Self {
        Self::Uniform {
            low: 1_000_000_000,
            high: 99_999_999_999,
            seed: Some(seed),
            reseed_per_trial: false,
        }
    }

    pub fn fixed_prime() -> Self {
        Self::Fixed { value: LARGE_PRIME }
    }

    pub fn alternating_prime() -> Self {
        Self::Alternating {
            first: 2,
            second: LARGE_PRIME,
        }
    }

    pub fn heavy_light() -> Self {
        Self::HeavyLight {
            heavy_low: 1_000_000,
            heavy_high: 10_000_000,
            light_low: 0,
            light_high: 9,
            seed: None,
            reseed_per_trial: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform { .. } => "uniform",
            Self::Fixed { .. } => "fixed",
            Self::Alternating { .. } => "alternating",
            Self::HeavyLight { .. } => "heavy_light",
        }
    }

    /// Generate the ordered values for one trial (1-based `trial`).
    pub fn generate(&self, count: usize, trial: u32) -> Vec<i64> {
        match self {
            Self::Uniform {
                low,
                high,
                seed,
                reseed_per_trial,
            } => {
                let range = ordered(*low, *high);
                match trial_seed(*seed, *reseed_per_trial, trial) {
                    Some(seed) => uniform(&mut StdRng::seed_from_u64(seed), count, range),
                    None => uniform(&mut rand::rng(), count, range),
                }
            }
            Self::Fixed { value } => vec![*value; count],
            Self::Alternating { first, second } => (0..count)
                .map(|i| if i % 2 == 0 { *first } else { *second })
                .collect(),
            Self::HeavyLight {
                heavy_low,
                heavy_high,
                light_low,
                light_high,
                seed,
                reseed_per_trial,
            } => {
                let heavy = ordered(*heavy_low, *heavy_high);
                let light = ordered(*light_low, *light_high);
                match trial_seed(*seed, *reseed_per_trial, trial) {
                    Some(seed) => {
                        interleave(&mut StdRng::seed_from_u64(seed), count, heavy, light)
                    }
                    None => interleave(&mut rand::rng(), count, heavy, light),
                }
            }
        }
    }

    /// Generate values paired with their positions
    pub fn items(&self, count: usize, trial: u32) -> Vec<WorkloadItem> {
        self.generate(count, trial)
            .into_iter()
            .enumerate()
            .map(|(index, value)| WorkloadItem { index, value })
            .collect()
    }

    /// Reject inverted ranges
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Uniform { low, high, .. } if low > high => {
                Err(format!("uniform range is empty: {}..={}", low, high))
            }
            Self::HeavyLight {
                heavy_low,
                heavy_high,
                ..
            } if heavy_low > heavy_high => Err(format!(
                "heavy range is empty: {}..={}",
                heavy_low, heavy_high
            )),
            Self::HeavyLight {
                light_low,
                light_high,
                ..
            } if light_low > light_high => Err(format!(
                "light range is empty: {}..={}",
                light_low, light_high
            )),
            _ => Ok(()),
        }
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn trial_seed(seed: Option<u64>, reseed_per_trial: bool, trial: u32) -> Option<u64> {
    seed.map(|s| {
        if reseed_per_trial {
            s.wrapping_add(trial as u64)
        } else {
            s
        }
    })
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, count: usize, (low, high): (i64, i64)) -> Vec<i64> {
    (0..count).map(|_| rng.random_range(low..=high)).collect()
}

fn interleave<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    (heavy_low, heavy_high): (i64, i64),
    (light_low, light_high): (i64, i64),
) -> Vec<i64> {
    let mut values = Vec::with_capacity(count + 1);
    while values.len() < count {
        values.push(rng.random_range(heavy_low..=heavy_high));
        values.push(rng.random_range(light_low..=light_high));
    }
    // odd counts end on a heavy value
    values.truncate(count);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_is_idempotent() {
        let policy = WorkloadPolicy::Fixed { value: 7 };
        for count in [0, 1, 50] {
            let first = policy.generate(count, 1);
            assert_eq!(first.len(), count);
            assert!(first.iter().all(|v| *v == 7));
            assert_eq!(first, policy.generate(count, 2));
        }
    }

    #[test]
    fn test_alternating_parity() {
        let policy = WorkloadPolicy::Alternating {
            first: 2,
            second: 11,
        };
        assert_eq!(policy.generate(6, 1), vec![2, 11, 2, 11, 2, 11]);
        assert_eq!(policy.generate(3, 1), vec![2, 11, 2]);
    }

    #[test]
    fn test_uniform_within_range() {
        let policy = WorkloadPolicy::Uniform {
            low: 100,
            high: 200,
            seed: None,
            reseed_per_trial: false,
        };
        let values = policy.generate(500, 1);
        assert_eq!(values.len(), 500);
        assert!(values.iter().all(|v| (100..=200).contains(v)));
    }

    #[test]
    fn test_seeded_uniform_replays_every_trial() {
        let policy = WorkloadPolicy::seeded(42);
        let trial1 = policy.generate(20, 1);
        let trial2 = policy.generate(20, 2);
        assert_eq!(trial1, trial2);
        assert!(trial1.iter().all(|v| (1_000_000_000..=99_999_999_999).contains(v)));
    }

    #[test]
    fn test_reseed_per_trial_is_reproducible_but_varies() {
        let policy = WorkloadPolicy::Uniform {
            low: 0,
            high: i64::MAX,
            seed: Some(42),
            reseed_per_trial: true,
        };
        assert_eq!(policy.generate(10, 3), policy.generate(10, 3));
        assert_ne!(policy.generate(10, 1), policy.generate(10, 2));
    }

    #[test]
    fn test_heavy_light_interleaves() {
        let policy = WorkloadPolicy::heavy_light();
        let values = policy.generate(100, 1);
        assert_eq!(values.len(), 100);
        for (i, v) in values.iter().enumerate() {
            if i % 2 == 0 {
                assert!((1_000_000..=10_000_000).contains(v), "heavy at {}: {}", i, v);
            } else {
                assert!((0..=9).contains(v), "light at {}: {}", i, v);
            }
        }
    }

    #[test]
    fn test_heavy_light_odd_count_reaches_requested_length() {
        let values = WorkloadPolicy::heavy_light().generate(7, 1);
        assert_eq!(values.len(), 7);
        assert!(values[6] >= 1_000_000);
    }

    #[test]
    fn test_items_carry_positions() {
        let items = WorkloadPolicy::alternating_prime().items(4, 1);
        assert_eq!(items[0], WorkloadItem { index: 0, value: 2 });
        assert_eq!(
            items[3],
            WorkloadItem {
                index: 3,
                value: LARGE_PRIME
            }
        );
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let policy = WorkloadPolicy::Uniform {
            low: 10,
            high: 1,
            seed: None,
            reseed_per_trial: false,
        };
        assert!(policy.validate().is_err());
        assert!(WorkloadPolicy::heavy_light().validate().is_ok());
    }

    #[test]
    fn test_serde_tagged_policy() {
        let json = r#"{"policy":"alternating","first":2,"second":3}"#;
        let policy: WorkloadPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy, WorkloadPolicy::Alternating { first: 2, second: 3 });
    }
}
