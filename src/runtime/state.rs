use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::{Condition, Effect};

pub const EMPATHY: &str = "empathy";
pub const AUTONOMY: &str = "autonomy";
pub const CONFIDENCE: &str = "confidence";

/// The standard stats every session starts with.
pub const STANDARD_STATS: [&str; 3] = [EMPATHY, AUTONOMY, CONFIDENCE];

/// Named numeric stats tracked across a playback session.
///
/// Keys are kept ordered so snapshots and logs are stable between runs.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameState {
    stats: BTreeMap<String, f64>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a stat. A stat that was never written reads as 0.
    pub fn get(&self, stat: &str) -> f64 {
        self.stats.get(stat).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, stat: &str) -> bool {
        self.stats.contains_key(stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.stats
    }

    /// Returns true when every condition holds. An empty list always holds.
    pub fn satisfies(&self, conditions: &[Condition]) -> bool {
        conditions.iter().all(|c| c.holds(self.get(&c.stat)))
    }

    /// Applies a batch of effects in order and reports what changed.
    ///
    /// Missing stats are created at 0 before the effect is applied. With
    /// `bounds`, every result is clamped into the range.
    pub fn apply_effects(
        &mut self,
        effects: &[Effect],
        bounds: Option<StatBounds>,
    ) -> Vec<StatChange> {
        let mut changes = Vec::with_capacity(effects.len());

        for effect in effects {
            let before = self.get(&effect.stat);
            let mut after = effect.apply_to(before);
            if let Some(bounds) = bounds {
                after = bounds.clamp(after);
            }

            log::debug!(
                "Effect {:?} on {}: {} -> {}",
                effect.operation,
                effect.stat,
                before,
                after
            );

            self.stats.insert(effect.stat.clone(), after);
            changes.push(StatChange {
                stat: effect.stat.clone(),
                before,
                after,
            });
        }

        changes
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for GameState {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            stats: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<BTreeMap<String, f64>> for GameState {
    fn from(stats: BTreeMap<String, f64>) -> Self {
        Self { stats }
    }
}

/// Inclusive range stats are clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatBounds {
    pub min: f64,
    pub max: f64,
}

impl StatBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 0..=100
    pub fn percent() -> Self {
        Self::new(0.0, 100.0)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// One stat write performed by a transition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatChange {
    pub stat: String,
    pub before: f64,
    pub after: f64,
}

impl StatChange {
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}
