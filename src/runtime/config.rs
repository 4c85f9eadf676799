use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::state::{GameState, StatBounds, STANDARD_STATS};

/// How sequential playback treats dialogues flagged as responses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ResponsePolicy {
    /// Responses are only reached by an explicit jump and are skipped when
    /// advancing in sequence.
    #[default]
    ConvergenceOnly,
    /// Responses are played in sequence like any other dialogue.
    Sequential,
}

/// Settings of a [`StageDirector`](super::StageDirector).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct DirectorConfig {
    pub initial_stats: BTreeMap<String, f64>,
    /// `None` leaves stats unbounded.
    pub bounds: Option<StatBounds>,
    pub response_policy: ResponsePolicy,
    /// Upper bound on dialogues skipped by a single sequential advance.
    pub max_skip_iterations: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            initial_stats: STANDARD_STATS
                .iter()
                .map(|s| (s.to_string(), 50.0))
                .collect(),
            bounds: None,
            response_policy: ResponsePolicy::default(),
            max_skip_iterations: 1000,
        }
    }
}

impl DirectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a configuration.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(StatBounds { min, max }) = self.bounds {
            if min.is_nan() || max.is_nan() || min > max {
                let err = anyhow::anyhow!("stat bounds are empty: min {} > max {}", min, max);
                return Err(err.into());
            }
        }
        Ok(())
    }

    pub fn with_initial_stat(mut self, stat: impl Into<String>, value: f64) -> Self {
        self.initial_stats.insert(stat.into(), value);
        self
    }

    pub fn with_initial_stats<K: Into<String>>(
        mut self,
        stats: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        self.initial_stats = stats.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    pub fn with_bounds(mut self, bounds: StatBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_response_policy(mut self, policy: ResponsePolicy) -> Self {
        self.response_policy = policy;
        self
    }

    pub fn with_max_skip_iterations(mut self, max: usize) -> Self {
        self.max_skip_iterations = max;
        self
    }

    pub fn initial_state(&self) -> GameState {
        let mut state = GameState::from(self.initial_stats.clone());
        if let Some(bounds) = self.bounds {
            state = state.iter().map(|(k, v)| (k, bounds.clamp(v))).collect();
        }
        state
    }
}
