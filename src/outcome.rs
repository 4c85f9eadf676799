//! Scoring helpers for the presentation layer.
//!
//! The engine only reports whether the story is finished. Whether the player
//! did well is a policy of the caller; these helpers implement the usual one,
//! the rounded mean of the standard stats.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::runtime::{GameState, STANDARD_STATS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Grade {
    D,
    C,
    B,
    APlus,
}

impl Grade {
    pub fn for_score(score: i64) -> Self {
        match score {
            s if s >= 80 => Grade::APlus,
            s if s >= 60 => Grade::B,
            s if s >= 40 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Ending {
    pub score: i64,
    pub grade: Grade,
    pub title: &'static str,
    pub message: &'static str,
}

impl Ending {
    pub fn for_score(score: i64) -> Self {
        let grade = Grade::for_score(score);
        let (title, message) = match grade {
            Grade::APlus => (
                "Outstanding run!",
                "You showed exemplary mastery of every skill.",
            ),
            Grade::B => ("Good run!", "You handled most situations well."),
            Grade::C => ("Average run", "Some skills still need work."),
            Grade::D => ("Difficult run", "Some approaches are worth revisiting."),
        };

        Self {
            score,
            grade,
            title,
            message,
        }
    }

    pub fn for_state(state: &GameState) -> Self {
        Self::for_score(final_score(state, &STANDARD_STATS))
    }
}

/// Rounded mean of the given stats, halves rounding up. Missing stats count
/// as 0, an empty list scores 0.
pub fn final_score(state: &GameState, stats: &[&str]) -> i64 {
    if stats.is_empty() {
        return 0;
    }
    let sum: f64 = stats.iter().map(|s| state.get(s)).sum();
    (sum / stats.len() as f64 + 0.5).floor() as i64
}
