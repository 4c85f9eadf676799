//! Playback engine for branching visual novel stories.
//!
//! A [`Story`](format::Story) is a list of scenes, each holding an ordered
//! run of dialogues. Dialogues may offer choices; a choice carries effects on
//! the game's numeric stats and an optional jump to another dialogue or
//! scene. [`StageDirector`](runtime::StageDirector) walks that graph one
//! choice at a time until the story ends.

pub mod error;
pub mod format;
pub mod outcome;
pub mod runtime;
