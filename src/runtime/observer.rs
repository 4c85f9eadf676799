use crate::format::{Dialogue, Scene};

use super::state::{GameState, StatChange};

/// Hooks the presentation layer uses to follow playback.
///
/// Every method is called synchronously from inside a transition, after the
/// engine state is final, so queries made from the hooks see the new state.
pub trait StageObserver {
    /// Called once per stat write made by a choice
    fn on_stat_changed(&mut self, _change: &StatChange) {}
    /// Called when the cursor enters a different scene
    fn on_scene_changed(&mut self, _scene: &Scene) {}
    /// Called when the cursor lands on a dialogue
    fn on_dialogue(&mut self, _scene: &Scene, _dialogue: &Dialogue) {}
    /// Called once, when playback ends
    fn on_game_over(&mut self, _state: &GameState) {}
}

impl StageObserver for () {}

impl<O: StageObserver + ?Sized> StageObserver for Box<O> {
    fn on_stat_changed(&mut self, change: &StatChange) {
        (**self).on_stat_changed(change)
    }

    fn on_scene_changed(&mut self, scene: &Scene) {
        (**self).on_scene_changed(scene)
    }

    fn on_dialogue(&mut self, scene: &Scene, dialogue: &Dialogue) {
        (**self).on_dialogue(scene, dialogue)
    }

    fn on_game_over(&mut self, state: &GameState) {
        (**self).on_game_over(state)
    }
}
