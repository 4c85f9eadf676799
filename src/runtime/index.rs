use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::Story;

/// Location of a dialogue inside the story graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub scene: usize,
    pub dialogue: usize,
}

impl Position {
    pub fn new(scene: usize, dialogue: usize) -> Self {
        Self { scene, dialogue }
    }

    pub fn scene_start(scene: usize) -> Self {
        Self { scene, dialogue: 0 }
    }
}

/// Lookup tables from ids to positions, built once per story.
#[derive(Debug, Default, Clone)]
pub struct DialogueIndex {
    dialogues: HashMap<String, Position>,
    scenes: HashMap<String, usize>,
}

impl DialogueIndex {
    pub fn build(story: &Story) -> Self {
        let mut index = Self::default();

        for (scene_index, scene) in story.scenes.iter().enumerate() {
            if index.scenes.contains_key(&scene.id) {
                log::warn!("Duplicate scene id {}, keeping the first one", scene.id);
            } else {
                index.scenes.insert(scene.id.clone(), scene_index);
            }

            for (dialogue_index, dialogue) in scene.dialogues.iter().enumerate() {
                if index.dialogues.contains_key(&dialogue.id) {
                    log::warn!(
                        "Duplicate dialogue id {} in scene {}, keeping the first one",
                        dialogue.id,
                        scene.id
                    );
                    continue;
                }
                let position = Position::new(scene_index, dialogue_index);
                index.dialogues.insert(dialogue.id.clone(), position);
            }
        }

        index
    }

    pub fn dialogue(&self, id: &str) -> Option<Position> {
        self.dialogues.get(id).copied()
    }

    pub fn scene(&self, id: &str) -> Option<usize> {
        self.scenes.get(id).copied()
    }

    pub fn dialogue_count(&self) -> usize {
        self.dialogues.len()
    }
}
