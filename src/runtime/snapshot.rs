#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use twox_hash::XxHash3_128;

use crate::format::Story;

use super::index::Position;
use super::state::GameState;

/// Everything needed to resume a playback session on the same story.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SavedPlayback {
    /// [`fingerprint`] of the story the session was played on.
    pub fingerprint: String,
    pub position: Position,
    pub game_over: bool,
    pub state: GameState,
}

#[cfg(feature = "serde")]
impl SavedPlayback {
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

const FIELD: u8 = 0x1f;
const RECORD: u8 = 0x1e;

fn push_field(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(value.as_bytes());
    buf.push(FIELD);
}

fn push_optional(buf: &mut Vec<u8>, value: Option<&String>) {
    match value {
        Some(v) => push_field(buf, v),
        None => buf.push(FIELD),
    }
}

/// Hash of the parts of a story that positions depend on: scene and
/// dialogue order, ids and navigation targets. Text edits keep it stable.
pub fn fingerprint(story: &Story) -> String {
    let mut buf = Vec::new();

    for scene in &story.scenes {
        push_field(&mut buf, &scene.id);
        for dialogue in &scene.dialogues {
            push_field(&mut buf, &dialogue.id);
            push_optional(&mut buf, dialogue.next_dialogue_id.as_ref());
            for choice in &dialogue.choices {
                push_field(&mut buf, &choice.id);
                push_optional(&mut buf, choice.next_dialogue_id.as_ref());
                push_optional(&mut buf, choice.next_scene_id.as_ref());
            }
            buf.push(RECORD);
        }
        buf.push(RECORD);
        buf.push(RECORD);
    }

    format!("{:032x}", XxHash3_128::oneshot(&buf))
}
