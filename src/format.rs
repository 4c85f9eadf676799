use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::Result;

/// The whole story graph handed to the engine for one playback session.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Story {
    pub scenes: Vec<Scene>,
    pub characters: Vec<Character>,
    /// Flat dialogue list kept by older editor exports. Playback only reads
    /// the dialogues owned by each scene.
    pub dialogues: Vec<Dialogue>,
}

impl Story {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            ..Default::default()
        }
    }

    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    /// Parse the editor's JSON export.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn scene_index(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    pub fn get_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn get_character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }
}

/// A contiguous unit of the story: a backdrop, the characters on stage and
/// an ordered run of dialogues.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Scene {
    pub id: String,
    pub title: String,
    pub description: String,
    pub background_url: String,
    pub dialogues: Vec<Dialogue>,
    pub characters: Vec<SceneCharacter>,
    pub audio: Option<SceneAudio>,
}

impl Scene {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_dialogue(mut self, dialogue: Dialogue) -> Self {
        self.dialogues.push(dialogue);
        self
    }

    pub fn with_background(mut self, url: impl Into<String>) -> Self {
        self.background_url = url.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dialogues.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SceneCharacter {
    pub id: String,
    pub character_id: String,
    pub mood: String,
    pub position: Point,
    pub size: Size,
    pub scale: Option<f64>,
    pub z_index: Option<i32>,
    pub entrance_animation: String,
    pub exit_animation: String,
    pub flipped: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Background music of a scene.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SceneAudio {
    pub url: String,
    pub volume: Option<f64>,
    pub r#loop: Option<bool>,
    pub continue_to_next_scene: bool,
}

/// Sound effect played when a dialogue appears.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DialogueAudio {
    pub url: String,
    pub volume: Option<f64>,
}

/// One line of narration or speech.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Dialogue {
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub choices: Vec<DialogueChoice>,
    pub sfx: Option<DialogueAudio>,
    /// Convergence target followed when this dialogue is advanced.
    pub next_dialogue_id: Option<String>,
    /// Marks a branch response, reached by a choice rather than in sequence.
    pub is_response: bool,
    /// Ends the story once reached.
    pub end_of_story: bool,
    pub speaker_mood: Option<String>,
    pub stage_directions: Option<String>,
    /// All of these must hold for sequential playback to visit the dialogue.
    pub conditions: Vec<Condition>,
}

impl Dialogue {
    pub fn new(id: impl Into<String>, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_choice(mut self, choice: DialogueChoice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn converging_to(mut self, id: impl Into<String>) -> Self {
        self.next_dialogue_id = Some(id.into());
        self
    }

    pub fn as_response(mut self) -> Self {
        self.is_response = true;
        self
    }

    pub fn as_ending(mut self) -> Self {
        self.end_of_story = true;
        self
    }

    pub fn get_choice(&self, id: &str) -> Option<&DialogueChoice> {
        self.choices.iter().find(|c| c.id == id)
    }

    /// Where playback goes when this dialogue is advanced without a choice.
    pub fn continuation(&self) -> NavigationTarget {
        match &self.next_dialogue_id {
            Some(id) => NavigationTarget::JumpToDialogue(id.clone()),
            None => NavigationTarget::NextInScene,
        }
    }
}

/// A player-selectable option attached to a dialogue.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DialogueChoice {
    pub id: String,
    pub text: String,
    pub effects: Vec<Effect>,
    pub next_dialogue_id: Option<String>,
    pub next_scene_id: Option<String>,
    pub conditions: Vec<Condition>,
}

impl DialogueChoice {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn to_dialogue(mut self, id: impl Into<String>) -> Self {
        self.next_dialogue_id = Some(id.into());
        self
    }

    pub fn to_scene(mut self, id: impl Into<String>) -> Self {
        self.next_scene_id = Some(id.into());
        self
    }

    /// The authoritative navigation target of this choice. A dialogue target
    /// wins over a scene target.
    pub fn target(&self) -> NavigationTarget {
        if let Some(id) = &self.next_dialogue_id {
            NavigationTarget::JumpToDialogue(id.clone())
        } else if let Some(id) = &self.next_scene_id {
            NavigationTarget::JumpToScene(id.clone())
        } else {
            NavigationTarget::NextInScene
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    NextInScene,
    JumpToDialogue(String),
    JumpToScene(String),
}

/// A change applied to one named stat when a choice is made.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Effect {
    #[cfg_attr(feature = "serde", serde(rename = "variable", alias = "stat"))]
    pub stat: String,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operation: EffectOperation,
}

impl Effect {
    pub fn add(stat: impl Into<String>, delta: f64) -> Self {
        Self {
            stat: stat.into(),
            value: delta,
            operation: EffectOperation::Add,
        }
    }

    pub fn set(stat: impl Into<String>, value: f64) -> Self {
        Self {
            stat: stat.into(),
            value,
            operation: EffectOperation::Set,
        }
    }

    pub fn multiply(stat: impl Into<String>, factor: f64) -> Self {
        Self {
            stat: stat.into(),
            value: factor,
            operation: EffectOperation::Multiply,
        }
    }

    pub fn apply_to(&self, current: f64) -> f64 {
        match self.operation {
            EffectOperation::Add => current + self.value,
            EffectOperation::Set => self.value,
            EffectOperation::Multiply => current * self.value,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum EffectOperation {
    #[default]
    Add,
    Set,
    Multiply,
}

/// A comparison of one stat against a constant. A stat that was never
/// written reads as 0.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Condition {
    #[cfg_attr(feature = "serde", serde(rename = "variable", alias = "stat"))]
    pub stat: String,
    pub operator: ConditionOperator,
    pub value: f64,
}

impl Condition {
    pub fn new(stat: impl Into<String>, operator: ConditionOperator, value: f64) -> Self {
        Self {
            stat: stat.into(),
            operator,
            value,
        }
    }

    pub fn holds(&self, current: f64) -> bool {
        match self.operator {
            ConditionOperator::GreaterOrEqual => current >= self.value,
            ConditionOperator::LessOrEqual => current <= self.value,
            ConditionOperator::Greater => current > self.value,
            ConditionOperator::Less => current < self.value,
            ConditionOperator::Equal => current == self.value,
            ConditionOperator::NotEqual => current != self.value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ConditionOperator {
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    GreaterOrEqual,
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    LessOrEqual,
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    Greater,
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    Less,
    #[cfg_attr(feature = "serde", serde(rename = "=="))]
    Equal,
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    NotEqual,
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
    /// mood -> sprite url
    pub sprites: BTreeMap<String, String>,
    pub moods: Vec<String>,
}

impl Character {
    /// Sprite for a mood, falling back to the neutral one.
    pub fn sprite(&self, mood: &str) -> Option<&str> {
        self.sprites
            .get(mood)
            .or_else(|| self.sprites.get("neutral"))
            .map(String::as_str)
    }
}
