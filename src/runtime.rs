mod config;
mod index;
mod observer;
mod snapshot;
mod state;

pub use self::config::{DirectorConfig, ResponsePolicy};
pub use self::index::{DialogueIndex, Position};
pub use self::observer::StageObserver;
pub use self::snapshot::{fingerprint, SavedPlayback};
pub use self::state::*;

use crate::error::{PlaybackError, Result};
use crate::format::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy)]
struct PlaybackCursor {
    position: Position,
    status: PlaybackStatus,
}

impl PlaybackCursor {
    fn start(scene: usize) -> Self {
        Self {
            position: Position::scene_start(scene),
            status: PlaybackStatus::Playing,
        }
    }
}

/// Where a navigation target ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Land(Position),
    End,
}

/// Outcome of a single `make_choice` or `advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Stat writes in the order they were applied
    pub changes: Vec<StatChange>,
    pub position: Position,
    pub game_over: bool,
}

/// Playback engine walking the scenes and dialogues of one story.
///
/// The director owns the story for the whole session and exposes the game
/// state read-only: the only way to change a stat is to make a choice.
/// Given the same story, configuration, initial scene and sequence of calls
/// the engine always ends up in the same state.
pub struct StageDirector<O: StageObserver = ()> {
    story: Story,
    index: DialogueIndex,
    fingerprint: String,
    config: DirectorConfig,
    initial_scene: usize,
    cursor: PlaybackCursor,
    state: GameState,
    observer: O,
}

impl StageDirector<()> {
    pub fn new(story: Story, initial_scene: usize) -> Self {
        Self::with_config(story, initial_scene, DirectorConfig::default())
    }

    pub fn with_config(story: Story, initial_scene: usize, config: DirectorConfig) -> Self {
        StageDirector::with_observer(story, initial_scene, config, ())
    }
}

impl<O: StageObserver> StageDirector<O> {
    pub fn with_observer(
        story: Story,
        initial_scene: usize,
        config: DirectorConfig,
        observer: O,
    ) -> Self {
        let initial_scene = if initial_scene < story.scenes.len() {
            initial_scene
        } else {
            log::warn!(
                "Initial scene index {} out of range ({} scenes), using 0",
                initial_scene,
                story.scenes.len()
            );
            0
        };

        let mut director = Self {
            index: DialogueIndex::build(&story),
            fingerprint: fingerprint(&story),
            state: config.initial_state(),
            cursor: PlaybackCursor::start(initial_scene),
            story,
            config,
            initial_scene,
            observer,
        };
        director.check_start();
        director
    }

    fn check_start(&mut self) {
        match self.story.scenes.get(self.cursor.position.scene) {
            None => {
                log::warn!("Story has no scenes, nothing to play");
                self.cursor.status = PlaybackStatus::GameOver;
            }
            Some(scene) if scene.is_empty() => {
                log::warn!("Scene {} has no dialogues, nothing to play", scene.id);
                self.cursor.status = PlaybackStatus::GameOver;
            }
            Some(scene) => {
                log::debug!(
                    "Starting at scene {} ({}/{})",
                    scene.id,
                    self.cursor.position.scene,
                    self.story.scenes.len()
                );
            }
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn position(&self) -> Position {
        self.cursor.position
    }

    pub fn status(&self) -> PlaybackStatus {
        self.cursor.status
    }

    pub fn is_game_over(&self) -> bool {
        self.cursor.status == PlaybackStatus::GameOver
    }

    /// Live, read-only view of the stats.
    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// The scene at the cursor. `None` only when the story has no scenes.
    pub fn current_scene(&self) -> Option<&Scene> {
        self.story.scenes.get(self.cursor.position.scene)
    }

    /// The dialogue at the cursor. `None` means the current scene has
    /// nothing to play.
    pub fn current_dialogue(&self) -> Option<&Dialogue> {
        self.dialogue_at(self.cursor.position)
    }

    /// Choices of the current dialogue whose conditions hold. Empty once the
    /// game is over.
    pub fn available_choices(&self) -> Vec<&DialogueChoice> {
        if self.is_game_over() {
            return Vec::new();
        }

        self.current_dialogue()
            .map(|d| {
                d.choices
                    .iter()
                    .filter(|c| self.state.satisfies(&c.conditions))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.story.get_character(id)
    }

    pub fn dialogues_for_scene(&self, scene_id: &str) -> &[Dialogue] {
        self.index
            .scene(scene_id)
            .map(|i| self.story.scenes[i].dialogues.as_slice())
            .unwrap_or(&[])
    }

    /// Applies a choice of the current dialogue and moves the cursor.
    ///
    /// The choice is matched by id against the current dialogue and the
    /// story's own copy is the one applied. Nothing changes when this fails.
    pub fn make_choice(&mut self, choice: &DialogueChoice) -> Result<Transition> {
        self.choose(&choice.id)
    }

    /// Same as [`make_choice`](Self::make_choice), by choice id.
    pub fn choose(&mut self, choice_id: &str) -> Result<Transition> {
        self.ensure_playing()?;

        let dialogue = self.current_dialogue().ok_or(PlaybackError::NoDialogue)?;
        let choice = dialogue
            .get_choice(choice_id)
            .ok_or_else(|| PlaybackError::ChoiceNotInDialogue(choice_id.to_string()))?;
        if !self.state.satisfies(&choice.conditions) {
            return Err(PlaybackError::ChoiceUnavailable(choice_id.to_string()));
        }

        log::debug!("Choice {} made on dialogue {}", choice.id, dialogue.id);

        let target = choice.target();
        let effects = choice.effects.clone();

        // dangling targets must fail before any effect is applied
        let jump = self.resolve_jump(&target)?;
        let changes = self.state.apply_effects(&effects, self.config.bounds);

        let resolution = match jump {
            Some(position) => Resolution::Land(position),
            None => self.next_in_sequence(self.cursor.position),
        };

        Ok(self.transition(resolution, changes))
    }

    /// Moves past a dialogue that offers no choice, following its
    /// convergence target if it has one.
    pub fn advance(&mut self) -> Result<Transition> {
        self.ensure_playing()?;

        let dialogue = self.current_dialogue().ok_or(PlaybackError::NoDialogue)?;
        if dialogue
            .choices
            .iter()
            .any(|c| self.state.satisfies(&c.conditions))
        {
            return Err(PlaybackError::AwaitingChoice);
        }

        let target = dialogue.continuation();
        let resolution = match self.resolve_jump(&target)? {
            Some(position) => Resolution::Land(position),
            None => self.next_in_sequence(self.cursor.position),
        };

        Ok(self.transition(resolution, Vec::new()))
    }

    /// Back to the initial stats and the initial scene.
    pub fn reset(&mut self) {
        self.state = self.config.initial_state();
        self.cursor = PlaybackCursor::start(self.initial_scene);
        self.check_start();
        log::debug!("Playback reset");
    }

    pub fn save(&self) -> SavedPlayback {
        SavedPlayback {
            fingerprint: self.fingerprint.clone(),
            position: self.cursor.position,
            game_over: self.is_game_over(),
            state: self.state.clone(),
        }
    }

    pub fn restore(&mut self, saved: SavedPlayback) -> Result<()> {
        if saved.fingerprint != self.fingerprint {
            return Err(PlaybackError::SnapshotMismatch);
        }

        let Position { scene, dialogue } = saved.position;
        match self.story.scenes.get(scene) {
            None if self.story.scenes.is_empty() && scene == 0 && saved.game_over => {}
            None => {
                return Err(PlaybackError::InvalidSnapshot(format!(
                    "scene index {} out of range",
                    scene
                )))
            }
            Some(s) if s.is_empty() && (dialogue != 0 || !saved.game_over) => {
                return Err(PlaybackError::InvalidSnapshot(format!(
                    "scene {} has no dialogues",
                    s.id
                )))
            }
            Some(s) if !s.is_empty() && dialogue >= s.dialogues.len() => {
                return Err(PlaybackError::InvalidSnapshot(format!(
                    "dialogue index {} out of range in scene {}",
                    dialogue, s.id
                )))
            }
            Some(_) => {}
        }

        self.cursor = PlaybackCursor {
            position: saved.position,
            status: if saved.game_over {
                PlaybackStatus::GameOver
            } else {
                PlaybackStatus::Playing
            },
        };
        self.state = saved.state;
        log::debug!("Playback restored at {:?}", self.cursor.position);
        Ok(())
    }

    fn ensure_playing(&self) -> Result<()> {
        match self.cursor.status {
            PlaybackStatus::Playing => Ok(()),
            PlaybackStatus::GameOver => Err(PlaybackError::GameOver),
        }
    }

    fn dialogue_at(&self, position: Position) -> Option<&Dialogue> {
        self.story
            .scenes
            .get(position.scene)
            .and_then(|s| s.dialogues.get(position.dialogue))
    }

    /// Looks up explicit jump targets. `None` means sequential playback.
    fn resolve_jump(&self, target: &NavigationTarget) -> Result<Option<Position>> {
        match target {
            NavigationTarget::NextInScene => Ok(None),
            NavigationTarget::JumpToDialogue(id) => self
                .index
                .dialogue(id)
                .map(Some)
                .ok_or_else(|| PlaybackError::DialogueNotFound(id.clone())),
            NavigationTarget::JumpToScene(id) => self
                .index
                .scene(id)
                .map(|i| Some(Position::scene_start(i)))
                .ok_or_else(|| PlaybackError::SceneNotFound(id.clone())),
        }
    }

    fn is_visitable(&self, dialogue: &Dialogue) -> bool {
        if dialogue.is_response && self.config.response_policy == ResponsePolicy::ConvergenceOnly {
            return false;
        }
        self.state.satisfies(&dialogue.conditions)
    }

    /// Next dialogue played in sequence after `from`, continuing into the
    /// following scenes when the current one is exhausted.
    fn next_in_sequence(&self, from: Position) -> Resolution {
        let mut scene = from.scene;
        let mut dialogue = from.dialogue + 1;
        let mut skipped = 0;

        loop {
            let Some(s) = self.story.scenes.get(scene) else {
                return Resolution::End;
            };
            if dialogue >= s.dialogues.len() {
                scene += 1;
                dialogue = 0;
                continue;
            }

            if self.is_visitable(&s.dialogues[dialogue]) {
                return Resolution::Land(Position::new(scene, dialogue));
            }

            log::debug!("Skipping dialogue {}", s.dialogues[dialogue].id);
            skipped += 1;
            if skipped >= self.config.max_skip_iterations {
                log::error!(
                    "Skipped {} dialogues in a row after {:?}, ending playback",
                    skipped,
                    from
                );
                return Resolution::End;
            }
            dialogue += 1;
        }
    }

    fn is_terminal(&self, position: Position) -> bool {
        let Some(dialogue) = self.dialogue_at(position) else {
            return true;
        };
        if dialogue.end_of_story {
            return true;
        }
        if dialogue.next_dialogue_id.is_some()
            || dialogue
                .choices
                .iter()
                .any(|c| self.state.satisfies(&c.conditions))
        {
            return false;
        }
        self.next_in_sequence(position) == Resolution::End
    }

    fn transition(&mut self, resolution: Resolution, changes: Vec<StatChange>) -> Transition {
        let previous_scene = self.cursor.position.scene;

        let landed = match resolution {
            Resolution::Land(position) => {
                self.cursor.position = position;
                if self.is_terminal(position) {
                    self.cursor.status = PlaybackStatus::GameOver;
                }
                true
            }
            Resolution::End => {
                self.cursor.status = PlaybackStatus::GameOver;
                false
            }
        };

        log::debug!(
            "Moved to {:?}, status {:?}",
            self.cursor.position,
            self.cursor.status
        );

        for change in &changes {
            self.observer.on_stat_changed(change);
        }
        if landed {
            let position = self.cursor.position;
            let scene = &self.story.scenes[position.scene];
            if position.scene != previous_scene {
                self.observer.on_scene_changed(scene);
            }
            if let Some(dialogue) = scene.dialogues.get(position.dialogue) {
                self.observer.on_dialogue(scene, dialogue);
            }
        }
        if self.is_game_over() {
            log::debug!("Game over");
            self.observer.on_game_over(&self.state);
        }

        Transition {
            changes,
            position: self.cursor.position,
            game_over: self.is_game_over(),
        }
    }
}
