use thiserror::Error;

pub type Result<T, E = PlaybackError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Game is over")]
    GameOver,
    #[error("Current scene has no dialogue to play")]
    NoDialogue,
    #[error("Current dialogue is waiting for a choice")]
    AwaitingChoice,
    #[error("Dialogue {0} not found")]
    DialogueNotFound(String),
    #[error("Scene {0} not found")]
    SceneNotFound(String),
    #[error("Choice {0} does not belong to the current dialogue")]
    ChoiceNotInDialogue(String),
    #[error("Choice {0} is not available in the current game state")]
    ChoiceUnavailable(String),
    #[error("Saved playback was made for a different story")]
    SnapshotMismatch,
    #[error("Invalid saved playback: {0}")]
    InvalidSnapshot(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
