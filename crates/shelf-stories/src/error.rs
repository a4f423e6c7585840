//! Story error types.

use std::path::PathBuf;

/// Result type for story operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Error type for loading and playing stories.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid story data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate story id '{0}'")]
    DuplicateStory(String),

    #[error("story '{0}' has no 'start' node")]
    MissingStart(String),

    #[error("story '{story}': choice in node '{node}' leads to missing node '{next}'")]
    DanglingChoice {
        story: String,
        node: String,
        next: String,
    },

    #[error("story '{story}': node '{node}' is not an ending but has no choices")]
    DeadEnd { story: String, node: String },

    #[error("unknown story '{0}'")]
    UnknownStory(String),

    #[error("no story is open")]
    NotPlaying,

    #[error("the story has ended")]
    Ended,

    #[error("choice {index} out of range ({available} available)")]
    InvalidChoice { index: usize, available: usize },
}
