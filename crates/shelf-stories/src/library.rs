//! Story model and validated library.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoryError, StoryResult};

/// Node every story begins at.
pub const START_NODE: &str = "start";

/// Tagline shown for stories that do not have one.
pub const DEFAULT_TAGLINE: &str = "یک ماجراجویی چندمسیره";

/// A branching story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    /// Cover image path.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub nodes: BTreeMap<String, StoryNode>,
}

impl Story {
    /// Tagline, or the default one.
    pub fn tagline(&self) -> &str {
        self.tagline
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TAGLINE)
    }

    pub fn node(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Number of ending nodes.
    pub fn endings(&self) -> usize {
        self.nodes.values().filter(|n| n.ending).count()
    }

    fn validate(&self) -> StoryResult<()> {
        if !self.nodes.contains_key(START_NODE) {
            return Err(StoryError::MissingStart(self.id.clone()));
        }
        for (id, node) in &self.nodes {
            if !node.ending && node.choices.is_empty() {
                return Err(StoryError::DeadEnd {
                    story: self.id.clone(),
                    node: id.clone(),
                });
            }
            if let Some(choice) = node.choices.iter().find(|c| !self.nodes.contains_key(&c.next)) {
                return Err(StoryError::DanglingChoice {
                    story: self.id.clone(),
                    node: id.clone(),
                    next: choice.next.clone(),
                });
            }
        }
        Ok(())
    }
}

/// One passage of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ending: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A choice leading to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next: String,
}

/// Stories in display order.
#[derive(Debug, Clone, Default)]
pub struct Library {
    stories: Vec<Story>,
}

impl Library {
    /// Build a library, validating every story.
    pub fn new(stories: Vec<Story>) -> StoryResult<Self> {
        let mut ids = HashSet::new();
        for story in &stories {
            if !ids.insert(story.id.as_str()) {
                return Err(StoryError::DuplicateStory(story.id.clone()));
            }
            story.validate()?;
        }
        Ok(Self { stories })
    }

    /// Parse a JSON array of stories.
    pub fn from_json(json: &str) -> StoryResult<Self> {
        let stories: Vec<Story> = serde_json::from_str(json)?;
        Self::new(stories)
    }

    /// Load a JSON story file.
    pub fn load(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json(&json)?;
        debug!(path = %path.display(), stories = library.len(), "loaded story library");
        Ok(library)
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn get(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}
