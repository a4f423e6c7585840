//! Story player state machine.

use tracing::debug;

use crate::error::{StoryError, StoryResult};
use crate::library::{Library, Story, StoryNode, START_NODE};

/// Position in an open story.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub story: &'a Story,
    pub node_id: &'a str,
    pub node: &'a StoryNode,
}

impl Scene<'_> {
    pub fn is_ending(&self) -> bool {
        self.node.ending
    }
}

/// Walks stories of a library one choice at a time.
///
/// The player is either on the catalog (no story open) or inside a story at
/// some node. Closing a story remembers it so the catalog can return focus to
/// it.
#[derive(Debug)]
pub struct Player<'a> {
    library: &'a Library,
    open: Option<(&'a Story, &'a str)>,
    last_story: Option<&'a str>,
}

impl<'a> Player<'a> {
    pub fn new(library: &'a Library) -> Self {
        Self {
            library,
            open: None,
            last_story: None,
        }
    }

    /// Open a story at its start node.
    pub fn open(&mut self, story_id: &str) -> StoryResult<Scene<'a>> {
        let story = self
            .library
            .get(story_id)
            .ok_or_else(|| StoryError::UnknownStory(story_id.to_string()))?;
        self.last_story = Some(story.id.as_str());
        self.goto(story, START_NODE)
    }

    /// The current scene, if a story is open.
    pub fn current(&self) -> Option<Scene<'a>> {
        let (story, node_id) = self.open?;
        let node = story.node(node_id)?;
        Some(Scene {
            story,
            node_id,
            node,
        })
    }

    /// Follow the choice at `index`.
    pub fn choose(&mut self, index: usize) -> StoryResult<Scene<'a>> {
        let scene = self.current().ok_or(StoryError::NotPlaying)?;
        if scene.is_ending() {
            return Err(StoryError::Ended);
        }
        let choice = scene
            .node
            .choices
            .get(index)
            .ok_or(StoryError::InvalidChoice {
                index,
                available: scene.node.choices.len(),
            })?;
        self.goto(scene.story, &choice.next)
    }

    /// Go back to the start of the open story.
    pub fn restart(&mut self) -> StoryResult<Scene<'a>> {
        let (story, _) = self.open.ok_or(StoryError::NotPlaying)?;
        self.goto(story, START_NODE)
    }

    pub fn is_ending(&self) -> bool {
        self.current().is_some_and(|scene| scene.is_ending())
    }

    /// Return to the catalog. Returns the story that was last opened.
    pub fn close(&mut self) -> Option<&'a str> {
        self.open = None;
        self.last_story
    }

    /// Story last opened, kept after closing.
    pub fn last_story(&self) -> Option<&'a str> {
        self.last_story
    }

    fn goto(&mut self, story: &'a Story, node_id: &str) -> StoryResult<Scene<'a>> {
        let (node_id, node) = story
            .nodes
            .get_key_value(node_id)
            .ok_or_else(|| StoryError::DanglingChoice {
                story: story.id.clone(),
                node: self.open.map(|(_, n)| n.to_string()).unwrap_or_default(),
                next: node_id.to_string(),
            })?;
        debug!(story = %story.id, node = %node_id, "entered node");
        self.open = Some((story, node_id.as_str()));
        Ok(Scene {
            story,
            node_id,
            node,
        })
    }
}
