//! Branching stories for the offline reader.
//!
//! This crate provides:
//! - `Library` - Validated collection of stories loaded from JSON
//! - `Player` - Walks one story from `start` to an ending
//! - `to_html_paragraphs` - Story text to paragraph markup
//!
//! # Example
//!
//! ```ignore
//! use shelf_stories::{Library, Player};
//!
//! let library = Library::load("data/stories.json")?;
//! let mut player = Player::new(&library);
//! player.open("forest")?;
//! player.choose(0)?;
//! ```

mod error;
mod library;
mod player;
mod render;

pub use error::*;
pub use library::*;
pub use player::*;
pub use render::*;
