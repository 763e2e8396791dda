/// Play configuration: file names and player-facing messages, loaded from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::builder::STORY_FILE;
use crate::core::error::StoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Story description resource inside the story directory.
    pub story_file: String,
    /// Shown when the selection is not a number in range.
    pub invalid_choice: String,
    /// Shown when the selection is gated off.
    pub unavailable_choice: String,
    /// Shown by the path report when no win page is reachable.
    pub unwinnable: String,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            story_file: STORY_FILE.to_string(),
            invalid_choice: "That is not a valid choice, please try again".to_string(),
            unavailable_choice: "That choice is not available at this time, please try again"
                .to_string(),
            unwinnable: "This story is unwinnable!".to_string(),
        }
    }
}

impl PlayConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<PlayConfig, StoryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoryError::Resource {
            resource: path.display().to_string(),
            source,
        })?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string. Missing fields keep their defaults.
    pub fn parse_ron(input: &str) -> Result<PlayConfig, StoryError> {
        Ok(ron::from_str(input)?)
    }
}
