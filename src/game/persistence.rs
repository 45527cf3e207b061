use super::state::GameState;
use crate::error::{GameError, GameResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// Save format version; bump on any change to the serialized state
pub const SAVE_VERSION: u32 = 1;

/// Versioned save file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub state: GameState,
}

impl SaveFile {
    pub fn new(state: GameState) -> Self {
        Self { version: SAVE_VERSION, state }
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a save file
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` for saves from another version, `Malformed` for
    /// anything that does not parse.
    pub fn from_json(json: &str) -> GameResult<Self> {
        #[derive(Deserialize)]
        struct Header {
            version: u32,
        }
        let header: Header = serde_json::from_str(json)?;
        if header.version != SAVE_VERSION {
            warn!("rejecting save version {}", header.version);
            return Err(GameError::UnsupportedVersion { found: header.version, expected: SAVE_VERSION });
        }
        Ok(serde_json::from_str(json)?)
    }
}
