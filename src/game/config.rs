use super::action_callback::AgentKind;
use super::constants::STARTING_SCORE;
use crate::error::GameResult;
use crate::tile::TileCatalogue;
use serde::{Deserialize, Serialize};

/// Game setup
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Base seed; round `n` shuffles with `seed + n`
    pub seed: u64,
    /// Stop after the East round
    pub east_only: bool,
    pub starting_score: i32,
    pub catalogue: TileCatalogue,
    /// Decision collaborator per seat
    pub agents: [AgentKind; 4],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            east_only: false,
            starting_score: STARTING_SCORE,
            catalogue: TileCatalogue::standard(),
            agents: [AgentKind::Eager; 4],
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_agents(mut self, agents: [AgentKind; 4]) -> Self {
        self.agents = agents;
        self
    }
}
