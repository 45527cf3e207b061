use thiserror::Error;

/// Engine errors
///
/// Incomplete hands and wall exhaustion are not errors: they come back as
/// `Decomposition::Invalid` and a normal round end respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Seat index outside 0..4
    #[error("seat {0} is out of range")]
    InvalidPlayer(u8),
    /// A call or discard whose precondition does not hold
    #[error("illegal action: {0}")]
    InvalidAction(String),
    /// Drawing into a hand that is already at full size
    #[error("hand is full ({0} tiles)")]
    HandFull(usize),
    /// Discarding from an empty hand or with a bad index
    #[error("no tile at index {index} (hand holds {len})")]
    NoSuchTile { index: usize, len: usize },
    /// The game already ended
    #[error("game is over")]
    GameOver,
    /// An answer was submitted for a seat that is not waiting for one
    #[error("seat {0} is not waiting for input")]
    NotWaiting(u8),
    /// Save file written by an incompatible version
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    /// Malformed content table, config or save data
    #[error("malformed data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Malformed(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
