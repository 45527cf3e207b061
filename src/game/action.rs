use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// A decision the engine needs from one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// Pick a concealed tile index to discard
    Discard { seat: u8 },
    /// Pick the riichi declaration discard among `options`
    RiichiDiscard { seat: u8, options: Vec<usize> },
    Tsumo { seat: u8 },
    Riichi { seat: u8 },
    KanClosed { seat: u8, tile: Tile },
    KanLate { seat: u8, tile: Tile },
    /// Ron on a discard, or on a tile added to a promoted quad
    Ron { seat: u8, tile: Tile },
    KanOpen { seat: u8, tile: Tile },
    Pon { seat: u8, tile: Tile },
    /// Chi with one of the index pairs, or decline
    Chi { seat: u8, tile: Tile, options: Vec<(usize, usize)> },
}

impl Prompt {
    pub fn seat(&self) -> u8 {
        match self {
            Prompt::Discard { seat }
            | Prompt::RiichiDiscard { seat, .. }
            | Prompt::Tsumo { seat }
            | Prompt::Riichi { seat }
            | Prompt::KanClosed { seat, .. }
            | Prompt::KanLate { seat, .. }
            | Prompt::Ron { seat, .. }
            | Prompt::KanOpen { seat, .. }
            | Prompt::Pon { seat, .. }
            | Prompt::Chi { seat, .. } => *seat,
        }
    }

    /// A claim on another seat's tile, asked inside a call window
    pub fn is_claim(&self) -> bool {
        matches!(
            self,
            Prompt::Ron { .. } | Prompt::KanOpen { .. } | Prompt::Pon { .. } | Prompt::Chi { .. }
        )
    }

    /// Whether `answer` has the right shape for this prompt
    pub fn accepts(&self, answer: &Answer, hand_len: usize) -> bool {
        match (self, answer) {
            (Prompt::Discard { .. }, Answer::Tile(index)) => *index < hand_len,
            (Prompt::RiichiDiscard { options, .. }, Answer::Tile(index)) => options.contains(index),
            (Prompt::Chi { options, .. }, Answer::Chi(Some(pair))) => options.contains(pair),
            (Prompt::Chi { .. }, Answer::Chi(None) | Answer::No | Answer::Cancel) => true,
            (Prompt::Discard { .. } | Prompt::RiichiDiscard { .. } | Prompt::Chi { .. }, _) => false,
            (_, Answer::Yes | Answer::No | Answer::Cancel) => true,
            _ => false,
        }
    }
}

/// An answer submitted for a human seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
    /// Concealed tile index
    Tile(usize),
    /// Chosen chi pair, or `None` to decline
    Chi(Option<(usize, usize)>),
    /// Decline every call for the rest of the current discard
    Cancel,
}

/// Result of asking a decider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<T> {
    Made(T),
    /// No answer yet; the engine suspends until one is submitted
    Pending,
}

impl<T> Decision<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decision<U> {
        match self {
            Decision::Made(value) => Decision::Made(f(value)),
            Decision::Pending => Decision::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_accepts() {
        let discard = Prompt::Discard { seat: 0 };
        assert!(discard.accepts(&Answer::Tile(3), 14));
        assert!(!discard.accepts(&Answer::Tile(14), 14));
        assert!(!discard.accepts(&Answer::Yes, 14));

        let chi = Prompt::Chi { seat: 1, tile: Tile::man(3).unwrap(), options: vec![(0, 1)] };
        assert!(chi.accepts(&Answer::Chi(Some((0, 1))), 13));
        assert!(!chi.accepts(&Answer::Chi(Some((1, 2))), 13));
        assert!(chi.accepts(&Answer::Cancel, 13));

        let pon = Prompt::Pon { seat: 2, tile: Tile::EAST };
        assert!(pon.accepts(&Answer::No, 13));
        assert!(!pon.accepts(&Answer::Tile(0), 13));
        assert_eq!(pon.seat(), 2);
    }

    #[test]
    fn test_decision_map() {
        assert_eq!(Decision::Made(2).map(|x| x * 2), Decision::Made(4));
        assert_eq!(Decision::<u8>::Pending.map(|x| x * 2), Decision::Pending);
    }
}
