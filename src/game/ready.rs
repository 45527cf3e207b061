use crate::tile::{Decomposer, Hand, Tile};

/// Tenpai checker
///
/// All queries speculate on the hand in place and leave it exactly as it
/// was on return.
pub struct ReadyChecker;

impl ReadyChecker {
    /// Tiles that would complete a 13-tile hand
    ///
    /// A candidate already held four times (called groups included) is
    /// skipped: it cannot be drawn.
    pub fn waits(hand: &mut Hand, pool: &[Tile], decomposer: &mut Decomposer) -> Vec<Tile> {
        let mut waits = Vec::new();
        for &candidate in pool {
            if hand.total_count(candidate) >= 4 {
                continue;
            }
            let complete = hand.with_candidate(candidate, |h| {
                decomposer.decompose(h.concealed(), h.called()).is_complete()
            });
            if complete {
                waits.push(candidate);
            }
        }
        waits
    }

    /// Whether adding some tile from `pool` completes the hand
    pub fn is_tenpai(hand: &mut Hand, pool: &[Tile], decomposer: &mut Decomposer) -> bool {
        pool.iter().any(|&candidate| {
            hand.total_count(candidate) < 4
                && hand.with_candidate(candidate, |h| {
                    decomposer.decompose(h.concealed(), h.called()).is_complete()
                })
        })
    }

    /// Tenpai after discarding the tile at `index` from a 14-tile hand
    pub fn is_tenpai_after_discard(
        hand: &mut Hand,
        index: usize,
        pool: &[Tile],
        decomposer: &mut Decomposer,
    ) -> bool {
        hand.with_removed(index, |h| Self::is_tenpai(h, pool, decomposer))
            .unwrap_or(false)
    }

    /// Indices of every discard that leaves the hand tenpai
    pub fn tenpai_discards(hand: &mut Hand, pool: &[Tile], decomposer: &mut Decomposer) -> Vec<usize> {
        (0..hand.concealed().len())
            .filter(|&index| Self::is_tenpai_after_discard(hand, index, pool, decomposer))
            .collect()
    }
}
