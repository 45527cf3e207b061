use crate::error::{GameError, GameResult};
use crate::game::player::Player;
use crate::tile::{Group, Tile};
use smallvec::SmallVec;

/// Chi handler
///
/// Chi is only ever offered to the seat right after the discarder, so the
/// discard always comes from the left.
pub struct ChiHandler;

impl ChiHandler {
    /// Index pairs that complete a run with `tile`; empty in riichi
    pub fn candidates(player: &Player, tile: &Tile) -> SmallVec<[(usize, usize); 3]> {
        if player.is_riichi() {
            return SmallVec::new();
        }
        player.hand.chi_candidates(*tile)
    }

    /// Call chi with the concealed tiles at `pair`
    pub fn chi(player: &mut Player, tile: Tile, pair: (usize, usize)) -> GameResult<Group> {
        if player.is_riichi() {
            return Err(GameError::InvalidAction(format!("seat {} is in riichi", player.seat)));
        }
        player.hand.chi(tile, pair, 0)
    }
}
