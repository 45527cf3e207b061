use crate::error::{GameError, GameResult};
use crate::game::player::Player;
use crate::tile::{Group, Tile};
use serde::{Deserialize, Serialize};

/// Kan kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KanType {
    /// On a discard, with a concealed triplet
    Open,
    /// Four concealed tiles
    Closed,
    /// Promoting a called triplet with the fourth tile
    Late,
}

/// Kan handler
///
/// Quad bookkeeping only: the dora reveal and replacement draw are the
/// engine's job.
pub struct KanHandler;

impl KanHandler {
    /// Open kan on a discard: three concealed copies, not in riichi
    pub fn can_open_kan(player: &Player, tile: &Tile) -> bool {
        !player.is_riichi() && player.hand.can_open_kan(*tile)
    }

    /// Closed kan candidates; none once the seat is in riichi
    pub fn closed_kan_options(player: &Player) -> Vec<Tile> {
        if player.is_riichi() {
            return Vec::new();
        }
        player.hand.closed_kan_tiles()
    }

    /// Late kan candidates; a riichi hand holds no called triplet
    pub fn late_kan_options(player: &Player) -> Vec<Tile> {
        if player.is_riichi() {
            return Vec::new();
        }
        player.hand.late_kan_tiles()
    }

    /// Declare a kan of `kind`; `side` is only used for open kans
    ///
    /// # Errors
    ///
    /// `InvalidAction` when the hand does not hold the needed tiles.
    pub fn kan(player: &mut Player, kind: KanType, tile: Tile, side: u8) -> GameResult<Group> {
        match kind {
            KanType::Open => {
                if !KanHandler::can_open_kan(player, &tile) {
                    return Err(GameError::InvalidAction(format!(
                        "seat {} cannot open kan {tile}",
                        player.seat
                    )));
                }
                player.hand.open_kan(tile, side)
            }
            KanType::Closed => player.hand.closed_kan(tile),
            KanType::Late => player.hand.late_kan(tile),
        }
    }
}
