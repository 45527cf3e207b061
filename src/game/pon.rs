use crate::error::{GameError, GameResult};
use crate::game::player::Player;
use crate::tile::{Group, Tile};

/// Pon handler
pub struct PonHandler;

impl PonHandler {
    /// Whether `player` may pon a discarded `tile`
    ///
    /// Needs two or three matching concealed tiles and no riichi.
    pub fn can_pon(player: &Player, tile: &Tile) -> bool {
        !player.is_riichi() && player.hand.can_pon(*tile)
    }

    /// Call pon, taking the discard from `side` (0 left, 1 across, 2 right)
    ///
    /// # Errors
    ///
    /// `InvalidAction` when `can_pon` does not hold.
    pub fn pon(player: &mut Player, tile: Tile, side: u8) -> GameResult<Group> {
        if !PonHandler::can_pon(player, &tile) {
            return Err(GameError::InvalidAction(format!("seat {} cannot pon {tile}", player.seat)));
        }
        player.hand.pon(tile, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::yaku::RiichiKind;
    use crate::tile::{parse_tiles, GroupKind, Hand};

    fn player(text: &str) -> Player {
        let mut p = Player::new(2, 25_000);
        p.hand = Hand::from_tiles(&parse_tiles(text).unwrap());
        p
    }

    #[test]
    fn test_pon() {
        let mut p = player("55m 123p 456p 789s EE");
        let five = Tile::man(5).unwrap();
        assert!(PonHandler::can_pon(&p, &five));
        let group = PonHandler::pon(&mut p, five, 0).unwrap();
        assert_eq!(group.kind(), GroupKind::Triplet);
        assert_eq!(p.hand.concealed().len(), 11);
        assert!(!p.hand.is_closed());
    }

    #[test]
    fn test_cannot_pon_single_tile() {
        let mut p = player("5m 123p 456p 789s EEE");
        let five = Tile::man(5).unwrap();
        assert!(!PonHandler::can_pon(&p, &five));
        assert!(PonHandler::pon(&mut p, five, 0).is_err());
        assert_eq!(p.hand.concealed().len(), 13);
    }

    #[test]
    fn test_riichi_blocks_pon() {
        let mut p = player("55m 123p 456p 789s E");
        p.declare_riichi(RiichiKind::Single, Vec::new());
        assert!(!PonHandler::can_pon(&p, &Tile::man(5).unwrap()));
    }
}
