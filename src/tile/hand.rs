use super::group::{Group, GroupKind, QuadKind};
use super::tile::Tile;
use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tile count of a complete hand (called groups count as 3)
pub const COMPLETE_SIZE: usize = 14;

/// Hand
///
/// A concealed tile list (draw order kept, the newest tile last) plus the
/// ordered called groups. `tile_num()` counts every called group as three
/// tiles, quads included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hand {
    concealed: Vec<Tile>,
    called: Vec<Group>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tiles(tiles: &[Tile]) -> Self {
        Self { concealed: tiles.to_vec(), called: Vec::new() }
    }

    pub fn with_called(tiles: &[Tile], called: &[Group]) -> Self {
        Self { concealed: tiles.to_vec(), called: called.to_vec() }
    }

    pub fn concealed(&self) -> &[Tile] {
        &self.concealed
    }

    pub fn called(&self) -> &[Group] {
        &self.called
    }

    /// `concealed + 3 * called`
    pub fn tile_num(&self) -> usize {
        self.concealed.len() + 3 * self.called.len()
    }

    pub fn is_full(&self) -> bool {
        self.tile_num() >= COMPLETE_SIZE
    }

    /// Closed unless some called group other than a closed quad exists
    pub fn is_closed(&self) -> bool {
        self.called.iter().all(|g| !g.opens_hand())
    }

    /// Copies of `tile` among the concealed tiles
    pub fn count(&self, tile: Tile) -> usize {
        self.concealed.iter().filter(|&&t| t == tile).count()
    }

    /// Copies of `tile` anywhere in the hand, called groups included
    pub fn total_count(&self, tile: Tile) -> usize {
        self.count(tile)
            + self
                .called
                .iter()
                .flat_map(|g| g.tiles())
                .filter(|&t| t == tile)
                .count()
    }

    /// Last concealed tile (the most recent draw)
    pub fn newest(&self) -> Option<Tile> {
        self.concealed.last().copied()
    }

    pub fn sorted(&self) -> Vec<Tile> {
        let mut tiles = self.concealed.clone();
        tiles.sort();
        tiles
    }

    /// Every tile in the hand, called groups expanded
    pub fn all_tiles(&self) -> Vec<Tile> {
        let mut tiles = self.concealed.clone();
        tiles.extend(self.called.iter().flat_map(|g| g.tiles()));
        tiles
    }

    /// Add a drawn tile
    pub fn draw(&mut self, tile: Tile) -> GameResult<()> {
        if self.is_full() {
            return Err(GameError::HandFull(self.tile_num()));
        }
        self.concealed.push(tile);
        Ok(())
    }

    /// Remove the tile at `index`
    pub fn discard(&mut self, index: usize) -> GameResult<Tile> {
        if index >= self.concealed.len() {
            return Err(GameError::NoSuchTile { index, len: self.concealed.len() });
        }
        Ok(self.concealed.remove(index))
    }

    pub fn position(&self, tile: Tile) -> Option<usize> {
        self.concealed.iter().position(|&t| t == tile)
    }

    /// Remove one copy of `tile`
    pub fn remove_tile(&mut self, tile: Tile) -> bool {
        match self.position(tile) {
            Some(index) => {
                self.concealed.remove(index);
                true
            }
            None => false,
        }
    }

    fn remove_copies(&mut self, tile: Tile, copies: usize) -> GameResult<()> {
        if self.count(tile) < copies {
            return Err(GameError::InvalidAction(format!("need {copies} x {tile} in hand")));
        }
        for _ in 0..copies {
            self.remove_tile(tile);
        }
        Ok(())
    }

    /// Run `f` against the hand with `tile` appended; always restored
    pub fn with_candidate<R>(&mut self, tile: Tile, f: impl FnOnce(&Hand) -> R) -> R {
        self.concealed.push(tile);
        let result = f(self);
        self.concealed.pop();
        result
    }

    /// Run `f` with the tile at `index` taken out; it is put back at the
    /// same index afterwards
    pub fn with_removed<R>(&mut self, index: usize, f: impl FnOnce(&mut Hand) -> R) -> Option<R> {
        if index >= self.concealed.len() {
            return None;
        }
        let tile = self.concealed.remove(index);
        let before = self.concealed.len();
        let result = f(self);
        debug_assert_eq!(self.concealed.len(), before, "speculative closure left the hand changed");
        self.concealed.insert(index.min(self.concealed.len()), tile);
        Some(result)
    }

    /// Pon: 2 or 3 matching concealed tiles (4 is reserved for kan)
    pub fn can_pon(&self, tile: Tile) -> bool {
        matches!(self.count(tile), 2 | 3)
    }

    /// Open kan on a discard: exactly 3 matching concealed tiles
    pub fn can_open_kan(&self, tile: Tile) -> bool {
        self.count(tile) == 3
    }

    /// Index pairs of concealed tiles that form a run with `tile`
    ///
    /// Empty for honours. Order: `tile` as the high, middle then low end.
    pub fn chi_candidates(&self, tile: Tile) -> SmallVec<[(usize, usize); 3]> {
        let mut candidates = SmallVec::new();
        if tile.is_honour() {
            return candidates;
        }
        let rank = tile.rank() as i8;
        for (a, b) in [(-2i8, -1i8), (-1, 1), (1, 2)] {
            let pick = |delta: i8| {
                let r = rank + delta;
                if !(1..=9).contains(&r) {
                    return None;
                }
                Tile::new(tile.suit(), r as u8).and_then(|t| self.position(t))
            };
            if let (Some(i), Some(j)) = (pick(a), pick(b)) {
                candidates.push((i, j));
            }
        }
        candidates
    }

    /// Concealed identities held four times
    pub fn closed_kan_tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.sorted();
        tiles.dedup();
        tiles.retain(|&t| self.count(t) == 4);
        tiles
    }

    /// Concealed tiles matching a called triplet
    pub fn late_kan_tiles(&self) -> Vec<Tile> {
        self.called
            .iter()
            .filter(|g| g.kind() == GroupKind::Triplet && !g.is_concealed())
            .map(|g| g.anchor())
            .filter(|&t| self.count(t) > 0)
            .collect()
    }

    pub fn pon(&mut self, tile: Tile, side: u8) -> GameResult<Group> {
        if !self.can_pon(tile) {
            return Err(GameError::InvalidAction(format!("cannot pon {tile}")));
        }
        let group = Group::called(GroupKind::Triplet, tile, side)
            .ok_or_else(|| GameError::InvalidAction(format!("bad call side {side}")))?;
        self.remove_copies(tile, 2)?;
        self.called.push(group);
        Ok(group)
    }

    /// Chi using the concealed tiles at `pair`
    pub fn chi(&mut self, tile: Tile, pair: (usize, usize), side: u8) -> GameResult<Group> {
        if !self.chi_candidates(tile).contains(&pair) {
            // any pair of indices naming the same two identities is accepted
            let same = self.chi_candidates(tile).iter().any(|&(i, j)| {
                self.concealed.get(pair.0) == self.concealed.get(i)
                    && self.concealed.get(pair.1) == self.concealed.get(j)
            });
            if !same {
                return Err(GameError::InvalidAction(format!("cannot chi {tile} with {pair:?}")));
            }
        }
        let a = self.concealed[pair.0];
        let b = self.concealed[pair.1];
        let anchor = [tile, a, b].into_iter().min().unwrap_or(tile);
        let group = Group::called(GroupKind::Run, anchor, side)
            .ok_or_else(|| GameError::InvalidAction(format!("bad chi anchor {anchor}")))?;
        self.remove_tile(a);
        self.remove_tile(b);
        self.called.push(group);
        Ok(group)
    }

    pub fn open_kan(&mut self, tile: Tile, side: u8) -> GameResult<Group> {
        if !self.can_open_kan(tile) {
            return Err(GameError::InvalidAction(format!("cannot open kan {tile}")));
        }
        let group = Group::called(GroupKind::Quad(QuadKind::Open), tile, side)
            .ok_or_else(|| GameError::InvalidAction(format!("bad call side {side}")))?;
        self.remove_copies(tile, 3)?;
        self.called.push(group);
        Ok(group)
    }

    pub fn closed_kan(&mut self, tile: Tile) -> GameResult<Group> {
        self.remove_copies(tile, 4)?;
        let group = Group::closed_quad(tile);
        self.called.push(group);
        Ok(group)
    }

    /// Promote a called triplet with the matching concealed tile
    pub fn late_kan(&mut self, tile: Tile) -> GameResult<Group> {
        let slot = self
            .called
            .iter()
            .position(|g| g.kind() == GroupKind::Triplet && g.anchor() == tile && !g.is_concealed())
            .ok_or_else(|| GameError::InvalidAction(format!("no called triplet of {tile}")))?;
        let promoted = self.called[slot]
            .promoted()
            .ok_or_else(|| GameError::InvalidAction(format!("cannot promote {tile}")))?;
        self.remove_copies(tile, 1)?;
        self.called[slot] = promoted;
        Ok(promoted)
    }

    pub fn clear(&mut self) {
        self.concealed.clear();
        self.called.clear();
    }
}
