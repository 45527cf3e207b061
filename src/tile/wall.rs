use super::tile::{Tile, TileCatalogue};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Dead wall size in slots
pub const DEAD_WALL_SIZE: usize = 14;

/// Maximum dora indicator reveals (the initial one plus one per kan)
pub const MAX_INDICATORS: usize = 5;

/// Maximum kan replacement draws
pub const MAX_REPLACEMENTS: usize = 4;

/// Replacement tile offsets from the dead-wall end, in draw order
const REPLACEMENT_OFFSETS: [usize; MAX_REPLACEMENTS] = [2, 1, 4, 3];

/// Wall
///
/// Slots hold `None` once drawn. Live draws walk forward from the dead-wall
/// end (wrapping) until they meet the dead wall, which is the fixed block of
/// `DEAD_WALL_SIZE` slots just before the dead-wall end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    slots: Vec<Option<Tile>>,
    /// Next live draw position
    cursor: usize,
    /// One past the last dead-wall slot
    dead_end: usize,
    /// Live draws so far
    drawn: usize,
    /// Replacement draws so far
    replacements: usize,
    /// Revealed indicator count
    revealed: usize,
}

impl Wall {
    /// Build an unshuffled wall from the catalogue
    pub fn new(catalogue: &TileCatalogue) -> Self {
        let mut slots = Vec::with_capacity(catalogue.total_tiles());
        for tile in catalogue.kinds() {
            for _ in 0..catalogue.copies {
                slots.push(Some(tile));
            }
        }
        let dead_end = DEAD_WALL_SIZE.min(slots.len());
        Self { slots, cursor: dead_end, dead_end, drawn: 0, replacements: 0, revealed: 0 }
    }

    /// Build and shuffle with a seeded generator
    pub fn shuffled(catalogue: &TileCatalogue, seed: u64) -> Self {
        let mut wall = Self::new(catalogue);
        wall.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        wall
    }

    /// Shuffle all slots and forget any draws
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut tiles: Vec<Tile> = self.slots.iter().flatten().copied().collect();
        tiles.shuffle(rng);
        self.slots = tiles.into_iter().map(Some).collect();
        self.cursor = self.dead_end;
        self.drawn = 0;
        self.replacements = 0;
        self.revealed = 0;
    }

    /// Position the break from the dice total and the dealer seat
    pub fn break_at(&mut self, dice_total: u8, dealer: u8) {
        let len = self.slots.len();
        if len == 0 {
            return;
        }
        let side = len / 4;
        let dead_end = (dice_total as usize * 2 + ((4 - dealer as usize % 4) % 4) * side) % len;
        self.dead_end = dead_end;
        self.cursor = dead_end;
    }

    fn slot_before_end(&self, offset: usize) -> usize {
        let len = self.slots.len();
        (self.dead_end + len - offset % len) % len
    }

    fn dead_start(&self) -> usize {
        self.slot_before_end(DEAD_WALL_SIZE)
    }

    /// Live tiles left before the dead wall
    pub fn remaining(&self) -> usize {
        self.slots.len().saturating_sub(DEAD_WALL_SIZE + self.drawn)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Draw the next live tile
    pub fn draw(&mut self) -> Option<Tile> {
        if self.is_exhausted() {
            return None;
        }
        let tile = self.slots[self.cursor].take();
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.drawn += 1;
        debug_assert!(self.drawn + DEAD_WALL_SIZE <= self.slots.len());
        debug_assert!(self.remaining() > 0 || self.cursor == self.dead_start());
        tile
    }

    /// Draw a kan replacement tile from the dead wall
    ///
    /// Does not change `remaining()`.
    pub fn draw_replacement(&mut self) -> Option<Tile> {
        let offset = *REPLACEMENT_OFFSETS.get(self.replacements)?;
        let index = self.slot_before_end(offset);
        self.replacements += 1;
        self.slots[index].take()
    }

    fn indicator_slot(&self, k: usize) -> usize {
        self.slot_before_end(6 + 2 * k)
    }

    /// Reveal the next dora indicator, up to `MAX_INDICATORS`
    pub fn reveal_indicator(&mut self) -> Option<Tile> {
        if self.revealed >= MAX_INDICATORS {
            return None;
        }
        let tile = self.slots[self.indicator_slot(self.revealed)];
        self.revealed += 1;
        tile
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Revealed indicators, in reveal order
    pub fn dora_indicators(&self) -> Vec<Tile> {
        (0..self.revealed).filter_map(|k| self.slots[self.indicator_slot(k)]).collect()
    }

    /// Ura indicators under each revealed indicator
    pub fn ura_indicators(&self) -> Vec<Tile> {
        (0..self.revealed)
            .filter_map(|k| {
                let index = (self.indicator_slot(k) + 1) % self.slots.len();
                self.slots[index]
            })
            .collect()
    }

    pub fn dora_tiles(&self) -> Vec<Tile> {
        self.dora_indicators().iter().map(Tile::dora_successor).collect()
    }

    pub fn ura_dora_tiles(&self) -> Vec<Tile> {
        self.ura_indicators().iter().map(Tile::dora_successor).collect()
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::new(&TileCatalogue::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_wall_creation() {
        let wall = Wall::default();
        assert_eq!(wall.total_count(), 136);
        assert_eq!(wall.remaining(), 122);
        assert!(!wall.is_exhausted());
    }

    #[test]
    fn test_wall_tile_distribution() {
        let wall = Wall::shuffled(&TileCatalogue::standard(), 7);
        let mut counts = HashMap::new();
        for tile in wall.slots.iter().flatten() {
            *counts.entry(*tile).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 34);
        assert!(counts.values().all(|&c| c == 4));
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let cat = TileCatalogue::standard();
        assert_eq!(Wall::shuffled(&cat, 42), Wall::shuffled(&cat, 42));
        assert_ne!(Wall::shuffled(&cat, 42), Wall::shuffled(&cat, 43));
    }

    #[test]
    fn test_remaining_decreases_per_live_draw_only() {
        let mut wall = Wall::shuffled(&TileCatalogue::standard(), 1);
        wall.break_at(7, 2);
        let before = wall.remaining();
        assert!(wall.draw().is_some());
        assert_eq!(wall.remaining(), before - 1);
        assert!(wall.draw_replacement().is_some());
        assert_eq!(wall.remaining(), before - 1);
    }

    #[test]
    fn test_draw_until_dead_wall() {
        let mut wall = Wall::shuffled(&TileCatalogue::standard(), 3);
        wall.break_at(5, 1);
        let mut count = 0;
        while wall.draw().is_some() {
            count += 1;
        }
        assert_eq!(count, 122);
        assert!(wall.is_exhausted());
        // dead wall untouched by live draws
        assert!(wall.draw_replacement().is_some());
        assert_eq!(wall.reveal_indicator().map(|_| ()), Some(()));
    }

    #[test]
    fn test_indicator_reveals_capped() {
        let mut wall = Wall::shuffled(&TileCatalogue::standard(), 9);
        wall.break_at(12, 3);
        for _ in 0..MAX_INDICATORS {
            assert!(wall.reveal_indicator().is_some());
        }
        assert!(wall.reveal_indicator().is_none());
        assert_eq!(wall.dora_indicators().len(), MAX_INDICATORS);
        assert_eq!(wall.ura_indicators().len(), MAX_INDICATORS);
        assert_eq!(wall.dora_tiles()[0], wall.dora_indicators()[0].dora_successor());
    }

    #[test]
    fn test_replacements_capped() {
        let mut wall = Wall::shuffled(&TileCatalogue::standard(), 11);
        for _ in 0..MAX_REPLACEMENTS {
            assert!(wall.draw_replacement().is_some());
        }
        assert!(wall.draw_replacement().is_none());
        assert!(!wall.is_exhausted());
    }

    #[test]
    fn test_break_wraps() {
        let mut wall = Wall::default();
        wall.break_at(2, 0);
        assert_eq!(wall.dead_end, 4);
        assert_eq!(wall.dead_start(), 126);
        wall.break_at(12, 1);
        assert_eq!(wall.dead_end, 24 + 3 * 34);
    }
}
