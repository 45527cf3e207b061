use crate::game::constants::CALL_INTERRUPT_PENALTY;
use crate::game::yaku::RiichiKind;
use crate::tile::{Hand, Tile, Wind};
use serde::{Deserialize, Serialize};

/// One discard in a seat's river
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardRecord {
    pub tile: Tile,
    /// Claimed by another seat (still counts for furiten)
    pub called: bool,
    /// Riichi declaration tile, shown sideways
    pub riichi: bool,
}

/// Riichi declaration state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiichiState {
    /// Single, or double when declared on the first discard
    pub kind: RiichiKind,
    /// Turns since declaration; a call anywhere adds a large penalty
    pub turns: u32,
    /// Index of the declaration tile in the discard river
    pub discard_position: usize,
    /// Winning tiles frozen at declaration
    pub wait: Vec<Tile>,
}

/// Player state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Fixed table position, 0 to 3
    pub seat: u8,
    pub hand: Hand,
    /// River in discard order, claimed tiles included
    pub discards: Vec<DiscardRecord>,
    pub score: i32,
    /// Change from the last settlement
    pub score_delta: i32,
    /// Wind for this round; East is the dealer
    pub seat_wind: Wind,
    /// Set from the declaration discard to the end of the round
    pub riichi: Option<RiichiState>,
    /// No discard yet and no call has interrupted the first go-around
    pub first_turn: bool,
    /// Declined a ron since the last own discard
    ///
    /// While in riichi this never clears.
    pub passed_ron: bool,
}

impl Player {
    pub fn new(seat: u8, score: i32) -> Self {
        Self {
            seat,
            hand: Hand::new(),
            discards: Vec::new(),
            score,
            score_delta: 0,
            seat_wind: Wind::East,
            riichi: None,
            first_turn: true,
            passed_ron: false,
        }
    }

    /// Clear everything per-round; the score carries over
    pub fn reset_for_round(&mut self, seat_wind: Wind) {
        self.hand.clear();
        self.discards.clear();
        self.seat_wind = seat_wind;
        self.riichi = None;
        self.first_turn = true;
        self.passed_ron = false;
        self.score_delta = 0;
    }

    pub fn is_riichi(&self) -> bool {
        self.riichi.is_some()
    }

    pub fn is_dealer(&self) -> bool {
        self.seat_wind == Wind::East
    }

    /// Discard the tile at `index` into the river
    pub fn discard(&mut self, index: usize) -> crate::error::GameResult<Tile> {
        let tile = self.hand.discard(index)?;
        self.discards.push(DiscardRecord { tile, called: false, riichi: false });
        self.first_turn = false;
        if self.riichi.is_none() {
            self.passed_ron = false;
        }
        Ok(tile)
    }

    /// Mark the newest discard as claimed
    pub fn mark_last_discard_called(&mut self) {
        if let Some(last) = self.discards.last_mut() {
            last.called = true;
        }
    }

    /// Lock in riichi; call right after the declaration discard
    pub fn declare_riichi(&mut self, kind: RiichiKind, wait: Vec<Tile>) {
        let discard_position = self.discards.len().saturating_sub(1);
        if let Some(last) = self.discards.last_mut() {
            last.riichi = true;
        }
        self.riichi = Some(RiichiState { kind, turns: 0, discard_position, wait });
    }

    /// Advance the ippatsu counter; called at the end of every turn
    pub fn tick_riichi(&mut self) {
        if let Some(riichi) = self.riichi.as_mut() {
            riichi.turns += 1;
        }
    }

    /// A call anywhere ends ippatsu and the first go-around
    pub fn interrupt(&mut self) {
        if let Some(riichi) = self.riichi.as_mut() {
            riichi.turns += CALL_INTERRUPT_PENALTY;
        }
        self.first_turn = false;
    }

    /// Furiten: a wait is in the own river, or a ron was declined
    pub fn is_furiten(&self, waits: &[Tile]) -> bool {
        self.passed_ron || self.discards.iter().any(|d| waits.contains(&d.tile))
    }

    pub fn apply_delta(&mut self, delta: i32) {
        self.score += delta;
        self.score_delta = delta;
    }
}
