use super::constants::{HONBA_RON, HONBA_TSUMO, NOTEN_POOL, NUM_PLAYERS, RIICHI_STAKE};
use serde::{Deserialize, Serialize};

/// How a hand was won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinMethod {
    /// On a discard (or a robbed kan tile) from `discarder`
    Ron { discarder: u8 },
    Tsumo,
}

/// Score changes of one settlement, indexed by seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Points gained (positive) or paid (negative) per seat
    pub deltas: [i32; 4],
    pub description: String,
}

impl SettlementResult {
    /// Sum of all deltas; zero unless a riichi pot was paid out
    pub fn net(&self) -> i32 {
        self.deltas.iter().sum()
    }
}

/// Round to the nearest 100, halves up
pub fn round_to_hundred(points: u32) -> i32 {
    ((points + 50) / 100 * 100) as i32
}

/// Round settlement calculator
pub struct Settlement;

impl Settlement {
    /// Payments for a win
    ///
    /// Ron: the discarder pays basic points ×6 (dealer winner) or ×4, plus
    /// 300 per honba. Tsumo: each other seat pays ×2 when the dealer won;
    /// otherwise the dealer pays ×2 and the rest ×1, each plus 100 per honba.
    /// The winner also collects the riichi pot.
    pub fn win(
        winner: u8,
        method: WinMethod,
        base_points: u32,
        dealer: u8,
        honba: u32,
        riichi_sticks: u32,
    ) -> SettlementResult {
        let mut deltas = [0i32; 4];
        let dealer_won = winner == dealer;
        let honba = honba as i32;

        let description = match method {
            WinMethod::Ron { discarder } => {
                let multiplier = if dealer_won { 6 } else { 4 };
                let pay = round_to_hundred(base_points * multiplier) + honba * HONBA_RON;
                deltas[discarder as usize] -= pay;
                deltas[winner as usize] += pay;
                format!("seat {winner} ron on seat {discarder}: {pay}")
            }
            WinMethod::Tsumo => {
                for seat in (0..NUM_PLAYERS).filter(|&s| s != winner) {
                    let multiplier = if dealer_won || seat == dealer { 2 } else { 1 };
                    let pay = round_to_hundred(base_points * multiplier) + honba * HONBA_TSUMO;
                    deltas[seat as usize] -= pay;
                    deltas[winner as usize] += pay;
                }
                format!("seat {winner} tsumo: {}", deltas[winner as usize])
            }
        };

        deltas[winner as usize] += riichi_sticks as i32 * RIICHI_STAKE;
        SettlementResult { deltas, description }
    }

    /// Noten payments at an exhaustive draw
    ///
    /// The pool is split evenly among tenpai seats and paid evenly by noten
    /// seats; nothing moves when everyone or nobody is tenpai.
    pub fn exhaustive_draw(tenpai: [bool; 4]) -> SettlementResult {
        let mut deltas = [0i32; 4];
        let ready = tenpai.iter().filter(|t| **t).count() as i32;
        if ready > 0 && ready < 4 {
            let gain = NOTEN_POOL / ready;
            let loss = NOTEN_POOL / (4 - ready);
            for (seat, is_tenpai) in tenpai.iter().enumerate() {
                deltas[seat] = if *is_tenpai { gain } else { -loss };
            }
        }
        SettlementResult { deltas, description: format!("exhaustive draw, {ready} tenpai") }
    }
}
