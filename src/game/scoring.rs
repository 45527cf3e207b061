use super::constants::{LIMIT_THRESHOLD, YAKUMAN_BASE};
use super::content::{YakuId, YakuTable};
use super::fu::FuCalculator;
use super::yaku::{YakuContext, YakuEvaluator};
use crate::tile::{Decomposer, Decomposition, Hand, Tile, TileCatalogue};
use log::debug;
use serde::{Deserialize, Serialize};

/// Limit tier reached by a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitHand {
    Mangan,
    Haneman,
    Baiman,
    Sanbaiman,
    /// Reached through han alone
    CountedYakuman,
    Yakuman,
}

impl LimitHand {
    /// Display name used in logs and round summaries
    pub fn name(self) -> &'static str {
        match self {
            LimitHand::Mangan => "Mangan",
            LimitHand::Haneman => "Haneman",
            LimitHand::Baiman => "Baiman",
            LimitHand::Sanbaiman => "Sanbaiman",
            LimitHand::CountedYakuman => "Counted Yakuman",
            LimitHand::Yakuman => "Yakuman",
        }
    }
}

/// Hand value before settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandScore {
    /// Includes the fixed +2 offset
    pub han: u32,
    /// Rounded up to ten, or 25 for seven pairs
    pub fu: u32,
    /// Basic points, multiplied at settlement
    pub base_points: u32,
    /// Set when the basic points were capped
    pub limit: Option<LimitHand>,
}

/// Score translator
pub struct ScoreTranslator;

impl ScoreTranslator {
    /// Basic points of a yaku list
    ///
    /// Yakuman lists score 8000 per entry. Otherwise
    /// `han = 2 + dora + sum(han)` and basic points are `fu * 2^han`, replaced
    /// by the limit table once they pass 2000.
    pub fn score(yaku: &[YakuId], table: &YakuTable, closed: bool, fu: u32, dora: u32) -> HandScore {
        let yakuman = yaku.iter().filter(|id| table.is_yakuman(**id)).count() as u32;
        if yakuman > 0 {
            return HandScore {
                han: 0,
                fu,
                base_points: yakuman * YAKUMAN_BASE,
                limit: Some(LimitHand::Yakuman),
            };
        }

        let han = 2 + dora + yaku.iter().map(|id| table.get(*id).han(closed)).sum::<u32>();
        let raw = u64::from(fu) << han.min(40);
        if raw <= u64::from(LIMIT_THRESHOLD) {
            return HandScore { han, fu, base_points: raw as u32, limit: None };
        }
        let (base_points, limit) = match han {
            0..=7 => (2_000, LimitHand::Mangan),
            8..=9 => (3_000, LimitHand::Haneman),
            10..=12 => (4_000, LimitHand::Baiman),
            13..=14 => (6_000, LimitHand::Sanbaiman),
            _ => (8_000, LimitHand::CountedYakuman),
        };
        HandScore { han, fu, base_points, limit: Some(limit) }
    }
}

/// Everything known about a winning hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinDetails {
    /// The reading that scored best
    pub decomposition: Decomposition,
    /// Yaku in table order; yakuman alone when any applies
    pub yaku: Vec<YakuId>,
    pub fu: u32,
    /// Dora hits, not yaku: they never make a hand winnable
    pub dora: u32,
    /// Counted for riichi hands only
    pub ura_dora: u32,
    pub score: HandScore,
}

/// Count hand tiles matching dora; repeated dora count repeatedly
pub fn count_dora(tiles: &[Tile], dora: &[Tile]) -> u32 {
    dora.iter()
        .map(|d| tiles.iter().filter(|t| *t == d).count() as u32)
        .sum()
}

/// Decompose, compute fu and yaku, and score a complete hand
///
/// Owns the decomposer cache and the yaku table. A seven-pairs hand that
/// also groups normally is scored both ways, as is a winning tile that
/// could have completed more than one group; the best reading wins.
pub struct HandEvaluator {
    decomposer: Decomposer,
    table: YakuTable,
}

impl HandEvaluator {
    pub fn new(catalogue: &TileCatalogue, table: YakuTable) -> Self {
        Self { decomposer: Decomposer::new(catalogue), table }
    }

    /// Yaku names and han values this evaluator scores with
    pub fn table(&self) -> &YakuTable {
        &self.table
    }

    /// Shared with tenpai checks so both hit the same cache
    pub fn decomposer_mut(&mut self) -> &mut Decomposer {
        &mut self.decomposer
    }

    /// Evaluate a 14-tile hand that already holds the winning tile
    ///
    /// `None` when the hand is incomplete or has no yaku. Ura dora only count
    /// for a riichi hand.
    pub fn evaluate(
        &mut self,
        hand: &Hand,
        ctx: &YakuContext,
        dora: &[Tile],
        ura_dora: &[Tile],
    ) -> Option<WinDetails> {
        let primary = self.decomposer.decompose(hand.concealed(), hand.called());
        if !primary.is_complete() {
            return None;
        }
        let mut readings = vec![primary];
        if readings[0].special().is_some() {
            let general = self.decomposer.decompose_general(hand.concealed(), hand.called());
            if general.is_complete() {
                readings.push(general);
            }
        }

        let tiles = hand.all_tiles();
        let dora_count = count_dora(&tiles, dora);
        let ura_count = if ctx.riichi.is_some() { count_dora(&tiles, ura_dora) } else { 0 };

        let table = &self.table;
        readings
            .into_iter()
            .flat_map(|decomposition| {
                FuCalculator::readings(&decomposition, &ctx.fu_context())
                    .into_iter()
                    .map(move |(winning_group, fu)| (decomposition.clone(), winning_group, fu))
            })
            .filter_map(|(decomposition, winning_group, fu)| {
                let mut ctx = ctx.clone();
                ctx.fu = fu;
                ctx.winning_group = winning_group;
                let yaku = YakuEvaluator::evaluate(&decomposition, &ctx, table);
                if !YakuEvaluator::has_yaku(&yaku, table, ctx.closed) {
                    return None;
                }
                let score = ScoreTranslator::score(&yaku, table, ctx.closed, fu, dora_count + ura_count);
                Some(WinDetails { decomposition, yaku, fu, dora: dora_count, ura_dora: ura_count, score })
            })
            .max_by_key(|w| w.score.base_points)
            .inspect(|w| {
                debug!(
                    "hand scored {} basic points ({} fu, {} han)",
                    w.score.base_points, w.fu, w.score.han
                )
            })
    }
}

impl Default for HandEvaluator {
    fn default() -> Self {
        Self::new(&TileCatalogue::standard(), YakuTable::standard())
    }
}
