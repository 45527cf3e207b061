use super::action::Prompt;
use super::config::GameConfig;
use super::constants::NUM_PLAYERS;
use super::content::YakuId;
use super::kan::KanType;
use super::player::Player;
use super::scoring::HandScore;
use super::settlement::{SettlementResult, WinMethod};
use super::yaku::{RiichiKind, YakuContext};
use crate::error::{GameError, GameResult};
use crate::tile::{Group, Tile, TileCatalogue, Wall, Wind};
use serde::{Deserialize, Serialize};

/// State machine stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    RoundSetup,
    DealerDetermination,
    WallBreak,
    InitialDeal,
    /// Other seats may claim the last discard (or rob a promoted kan)
    TurnDrawCheck,
    TurnDraw,
    /// The active seat holds 14 tiles and acts
    TurnMid,
    TurnEnd,
    RoundEnd,
    GameEnd,
}

/// Round counters carried between rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundContext {
    /// Prevailing wind, East then South
    pub round_wind: Wind,
    /// 1..=4 within the wind
    pub round_number: u8,
    /// Seat holding East this round
    pub dealer: u8,
    /// Repeat counter, worth 300 points per win
    pub honba: u32,
    /// Riichi sticks waiting for the next winner
    pub riichi_sticks: u32,
    /// Play a single wind instead of East and South
    pub east_only: bool,
}

impl RoundContext {
    pub fn new(east_only: bool) -> Self {
        Self { round_wind: Wind::East, round_number: 1, dealer: 0, honba: 0, riichi_sticks: 0, east_only }
    }

    pub fn seat_wind(&self, seat: u8) -> Wind {
        Wind::for_seat(seat, self.dealer)
    }

    /// "East 1", "South 3 (2 honba)" and so on
    pub fn label(&self) -> String {
        let wind = match self.round_wind {
            Wind::East => "East",
            Wind::South => "South",
            Wind::West => "West",
            Wind::North => "North",
        };
        if self.honba == 0 {
            format!("{wind} {}", self.round_number)
        } else {
            format!("{wind} {} ({} honba)", self.round_number, self.honba)
        }
    }

    /// Whether the round counter is past the last round of the game
    pub fn past_last_round(&self) -> bool {
        match self.round_wind {
            Wind::East => false,
            Wind::South => self.east_only,
            _ => true,
        }
    }
}

/// Why a round ended without a winner before the wall ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// Four kans declared by more than one seat
    FourKans,
    FourRiichi,
}

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Win {
        winner: u8,
        method: WinMethod,
        yaku: Vec<YakuId>,
        score: HandScore,
        payout: SettlementResult,
    },
    ExhaustiveDraw {
        tenpai: [bool; 4],
        payout: SettlementResult,
    },
    Abort(AbortReason),
}

impl RoundOutcome {
    pub fn deltas(&self) -> [i32; 4] {
        match self {
            RoundOutcome::Win { payout, .. } | RoundOutcome::ExhaustiveDraw { payout, .. } => payout.deltas,
            RoundOutcome::Abort(_) => [0; 4],
        }
    }
}

/// What opened a call window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    Discard,
    /// Tile added to a promoted quad; only ron is offered
    Chankan,
}

/// Call priority, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallTier {
    Ron,
    Kan,
    Pon,
    Chi,
}

impl CallTier {
    pub fn next(self) -> Option<CallTier> {
        match self {
            CallTier::Ron => Some(CallTier::Kan),
            CallTier::Kan => Some(CallTier::Pon),
            CallTier::Pon => Some(CallTier::Chi),
            CallTier::Chi => None,
        }
    }
}

/// Claims being resolved on one tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallWindow {
    /// Discard or a late kan open to robbing
    pub kind: WindowKind,
    pub tile: Tile,
    /// Seat the tile came from; never asked
    pub discarder: u8,
    /// Tier being asked, ron first
    pub tier: CallTier,
    /// Seats already asked in the current tier
    pub asked: Vec<u8>,
    /// Seats that cancelled every call on this tile
    pub cancelled: Vec<u8>,
}

impl CallWindow {
    pub fn new(kind: WindowKind, tile: Tile, discarder: u8) -> Self {
        Self { kind, tile, discarder, tier: CallTier::Ron, asked: Vec::new(), cancelled: Vec::new() }
    }

    /// May `seat` still be asked at the current tier
    pub fn is_open_to(&self, seat: u8) -> bool {
        seat != self.discarder && !self.asked.contains(&seat) && !self.cancelled.contains(&seat)
    }
}

/// Options the active seat turned down this turn
///
/// Cleared at `TurnEnd`. A kan replacement only clears `tsumo`, since
/// that decline was about the tile it replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineLatch {
    /// Tsumo was offered and turned down
    pub tsumo: bool,
    /// Promotions turned down, by tile
    pub late_kan: Vec<Tile>,
    pub closed_kan: Vec<Tile>,
    /// Riichi was offered and turned down
    pub riichi: bool,
}

/// Notifications for the presentation layer, drained from the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { label: String, dealer: u8 },
    DiceRolled { dice: (u8, u8) },
    DoraRevealed { indicator: Tile },
    Drew { seat: u8, tile: Tile, replacement: bool },
    Discarded { seat: u8, tile: Tile, riichi: bool },
    Called { seat: u8, from: u8, group: Group },
    Kan { seat: u8, kind: KanType, tile: Tile },
    Riichi { seat: u8, kind: RiichiKind },
    Won { winner: u8, method: WinMethod, yaku: Vec<YakuId>, score: HandScore },
    DrawGame { tenpai: [bool; 4] },
    Aborted { reason: AbortReason },
    ScoresChanged { deltas: [i32; 4], scores: [i32; 4] },
    GameEnded { scores: [i32; 4] },
}

/// Complete game state
///
/// Everything needed to resume a game mid-round; the engine's caches and
/// agents are rebuilt around it on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Wind, dealer and stick counters
    pub round: RoundContext,
    /// Indexed by seat
    pub players: [Player; 4],
    /// Live and dead wall for the current round
    pub wall: Wall,
    /// Tile set the wall is rebuilt from each round
    pub catalogue: TileCatalogue,
    /// Next stage `step` will run
    pub stage: Stage,
    /// Seat whose turn it is
    pub active: u8,
    /// Seat and tile of the newest discard still on the table
    pub last_discard: Option<(u8, Tile)>,
    /// Claims still being resolved, if any
    pub call_window: Option<CallWindow>,
    /// Declines of the active seat this turn
    pub latch: DeclineLatch,
    /// The active seat drew (or took a replacement) this turn
    pub fresh_draw: bool,
    /// The newest tile of the active seat is a kan replacement
    pub after_kan: bool,
    /// Riichi accepted, declaration discard not chosen yet
    pub riichi_pending: bool,
    /// Declaring seat of every kan this round, in order
    pub kan_seats: Vec<u8>,
    /// Late kan robbed or completed after the chankan window
    pub pending_kan: Option<(u8, Tile)>,
    /// Dealer-determination roll
    pub dice: (u8, u8),
    /// Wall-break roll
    pub break_dice: (u8, u8),
    /// Random seat offset added to the first dealer roll
    pub dealer_offset: u8,
    /// Prompt a human seat has not answered yet
    pub pending: Option<Prompt>,
    /// Result of the round once it has ended
    pub outcome: Option<RoundOutcome>,
    /// Base seed; each round shuffles with seed plus round index
    pub seed: u64,
    /// Rounds played so far, including repeats
    pub round_index: u64,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            round: RoundContext::new(config.east_only),
            players: std::array::from_fn(|seat| Player::new(seat as u8, config.starting_score)),
            wall: Wall::new(&config.catalogue),
            catalogue: config.catalogue.clone(),
            stage: Stage::RoundSetup,
            active: 0,
            last_discard: None,
            call_window: None,
            latch: DeclineLatch::default(),
            fresh_draw: false,
            after_kan: false,
            riichi_pending: false,
            kan_seats: Vec::new(),
            pending_kan: None,
            dice: (1, 1),
            break_dice: (1, 1),
            dealer_offset: 0,
            pending: None,
            outcome: None,
            seed: config.seed,
            round_index: 0,
        }
    }

    pub fn player(&self, seat: u8) -> GameResult<&Player> {
        self.players.get(seat as usize).ok_or(GameError::InvalidPlayer(seat))
    }

    pub fn player_mut(&mut self, seat: u8) -> GameResult<&mut Player> {
        self.players.get_mut(seat as usize).ok_or(GameError::InvalidPlayer(seat))
    }

    pub fn scores(&self) -> [i32; 4] {
        std::array::from_fn(|seat| self.players[seat].score)
    }

    /// The game has ended and `step` only reports it
    pub fn is_over(&self) -> bool {
        self.stage == Stage::GameEnd
    }

    pub fn total_kans(&self) -> usize {
        self.kan_seats.len()
    }

    /// Four kans by more than one seat
    pub fn four_kan_abort(&self) -> bool {
        self.kan_seats.len() >= 4 && self.kan_seats.iter().any(|&s| s != self.kan_seats[0])
    }

    pub fn all_riichi(&self) -> bool {
        self.players.iter().all(Player::is_riichi)
    }

    /// Other seats in anticlockwise order starting after `seat`
    pub fn seats_after(seat: u8) -> impl Iterator<Item = u8> {
        (1..NUM_PLAYERS).map(move |i| (seat + i) % NUM_PLAYERS)
    }

    /// Side a claimed tile came from, relative to the claimer
    ///
    /// 0 is the left (previous) seat, 1 across, 2 right.
    pub fn called_side(claimer: u8, discarder: u8) -> u8 {
        (claimer + NUM_PLAYERS - discarder) % NUM_PLAYERS - 1
    }

    /// Yaku situation for `seat` winning on `tile`
    pub fn win_context(&self, seat: u8, tile: Tile, self_drawn: bool) -> YakuContext {
        let player = &self.players[seat as usize];
        let mut ctx = YakuContext::new(self.round.round_wind, player.seat_wind, tile, self_drawn);
        ctx.closed = player.hand.is_closed();
        ctx.dealer = seat == self.round.dealer;
        if let Some(riichi) = &player.riichi {
            ctx.riichi = Some(riichi.kind);
            ctx.riichi_turns = riichi.turns;
        }
        ctx.first_draw = self_drawn && player.first_turn && !self.after_kan;
        ctx.after_kan = self_drawn && self.after_kan;
        ctx.last_tile = self.wall.is_exhausted();
        ctx.robbed_kan = matches!(&self.call_window, Some(w) if w.kind == WindowKind::Chankan);
        ctx
    }
}
