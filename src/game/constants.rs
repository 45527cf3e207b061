//! Rule constants

/// Seats at the table
pub const NUM_PLAYERS: u8 = 4;

/// Concealed tiles dealt to each seat
pub const DEAL_SIZE: usize = 13;

/// Default starting score
pub const STARTING_SCORE: i32 = 25_000;

/// Value of one riichi stick
pub const RIICHI_STAKE: i32 = 1_000;

/// Minimum live tiles left to declare riichi
pub const RIICHI_MIN_REMAINING: usize = 4;

/// Ippatsu holds while the riichi seat has taken at most this many turns
pub const IPPATSU_WINDOW: u32 = 4;

/// Added to every riichi counter when anyone calls, closing the ippatsu window
pub const CALL_INTERRUPT_PENALTY: u32 = 10;

/// Honba bonus per counter on a ron (paid by the discarder)
pub const HONBA_RON: i32 = 300;

/// Honba bonus per counter from each payer of a tsumo
pub const HONBA_TSUMO: i32 = 100;

/// Pool split between tenpai and noten seats at an exhaustive draw
pub const NOTEN_POOL: i32 = 3_000;

/// Basic points of one yakuman
pub const YAKUMAN_BASE: u32 = 8_000;

/// Basic points above which han alone sets the value
pub const LIMIT_THRESHOLD: u32 = 2_000;

/// Kans allowed in one round
pub const MAX_KANS: usize = 4;

/// Guard against a state machine that never reaches a round end
pub const MAX_STEPS_PER_ROUND: u32 = 10_000;
