//! Riichi mahjong rules engine
//!
//! Tile model and hand decomposition, yaku/fu/score evaluation and a
//! seat-agnostic turn/call state machine.

pub mod error;
pub mod game;
pub mod tile;

pub use error::{GameError, GameResult};
pub use game::action::{Answer, Decision, Prompt};
pub use game::action_callback::{AgentKind, CallDecider, EagerAgent, HumanAgent, PassiveAgent, SeatAgent};
pub use game::config::GameConfig;
pub use game::content::{YakuId, YakuRecord, YakuTable};
pub use game::fu::{FuCalculator, FuContext, WaitKind};
pub use game::game_engine::{GameEngine, StepOutcome};
pub use game::persistence::{SaveFile, SAVE_VERSION};
pub use game::player::Player;
pub use game::ready::ReadyChecker;
pub use game::scoring::{HandEvaluator, HandScore, LimitHand, ScoreTranslator, WinDetails};
pub use game::settlement::{Settlement, SettlementResult, WinMethod};
pub use game::state::{GameEvent, GameState, RoundContext, RoundOutcome, Stage};
pub use game::yaku::{RiichiKind, YakuContext, YakuEvaluator};
pub use tile::{Decomposer, Decomposition, Group, GroupKind, Hand, Suit, Tile, TileCatalogue, Wall, Wind};
