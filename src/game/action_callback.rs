use crate::game::action::{Answer, Decision, Prompt};
use crate::game::state::GameState;
use crate::tile::Tile;
use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Call-decision interface
///
/// Every method sees a read-only snapshot of the game and the asking seat.
/// The engine only asks about options that are legal right now.
pub trait CallDecider {
    /// Concealed tile index to discard
    fn decide_discard(&mut self, state: &GameState, seat: u8) -> Decision<usize>;

    fn decide_pon(&mut self, state: &GameState, seat: u8, tile: Tile) -> Decision<bool>;

    /// Chosen index pair, or `None` to decline
    fn decide_chi(
        &mut self,
        state: &GameState,
        seat: u8,
        tile: Tile,
        candidates: &[(usize, usize)],
    ) -> Decision<Option<(usize, usize)>>;

    fn decide_kan_open(&mut self, state: &GameState, seat: u8, tile: Tile) -> Decision<bool>;

    fn decide_kan_closed(&mut self, state: &GameState, seat: u8, tile: Tile) -> Decision<bool>;

    fn decide_kan_late(&mut self, state: &GameState, seat: u8, tile: Tile) -> Decision<bool>;

    fn decide_ron(&mut self, state: &GameState, seat: u8, tile: Tile) -> Decision<bool>;

    fn decide_tsumo(&mut self, state: &GameState, seat: u8) -> Decision<bool>;

    fn decide_riichi(&mut self, state: &GameState, seat: u8) -> Decision<bool>;

    /// One of the tenpai-keeping discard indices
    fn decide_riichi_discard(&mut self, state: &GameState, seat: u8, candidates: &[usize]) -> Decision<usize>;
}

/// Route a prompt to the matching decider method
pub fn ask(decider: &mut dyn CallDecider, state: &GameState, prompt: &Prompt) -> Decision<Answer> {
    let yes_no = |made: bool| if made { Answer::Yes } else { Answer::No };
    match prompt {
        Prompt::Discard { seat } => decider.decide_discard(state, *seat).map(Answer::Tile),
        Prompt::RiichiDiscard { seat, options } => {
            decider.decide_riichi_discard(state, *seat, options).map(Answer::Tile)
        }
        Prompt::Tsumo { seat } => decider.decide_tsumo(state, *seat).map(yes_no),
        Prompt::Riichi { seat } => decider.decide_riichi(state, *seat).map(yes_no),
        Prompt::KanClosed { seat, tile } => decider.decide_kan_closed(state, *seat, *tile).map(yes_no),
        Prompt::KanLate { seat, tile } => decider.decide_kan_late(state, *seat, *tile).map(yes_no),
        Prompt::Ron { seat, tile } => decider.decide_ron(state, *seat, *tile).map(yes_no),
        Prompt::KanOpen { seat, tile } => decider.decide_kan_open(state, *seat, *tile).map(yes_no),
        Prompt::Pon { seat, tile } => decider.decide_pon(state, *seat, *tile).map(yes_no),
        Prompt::Chi { seat, tile, options } => {
            decider.decide_chi(state, *seat, *tile, options).map(Answer::Chi)
        }
    }
}

/// Never calls, discards the first tile
#[derive(Debug, Clone, Default)]
pub struct PassiveAgent;

impl CallDecider for PassiveAgent {
    fn decide_discard(&mut self, _state: &GameState, _seat: u8) -> Decision<usize> {
        Decision::Made(0)
    }

    fn decide_pon(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_chi(
        &mut self,
        _state: &GameState,
        _seat: u8,
        _tile: Tile,
        _candidates: &[(usize, usize)],
    ) -> Decision<Option<(usize, usize)>> {
        Decision::Made(None)
    }

    fn decide_kan_open(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_kan_closed(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_kan_late(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_ron(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_tsumo(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_riichi(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        Decision::Made(false)
    }

    fn decide_riichi_discard(&mut self, _state: &GameState, _seat: u8, candidates: &[usize]) -> Decision<usize> {
        Decision::Made(candidates.first().copied().unwrap_or(0))
    }
}

/// Accepts every option and discards at random
#[derive(Debug, Clone)]
pub struct EagerAgent {
    rng: ChaCha8Rng,
}

impl EagerAgent {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl CallDecider for EagerAgent {
    fn decide_discard(&mut self, state: &GameState, seat: u8) -> Decision<usize> {
        let len = state.players[seat as usize].hand.concealed().len();
        Decision::Made(if len == 0 { 0 } else { self.rng.gen_range(0..len) })
    }

    fn decide_pon(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_chi(
        &mut self,
        _state: &GameState,
        _seat: u8,
        _tile: Tile,
        candidates: &[(usize, usize)],
    ) -> Decision<Option<(usize, usize)>> {
        Decision::Made(candidates.first().copied())
    }

    fn decide_kan_open(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_kan_closed(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_kan_late(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_ron(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_tsumo(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_riichi(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        Decision::Made(true)
    }

    fn decide_riichi_discard(&mut self, _state: &GameState, _seat: u8, candidates: &[usize]) -> Decision<usize> {
        if candidates.is_empty() {
            return Decision::Made(0);
        }
        Decision::Made(candidates[self.rng.gen_range(0..candidates.len())])
    }
}

/// Answers come from outside through a queue
///
/// Every method pops one queued answer; an empty queue is `Pending`. A
/// `Cancel` answers "no" and raises a flag the engine reads to skip this
/// seat for the rest of the discard.
#[derive(Debug, Clone, Default)]
pub struct HumanAgent {
    inbox: VecDeque<Answer>,
    cancelled: bool,
}

impl HumanAgent {
    /// Queue an answer for the next question
    pub fn push(&mut self, answer: Answer) {
        self.inbox.push_back(answer);
    }

    /// Whether a cancel arrived since the last call, clearing it
    pub fn take_cancel(&mut self) -> bool {
        std::mem::take(&mut self.cancelled)
    }

    fn yes_no(&mut self) -> Decision<bool> {
        match self.inbox.pop_front() {
            None => Decision::Pending,
            Some(Answer::Yes) => Decision::Made(true),
            Some(Answer::No) => Decision::Made(false),
            Some(Answer::Cancel) => {
                self.cancelled = true;
                Decision::Made(false)
            }
            Some(other) => {
                warn!("dropping answer {other:?} to a yes/no question");
                Decision::Pending
            }
        }
    }

    fn index(&mut self) -> Decision<usize> {
        match self.inbox.pop_front() {
            None => Decision::Pending,
            Some(Answer::Tile(index)) => Decision::Made(index),
            Some(other) => {
                warn!("dropping answer {other:?} to a discard question");
                Decision::Pending
            }
        }
    }
}

impl CallDecider for HumanAgent {
    fn decide_discard(&mut self, _state: &GameState, _seat: u8) -> Decision<usize> {
        self.index()
    }

    fn decide_pon(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_chi(
        &mut self,
        _state: &GameState,
        _seat: u8,
        _tile: Tile,
        _candidates: &[(usize, usize)],
    ) -> Decision<Option<(usize, usize)>> {
        match self.inbox.pop_front() {
            None => Decision::Pending,
            Some(Answer::Chi(choice)) => Decision::Made(choice),
            Some(Answer::No) => Decision::Made(None),
            Some(Answer::Cancel) => {
                self.cancelled = true;
                Decision::Made(None)
            }
            Some(other) => {
                warn!("dropping answer {other:?} to a chi question");
                Decision::Pending
            }
        }
    }

    fn decide_kan_open(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_kan_closed(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_kan_late(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_ron(&mut self, _state: &GameState, _seat: u8, _tile: Tile) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_tsumo(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_riichi(&mut self, _state: &GameState, _seat: u8) -> Decision<bool> {
        self.yes_no()
    }

    fn decide_riichi_discard(&mut self, _state: &GameState, _seat: u8, _candidates: &[usize]) -> Decision<usize> {
        self.index()
    }
}

/// Agent kind as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Passive,
    Eager,
    Human,
}

/// Decision collaborator for one seat, fixed at setup
#[derive(Debug, Clone)]
pub enum SeatAgent {
    Passive(PassiveAgent),
    Eager(EagerAgent),
    Human(HumanAgent),
}

impl SeatAgent {
    pub fn from_kind(kind: AgentKind, seed: u64) -> Self {
        match kind {
            AgentKind::Passive => SeatAgent::Passive(PassiveAgent),
            AgentKind::Eager => SeatAgent::Eager(EagerAgent::new(seed)),
            AgentKind::Human => SeatAgent::Human(HumanAgent::default()),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, SeatAgent::Human(_))
    }

    /// The decision interface behind this seat
    pub fn as_decider(&mut self) -> &mut dyn CallDecider {
        match self {
            SeatAgent::Passive(agent) => agent,
            SeatAgent::Eager(agent) => agent,
            SeatAgent::Human(agent) => agent,
        }
    }

    pub fn human_mut(&mut self) -> Option<&mut HumanAgent> {
        match self {
            SeatAgent::Human(agent) => Some(agent),
            _ => None,
        }
    }

    /// Consume a pending cancel from a human seat
    pub fn take_cancel(&mut self) -> bool {
        self.human_mut().is_some_and(HumanAgent::take_cancel)
    }
}
