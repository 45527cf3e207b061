use super::action::{Answer, Decision, Prompt};
use super::action_callback::{ask, SeatAgent};
use super::chi::ChiHandler;
use super::config::GameConfig;
use super::constants::{DEAL_SIZE, MAX_KANS, MAX_STEPS_PER_ROUND, NUM_PLAYERS, RIICHI_MIN_REMAINING, RIICHI_STAKE};
use super::content::YakuTable;
use super::kan::{KanHandler, KanType};
use super::persistence::SaveFile;
use super::pon::PonHandler;
use super::ready::ReadyChecker;
use super::scoring::{HandEvaluator, WinDetails};
use super::settlement::{Settlement, WinMethod};
use super::state::{
    AbortReason, CallTier, CallWindow, DeclineLatch, GameEvent, GameState, RoundOutcome, Stage, WindowKind,
};
use super::yaku::RiichiKind;
use crate::error::{GameError, GameResult};
use crate::tile::{Group, Tile, Wall};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Result of one state machine step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to the given stage
    Advanced(Stage),
    /// A human seat must answer before the game can continue
    AwaitingInput(Prompt),
    RoundOver(RoundOutcome),
    GameOver,
}

/// Game engine
///
/// The sole mutator of game state. Each `step` runs one stage; agents are
/// asked through `CallDecider` with a read-only view of the state. A human
/// seat without a queued answer suspends the engine until `submit`.
pub struct GameEngine {
    state: GameState,
    agents: [SeatAgent; 4],
    evaluator: HandEvaluator,
    events: Vec<GameEvent>,
    /// Every tile identity, for tenpai queries
    pool: Vec<Tile>,
}

impl GameEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_table(config, YakuTable::standard())
    }

    /// Build with a custom yaku table, such as one loaded from JSON
    pub fn with_table(config: &GameConfig, table: YakuTable) -> Self {
        Self::from_state(GameState::new(config), config, table)
    }

    /// Wrap an existing state; agents come from `config`
    pub fn from_state(state: GameState, config: &GameConfig, table: YakuTable) -> Self {
        let agents = std::array::from_fn(|seat| {
            SeatAgent::from_kind(config.agents[seat], config.seed.wrapping_mul(31).wrapping_add(seat as u64))
        });
        Self {
            evaluator: HandEvaluator::new(&state.catalogue, table),
            pool: state.catalogue.kinds(),
            state,
            agents,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scenario setup
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Swap or drive the agent at `seat`
    pub fn agent_mut(&mut self, seat: u8) -> GameResult<&mut SeatAgent> {
        self.agents.get_mut(seat as usize).ok_or(GameError::InvalidPlayer(seat))
    }

    /// Take the buffered notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the game state; agents are not saved
    pub fn save(&self) -> GameResult<String> {
        SaveFile::new(self.state.clone()).to_json()
    }

    /// Resume a saved game with agents built from `config`
    pub fn load(json: &str, config: &GameConfig, table: YakuTable) -> GameResult<Self> {
        let save = SaveFile::from_json(json)?;
        Ok(Self::from_state(save.state, config, table))
    }

    /// Answer the pending prompt of a human seat
    ///
    /// # Errors
    ///
    /// `GameOver` once the game has ended; `NotWaiting` when `seat` has no
    /// pending prompt or is not human; `InvalidAction` when the answer does
    /// not fit the prompt.
    pub fn submit(&mut self, seat: u8, answer: Answer) -> GameResult<()> {
        if self.state.stage == Stage::GameEnd {
            return Err(GameError::GameOver);
        }
        let prompt = self
            .state
            .pending
            .as_ref()
            .filter(|p| p.seat() == seat)
            .ok_or(GameError::NotWaiting(seat))?;
        let hand_len = self.state.player(seat)?.hand.concealed().len();
        if !prompt.accepts(&answer, hand_len) {
            return Err(GameError::InvalidAction(format!("{answer:?} does not answer {prompt:?}")));
        }
        let human = self.agents[seat as usize].human_mut().ok_or(GameError::NotWaiting(seat))?;
        human.push(answer);
        self.state.pending = None;
        Ok(())
    }

    /// Run one stage
    pub fn step(&mut self) -> GameResult<StepOutcome> {
        match self.state.stage {
            Stage::RoundSetup => self.setup_round(),
            Stage::DealerDetermination => self.determine_dealer(),
            Stage::WallBreak => self.break_wall(),
            Stage::InitialDeal => self.deal(),
            Stage::TurnDrawCheck => self.resolve_calls(),
            Stage::TurnDraw => self.draw_turn(),
            Stage::TurnMid => self.turn_mid(),
            Stage::TurnEnd => self.end_turn(),
            Stage::RoundEnd => self.end_round(),
            Stage::GameEnd => Ok(StepOutcome::GameOver),
        }
    }

    /// Step until the round ends or input is needed
    pub fn run_round(&mut self) -> GameResult<StepOutcome> {
        for _ in 0..MAX_STEPS_PER_ROUND {
            match self.step()? {
                StepOutcome::Advanced(_) => continue,
                other => return Ok(other),
            }
        }
        Err(GameError::InvalidAction(format!(
            "round {} did not finish in {MAX_STEPS_PER_ROUND} steps",
            self.state.round.label()
        )))
    }

    /// Step until the game ends or input is needed
    pub fn run_game(&mut self) -> GameResult<StepOutcome> {
        loop {
            match self.run_round()? {
                StepOutcome::RoundOver(_) => continue,
                other => return Ok(other),
            }
        }
    }

    fn advance(&mut self, stage: Stage) -> GameResult<StepOutcome> {
        self.state.stage = stage;
        Ok(StepOutcome::Advanced(stage))
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Ask the seat named by `prompt`; `None` while the answer is pending
    ///
    /// A malformed answer is replaced by a safe default.
    fn query(&mut self, prompt: &Prompt) -> Option<Answer> {
        let seat = prompt.seat();
        match ask(self.agents[seat as usize].as_decider(), &self.state, prompt) {
            Decision::Pending => {
                self.state.pending = Some(prompt.clone());
                None
            }
            Decision::Made(answer) => {
                self.state.pending = None;
                if !prompt.is_claim() {
                    // a cancel only means something inside a call window
                    self.agents[seat as usize].take_cancel();
                }
                let hand_len = self.state.players[seat as usize].hand.concealed().len();
                if prompt.accepts(&answer, hand_len) {
                    return Some(answer);
                }
                warn!("seat {seat} gave {answer:?} to {prompt:?}; using a default");
                Some(match prompt {
                    Prompt::Discard { .. } => Answer::Tile(hand_len.saturating_sub(1)),
                    Prompt::RiichiDiscard { options, .. } => Answer::Tile(options.first().copied().unwrap_or(0)),
                    Prompt::Chi { .. } => Answer::Chi(None),
                    _ => Answer::No,
                })
            }
        }
    }

    fn setup_round(&mut self) -> GameResult<StepOutcome> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.state.seed.wrapping_add(self.state.round_index));
        let mut wall = Wall::new(&self.state.catalogue);
        wall.shuffle(&mut rng);

        let state = &mut self.state;
        state.wall = wall;
        state.dice = (rng.gen_range(1..=6), rng.gen_range(1..=6));
        state.break_dice = (rng.gen_range(1..=6), rng.gen_range(1..=6));
        state.dealer_offset = rng.gen_range(0..NUM_PLAYERS);
        state.last_discard = None;
        state.call_window = None;
        state.latch = DeclineLatch::default();
        state.fresh_draw = false;
        state.after_kan = false;
        state.riichi_pending = false;
        state.kan_seats.clear();
        state.pending_kan = None;
        state.pending = None;
        state.outcome = None;
        let dice = state.dice;
        self.emit(GameEvent::DiceRolled { dice });
        self.advance(Stage::DealerDetermination)
    }

    fn determine_dealer(&mut self) -> GameResult<StepOutcome> {
        let state = &mut self.state;
        if state.round_index == 0 {
            let (a, b) = state.dice;
            state.round.dealer = (state.dealer_offset + a + b) % NUM_PLAYERS;
        }
        for seat in 0..NUM_PLAYERS {
            let wind = state.round.seat_wind(seat);
            state.players[seat as usize].reset_for_round(wind);
        }
        let label = state.round.label();
        let dealer = state.round.dealer;
        info!("{label}: dealer is seat {dealer}");
        self.emit(GameEvent::RoundStarted { label, dealer });
        self.advance(Stage::WallBreak)
    }

    fn break_wall(&mut self) -> GameResult<StepOutcome> {
        let (a, b) = self.state.break_dice;
        self.state.wall.break_at(a + b, self.state.round.dealer);
        self.emit(GameEvent::DiceRolled { dice: (a, b) });
        if let Some(indicator) = self.state.wall.reveal_indicator() {
            self.emit(GameEvent::DoraRevealed { indicator });
        }
        self.advance(Stage::InitialDeal)
    }

    /// Three passes of four tiles, then one tile each, from the dealer
    fn deal(&mut self) -> GameResult<StepOutcome> {
        let dealer = self.state.round.dealer;
        let mut passes = vec![4; DEAL_SIZE / 4];
        passes.push(DEAL_SIZE % 4);
        for count in passes {
            for seat in std::iter::once(dealer).chain(GameState::seats_after(dealer)) {
                for _ in 0..count {
                    let tile = self
                        .state
                        .wall
                        .draw()
                        .ok_or_else(|| GameError::Malformed("wall too small to deal".into()))?;
                    self.state.players[seat as usize].hand.draw(tile)?;
                }
            }
        }
        self.state.active = dealer;
        self.advance(Stage::TurnDraw)
    }

    fn draw_turn(&mut self) -> GameResult<StepOutcome> {
        if self.state.four_kan_abort() {
            return self.finish(RoundOutcome::Abort(AbortReason::FourKans));
        }
        if self.state.all_riichi() {
            return self.finish(RoundOutcome::Abort(AbortReason::FourRiichi));
        }
        if self.state.wall.is_exhausted() {
            return self.exhaustive_draw();
        }
        let seat = self.state.active;
        let tile = self
            .state
            .wall
            .draw()
            .ok_or_else(|| GameError::InvalidAction("draw from an exhausted wall".into()))?;
        self.state.players[seat as usize].hand.draw(tile)?;
        self.state.fresh_draw = true;
        self.state.after_kan = false;
        debug!("seat {seat} drew {tile} ({} left)", self.state.wall.remaining());
        self.emit(GameEvent::Drew { seat, tile, replacement: false });
        self.advance(Stage::TurnMid)
    }

    fn turn_mid(&mut self) -> GameResult<StepOutcome> {
        let seat = self.state.active;
        if self.state.riichi_pending {
            return self.riichi_discard(seat);
        }
        if self.state.fresh_draw {
            if !self.state.latch.tsumo {
                if let Some(outcome) = self.offer_tsumo(seat)? {
                    return Ok(outcome);
                }
            }
            if let Some(outcome) = self.offer_kans(seat)? {
                return Ok(outcome);
            }
            if !self.state.latch.riichi && !self.riichi_options(seat).is_empty() {
                let prompt = Prompt::Riichi { seat };
                let Some(answer) = self.query(&prompt) else {
                    return Ok(StepOutcome::AwaitingInput(prompt));
                };
                if answer == Answer::Yes {
                    self.state.riichi_pending = true;
                    return self.riichi_discard(seat);
                }
                self.state.latch.riichi = true;
            }
        }
        self.discard_turn(seat)
    }

    fn offer_tsumo(&mut self, seat: u8) -> GameResult<Option<StepOutcome>> {
        let player = &self.state.players[seat as usize];
        let Some(tile) = player.hand.newest() else {
            return Ok(None);
        };
        let ctx = self.state.win_context(seat, tile, true);
        let dora = self.state.wall.dora_tiles();
        let ura = self.state.wall.ura_dora_tiles();
        let Some(win) = self.evaluator.evaluate(&player.hand, &ctx, &dora, &ura) else {
            return Ok(None);
        };
        // a riichi hand wins automatically
        if !player.is_riichi() {
            let prompt = Prompt::Tsumo { seat };
            let Some(answer) = self.query(&prompt) else {
                return Ok(Some(StepOutcome::AwaitingInput(prompt)));
            };
            if answer != Answer::Yes {
                self.state.latch.tsumo = true;
                return Ok(None);
            }
        }
        self.win(seat, WinMethod::Tsumo, win).map(Some)
    }

    fn kan_allowed(&self) -> bool {
        self.state.total_kans() < MAX_KANS && self.state.wall.remaining() > 0
    }

    fn offer_kans(&mut self, seat: u8) -> GameResult<Option<StepOutcome>> {
        if !self.kan_allowed() {
            return Ok(None);
        }
        let player = &self.state.players[seat as usize];
        let late: Vec<Tile> = KanHandler::late_kan_options(player)
            .into_iter()
            .filter(|t| !self.state.latch.late_kan.contains(t))
            .collect();
        for tile in late {
            let prompt = Prompt::KanLate { seat, tile };
            let Some(answer) = self.query(&prompt) else {
                return Ok(Some(StepOutcome::AwaitingInput(prompt)));
            };
            if answer == Answer::Yes {
                return self.declare_late_kan(seat, tile).map(Some);
            }
            self.state.latch.late_kan.push(tile);
        }

        let closed: Vec<Tile> = KanHandler::closed_kan_options(&self.state.players[seat as usize])
            .into_iter()
            .filter(|t| !self.state.latch.closed_kan.contains(t))
            .collect();
        for tile in closed {
            let prompt = Prompt::KanClosed { seat, tile };
            let Some(answer) = self.query(&prompt) else {
                return Ok(Some(StepOutcome::AwaitingInput(prompt)));
            };
            if answer == Answer::Yes {
                let player = self.state.player_mut(seat)?;
                KanHandler::kan(player, KanType::Closed, tile, 0)?;
                info!("seat {seat} declared a closed kan of {tile}");
                self.emit(GameEvent::Kan { seat, kind: KanType::Closed, tile });
                return self.complete_kan(seat).map(Some);
            }
            self.state.latch.closed_kan.push(tile);
        }
        Ok(None)
    }

    /// Promote the triplet, then let the other seats rob the added tile
    fn declare_late_kan(&mut self, seat: u8, tile: Tile) -> GameResult<StepOutcome> {
        let player = self.state.player_mut(seat)?;
        KanHandler::kan(player, KanType::Late, tile, 0)?;
        info!("seat {seat} promoted a pon of {tile} to a kan");
        self.emit(GameEvent::Kan { seat, kind: KanType::Late, tile });
        self.state.pending_kan = Some((seat, tile));
        self.open_window(WindowKind::Chankan, tile, seat);
        self.advance(Stage::TurnDrawCheck)
    }

    /// Start a call window; earlier cancels do not carry into it
    fn open_window(&mut self, kind: WindowKind, tile: Tile, discarder: u8) {
        for agent in self.agents.iter_mut() {
            agent.take_cancel();
        }
        self.state.call_window = Some(CallWindow::new(kind, tile, discarder));
    }

    /// Interrupt every riichi counter, reveal a dora and draw a replacement
    fn complete_kan(&mut self, seat: u8) -> GameResult<StepOutcome> {
        for player in self.state.players.iter_mut() {
            player.interrupt();
        }
        self.state.kan_seats.push(seat);
        if let Some(indicator) = self.state.wall.reveal_indicator() {
            self.emit(GameEvent::DoraRevealed { indicator });
        }
        let tile = self
            .state
            .wall
            .draw_replacement()
            .ok_or_else(|| GameError::InvalidAction("no replacement tile left".into()))?;
        self.state.players[seat as usize].hand.draw(tile)?;
        self.emit(GameEvent::Drew { seat, tile, replacement: true });

        let state = &mut self.state;
        state.active = seat;
        state.fresh_draw = true;
        state.after_kan = true;
        // a new tile reopens only the tsumo question
        state.latch.tsumo = false;
        state.call_window = None;
        state.pending_kan = None;
        self.advance(Stage::TurnMid)
    }

    /// Discard indices that keep the active hand tenpai, if riichi is legal
    fn riichi_options(&mut self, seat: u8) -> Vec<usize> {
        let player = &self.state.players[seat as usize];
        if player.is_riichi()
            || !player.hand.is_closed()
            || player.score < RIICHI_STAKE
            || self.state.wall.remaining() < RIICHI_MIN_REMAINING
        {
            return Vec::new();
        }
        let mut probe = player.hand.clone();
        ReadyChecker::tenpai_discards(&mut probe, &self.pool, self.evaluator.decomposer_mut())
    }

    fn riichi_discard(&mut self, seat: u8) -> GameResult<StepOutcome> {
        let options = self.riichi_options(seat);
        if options.is_empty() {
            warn!("seat {seat} can no longer declare riichi");
            self.state.riichi_pending = false;
            return self.discard_turn(seat);
        }
        let prompt = Prompt::RiichiDiscard { seat, options };
        let Some(Answer::Tile(index)) = self.query(&prompt) else {
            return Ok(StepOutcome::AwaitingInput(prompt));
        };

        let player = self.state.player_mut(seat)?;
        let kind = if player.first_turn { RiichiKind::Double } else { RiichiKind::Single };
        let tile = player.discard(index)?;
        let mut probe = player.hand.clone();
        let wait = ReadyChecker::waits(&mut probe, &self.pool, self.evaluator.decomposer_mut());
        let player = &mut self.state.players[seat as usize];
        player.declare_riichi(kind, wait);
        player.score -= RIICHI_STAKE;
        self.state.round.riichi_sticks += 1;
        self.state.riichi_pending = false;
        info!("seat {seat} declared {kind:?} riichi discarding {tile}");
        self.emit(GameEvent::Riichi { seat, kind });
        self.emit(GameEvent::Discarded { seat, tile, riichi: true });
        self.after_discard(seat, tile)
    }

    fn discard_turn(&mut self, seat: u8) -> GameResult<StepOutcome> {
        let player = &self.state.players[seat as usize];
        let index = if player.is_riichi() {
            // the drawn tile goes straight out
            player.hand.concealed().len().saturating_sub(1)
        } else {
            let prompt = Prompt::Discard { seat };
            match self.query(&prompt) {
                Some(Answer::Tile(index)) => index,
                _ => return Ok(StepOutcome::AwaitingInput(prompt)),
            }
        };
        let tile = self.state.player_mut(seat)?.discard(index)?;
        debug!("seat {seat} discarded {tile}");
        self.emit(GameEvent::Discarded { seat, tile, riichi: false });
        self.after_discard(seat, tile)
    }

    fn after_discard(&mut self, seat: u8, tile: Tile) -> GameResult<StepOutcome> {
        self.open_window(WindowKind::Discard, tile, seat);
        let state = &mut self.state;
        state.last_discard = Some((seat, tile));
        state.fresh_draw = false;
        state.after_kan = false;
        self.advance(Stage::TurnEnd)
    }

    fn end_turn(&mut self) -> GameResult<StepOutcome> {
        let state = &mut self.state;
        state.latch = DeclineLatch::default();
        for player in state.players.iter_mut() {
            player.tick_riichi();
        }
        state.active = (state.active + 1) % NUM_PLAYERS;
        self.advance(Stage::TurnDrawCheck)
    }

    /// Seats that may claim, human seats first, each group anticlockwise
    fn claim_order(&self, discarder: u8) -> Vec<u8> {
        let (mut humans, others): (Vec<u8>, Vec<u8>) =
            GameState::seats_after(discarder).partition(|&s| self.agents[s as usize].is_human());
        humans.extend(others);
        humans
    }

    /// Walk the call window tier by tier until a claim is made or it closes
    fn resolve_calls(&mut self) -> GameResult<StepOutcome> {
        while let Some(window) = self.state.call_window.clone() {
            match self.next_claim(&window) {
                Some(prompt) => {
                    let seat = prompt.seat();
                    let Some(answer) = self.query(&prompt) else {
                        return Ok(StepOutcome::AwaitingInput(prompt));
                    };
                    let cancelled = self.agents[seat as usize].take_cancel();
                    if let Some(open) = self.state.call_window.as_mut() {
                        open.asked.push(seat);
                        if cancelled {
                            open.cancelled.push(seat);
                        }
                    }
                    if let Some(outcome) = self.claim(&window, &prompt, answer)? {
                        return Ok(outcome);
                    }
                }
                None => {
                    let next = match window.kind {
                        WindowKind::Discard => window.tier.next(),
                        WindowKind::Chankan => None,
                    };
                    match (next, self.state.call_window.as_mut()) {
                        (Some(tier), Some(open)) => {
                            open.tier = tier;
                            open.asked.clear();
                        }
                        _ => self.state.call_window = None,
                    }
                }
            }
        }
        if let Some((seat, _)) = self.state.pending_kan {
            return self.complete_kan(seat);
        }
        self.advance(Stage::TurnDraw)
    }

    /// The next seat with a legal claim at the window's tier
    fn next_claim(&mut self, window: &CallWindow) -> Option<Prompt> {
        let tile = window.tile;
        let live = self.state.wall.remaining() > 0;
        for seat in self.claim_order(window.discarder) {
            if !window.is_open_to(seat) {
                continue;
            }
            let prompt = if window.tier == CallTier::Ron {
                self.ron_win(seat, tile).map(|_| Prompt::Ron { seat, tile })
            } else {
                let player = &self.state.players[seat as usize];
                match window.tier {
                    CallTier::Kan if live && self.kan_allowed() && KanHandler::can_open_kan(player, &tile) => {
                        Some(Prompt::KanOpen { seat, tile })
                    }
                    CallTier::Pon if live && PonHandler::can_pon(player, &tile) => Some(Prompt::Pon { seat, tile }),
                    CallTier::Chi if live && seat == (window.discarder + 1) % NUM_PLAYERS => {
                        let options = ChiHandler::candidates(player, &tile).to_vec();
                        (!options.is_empty()).then_some(Prompt::Chi { seat, tile, options })
                    }
                    _ => None,
                }
            };
            if prompt.is_some() {
                return prompt;
            }
        }
        None
    }

    /// Scored ron for `seat` on `tile`, or `None` when not allowed
    ///
    /// Refused without a yaku and in furiten.
    fn ron_win(&mut self, seat: u8, tile: Tile) -> Option<WinDetails> {
        let player = &self.state.players[seat as usize];
        let mut hand = player.hand.clone();
        hand.draw(tile).ok()?;
        let ctx = self.state.win_context(seat, tile, false);
        let dora = self.state.wall.dora_tiles();
        let ura = self.state.wall.ura_dora_tiles();
        let win = self.evaluator.evaluate(&hand, &ctx, &dora, &ura)?;
        let waits = match &player.riichi {
            Some(riichi) => riichi.wait.clone(),
            None => {
                let mut probe = player.hand.clone();
                ReadyChecker::waits(&mut probe, &self.pool, self.evaluator.decomposer_mut())
            }
        };
        if player.is_furiten(&waits) {
            debug!("seat {seat} is furiten on {tile}");
            return None;
        }
        Some(win)
    }

    /// Apply an answered claim; `None` when declined
    fn claim(&mut self, window: &CallWindow, prompt: &Prompt, answer: Answer) -> GameResult<Option<StepOutcome>> {
        let accepted = matches!(answer, Answer::Yes | Answer::Chi(Some(_)));
        if !accepted {
            if let Prompt::Ron { seat, .. } = prompt {
                self.state.player_mut(*seat)?.passed_ron = true;
            }
            return Ok(None);
        }
        let discarder = window.discarder;
        match *prompt {
            Prompt::Ron { seat, tile } => {
                let win = self
                    .ron_win(seat, tile)
                    .ok_or_else(|| GameError::InvalidAction(format!("seat {seat} cannot ron {tile}")))?;
                self.state.player_mut(seat)?.hand.draw(tile)?;
                if window.kind == WindowKind::Discard {
                    self.state.player_mut(discarder)?.mark_last_discard_called();
                }
                self.win(seat, WinMethod::Ron { discarder }, win).map(Some)
            }
            Prompt::KanOpen { seat, tile } => {
                let side = GameState::called_side(seat, discarder);
                let group = KanHandler::kan(self.state.player_mut(seat)?, KanType::Open, tile, side)?;
                self.state.player_mut(discarder)?.mark_last_discard_called();
                info!("seat {seat} called kan on {tile} from seat {discarder}");
                self.emit(GameEvent::Called { seat, from: discarder, group });
                self.emit(GameEvent::Kan { seat, kind: KanType::Open, tile });
                self.state.last_discard = None;
                self.complete_kan(seat).map(Some)
            }
            Prompt::Pon { seat, tile } => {
                let side = GameState::called_side(seat, discarder);
                let group = PonHandler::pon(self.state.player_mut(seat)?, tile, side)?;
                info!("seat {seat} called pon on {tile} from seat {discarder}");
                self.after_call(seat, discarder, group).map(Some)
            }
            Prompt::Chi { seat, tile, .. } => {
                let Answer::Chi(Some(pair)) = answer else {
                    return Ok(None);
                };
                let group = ChiHandler::chi(self.state.player_mut(seat)?, tile, pair)?;
                info!("seat {seat} called chi on {tile}");
                self.after_call(seat, discarder, group).map(Some)
            }
            _ => Err(GameError::InvalidAction(format!("{prompt:?} is not a claim"))),
        }
    }

    /// A pon or chi: the caller discards next without drawing
    fn after_call(&mut self, seat: u8, discarder: u8, group: Group) -> GameResult<StepOutcome> {
        self.state.player_mut(discarder)?.mark_last_discard_called();
        for player in self.state.players.iter_mut() {
            player.interrupt();
        }
        self.emit(GameEvent::Called { seat, from: discarder, group });
        let state = &mut self.state;
        state.call_window = None;
        state.last_discard = None;
        state.active = seat;
        state.fresh_draw = false;
        state.after_kan = false;
        self.advance(Stage::TurnMid)
    }

    fn win(&mut self, seat: u8, method: WinMethod, win: WinDetails) -> GameResult<StepOutcome> {
        let round = &self.state.round;
        let payout = Settlement::win(
            seat,
            method,
            win.score.base_points,
            round.dealer,
            round.honba,
            round.riichi_sticks,
        );
        self.state.round.riichi_sticks = 0;
        info!(
            "seat {seat} won by {method:?}: {:?}, {} fu, {} basic points",
            win.yaku, win.fu, win.score.base_points
        );
        self.emit(GameEvent::Won { winner: seat, method, yaku: win.yaku.clone(), score: win.score });
        self.finish(RoundOutcome::Win { winner: seat, method, yaku: win.yaku, score: win.score, payout })
    }

    fn exhaustive_draw(&mut self) -> GameResult<StepOutcome> {
        let mut tenpai = [false; 4];
        for (seat, ready) in tenpai.iter_mut().enumerate() {
            let mut probe = self.state.players[seat].hand.clone();
            *ready = ReadyChecker::is_tenpai(&mut probe, &self.pool, self.evaluator.decomposer_mut());
        }
        info!("wall exhausted, tenpai seats: {tenpai:?}");
        self.emit(GameEvent::DrawGame { tenpai });
        let payout = Settlement::exhaustive_draw(tenpai);
        self.finish(RoundOutcome::ExhaustiveDraw { tenpai, payout })
    }

    fn finish(&mut self, outcome: RoundOutcome) -> GameResult<StepOutcome> {
        if let RoundOutcome::Abort(reason) = outcome {
            info!("round aborted: {reason:?}");
            self.emit(GameEvent::Aborted { reason });
        }
        self.state.outcome = Some(outcome);
        self.state.call_window = None;
        self.state.pending = None;
        self.advance(Stage::RoundEnd)
    }

    /// Pay out, then move the dealer and round counters
    ///
    /// The dealer keeps the seat after a dealer win, an abort, or a draw
    /// with the dealer tenpai. Honba grows on those and on any draw, and
    /// resets after a non-dealer win.
    fn end_round(&mut self) -> GameResult<StepOutcome> {
        let outcome = self
            .state
            .outcome
            .clone()
            .ok_or_else(|| GameError::InvalidAction("round ended without an outcome".into()))?;
        let deltas = outcome.deltas();
        for (player, delta) in self.state.players.iter_mut().zip(deltas) {
            player.apply_delta(delta);
        }
        let scores = self.state.scores();
        self.emit(GameEvent::ScoresChanged { deltas, scores });

        let round = &mut self.state.round;
        let dealer = round.dealer;
        let repeat = match &outcome {
            RoundOutcome::Win { winner, .. } => {
                round.honba = if *winner == dealer { round.honba + 1 } else { 0 };
                *winner == dealer
            }
            RoundOutcome::ExhaustiveDraw { tenpai, .. } => {
                round.honba += 1;
                tenpai[dealer as usize]
            }
            RoundOutcome::Abort(_) => {
                round.honba += 1;
                true
            }
        };
        if !repeat {
            round.dealer = (dealer + 1) % NUM_PLAYERS;
            round.round_number += 1;
            if round.round_number > 4 {
                round.round_number = 1;
                round.round_wind = round.round_wind.next();
            }
        }
        self.state.round_index += 1;

        if self.state.round.past_last_round() || scores.iter().any(|&s| s < 0) {
            info!("game over, final scores {scores:?}");
            self.emit(GameEvent::GameEnded { scores });
            self.state.stage = Stage::GameEnd;
        } else {
            self.state.stage = Stage::RoundSetup;
        }
        Ok(StepOutcome::RoundOver(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action_callback::AgentKind;
    use crate::tile::{parse_tiles, Hand};

    fn engine(agents: [AgentKind; 4]) -> GameEngine {
        GameEngine::new(&GameConfig::default().with_seed(11).with_agents(agents))
    }

    fn step_until(engine: &mut GameEngine, stage: Stage) {
        for _ in 0..100 {
            if engine.state().stage == stage {
                return;
            }
            engine.step().unwrap();
        }
        panic!("never reached {stage:?}");
    }

    #[test]
    fn test_setup_deals_thirteen_each() {
        let mut engine = engine([AgentKind::Passive; 4]);
        step_until(&mut engine, Stage::TurnDraw);
        let state = engine.state();
        for player in &state.players {
            assert_eq!(player.hand.tile_num(), DEAL_SIZE);
        }
        assert_eq!(state.wall.remaining(), 136 - 14 - 52);
        assert_eq!(state.wall.revealed_count(), 1);
        assert_eq!(state.active, state.round.dealer);
        assert_eq!(state.players[state.round.dealer as usize].seat_wind, crate::tile::Wind::East);
    }

    #[test]
    fn test_turn_order_rotates() {
        let mut engine = engine([AgentKind::Passive; 4]);
        step_until(&mut engine, Stage::TurnDraw);
        let dealer = engine.state().active;
        let mut seen = Vec::new();
        while seen.len() < 4 {
            if engine.state().stage == Stage::TurnMid {
                seen.push(engine.state().active);
            }
            engine.step().unwrap();
        }
        let expected: Vec<u8> = (0..4).map(|i| (dealer + i) % 4).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_passive_round_ends_in_draw() {
        let mut engine = engine([AgentKind::Passive; 4]);
        let outcome = engine.run_round().unwrap();
        let StepOutcome::RoundOver(outcome) = outcome else {
            panic!("unexpected {outcome:?}");
        };
        assert!(matches!(outcome, RoundOutcome::ExhaustiveDraw { .. }));
        let total: i32 = engine.state().scores().iter().sum();
        assert_eq!(total, 100_000);
        assert_eq!(engine.state().round.honba, 1);
    }

    #[test]
    fn test_human_discard_waits_for_submit() {
        let mut engine = engine([AgentKind::Human, AgentKind::Passive, AgentKind::Passive, AgentKind::Passive]);
        // force seat 0 to deal
        step_until(&mut engine, Stage::DealerDetermination);
        engine.state_mut().round_index = 1;
        engine.state_mut().round.dealer = 0;
        step_until(&mut engine, Stage::TurnMid);
        let mut outcome = engine.step().unwrap();
        // skip any tsumo/kan/riichi questions
        while let StepOutcome::AwaitingInput(prompt) = outcome.clone() {
            if let Prompt::Discard { seat } = prompt {
                assert_eq!(seat, 0);
                break;
            }
            engine.submit(0, Answer::No).unwrap();
            outcome = engine.step().unwrap();
        }
        assert!(matches!(outcome, StepOutcome::AwaitingInput(Prompt::Discard { seat: 0 })));
        assert_eq!(engine.submit(1, Answer::Tile(0)), Err(GameError::NotWaiting(1)));
        assert!(engine.submit(0, Answer::Tile(99)).is_err());
        engine.submit(0, Answer::Tile(0)).unwrap();
        assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
        assert_eq!(engine.state().players[0].discards.len(), 1);
    }

    #[test]
    fn test_ron_ends_round() {
        let mut engine = engine([AgentKind::Eager; 4]);
        step_until(&mut engine, Stage::TurnDraw);
        let state = engine.state_mut();
        state.round.dealer = 0;
        state.active = 0;
        for player in state.players.iter_mut() {
            player.reset_for_round(crate::tile::Wind::for_seat(player.seat, 0));
        }
        // seat 0 draws and discards 6p; seat 2 waits on 3p-6p with tanyao
        state.players[0].hand = Hand::from_tiles(&parse_tiles("1119m 1119p 1119s EE").unwrap());
        state.players[2].hand = Hand::from_tiles(&parse_tiles("234m 456m 678s 45p 88s").unwrap());
        state.players[0].hand.draw(Tile::pin(6).unwrap()).unwrap();
        state.fresh_draw = true;
        state.latch.tsumo = true;
        state.latch.riichi = true;
        state.stage = Stage::TurnMid;

        // eager seat 0 discards at random; keep stepping until someone wins or the turn passes
        let mut rounds = 0;
        loop {
            let outcome = engine.step().unwrap();
            if let StepOutcome::RoundOver(RoundOutcome::Win { winner, method, .. }) = outcome {
                assert_eq!(winner, 2);
                assert!(matches!(method, WinMethod::Ron { discarder: 0 }));
                break;
            }
            if engine.state().stage == Stage::TurnDraw {
                let discarded = engine.state().players[0].discards.last().map(|d| d.tile);
                assert_ne!(discarded, Some(Tile::pin(6).unwrap()));
                break;
            }
            rounds += 1;
            assert!(rounds < 20);
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut engine = engine([AgentKind::Eager; 4]);
        for _ in 0..30 {
            engine.step().unwrap();
        }
        let json = engine.save().unwrap();
        let config = GameConfig::default().with_seed(11);
        let restored = GameEngine::load(&json, &config, YakuTable::standard()).unwrap();
        assert_eq!(restored.state(), engine.state());
    }

    #[test]
    fn test_full_game_conserves_points() {
        let mut engine = GameEngine::new(&GameConfig { seed: 5, east_only: true, ..GameConfig::default() });
        assert_eq!(engine.run_game().unwrap(), StepOutcome::GameOver);
        let state = engine.state();
        let total: i32 = state.scores().iter().sum::<i32>() + state.round.riichi_sticks as i32 * RIICHI_STAKE;
        assert_eq!(total, 100_000);
        assert!(engine.drain_events().iter().any(|e| matches!(e, GameEvent::GameEnded { .. })));
    }
}
