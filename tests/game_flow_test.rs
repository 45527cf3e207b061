use riichi_engine::game::kan::KanType;
use riichi_engine::game::player::DiscardRecord;
use riichi_engine::game::settlement::round_to_hundred;
use riichi_engine::game::state::{AbortReason, WindowKind};
use riichi_engine::tile::{parse_tiles, GroupKind};
use riichi_engine::{
    AgentKind, Answer, GameConfig, GameEngine, GameEvent, Group, Hand, Prompt, RiichiKind, RoundOutcome, Stage,
    StepOutcome, Tile, WinMethod, YakuId, YakuTable,
};

fn engine(seed: u64, agents: [AgentKind; 4]) -> GameEngine {
    GameEngine::new(&GameConfig::default().with_seed(seed).with_agents(agents))
}

/// Deal a round with seat 0 as dealer and stop before the first draw
fn dealt(seed: u64, agents: [AgentKind; 4]) -> GameEngine {
    let mut engine = engine(seed, agents);
    engine.step().unwrap();
    // skip the first-round dealer roll
    engine.state_mut().round_index = 1;
    engine.state_mut().round.dealer = 0;
    while engine.state().stage != Stage::TurnDraw {
        engine.step().unwrap();
    }
    engine
}

fn hand(text: &str) -> Hand {
    Hand::from_tiles(&parse_tiles(text).unwrap())
}

fn tile(text: &str) -> Tile {
    parse_tiles(text).unwrap()[0]
}

/// Put seat 0 mid-turn holding `hand`, as if it had just drawn
fn mid_turn(engine: &mut GameEngine, text: &str) {
    let state = engine.state_mut();
    state.players[0].hand = hand(text);
    state.active = 0;
    state.fresh_draw = true;
    state.stage = Stage::TurnMid;
}

#[test]
fn test_games_conserve_points() {
    for seed in 0..6 {
        let mut engine = GameEngine::new(&GameConfig { seed, east_only: true, ..GameConfig::default() });
        assert_eq!(engine.run_game().unwrap(), StepOutcome::GameOver);
        let state = engine.state();
        let sticks = state.round.riichi_sticks as i32 * 1_000;
        assert_eq!(state.scores().iter().sum::<i32>() + sticks, 100_000, "seed {seed}");
        assert!(state.is_over());
    }
}

#[test]
fn test_same_seed_same_game() {
    let mut a = engine(77, [AgentKind::Eager; 4]);
    let mut b = engine(77, [AgentKind::Eager; 4]);
    a.run_round().unwrap();
    b.run_round().unwrap();
    assert_eq!(a.state(), b.state());
    assert_eq!(a.drain_events(), b.drain_events());
}

#[test]
fn test_turns_rotate_anticlockwise() {
    let mut engine = dealt(3, [AgentKind::Passive; 4]);
    let mut seats = Vec::new();
    while seats.len() < 8 {
        if engine.state().stage == Stage::TurnMid {
            seats.push(engine.state().active);
        }
        engine.step().unwrap();
    }
    assert_eq!(seats, vec![0, 1, 2, 3, 0, 1, 2, 3]);
}

#[test]
fn test_exhaustive_draw_pays_noten() {
    let mut engine = dealt(8, [AgentKind::Passive; 4]);
    let StepOutcome::RoundOver(outcome) = engine.run_round().unwrap() else {
        panic!("round did not end");
    };
    let RoundOutcome::ExhaustiveDraw { tenpai, payout } = outcome else {
        panic!("passive seats never win: {outcome:?}");
    };
    for seat in 0..4 {
        let ready = tenpai.iter().filter(|t| **t).count() as i32;
        if ready == 0 || ready == 4 {
            assert_eq!(payout.deltas[seat], 0);
        } else if tenpai[seat] {
            assert_eq!(payout.deltas[seat], 3_000 / ready);
        } else {
            assert_eq!(payout.deltas[seat], -3_000 / (4 - ready));
        }
    }
    assert_eq!(engine.state().wall.remaining(), 0);
    // dealer stays only when tenpai
    let expected_dealer = if tenpai[0] { 0 } else { 1 };
    assert_eq!(engine.state().round.dealer, expected_dealer);
}

#[test]
fn test_riichi_declaration() {
    let mut engine = dealt(21, [AgentKind::Eager; 4]);
    mid_turn(&mut engine, "123m 456m 789p 23s EE N");
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));

    let state = engine.state();
    let riichi = state.players[0].riichi.as_ref().unwrap();
    assert_eq!(riichi.kind, RiichiKind::Double);
    assert_eq!(riichi.wait, vec![tile("1s"), tile("4s")]);
    assert_eq!(state.players[0].score, 24_000);
    assert_eq!(state.round.riichi_sticks, 1);
    assert_eq!(state.last_discard, Some((0, Tile::NORTH)));
    assert!(state.players[0].discards[0].riichi);

    let events = engine.drain_events();
    assert!(events.contains(&GameEvent::Riichi { seat: 0, kind: RiichiKind::Double }));
}

#[test]
fn test_riichi_seat_discards_the_drawn_tile() {
    let mut engine = dealt(22, [AgentKind::Eager; 4]);
    mid_turn(&mut engine, "123m 456m 789p 23s EE N");
    engine.step().unwrap();
    // back to seat 0 with a useless draw
    let state = engine.state_mut();
    state.players[0].hand.draw(Tile::WEST).unwrap();
    state.active = 0;
    state.fresh_draw = true;
    state.call_window = None;
    state.stage = Stage::TurnMid;
    engine.step().unwrap();
    let player = &engine.state().players[0];
    assert_eq!(player.discards.last().map(|d| d.tile), Some(Tile::WEST));
    assert_eq!(player.hand.concealed(), &parse_tiles("123m 456m 789p 23s EE").unwrap()[..]);
}

#[test]
fn test_late_kan_can_be_robbed() {
    let mut engine = dealt(5, [AgentKind::Eager; 4]);
    let pon = Group::called(GroupKind::Triplet, tile("5p"), 1).unwrap();
    {
        let state = engine.state_mut();
        state.players[0].hand = Hand::with_called(&parse_tiles("5p 123s 456s 789s E").unwrap(), &[pon]);
        state.players[1].hand = hand("123m 456m 789s 34p 11s");
        state.active = 0;
        state.fresh_draw = true;
        state.stage = Stage::TurnMid;
    }

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    assert_eq!(engine.state().call_window.as_ref().map(|w| w.kind), Some(WindowKind::Chankan));

    let StepOutcome::Advanced(Stage::RoundEnd) = engine.step().unwrap() else {
        panic!("expected the kan to be robbed");
    };
    let Some(RoundOutcome::Win { winner, method, yaku, .. }) = engine.state().outcome.clone() else {
        panic!("no win recorded");
    };
    assert_eq!(winner, 1);
    assert_eq!(method, WinMethod::Ron { discarder: 0 });
    assert!(yaku.contains(&YakuId::Chankan));
    assert!(engine.drain_events().contains(&GameEvent::Kan { seat: 0, kind: KanType::Late, tile: tile("5p") }));
}

#[test]
fn test_closed_kan_draws_replacement_and_reveals_dora() {
    let mut engine = dealt(6, [AgentKind::Eager; 4]);
    mid_turn(&mut engine, "1111m 258p 369s ESWN");
    let remaining = engine.state().wall.remaining();
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));

    let state = engine.state();
    assert_eq!(state.kan_seats, vec![0]);
    assert_eq!(state.wall.revealed_count(), 2);
    assert_eq!(state.wall.remaining(), remaining);
    assert!(state.after_kan);
    assert_eq!(state.players[0].hand.tile_num(), 14);
    assert_eq!(state.players[0].hand.called()[0], Group::closed_quad(tile("1m")));
}

#[test]
fn test_human_cancel_skips_later_tiers() {
    let mut engine = dealt(9, [AgentKind::Passive, AgentKind::Human, AgentKind::Passive, AgentKind::Passive]);
    engine.state_mut().players[1].hand = hand("55m 46m 123p 456p 789s");
    mid_turn(&mut engine, "5m 28m 28p 28s ESWN WhGrRd");

    // passive seat 0 throws the 5m
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    let prompt = Prompt::Pon { seat: 1, tile: tile("5m") };
    assert_eq!(engine.step().unwrap(), StepOutcome::AwaitingInput(prompt.clone()));
    assert_eq!(engine.state().pending, Some(prompt));

    engine.submit(1, Answer::Cancel).unwrap();
    // no chi offer follows
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDraw));
    assert_eq!(engine.state().players[1].hand.concealed().len(), 13);
    assert!(engine.state().call_window.is_none());
}

#[test]
fn test_human_pon_takes_the_turn() {
    let mut engine = dealt(10, [AgentKind::Passive, AgentKind::Passive, AgentKind::Human, AgentKind::Passive]);
    engine.state_mut().players[2].hand = hand("55m 19m 123p 456p 789s");
    mid_turn(&mut engine, "5m 28m 28p 28s ESWN WhGrRd");
    engine.step().unwrap();
    engine.step().unwrap();
    assert!(matches!(engine.step().unwrap(), StepOutcome::AwaitingInput(Prompt::Pon { seat: 2, .. })));
    engine.submit(2, Answer::Yes).unwrap();
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));

    let state = engine.state();
    assert_eq!(state.active, 2);
    assert_eq!(state.players[2].hand.called()[0].kind(), GroupKind::Triplet);
    assert_eq!(state.players[2].hand.called()[0].called_side(), Some(1));
    assert!(state.players[0].discards[0].called);
    assert!(!state.fresh_draw);
}

/// Seats 2 and 3 hold hands that can neither win nor call
fn quiet_others(engine: &mut GameEngine) {
    for seat in [2, 3] {
        engine.state_mut().players[seat].hand = hand("19m 19p 19s ESWN WhGr 5m");
    }
}

/// Seat 0 holds only the 6p, with tsumo and riichi already declined
fn throw_six_pin(engine: &mut GameEngine) {
    mid_turn(engine, "6p");
    engine.state_mut().latch.riichi = true;
    engine.state_mut().latch.tsumo = true;
}

#[test]
fn test_furiten_blocks_ron_but_not_chi() {
    let mut engine = dealt(12, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    {
        let state = engine.state_mut();
        state.players[1].hand = hand("234m 456m 678s 45p 88s");
        // 6p already in seat 1's own river
        state.players[1].discards.push(DiscardRecord { tile: tile("6p"), called: false, riichi: false });
    }
    throw_six_pin(&mut engine);

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));

    let state = engine.state();
    assert!(state.outcome.is_none());
    assert_eq!(state.active, 1);
    assert_eq!(state.players[1].hand.called()[0].kind(), GroupKind::Run);
    assert_eq!(state.players[1].hand.called()[0].anchor(), tile("4p"));
}

#[test]
fn test_save_resumes_the_same_round() {
    let config = GameConfig::default().with_seed(31).with_agents([AgentKind::Passive; 4]);
    let mut original = GameEngine::new(&config);
    for _ in 0..40 {
        original.step().unwrap();
    }
    let json = original.save().unwrap();
    let mut restored = GameEngine::load(&json, &config, YakuTable::standard()).unwrap();
    for _ in 0..60 {
        assert_eq!(original.step().unwrap(), restored.step().unwrap());
    }
    assert_eq!(original.state(), restored.state());
}

#[test]
fn test_dealer_rotation_after_non_dealer_win() {
    let mut engine = dealt(14, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    engine.state_mut().round.honba = 2;
    engine.state_mut().players[1].hand = hand("234m 456m 678s 45p 88s");
    throw_six_pin(&mut engine);

    engine.step().unwrap();
    engine.step().unwrap();
    let StepOutcome::Advanced(Stage::RoundEnd) = engine.step().unwrap() else {
        panic!("seat 1 should ron the 6p");
    };
    let StepOutcome::RoundOver(RoundOutcome::Win { winner, yaku, score, payout, .. }) = engine.step().unwrap() else {
        panic!("expected a win");
    };
    assert_eq!(winner, 1);
    assert!(yaku.contains(&YakuId::Tanyao));
    assert!(yaku.contains(&YakuId::Pinfu));
    assert_eq!(score.fu, 30);
    // non-dealer ron: four times basic points plus 300 per honba
    let expected = round_to_hundred(score.base_points * 4) + 600;
    assert_eq!(payout.deltas, [-expected, expected, 0, 0]);

    let round = &engine.state().round;
    assert_eq!(round.dealer, 1);
    assert_eq!(round.honba, 0);
    assert_eq!(round.round_number, 2);
    assert_eq!(engine.state().stage, Stage::RoundSetup);
    assert_eq!(engine.state().players[1].score, 25_000 + expected);
}

#[test]
fn test_cancel_on_own_turn_does_not_block_later_calls() {
    let mut engine = dealt(15, [AgentKind::Human, AgentKind::Passive, AgentKind::Passive, AgentKind::Passive]);
    for seat in [1, 2, 3] {
        engine.state_mut().players[seat].hand = hand("19m 19p 19s ESWN WhGr 5m");
    }
    mid_turn(&mut engine, "123m 456m 789p 23s EE N");
    assert_eq!(engine.step().unwrap(), StepOutcome::AwaitingInput(Prompt::Riichi { seat: 0 }));
    engine.submit(0, Answer::Cancel).unwrap();
    assert_eq!(engine.step().unwrap(), StepOutcome::AwaitingInput(Prompt::Discard { seat: 0 }));
    let north = engine.state().players[0].hand.concealed().iter().position(|t| *t == Tile::NORTH).unwrap();
    engine.submit(0, Answer::Tile(north)).unwrap();
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert!(engine.state().players[0].riichi.is_none());

    // seat 3 throws a 5m that seat 0 could pon or chi
    {
        let state = engine.state_mut();
        state.players[0].hand = hand("55m 46m 123p 456p 789s");
        state.players[3].hand = hand("5m");
        state.active = 3;
        state.fresh_draw = true;
        state.call_window = None;
        state.latch.riichi = true;
        state.latch.tsumo = true;
        state.stage = Stage::TurnMid;
    }
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    assert_eq!(engine.step().unwrap(), StepOutcome::AwaitingInput(Prompt::Pon { seat: 0, tile: tile("5m") }));
    engine.submit(0, Answer::No).unwrap();

    let StepOutcome::AwaitingInput(Prompt::Chi { seat: 0, options, .. }) = engine.step().unwrap() else {
        panic!("declining the pon should still leave the chi");
    };
    engine.submit(0, Answer::Chi(Some(options[0]))).unwrap();
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert_eq!(engine.state().active, 0);
    assert_eq!(engine.state().players[0].hand.called()[0].kind(), GroupKind::Run);
}

#[test]
fn test_riichi_seat_is_not_offered_a_closed_kan() {
    let mut engine = dealt(16, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    mid_turn(&mut engine, "999p 123m 456m 78s EE 9p");
    engine.state_mut().players[0].declare_riichi(RiichiKind::Single, vec![tile("6s"), tile("9s")]);

    // straight to the discard, no kan in between
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    let state = engine.state();
    assert!(state.kan_seats.is_empty());
    assert!(state.players[0].hand.called().is_empty());
    assert_eq!(state.wall.revealed_count(), 1);
    assert!(!engine.drain_events().iter().any(|e| matches!(e, GameEvent::Kan { .. })));
}

/// Step until the round ends, at most `limit` steps
fn step_to_round_end(engine: &mut GameEngine, limit: usize) {
    for _ in 0..limit {
        if engine.state().stage == Stage::RoundEnd {
            return;
        }
        engine.step().unwrap();
    }
    assert_eq!(engine.state().stage, Stage::RoundEnd);
}

#[test]
fn test_fourth_riichi_aborts_the_round() {
    let mut engine = dealt(17, [AgentKind::Eager; 4]);
    for seat in [1, 2, 3] {
        let player = &mut engine.state_mut().players[seat];
        player.hand = hand("19m 19p 19s ESWN WhGr 5m");
        player.declare_riichi(RiichiKind::Single, vec![Tile::RED]);
    }
    mid_turn(&mut engine, "123m 456m 789p 23s EE N");
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert!(engine.state().all_riichi());

    step_to_round_end(&mut engine, 4);
    assert_eq!(engine.state().outcome, Some(RoundOutcome::Abort(AbortReason::FourRiichi)));
    let StepOutcome::RoundOver(_) = engine.step().unwrap() else {
        panic!("expected the round to close");
    };
    let round = &engine.state().round;
    assert_eq!(round.dealer, 0);
    assert_eq!(round.honba, 1);
    // the stick stays on the table
    assert_eq!(round.riichi_sticks, 1);
}

#[test]
fn test_four_kans_by_two_seats_abort() {
    let mut engine = dealt(18, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    engine.state_mut().players[1].hand = hand("19m 19p 19s ESWN WhGr 5m");
    engine.state_mut().kan_seats = vec![1, 2, 3];
    mid_turn(&mut engine, "1111m 258p 369s ESWN");

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert_eq!(engine.state().kan_seats, vec![1, 2, 3, 0]);
    step_to_round_end(&mut engine, 6);
    assert_eq!(engine.state().outcome, Some(RoundOutcome::Abort(AbortReason::FourKans)));
    assert!(engine.drain_events().contains(&GameEvent::Aborted { reason: AbortReason::FourKans }));
}

#[test]
fn test_four_kans_by_one_seat_play_on() {
    let mut engine = dealt(19, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    engine.state_mut().players[1].hand = hand("19m 19p 19s ESWN WhGr 5m");
    engine.state_mut().kan_seats = vec![0, 0, 0];
    mid_turn(&mut engine, "1111m 258p 369s ESWN");

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDraw));
    // seat 1 draws as usual
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert_eq!(engine.state().active, 1);
    assert!(engine.state().outcome.is_none());
    assert_eq!(engine.state().kan_seats, vec![0; 4]);
}

#[test]
fn test_replacement_draw_wins_rinshan_after_declining_tsumo() {
    let mut engine = dealt(20, [AgentKind::Eager; 4]);
    let next = engine.state().wall.clone().draw_replacement().unwrap();
    let quad = if next == tile("1m") { "9999m" } else { "1111m" };
    mid_turn(&mut engine, &format!("{quad} 234p 567p 789s"));
    engine.state_mut().players[0].hand.draw(next).unwrap();
    // a tsumo declined before the kan does not carry past the replacement
    engine.state_mut().latch.tsumo = true;
    engine.state_mut().latch.riichi = true;

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert!(!engine.state().latch.tsumo);
    assert!(engine.state().latch.riichi);
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::RoundEnd));
    let Some(RoundOutcome::Win { winner, method, yaku, .. }) = engine.state().outcome.clone() else {
        panic!("the replacement tile completes the pair");
    };
    assert_eq!(winner, 0);
    assert_eq!(method, WinMethod::Tsumo);
    assert!(yaku.contains(&YakuId::RinshanKaihou));
    assert!(!yaku.contains(&YakuId::Tenhou));
}

#[test]
fn test_last_live_tile_wins_haitei() {
    let mut engine = dealt(23, [AgentKind::Eager; 4]);
    let last = {
        let state = engine.state_mut();
        while state.wall.remaining() > 1 {
            state.wall.draw();
        }
        state.players[0].hand = hand("123m 234p 567p 789s");
        state.players[0].first_turn = false;
        state.wall.clone().draw().unwrap()
    };
    engine.state_mut().players[0].hand.draw(last).unwrap();

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnMid));
    assert!(engine.state().wall.is_exhausted());
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::RoundEnd));
    let Some(RoundOutcome::Win { winner, method, yaku, .. }) = engine.state().outcome.clone() else {
        panic!("the last tile completes the pair");
    };
    assert_eq!((winner, method), (0, WinMethod::Tsumo));
    assert!(yaku.contains(&YakuId::HaiteiRaoyue));
}

#[test]
fn test_last_discard_wins_houtei() {
    let mut engine = dealt(24, [AgentKind::Eager; 4]);
    quiet_others(&mut engine);
    {
        let state = engine.state_mut();
        while state.wall.draw().is_some() {}
        state.players[1].hand = hand("234m 456m 678s 45p 88s");
    }
    throw_six_pin(&mut engine);

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnEnd));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::TurnDrawCheck));
    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::RoundEnd));
    let Some(RoundOutcome::Win { winner, method, yaku, .. }) = engine.state().outcome.clone() else {
        panic!("seat 1 should ron the last discard");
    };
    assert_eq!(winner, 1);
    assert_eq!(method, WinMethod::Ron { discarder: 0 });
    assert!(yaku.contains(&YakuId::HouteiRaoyui));
    assert!(!yaku.contains(&YakuId::HaiteiRaoyue));
}

#[test]
fn test_non_dealer_first_draw_wins_chiihou() {
    let mut engine = dealt(25, [AgentKind::Eager; 4]);
    {
        let state = engine.state_mut();
        state.players[1].hand = hand("234m 456m 678s 456p 88s");
        state.active = 1;
        state.fresh_draw = true;
        state.stage = Stage::TurnMid;
    }
    assert!(engine.state().players[1].first_turn);

    assert_eq!(engine.step().unwrap(), StepOutcome::Advanced(Stage::RoundEnd));
    let Some(RoundOutcome::Win { winner, method, yaku, score, .. }) = engine.state().outcome.clone() else {
        panic!("a complete first draw wins");
    };
    assert_eq!((winner, method), (1, WinMethod::Tsumo));
    assert_eq!(yaku, vec![YakuId::Chiihou]);
    assert_eq!(score.base_points, 8_000);
}
