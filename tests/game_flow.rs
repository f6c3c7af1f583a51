//! Full games driven through the director, the way a front end drives them

use sushi_cat::consts::SIM_DT;
use sushi_cat::proxy::{self, HeadlessProxy, SpriteHandle};
use sushi_cat::sim::{GameEvent, GameSession, TickInput};
use sushi_cat::{Director, SceneId, Tuning};

const TICK_LIMIT: usize = 500_000;

fn start(director: &mut Director, challenge_count: usize) {
    let input = TickInput {
        select_count: Some(challenge_count),
        confirm: true,
        ..Default::default()
    };
    director.update(&input, SIM_DT);
    assert_eq!(director.active_id(), SceneId::Play);
}

/// Play with the autopilot until game over, syncing sprites every tick
fn play_out(director: &mut Director, proxy: &mut HeadlessProxy) -> (GameSession, Vec<GameEvent>) {
    let idle = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    if let Some(state) = director.game_state() {
        proxy::setup(proxy, state);
    }
    let mut seen = Vec::new();
    for _ in 0..TICK_LIMIT {
        director.update(&idle, SIM_DT);
        let state = director.game_state_mut().expect("still playing");
        let events = state.drain_events();
        proxy::sync(proxy, state, &events);
        seen.extend(events);
        if state.is_game_over() {
            return (state.session.clone(), seen);
        }
    }
    panic!("game did not finish");
}

#[test]
fn test_autopilot_plays_five_rounds() {
    let mut director = Director::new(Tuning::default(), 2024);
    let mut proxy = HeadlessProxy::new();
    start(&mut director, 3);
    let (session, events) = play_out(&mut director, &mut proxy);

    assert_eq!(session.history.len(), 5);
    assert_eq!(session.round, 5);
    assert_eq!(session.challenge_count, 3);
    let sum: u64 = session.history.iter().map(|r| r.total as u64).sum();
    assert_eq!(session.total_score, sum);

    let judged = events
        .iter()
        .filter(|e| matches!(e, GameEvent::RoundJudged(_)))
        .count();
    assert_eq!(judged, 5);
    assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));

    for result in &session.history {
        assert_eq!(result.challenge.len(), 3);
        assert!(result.lines.len() <= 3);
    }
}

#[test]
fn test_sprites_match_state_at_game_over() {
    let mut director = Director::new(Tuning::default(), 99);
    let mut proxy = HeadlessProxy::new();
    start(&mut director, 2);
    play_out(&mut director, &mut proxy);

    let state = director.game_state().expect("game over keeps the play scene");
    assert!(state.round.falling.is_empty());
    for item in &state.round.caught {
        let sprite = proxy.get(SpriteHandle::Item(item.id)).expect("caught sprite");
        assert_eq!(sprite.pos, item.pos);
    }
    assert_eq!(proxy.get(SpriteHandle::Plate).map(|s| s.pos), Some(state.plate.pos()));

    proxy::teardown(&mut proxy, state);
    assert!(proxy.sprites.is_empty());
}

#[test]
fn test_same_seed_same_game() {
    let run = || {
        let mut director = Director::new(Tuning::default(), 5);
        let mut proxy = HeadlessProxy::new();
        start(&mut director, 4);
        play_out(&mut director, &mut proxy).0
    };
    let a = run();
    let b = run();
    assert_eq!(a.total_score, b.total_score);
    assert_eq!(a.history, b.history);
}

#[test]
fn test_replay_after_game_over() {
    let mut director = Director::new(Tuning::default(), 31);
    let mut proxy = HeadlessProxy::new();
    start(&mut director, 2);
    let (first, _) = play_out(&mut director, &mut proxy);

    director.update(
        &TickInput {
            confirm: true,
            ..Default::default()
        },
        SIM_DT,
    );
    assert_eq!(director.active_id(), SceneId::Selection);

    // Selection remembers the last size
    director.update(
        &TickInput {
            confirm: true,
            ..Default::default()
        },
        SIM_DT,
    );
    let state = director.game_state().expect("new game");
    assert_eq!(state.challenge_count(), first.challenge_count);
    assert_eq!(state.session.round, 1);
    assert_eq!(state.session.total_score, 0);
    assert!(state.session.history.is_empty());
}

#[test]
fn test_custom_tuning_round_count() {
    let tuning = Tuning::from_json(r#"{ "max_rounds": 2, "order_bonus": 50 }"#).unwrap();
    let mut director = Director::new(tuning, 8);
    let mut proxy = HeadlessProxy::new();
    start(&mut director, 2);
    let (session, _) = play_out(&mut director, &mut proxy);
    assert_eq!(session.history.len(), 2);
    for result in &session.history {
        assert!(result.order_bonus == 0 || result.order_bonus == 50);
    }
}
