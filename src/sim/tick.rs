//! Fixed timestep simulation tick
//!
//! Drives the round state machine: Waiting (preview) -> Falling -> Judging ->
//! Waiting for the next round, or GameOver after the last one.

use super::catch;
use super::challenge::Challenge;
use super::judge::judge;
use super::state::{CatMood, GameEvent, GameState, RoundPhase, RoundState};
use super::timers::TimerAction;
use crate::consts::*;
use crate::ms_to_ticks;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement: -1 left, 1 right, 0 none
    pub move_dir: f32,
    /// Pointer pressed at this logical x (nudges toward that half of the screen)
    pub pointer_x: Option<f32>,
    /// Continue / start / restart (Enter, Space)
    pub confirm: bool,
    /// Challenge size picked on the selection screen
    pub select_count: Option<usize>,
    /// Idle/demo mode - the cat plays itself
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.round.phase == RoundPhase::GameOver {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    state.time_ticks += 1;

    // Input first, so a move this tick counts for this tick's catch test
    match state.round.phase {
        RoundPhase::Falling => {
            if input.move_dir != 0.0 {
                let dx = input.move_dir.signum() * state.tuning.move_step;
                catch::move_plate(state, dx);
            }
            if let Some(x) = input.pointer_x {
                let dir = if x < SCREEN_WIDTH / 2.0 { -1.0 } else { 1.0 };
                catch::move_plate(state, dir * state.tuning.nudge_step);
            }
        }
        RoundPhase::Judging => {
            if input.confirm || input.pointer_x.is_some() {
                advance_round(state);
            }
        }
        _ => {}
    }

    for action in state.timers.drain_due(state.time_ticks) {
        run_timer(state, action);
    }

    if state.round.phase == RoundPhase::Falling {
        catch::fall(state, dt);
        catch::test_catches(state);
        catch::cleanup_missed(state);

        if !state.round.all_processed {
            state.round.ticks_left = state.round.ticks_left.saturating_sub(1);
            if state.round.ticks_left == 0 {
                log::info!("Round {} timed out", state.session.round);
                state.emit(GameEvent::TimeUp);
                finish_round(state, true);
            }
        }
    }
}

fn run_timer(state: &mut GameState, action: TimerAction) {
    match action {
        TimerAction::EndPreview => {
            if state.round.phase != RoundPhase::Waiting {
                log::warn!("Preview ended outside Waiting, ignoring");
                return;
            }
            state.round.phase = RoundPhase::Falling;
            state.round.ticks_left = ms_to_ticks(state.tuning.round_time_ms);
            let count = state.challenge_count();
            state.emit(GameEvent::ChallengeHidden { count });
            catch::spawn_next(state);
        }
        TimerAction::SpawnNext => {
            if state.round.phase == RoundPhase::Falling && !state.round.all_processed {
                catch::spawn_next(state);
            }
        }
        TimerAction::Judge => finish_round(state, false),
    }
}

/// Remove every sushi sprite of the current round
fn clear_items(state: &mut GameState) {
    let ids: Vec<u32> = state
        .round
        .falling
        .iter()
        .map(|i| i.id)
        .chain(state.round.caught.iter().map(|c| c.id))
        .collect();
    state.round.falling.clear();
    state.round.caught.clear();
    for id in ids {
        state.emit(GameEvent::ItemRemoved { id });
    }
}

/// Reset the round and show a fresh challenge
pub fn start_round(state: &mut GameState) {
    // Nothing scheduled by the previous round may fire into this one
    state.timers.cancel_all();
    clear_items(state);
    state.round = RoundState::default();
    state.cat_mood = CatMood::Normal;

    let count = state.challenge_count();
    let challenge = Challenge::generate(count, &mut state.rng);
    let kinds = challenge.kinds().to_vec();
    state.round.challenge = Some(challenge);

    let preview_ticks = ms_to_ticks(state.tuning.preview_ms(count));
    state
        .timers
        .schedule(state.time_ticks, preview_ticks, TimerAction::EndPreview);

    log::info!(
        "Round {}/{}: {}",
        state.session.round,
        state.session.max_rounds,
        kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
    );
    state.emit(GameEvent::RoundStarted {
        round: state.session.round,
    });
    state.emit(GameEvent::ChallengeShown {
        kinds,
        preview_ticks,
    });
}

/// Judge the plate and enter Judging. `timed_out` swaps in the time-up message.
pub fn finish_round(state: &mut GameState, timed_out: bool) {
    if state.round.phase != RoundPhase::Falling {
        log::warn!("Judge requested outside Falling, ignoring");
        return;
    }
    state.timers.cancel_all();

    // Anything still in the air is gone
    let leftovers: Vec<u32> = state.round.falling.iter().map(|i| i.id).collect();
    state.round.falling.clear();
    for id in leftovers {
        state.emit(GameEvent::ItemRemoved { id });
    }

    let Some(challenge) = state.round.challenge.as_ref() else {
        debug_assert!(false, "judging a round without a challenge");
        log::warn!("No challenge to judge against");
        return;
    };
    let mut result = judge(challenge, &state.round.caught, state.tuning.order_bonus);
    result.round = state.session.round;
    if timed_out {
        result.mark_timed_out();
    }

    let tuning = &state.tuning;
    if result.perfect {
        state.fall_speed = (state.fall_speed + tuning.fall_speed_perfect_step)
            .min(tuning.fall_speed_max);
        state.cat_mood = CatMood::Happy;
    } else {
        state.fall_speed =
            (state.fall_speed - tuning.fall_speed_miss_step).max(tuning.fall_speed_min);
    }

    state.session.record(&result);
    log::info!(
        "Round {} judged: {} (+{}, total {})",
        result.round,
        result.headline(),
        result.total,
        state.session.total_score
    );

    state.round.phase = RoundPhase::Judging;
    state.round.result = Some(result.clone());
    state.emit(GameEvent::RoundJudged(result));
}

/// Leave Judging: next round, or GameOver after the last
pub fn advance_round(state: &mut GameState) {
    if state.round.phase != RoundPhase::Judging {
        return;
    }
    if state.session.is_last_round() {
        state.timers.cancel_all();
        state.round.phase = RoundPhase::GameOver;
        log::info!(
            "Game over after {} rounds, score {}",
            state.session.round,
            state.session.total_score
        );
        state.emit(GameEvent::GameOver {
            total_score: state.session.total_score,
        });
        return;
    }
    state.session.round += 1;
    start_round(state);
}

/// Steer under the lowest sample sushi and away from decoys
fn autopilot(state: &GameState, input: &mut TickInput) {
    match state.round.phase {
        RoundPhase::Judging => input.confirm = true,
        RoundPhase::Falling => {
            let plate_x = state.plate.x;
            let lowest = state
                .round
                .falling
                .iter()
                .filter(|i| !i.processed)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

            let target_x = match lowest {
                Some(item) if item.sample => item.pos.x,
                Some(decoy) => {
                    let danger = state.tuning.catch_horizontal(state.challenge_count()) + 20.0;
                    if (decoy.pos.x - plate_x).abs() > danger {
                        plate_x
                    } else if decoy.pos.x <= plate_x && plate_x + danger < PLATE_MAX_X {
                        decoy.pos.x + danger * 1.5
                    } else if plate_x - danger > PLATE_MIN_X {
                        decoy.pos.x - danger * 1.5
                    } else {
                        decoy.pos.x + danger * 1.5
                    }
                }
                None => plate_x,
            };

            let diff = target_x - plate_x;
            input.move_dir = if diff.abs() <= state.tuning.move_step {
                0.0
            } else {
                diff.signum()
            };
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::sushi::SushiKind;

    fn run_until(state: &mut GameState, input: &TickInput, max_ticks: u32, done: impl Fn(&GameState) -> bool) {
        for _ in 0..max_ticks {
            if done(state) {
                return;
            }
            tick(state, input, SIM_DT);
        }
        assert!(done(state), "condition not reached in {} ticks", max_ticks);
    }

    #[test]
    fn test_preview_then_falling() {
        let mut state = GameState::new(12345, 3, Tuning::default());
        let preview = ms_to_ticks(Tuning::default().preview_ms(3));
        let input = TickInput::default();

        for _ in 0..preview - 1 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.round.phase, RoundPhase::Waiting);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.round.phase, RoundPhase::Falling);
        assert_eq!(state.round.falling.len(), 1);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::ChallengeHidden { count: 3 }))
        );
    }

    #[test]
    fn test_longer_preview_for_bigger_challenge() {
        let mut small = GameState::new(1, 2, Tuning::default());
        let mut big = GameState::new(1, 5, Tuning::default());
        let input = TickInput::default();
        let mut small_ticks = 0;
        while small.round.phase == RoundPhase::Waiting {
            tick(&mut small, &input, SIM_DT);
            small_ticks += 1;
        }
        let mut big_ticks = 0;
        while big.round.phase == RoundPhase::Waiting {
            tick(&mut big, &input, SIM_DT);
            big_ticks += 1;
        }
        assert!(big_ticks > small_ticks);
    }

    #[test]
    fn test_no_movement_during_preview() {
        let mut state = GameState::new(1, 2, Tuning::default());
        let input = TickInput {
            move_dir: 1.0,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.plate.x, PLATE_START_X);
    }

    #[test]
    fn test_held_and_pointer_movement() {
        let mut state = GameState::new(1, 2, Tuning::default());
        run_until(&mut state, &TickInput::default(), 10_000, |s| {
            s.round.phase == RoundPhase::Falling
        });
        let step = state.tuning.move_step;
        tick(
            &mut state,
            &TickInput {
                move_dir: -1.0,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.plate.x, PLATE_START_X - step);

        let before = state.plate.x;
        tick(
            &mut state,
            &TickInput {
                pointer_x: Some(SCREEN_WIDTH - 10.0),
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.plate.x, before + state.tuning.nudge_step);
    }

    #[test]
    fn test_timeout_forces_judging() {
        // One of two caught, then the clock runs out
        let mut state = GameState::new(77, 2, Tuning::default());
        state.set_challenge(Challenge::from_kinds(vec![
            SushiKind::Tuna,
            SushiKind::Salmon,
        ]));
        let input = TickInput::default();
        run_until(&mut state, &input, 10_000, |s| s.round.phase == RoundPhase::Falling);

        let surface = state.plate.surface_y();
        let x = state.plate.x;
        state.round.falling[0].kind = SushiKind::Tuna;
        state.round.falling[0].pos = glam::Vec2::new(x, surface);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.round.caught.len(), 1);

        // No more drops: only the round clock is left
        state.timers.cancel_all();
        run_until(&mut state, &input, 4_000, |s| s.round.phase == RoundPhase::Judging);

        let result = state.round.result.clone().unwrap();
        assert!(result.timed_out);
        assert_eq!(result.message, crate::sim::judge::TIME_UP_MESSAGE);
        assert_eq!(result.total, SushiKind::Tuna.score());
        assert_eq!(state.session.total_score, SushiKind::Tuna.score() as u64);
        assert!(state.events.contains(&GameEvent::TimeUp));
    }

    #[test]
    fn test_all_missed_round_is_judged() {
        let mut state = GameState::new(21, 2, Tuning::default());
        let input = TickInput::default();
        run_until(&mut state, &input, 10_000, |s| s.round.phase == RoundPhase::Falling);

        // Drop every sushi straight past the plate
        for _ in 0..600 {
            if state.round.phase != RoundPhase::Falling {
                break;
            }
            for item in state.round.falling.iter_mut().filter(|i| !i.processed) {
                item.pos.y = MISS_Y + 1.0;
            }
            tick(&mut state, &input, SIM_DT);
            assert!(state.round.processed <= 2);
        }

        assert_eq!(state.round.phase, RoundPhase::Judging);
        assert_eq!(state.round.processed, 2);
        assert!(state.round.caught.is_empty());
        let result = state.round.result.clone().unwrap();
        assert!(!result.timed_out);
        assert_eq!(result.total, 0);
        assert!(!result.perfect);
        assert!(result.correct_order.is_some());
        let misses = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ItemMissed { .. }))
            .count();
        assert_eq!(misses, 2);
    }

    #[test]
    fn test_judging_waits_for_confirm() {
        let mut state = GameState::new(3, 2, Tuning::default());
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        // Let the autopilot play until the first judge, then stop helping
        run_until(&mut state, &idle, 10_000, |s| s.round.phase == RoundPhase::Judging);
        let none = TickInput::default();
        for _ in 0..1_000 {
            tick(&mut state, &none, SIM_DT);
        }
        assert_eq!(state.round.phase, RoundPhase::Judging);
        assert_eq!(state.session.round, 1);

        let confirm = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &confirm, SIM_DT);
        assert_eq!(state.session.round, 2);
        assert_eq!(state.round.phase, RoundPhase::Waiting);
        assert!(state.round.caught.is_empty());
    }

    #[test]
    fn test_new_round_cancels_pending_spawn() {
        let mut state = GameState::new(9, 3, Tuning::default());
        let input = TickInput::default();
        run_until(&mut state, &input, 10_000, |s| s.round.phase == RoundPhase::Falling);
        // Force a miss so a spawn is pending, then judge early
        state.round.falling[0].pos.y = MISS_Y + 1.0;
        tick(&mut state, &input, SIM_DT);
        assert!(state.timers.is_pending(TimerAction::SpawnNext));
        finish_round(&mut state, false);
        assert!(state.timers.is_empty());

        advance_round(&mut state);
        assert_eq!(state.round.phase, RoundPhase::Waiting);
        assert_eq!(state.timers.len(), 1);
        assert!(state.timers.is_pending(TimerAction::EndPreview));
    }

    #[test]
    fn test_speed_adapts_to_result() {
        let tuning = Tuning::default();
        let mut state = GameState::new(2, 2, tuning.clone());
        state.set_challenge(Challenge::from_kinds(vec![SushiKind::Egg, SushiKind::Uni]));
        run_until(&mut state, &TickInput::default(), 10_000, |s| {
            s.round.phase == RoundPhase::Falling
        });
        finish_round(&mut state, false);
        assert_eq!(
            state.fall_speed,
            tuning.initial_fall_speed() - tuning.fall_speed_miss_step
        );
        assert_eq!(state.cat_mood, CatMood::Normal);
    }

    #[test]
    fn test_game_over_after_max_rounds() {
        let mut state = GameState::new(42, 2, Tuning::default());
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        run_until(&mut state, &idle, 200_000, |s| s.is_game_over());

        assert_eq!(state.session.history.len(), 5);
        assert_eq!(state.session.round, 5);
        let sum: u64 = state.session.history.iter().map(|r| r.total as u64).sum();
        assert_eq!(state.session.total_score, sum);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { total_score } if *total_score == sum))
        );

        // Ticks after game over change nothing
        let ticks = state.time_ticks;
        tick(&mut state, &idle, SIM_DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_determinism() {
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut a = GameState::new(99999, 4, Tuning::default());
        let mut b = GameState::new(99999, 4, Tuning::default());
        for _ in 0..5_000 {
            tick(&mut a, &idle, SIM_DT);
            tick(&mut b, &idle, SIM_DT);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.session.total_score, b.session.total_score);
        assert_eq!(a.round.challenge, b.round.challenge);
        assert!((a.plate.x - b.plate.x).abs() < 0.0001);
    }
}
