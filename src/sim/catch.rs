//! Falling sushi and the catch zone
//!
//! One sushi falls at a time and a round has exactly `challenge_count` drops.
//! The Nth drop is usually the challenge's Nth sushi, sometimes a decoy. An
//! item is resolved exactly once, either caught by the plate or missed off the
//! bottom of the screen, and either way it uses up its drop: the next drop is
//! scheduled, or the judge once every drop is resolved.

use glam::Vec2;
use rand::Rng;

use super::challenge::Challenge;
use super::state::{CaughtItem, FallingItem, GameEvent, GameState, Plate, RoundPhase};
use super::sushi::SushiKind;
use super::timers::TimerAction;
use crate::consts::*;
use crate::ms_to_ticks;

/// How a falling item left play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Caught,
    Missed,
}

/// Pick the kind for drop number `slot` (0-based).
///
/// Returns the kind and whether it belongs to the challenge.
pub fn choose_spawn_kind<R: Rng + ?Sized>(
    challenge: &Challenge,
    slot: usize,
    sample_probability: f64,
    rng: &mut R,
) -> (SushiKind, bool) {
    debug_assert!(!challenge.is_empty());
    let slot = slot.min(challenge.len().saturating_sub(1));
    let Some(sample) = challenge.get(slot) else {
        log::warn!("Empty challenge, dropping a random sushi");
        return (SushiKind::ALL[rng.random_range(0..SushiKind::ALL.len())], false);
    };

    if rng.random_bool(sample_probability) {
        return (sample, true);
    }
    match challenge.pick_decoy(rng) {
        Some(decoy) => (decoy, false),
        None => (sample, true),
    }
}

/// Drop the next sushi. Returns its id, or `None` if nothing should fall now.
pub fn spawn_next(state: &mut GameState) -> Option<u32> {
    if state.round.phase != RoundPhase::Falling || state.round.all_processed {
        log::warn!("Spawn requested outside an open round, ignoring");
        return None;
    }
    let Some(challenge) = state.round.challenge.as_ref() else {
        debug_assert!(false, "falling round without a challenge");
        log::warn!("No challenge for this round, cannot spawn");
        return None;
    };

    let slot = state.round.processed as usize;
    let (kind, sample) = choose_spawn_kind(
        challenge,
        slot,
        state.tuning.sample_probability,
        &mut state.rng,
    );
    let x = state.rng.random_range(SPAWN_MIN_X..SPAWN_MAX_X);
    let pos = Vec2::new(x, SPAWN_Y);

    let id = state.next_entity_id();
    state.round.falling.push(FallingItem {
        id,
        kind,
        pos,
        speed: state.fall_speed,
        sample,
        processed: false,
    });
    log::debug!(
        "Spawned #{} {} at x={:.0} ({})",
        id,
        kind.as_str(),
        x,
        if sample { "sample" } else { "decoy" }
    );
    state.emit(GameEvent::ItemSpawned {
        id,
        kind,
        pos,
        sample,
    });
    Some(id)
}

/// Advance unresolved items by their fall speed
pub fn fall(state: &mut GameState, dt: f32) {
    for item in state.round.falling.iter_mut().filter(|i| !i.processed) {
        item.pos.y += item.speed * dt;
    }
}

/// Whether a sushi at `pos` is inside the plate's catch zone
pub fn in_catch_zone(pos: Vec2, plate: &Plate, vertical: f32, horizontal: f32) -> bool {
    (pos.y - plate.surface_y()).abs() <= vertical && (pos.x - plate.x).abs() <= horizontal
}

/// Catch every unresolved item inside the catch zone. Returns the number caught.
pub fn test_catches(state: &mut GameState) -> usize {
    if state.round.phase != RoundPhase::Falling {
        return 0;
    }
    let vertical = state.tuning.catch_vertical;
    let horizontal = state.tuning.catch_horizontal(state.challenge_count());

    let hits: Vec<u32> = state
        .round
        .falling
        .iter()
        .filter(|i| !i.processed && in_catch_zone(i.pos, &state.plate, vertical, horizontal))
        .map(|i| i.id)
        .collect();

    hits.into_iter()
        .filter(|id| resolve_item(state, *id, ItemOutcome::Caught))
        .count()
}

/// Miss every unresolved item that fell past the screen, then drop resolved items
/// from the falling list. Returns the number missed.
pub fn cleanup_missed(state: &mut GameState) -> usize {
    let gone: Vec<u32> = state
        .round
        .falling
        .iter()
        .filter(|i| !i.processed && i.pos.y > MISS_Y)
        .map(|i| i.id)
        .collect();

    let missed = gone
        .into_iter()
        .filter(|id| resolve_item(state, *id, ItemOutcome::Missed))
        .count();

    state.round.falling.retain(|i| !i.processed);
    missed
}

/// Resolve a falling item as caught or missed.
///
/// Returns false (and changes nothing) if the item is unknown, already
/// resolved, or every drop of the round is already resolved.
pub fn resolve_item(state: &mut GameState, id: u32, outcome: ItemOutcome) -> bool {
    let count = state.challenge_count();
    let Some(item) = state.round.falling.iter_mut().find(|i| i.id == id) else {
        return false;
    };
    if item.processed {
        return false;
    }
    if state.round.processed as usize >= count {
        return false;
    }
    item.processed = true;
    let (kind, pos) = (item.kind, item.pos);
    state.round.processed += 1;

    match outcome {
        ItemOutcome::Caught => {
            let reach = state.tuning.catch_horizontal(count);
            let plate_offset = (pos.x - state.plate.x).clamp(-reach, reach);
            let rest_pos = Vec2::new(state.plate.x + plate_offset, state.plate.surface_y());
            state.round.caught.push(CaughtItem {
                id,
                kind,
                catch_x: pos.x,
                plate_offset,
                pos: rest_pos,
            });
            log::debug!(
                "Caught #{} {} ({}/{})",
                id,
                kind.as_str(),
                state.round.caught.len(),
                count
            );
            state.emit(GameEvent::ItemCaught { id, kind, rest_pos });
        }
        ItemOutcome::Missed => {
            log::debug!("Missed #{} {}", id, kind.as_str());
            state.emit(GameEvent::ItemMissed { id });
        }
    }

    schedule_after_resolve(state);
    true
}

/// After a catch or miss: another drop if drops remain, otherwise the judge
fn schedule_after_resolve(state: &mut GameState) {
    let now = state.time_ticks;
    if state.round.processed as usize >= state.challenge_count() {
        state.round.all_processed = true;
        log::info!(
            "All {} drops resolved ({} caught), judging soon",
            state.round.processed,
            state.round.caught.len()
        );
        state.timers.schedule(
            now,
            ms_to_ticks(state.tuning.judge_delay_ms),
            TimerAction::Judge,
        );
    } else {
        state.timers.schedule(
            now,
            ms_to_ticks(state.tuning.spawn_delay_ms),
            TimerAction::SpawnNext,
        );
    }
}

/// Slide the cat and plate; resting sushi moves along. Returns distance moved.
pub fn move_plate(state: &mut GameState, dx: f32) -> f32 {
    if state.round.phase != RoundPhase::Falling || dx == 0.0 {
        return 0.0;
    }
    let moved = state.plate.move_by(dx);
    if moved != 0.0 {
        for item in &mut state.round.caught {
            item.pos.x += moved;
        }
        state.emit(GameEvent::PlateMoved {
            x: state.plate.x,
            dx: moved,
        });
    }
    moved
}

/// Item ids ordered left-to-right, for draw depth
pub fn draw_order(state: &GameState) -> Vec<u32> {
    let mut items: Vec<(u32, f32)> = state
        .round
        .falling
        .iter()
        .filter(|i| !i.processed)
        .map(|i| (i.id, i.pos.x))
        .chain(state.round.caught.iter().map(|c| (c.id, c.pos.x)))
        .collect();
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
    items.into_iter().map(|(id, _)| id).collect()
}
