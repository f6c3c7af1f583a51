//! Game state and core simulation types
//!
//! Gameplay state is owned here as plain records. Renderers refer to items by
//! their entity id and learn about changes through `GameEvent`s; nothing in
//! the simulation is stored on a render object.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::challenge::{Challenge, clamp_challenge_count};
use super::judge::RoundResult;
use super::sushi::SushiKind;
use super::timers::TimerQueue;
use crate::Tuning;
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Challenge preview is showing
    Waiting,
    /// Sushi is dropping, plate is movable
    Falling,
    /// Result is showing, waiting for the player to continue
    Judging,
    /// All rounds played
    GameOver,
}

/// A sushi on its way down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub kind: SushiKind,
    pub pos: Vec2,
    /// Downward speed (px/s), fixed at spawn
    pub speed: f32,
    /// Part of the challenge set (false = decoy)
    pub sample: bool,
    /// Set once the item is caught or missed; never cleared
    pub processed: bool,
}

/// A sushi resting on the plate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaughtItem {
    pub id: u32,
    pub kind: SushiKind,
    /// World x at the moment of the catch (used for the order check)
    pub catch_x: f32,
    /// Offset from the plate centre, kept while the plate moves
    pub plate_offset: f32,
    pub pos: Vec2,
}

/// The cat and its plate, moved together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    pub x: f32,
}

impl Default for Plate {
    fn default() -> Self {
        Self { x: PLATE_START_X }
    }
}

impl Plate {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, PLATE_Y)
    }

    pub fn cat_pos(&self) -> Vec2 {
        Vec2::new(self.x, CAT_Y)
    }

    /// Height sushi sits at once caught
    pub fn surface_y(&self) -> f32 {
        PLATE_Y - PLATE_SURFACE_OFFSET
    }

    /// Move horizontally within bounds. Returns the distance actually moved.
    pub fn move_by(&mut self, dx: f32) -> f32 {
        let old = self.x;
        self.x = (self.x + dx).clamp(PLATE_MIN_X, PLATE_MAX_X);
        self.x - old
    }
}

/// Cat expression, swapped after a perfect round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CatMood {
    #[default]
    Normal,
    Happy,
}

impl CatMood {
    pub fn texture_key(self) -> &'static str {
        match self {
            CatMood::Normal => "cat",
            CatMood::Happy => "cat-happy",
        }
    }
}

/// Totals that span the whole game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub total_score: u64,
    /// Current round (1-based)
    pub round: u32,
    pub challenge_count: usize,
    pub max_rounds: u32,
    /// Consecutive perfect rounds
    pub perfect_streak: u32,
    pub best_streak: u32,
    /// Results of every judged round, oldest first
    pub history: Vec<RoundResult>,
}

impl GameSession {
    pub fn new(challenge_count: usize, max_rounds: u32) -> Self {
        Self {
            total_score: 0,
            round: 1,
            challenge_count: clamp_challenge_count(challenge_count),
            max_rounds,
            perfect_streak: 0,
            best_streak: 0,
            history: Vec::new(),
        }
    }

    /// Fold a judged round into the running totals
    pub fn record(&mut self, result: &RoundResult) {
        self.total_score += result.total as u64;
        if result.perfect {
            self.perfect_streak += 1;
            self.best_streak = self.best_streak.max(self.perfect_streak);
        } else {
            self.perfect_streak = 0;
        }
        self.history.push(result.clone());
    }

    pub fn is_last_round(&self) -> bool {
        self.round >= self.max_rounds
    }
}

/// Per-round counters and entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub challenge: Option<Challenge>,
    pub falling: Vec<FallingItem>,
    pub caught: Vec<CaughtItem>,
    /// Ticks left on the round timer (only counts down while Falling)
    pub ticks_left: u64,
    /// Items that were caught or missed this round
    pub processed: u32,
    /// Every drop is caught or missed and the judge is scheduled
    pub all_processed: bool,
    pub result: Option<RoundResult>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Waiting,
            challenge: None,
            falling: Vec::new(),
            caught: Vec::new(),
            ticks_left: 0,
            processed: 0,
            all_processed: false,
            result: None,
        }
    }
}

/// Everything a renderer or HUD needs to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32 },
    ChallengeShown { kinds: Vec<SushiKind>, preview_ticks: u64 },
    ChallengeHidden { count: usize },
    ItemSpawned { id: u32, kind: SushiKind, pos: Vec2, sample: bool },
    ItemCaught { id: u32, kind: SushiKind, rest_pos: Vec2 },
    ItemMissed { id: u32 },
    /// Destroyed by a round reset or timeout rather than a miss
    ItemRemoved { id: u32 },
    PlateMoved { x: f32, dx: f32 },
    TimeUp,
    RoundJudged(RoundResult),
    GameOver { total_score: u64 },
}

/// Undrained events beyond this are dropped oldest-first
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub session: GameSession,
    pub round: RoundState,
    pub plate: Plate,
    /// Fall speed given to the next spawn (px/s)
    pub fall_speed: f32,
    pub cat_mood: CatMood,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub timers: TimerQueue,
    pub events: Vec<GameEvent>,
    /// Events dropped since the last drain
    pub dropped_events: u64,
    pub(crate) rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a game and start its first round
    pub fn new(seed: u64, challenge_count: usize, tuning: Tuning) -> Self {
        let session = GameSession::new(challenge_count, tuning.max_rounds);
        let mut state = Self {
            seed,
            fall_speed: tuning.initial_fall_speed(),
            tuning,
            session,
            round: RoundState::default(),
            plate: Plate::default(),
            cat_mood: CatMood::Normal,
            time_ticks: 0,
            timers: TimerQueue::new(),
            events: Vec::new(),
            dropped_events: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        super::tick::start_round(&mut state);

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn challenge_count(&self) -> usize {
        self.session.challenge_count
    }

    /// Replace the current challenge while the preview is still up
    pub fn set_challenge(&mut self, challenge: Challenge) {
        if self.round.phase != RoundPhase::Waiting {
            log::warn!("Ignoring challenge override outside the preview");
            return;
        }
        debug_assert_eq!(challenge.len(), self.challenge_count());
        self.round.challenge = Some(challenge);
    }

    pub fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let excess = self.events.len() + 1 - MAX_PENDING_EVENTS;
            if self.dropped_events == 0 {
                log::warn!(
                    "Event buffer full ({} undrained), dropping oldest events",
                    MAX_PENDING_EVENTS
                );
            }
            self.dropped_events += excess as u64;
            self.events.drain(..excess);
        }
        self.events.push(event);
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        if self.dropped_events > 0 {
            log::warn!("{} events were dropped before this drain", self.dropped_events);
            self.dropped_events = 0;
        }
        std::mem::take(&mut self.events)
    }

    /// Seconds left on the round timer (for the HUD)
    pub fn seconds_left(&self) -> f32 {
        crate::ticks_to_secs(self.round.ticks_left)
    }

    pub fn is_game_over(&self) -> bool {
        self.round.phase == RoundPhase::GameOver
    }
}
