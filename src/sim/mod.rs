//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Delayed actions through the timer queue, never wall-clock callbacks
//! - No rendering or platform dependencies

pub mod catch;
pub mod challenge;
pub mod judge;
pub mod state;
pub mod sushi;
pub mod tick;
pub mod timers;

pub use catch::{ItemOutcome, draw_order, resolve_item};
pub use challenge::Challenge;
pub use judge::{RoundResult, ScoreLine, judge};
pub use state::{
    CatMood, CaughtItem, FallingItem, GameEvent, GameSession, GameState, Plate, RoundPhase,
    RoundState,
};
pub use sushi::SushiKind;
pub use tick::{TickInput, advance_round, tick};
pub use timers::{TimerAction, TimerQueue};
