//! Data-driven game balance
//!
//! Every knob that shapes difficulty lives here so it can be overridden from
//! JSON without touching the simulation. Missing fields fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_CHALLENGE, SIM_DT};

/// Errors loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Chance that a drop is the challenge's next sushi rather than a decoy
    pub sample_probability: f64,

    // === Falling ===
    /// Fall speed of the first round (px/s)
    pub fall_speed_start: f32,
    pub fall_speed_min: f32,
    pub fall_speed_max: f32,
    /// Added after a perfect round
    pub fall_speed_perfect_step: f32,
    /// Removed after an imperfect round
    pub fall_speed_miss_step: f32,

    // === Catch zone ===
    /// Max vertical distance between sushi and plate surface
    pub catch_vertical: f32,
    /// Horizontal tolerance = base + per_item * challenge size
    pub catch_horizontal_base: f32,
    pub catch_horizontal_per_item: f32,

    // === Movement ===
    /// Plate travel per tick while an arrow key is held (px)
    pub move_step: f32,
    /// Plate travel per pointer press (px)
    pub nudge_step: f32,

    // === Pacing (milliseconds) ===
    pub preview_base_ms: u32,
    pub preview_per_item_ms: u32,
    pub spawn_delay_ms: u32,
    pub judge_delay_ms: u32,
    pub round_time_ms: u32,

    // === Scoring ===
    pub order_bonus: u32,
    pub max_rounds: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sample_probability: 0.6,

            fall_speed_start: 200.0,
            fall_speed_min: 150.0,
            fall_speed_max: 400.0,
            fall_speed_perfect_step: 10.0,
            fall_speed_miss_step: 5.0,

            catch_vertical: 20.0,
            catch_horizontal_base: 30.0,
            catch_horizontal_per_item: 12.0,

            move_step: 4.0,
            nudge_step: 50.0,

            preview_base_ms: 500,
            preview_per_item_ms: 500,
            spawn_delay_ms: 500,
            judge_delay_ms: 1000,
            round_time_ms: 30_000,

            order_bonus: 100,
            max_rounds: 5,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON (`sushi-cat --dump-tuning`)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(0.0..=1.0).contains(&self.sample_probability) {
            return Err(invalid("sample_probability", "must be within [0, 1]"));
        }
        if self.fall_speed_min <= 0.0 {
            return Err(invalid("fall_speed_min", "must be positive"));
        }
        if self.fall_speed_min > self.fall_speed_max {
            return Err(invalid(
                "fall_speed_min",
                format!(
                    "{} exceeds fall_speed_max {}",
                    self.fall_speed_min, self.fall_speed_max
                ),
            ));
        }
        if self.catch_vertical <= 0.0 {
            return Err(invalid("catch_vertical", "must be positive"));
        }
        // Faster than this and a sushi can step clean over the catch window
        let max_speed = 2.0 * self.catch_vertical / SIM_DT;
        for (field, speed) in [
            ("fall_speed_max", self.fall_speed_max),
            ("fall_speed_start", self.fall_speed_start),
        ] {
            if speed > max_speed {
                return Err(invalid(
                    field,
                    format!(
                        "{} px/s skips the {} px catch window (limit {})",
                        speed, self.catch_vertical, max_speed
                    ),
                ));
            }
        }
        if self.catch_horizontal_base < 0.0 || self.catch_horizontal_per_item < 0.0 {
            return Err(invalid("catch_horizontal_base", "tolerances cannot be negative"));
        }
        if self
            .preview_per_item_ms
            .checked_mul(MAX_CHALLENGE as u32)
            .and_then(|ms| ms.checked_add(self.preview_base_ms))
            .is_none()
        {
            return Err(invalid(
                "preview_per_item_ms",
                "preview for the largest challenge overflows",
            ));
        }
        if self.round_time_ms == 0 {
            return Err(invalid("round_time_ms", "must be non-zero"));
        }
        if self.max_rounds == 0 {
            return Err(invalid("max_rounds", "must be at least 1"));
        }
        Ok(())
    }

    /// Starting fall speed, clamped into the allowed band
    pub fn initial_fall_speed(&self) -> f32 {
        self.fall_speed_start
            .clamp(self.fall_speed_min, self.fall_speed_max)
    }

    /// Horizontal catch tolerance for a challenge size (wider plate, wider zone)
    pub fn catch_horizontal(&self, challenge_count: usize) -> f32 {
        self.catch_horizontal_base + self.catch_horizontal_per_item * challenge_count as f32
    }

    /// How long the challenge preview stays up
    pub fn preview_ms(&self, challenge_count: usize) -> u32 {
        self.preview_per_item_ms
            .saturating_mul(challenge_count as u32)
            .saturating_add(self.preview_base_ms)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}
