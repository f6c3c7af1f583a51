//! Round judging
//!
//! Scores the plate against the challenge. Only sushi that belongs to the
//! challenge earns points; the order bonus needs a full plate whose
//! left-to-right arrangement (by catch position) matches the challenge.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::challenge::Challenge;
use super::state::CaughtItem;
use super::sushi::SushiKind;

/// Message shown instead of the breakdown when the round clock runs out
pub const TIME_UP_MESSAGE: &str = "Time's up!";

/// One caught sushi's contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub kind: SushiKind,
    pub points: u32,
    /// Kind is part of the challenge set
    pub matched: bool,
}

/// Outcome of judging one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub challenge: Vec<SushiKind>,
    /// Caught sushi in catch order
    pub lines: Vec<ScoreLine>,
    pub base_score: u32,
    pub order_bonus: u32,
    pub total: u32,
    /// Every challenge kind was caught at least once
    pub perfect: bool,
    /// Plate was full, so the order was compared
    pub order_checked: bool,
    pub order_matched: bool,
    /// The sequence to show when the order bonus was missed
    pub correct_order: Option<Vec<SushiKind>>,
    pub timed_out: bool,
    pub message: String,
}

/// Score the caught sushi against the challenge
pub fn judge(challenge: &Challenge, caught: &[CaughtItem], order_bonus: u32) -> RoundResult {
    let lines: Vec<ScoreLine> = caught
        .iter()
        .map(|item| {
            let matched = challenge.contains(item.kind);
            ScoreLine {
                kind: item.kind,
                points: if matched { item.kind.score() } else { 0 },
                matched,
            }
        })
        .collect();
    let base_score: u32 = lines.iter().map(|l| l.points).sum();

    let perfect = challenge
        .kinds()
        .iter()
        .all(|kind| caught.iter().any(|c| c.kind == *kind));

    let order_checked = caught.len() >= challenge.len();
    let order_matched = order_checked && matches_order(challenge, caught);
    let bonus = if order_matched { order_bonus } else { 0 };

    let mut result = RoundResult {
        round: 0,
        challenge: challenge.kinds().to_vec(),
        lines,
        base_score,
        order_bonus: bonus,
        total: base_score + bonus,
        perfect,
        order_checked,
        order_matched,
        correct_order: (!order_matched).then(|| challenge.kinds().to_vec()),
        timed_out: false,
        message: String::new(),
    };
    result.message = result.breakdown();
    result
}

/// Caught sushi sorted left-to-right by catch position equals the challenge
fn matches_order(challenge: &Challenge, caught: &[CaughtItem]) -> bool {
    let mut sorted: Vec<&CaughtItem> = caught.iter().collect();
    // Stable sort keeps catch order on ties
    sorted.sort_by(|a, b| a.catch_x.total_cmp(&b.catch_x));
    sorted.len() == challenge.len()
        && sorted
            .iter()
            .zip(challenge.kinds())
            .all(|(item, kind)| item.kind == *kind)
}

impl RoundResult {
    /// Per-item breakdown plus total
    pub fn breakdown(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if line.matched {
                let _ = writeln!(out, "{}: {}", line.kind.display_name(), line.points);
            } else {
                let _ = writeln!(out, "{} (decoy): 0", line.kind.display_name());
            }
        }
        if self.order_bonus > 0 {
            let _ = writeln!(out, "Order bonus: {}", self.order_bonus);
        }
        let _ = write!(out, "Total: {}", self.total);
        if let Some(order) = &self.correct_order {
            let names: Vec<&str> = order.iter().map(|k| k.display_name()).collect();
            let _ = write!(out, "\nCorrect order: {}", names.join(", "));
        }
        out
    }

    /// Replace the breakdown with the time-up notice; scores stay as caught
    pub fn mark_timed_out(&mut self) {
        self.timed_out = true;
        self.message = TIME_UP_MESSAGE.to_string();
    }

    /// Short result banner
    pub fn headline(&self) -> &'static str {
        if self.timed_out {
            TIME_UP_MESSAGE
        } else if self.perfect && self.order_matched {
            "Purrfect!"
        } else if self.perfect {
            "Nice catch!"
        } else {
            "So close..."
        }
    }
}
