//! Challenge generation
//!
//! A challenge is the ordered run of sushi the player must reproduce on the
//! plate. It is shown during the preview and then hidden.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::sushi::SushiKind;
use crate::consts::{MAX_CHALLENGE, MIN_CHALLENGE};

/// The target sequence for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    kinds: Vec<SushiKind>,
}

/// Clamp a requested challenge size into the selectable range
pub fn clamp_challenge_count(count: usize) -> usize {
    if !(MIN_CHALLENGE..=MAX_CHALLENGE).contains(&count) {
        log::warn!(
            "Challenge size {} out of range, clamping to {}..={}",
            count,
            MIN_CHALLENGE,
            MAX_CHALLENGE
        );
    }
    count.clamp(MIN_CHALLENGE, MAX_CHALLENGE)
}

impl Challenge {
    /// Draw `count` kinds independently and uniformly (repeats allowed)
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let count = clamp_challenge_count(count);
        let kinds = (0..count)
            .map(|_| SushiKind::ALL[rng.random_range(0..SushiKind::ALL.len())])
            .collect();
        Self { kinds }
    }

    /// Build a fixed challenge (tests, replays)
    pub fn from_kinds(kinds: Vec<SushiKind>) -> Self {
        debug_assert!(!kinds.is_empty(), "challenge must not be empty");
        Self { kinds }
    }

    pub fn kinds(&self) -> &[SushiKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<SushiKind> {
        self.kinds.get(slot).copied()
    }

    pub fn contains(&self, kind: SushiKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Kinds that never appear in this challenge
    pub fn decoy_pool(&self) -> Vec<SushiKind> {
        SushiKind::ALL
            .into_iter()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    /// Pick a decoy uniformly, or `None` if every kind is in the challenge
    pub fn pick_decoy<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SushiKind> {
        self.decoy_pool().choose(rng).copied()
    }
}
