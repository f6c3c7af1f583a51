//! Sushi kinds and their fixed score values

use serde::{Deserialize, Serialize};

/// The ten kinds of sushi that can fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SushiKind {
    Tuna,
    Salmon,
    Chutoro,
    Ikura,
    Shrimp,
    Egg,
    Uni,
    Hotate,
    Iwashi,
    Tai,
}

impl SushiKind {
    pub const ALL: [SushiKind; 10] = [
        SushiKind::Tuna,
        SushiKind::Salmon,
        SushiKind::Chutoro,
        SushiKind::Ikura,
        SushiKind::Shrimp,
        SushiKind::Egg,
        SushiKind::Uni,
        SushiKind::Hotate,
        SushiKind::Iwashi,
        SushiKind::Tai,
    ];

    /// Points for catching this sushi when it is part of the challenge
    pub fn score(self) -> u32 {
        match self {
            SushiKind::Tuna => 10,
            SushiKind::Salmon => 10,
            SushiKind::Chutoro => 30,
            SushiKind::Ikura => 25,
            SushiKind::Shrimp => 15,
            SushiKind::Egg => 5,
            SushiKind::Uni => 40,
            SushiKind::Hotate => 20,
            SushiKind::Iwashi => 8,
            SushiKind::Tai => 15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SushiKind::Tuna => "tuna",
            SushiKind::Salmon => "salmon",
            SushiKind::Chutoro => "chutoro",
            SushiKind::Ikura => "ikura",
            SushiKind::Shrimp => "shrimp",
            SushiKind::Egg => "egg",
            SushiKind::Uni => "uni",
            SushiKind::Hotate => "hotate",
            SushiKind::Iwashi => "iwashi",
            SushiKind::Tai => "tai",
        }
    }

    /// Human-readable name for result breakdowns
    pub fn display_name(self) -> &'static str {
        match self {
            SushiKind::Tuna => "Tuna",
            SushiKind::Salmon => "Salmon",
            SushiKind::Chutoro => "Chutoro",
            SushiKind::Ikura => "Ikura",
            SushiKind::Shrimp => "Shrimp",
            SushiKind::Egg => "Egg",
            SushiKind::Uni => "Uni",
            SushiKind::Hotate => "Scallop",
            SushiKind::Iwashi => "Sardine",
            SushiKind::Tai => "Sea bream",
        }
    }

    /// Texture key the renderer loads for this sushi
    pub fn texture_key(self) -> String {
        format!("{}-sushi", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_kinds_distinct() {
        let set: HashSet<_> = SushiKind::ALL.iter().collect();
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in SushiKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_texture_key() {
        assert_eq!(SushiKind::Salmon.texture_key(), "salmon-sushi");
    }

    #[test]
    fn test_scores_positive() {
        assert!(SushiKind::ALL.iter().all(|k| k.score() > 0));
    }
}
