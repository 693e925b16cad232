//! Competitive rank tracks read from character progressions.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::character::CharacterId;

/// One progression entry as the remote API reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progression {
    pub progression_hash: u32,
    pub current_progress: u32,
    pub level: u32,
    pub level_cap: u32,
    pub step_index: u32,
    pub progress_to_next_level: u32,
    pub next_level_at: u32,
}

/// Progressions per character, keyed by progression hash.
pub type ProgressionSnapshot = BTreeMap<CharacterId, HashMap<u32, Progression>>;

const PVP_RANK_STEPS: [&str; 6] = ["Guardian", "Brave", "Heroic", "Fabled", "Mythic", "Legend"];

const GAMBIT_RANK_STEPS: [&str; 16] = [
    "Guardian 1",
    "Guardian 2",
    "Guardian 3",
    "Brave 1",
    "Brave 2",
    "Brave 3",
    "Heroic 1",
    "Heroic 2",
    "Heroic 3",
    "Fabled 1",
    "Fabled 2",
    "Fabled 3",
    "Mythic 1",
    "Mythic 2",
    "Mythic 3",
    "Legend",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTrack {
    Glory,
    Valor,
    Infamy,
}

impl RankTrack {
    pub fn progression_hash(self) -> u32 {
        match self {
            Self::Glory => 2_679_551_909,
            Self::Valor => 3_882_308_435,
            Self::Infamy => 2_772_425_241,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glory => "glory",
            Self::Valor => "valor",
            Self::Infamy => "infamy",
        }
    }

    fn steps(self) -> &'static [&'static str] {
        match self {
            Self::Glory | Self::Valor => &PVP_RANK_STEPS,
            Self::Infamy => &GAMBIT_RANK_STEPS,
        }
    }

    /// Rank name for a level; levels past the last step stay on it.
    pub fn rank_name(self, level: u32) -> &'static str {
        let steps = self.steps();
        let index = usize::try_from(level).unwrap_or(usize::MAX).min(steps.len() - 1);
        steps[index]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStanding {
    /// At the level cap; the track can be reset.
    Capped,
    /// One level below the cap.
    Legend,
    Climbing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub track: RankTrack,
    pub rank: &'static str,
    pub step_index: u32,
    pub level: u32,
    pub level_cap: u32,
    pub progress_to_next_level: u32,
    pub next_level_at: u32,
    pub points_to_next_rank: u32,
    pub standing: RankStanding,
}

impl Ranking {
    pub fn new(track: RankTrack, progression: &Progression) -> Self {
        let standing = if progression.level >= progression.level_cap {
            RankStanding::Capped
        } else if progression.level.saturating_add(1) == progression.level_cap {
            RankStanding::Legend
        } else {
            RankStanding::Climbing
        };

        Self {
            track,
            rank: track.rank_name(progression.level),
            step_index: progression.step_index,
            level: progression.level,
            level_cap: progression.level_cap,
            progress_to_next_level: progression.progress_to_next_level,
            next_level_at: progression.next_level_at,
            points_to_next_rank: progression.next_level_at.saturating_sub(progression.progress_to_next_level),
            standing,
        }
    }
}

/// Ranks are account-wide, so the first character carrying the track answers.
pub fn find_ranking(snapshot: &ProgressionSnapshot, track: RankTrack) -> Option<Ranking> {
    snapshot
        .values()
        .find_map(|progressions| progressions.get(&track.progression_hash()))
        .map(|progression| Ranking::new(track, progression))
}
