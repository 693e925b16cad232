use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::taxonomy::ClassType;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub membership_id: String,
    pub membership_type: i32,
    pub class_type: ClassType,
    pub level: u32,
    pub light: u32,
    pub last_played: DateTime<Utc>,
}

/// Orders characters so the most recently played one comes first.
pub fn sort_by_last_played(characters: &mut [Character]) {
    characters.sort_by(|left, right| right.last_played.cmp(&left.last_played));
}
