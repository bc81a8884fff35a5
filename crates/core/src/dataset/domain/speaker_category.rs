use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Speaker group an utterance belongs to.
///
/// Accepts both `male`/`female` and the `m`/`f` codes; anything else is kept
/// verbatim. Persisted as the short code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpeakerCategory {
    Female,
    Male,
    Other(String),
}

impl SpeakerCategory {
    pub fn code(&self) -> &str {
        match self {
            SpeakerCategory::Female => "f",
            SpeakerCategory::Male => "m",
            SpeakerCategory::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("speaker category must not be empty")]
pub struct EmptyCategory;

impl FromStr for SpeakerCategory {
    type Err = EmptyCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err(EmptyCategory),
            "m" | "male" => Ok(SpeakerCategory::Male),
            "f" | "female" => Ok(SpeakerCategory::Female),
            _ => Ok(SpeakerCategory::Other(trimmed.to_string())),
        }
    }
}

impl fmt::Display for SpeakerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for SpeakerCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SpeakerCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
