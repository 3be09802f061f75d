//! Group tags
//!
//! A group tag correlates everything one launch produces: it is attached to
//! every submitted job, embedded in job names, and used as the key of the
//! persisted parameter record. The format is `fruit-animal--YYYYMMDDHHMMSS`
//! (UTC). Two launches in the same second can draw the same word pair, so a
//! tag is a human-friendly correlation key, not a uniqueness guarantee.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const FRUITS: [&str; 24] = [
    "apple",
    "banana",
    "cherry",
    "dragonfruit",
    "elderberry",
    "fig",
    "grape",
    "honeydew",
    "kiwi",
    "lemon",
    "mango",
    "nectarine",
    "orange",
    "papaya",
    "quince",
    "raspberry",
    "strawberry",
    "tangerine",
    "ugli",
    "vanilla",
    "watermelon",
    "xigua",
    "yam",
    "zucchini",
];

const ANIMALS: [&str; 24] = [
    "alpaca", "badger", "camel", "dolphin", "eagle", "ferret", "gecko", "heron", "ibis", "jaguar",
    "koala", "lemur", "marmot", "narwhal", "otter", "panda", "quokka", "raccoon", "seal", "tapir",
    "urchin", "vulture", "walrus", "yak",
];

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Correlation identifier for one pipeline launch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupTag(String);

impl GroupTag {
    /// Generate a tag from the thread RNG and the current time
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng(), Utc::now())
    }

    /// Generate a tag from an explicit RNG and timestamp
    pub fn generate_with<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let fruit = FRUITS[rng.gen_range(0..FRUITS.len())];
        let animal = ANIMALS[rng.gen_range(0..ANIMALS.len())];

        Self(format!(
            "{}-{}--{}",
            fruit,
            animal,
            now.format(TIMESTAMP_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
