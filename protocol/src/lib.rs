//! JSON bodies exchanged with the score endpoint.
//!
//! Writes are a single `POST` of a [`ScoreRecord`]. Reads are `GET` requests selected by a
//! [`ListingQuery`] and answered with a [`ListingResponse`].

use serde::{Deserialize, Serialize};

/// A finished game as submitted by a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub name: String,
    /// Seconds from the first click to the win.
    pub time: f64,
    /// Submission time in epoch milliseconds.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    /// Epoch milliseconds of every move made during the game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamps: Option<Vec<u64>>,
    /// Mine layout as `[row, col]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mines: Option<Vec<[u8; 2]>>,
}

/// When an entry was recorded, as the endpoint reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryTime {
    /// Epoch milliseconds.
    Millis(f64),
    /// Date string, usually RFC 3339.
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<EntryTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<EntryTime>,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, time: f64) -> Self {
        Self {
            name: name.into(),
            time,
            timestamp: None,
            date: None,
        }
    }

    pub fn with_timestamp(mut self, millis: f64) -> Self {
        self.timestamp = Some(EntryTime::Millis(millis));
        self
    }

    /// `timestamp` if present, `date` otherwise.
    pub fn recorded_at(&self) -> Option<&EntryTime> {
        self.timestamp.as_ref().or(self.date.as_ref())
    }
}

/// Listing payload, the endpoint answers with either key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<ScoreEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<ScoreEntry>>,
}

impl ListingResponse {
    pub fn into_entries(self) -> Vec<ScoreEntry> {
        self.leaderboard.or(self.scores).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingQuery {
    /// Ranked listing as the endpoint sorts it.
    Top,
    /// Ranked listing the endpoint narrows to today.
    Daily,
    /// Every submission ever recorded.
    AllScores,
}

impl ListingQuery {
    pub const fn query_pair(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Top => None,
            Self::Daily => Some(("daily", "true")),
            Self::AllScores => Some(("allScores", "true")),
        }
    }
}
