use core::fmt;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use mosweeper_protocol::{EntryTime, ScoreEntry};

/// Parses the recorded time of an entry, `None` when absent or unreadable.
pub fn recorded_at(entry: &ScoreEntry) -> Option<DateTime<Utc>> {
    match entry.recorded_at()? {
        EntryTime::Millis(millis) => DateTime::from_timestamp_millis(*millis as i64),
        EntryTime::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|date| date.to_utc())
            .or_else(|_| {
                text.parse::<NaiveDate>()
                    .map(|day| day.and_time(NaiveTime::default()).and_utc())
            })
            .ok(),
    }
}

/// Keeps entries recorded on `date` as seen from `tz`.
pub fn filter_on_date<Tz: TimeZone>(
    entries: Vec<ScoreEntry>,
    date: NaiveDate,
    tz: &Tz,
) -> Vec<ScoreEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            recorded_at(entry).is_some_and(|at| at.with_timezone(tz).date_naive() == date)
        })
        .collect()
}

/// Stable ascending sort, fastest first.
pub fn sort_by_time(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Reduces the list to each player's fastest entry, sorted fastest first.
///
/// Names match case-insensitively after trimming. The kept entry is the first one seen
/// with the player's minimum time, so its capitalization is what gets displayed.
pub fn best_per_player(entries: impl IntoIterator<Item = ScoreEntry>) -> Vec<ScoreEntry> {
    let mut best: Vec<ScoreEntry> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = entry.name.trim().to_lowercase();
        match index_by_name.get(&key) {
            Some(&index) => {
                if entry.time < best[index].time {
                    best[index] = entry;
                }
            }
            None => {
                index_by_name.insert(key, best.len());
                best.push(entry);
            }
        }
    }

    sort_by_time(&mut best);
    best
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rank {
    Gold,
    Silver,
    Bronze,
    Ordinal(usize),
}

impl Rank {
    /// Rank of the entry at zero-based `index` of the full list.
    pub const fn at_index(index: usize) -> Self {
        match index {
            0 => Self::Gold,
            1 => Self::Silver,
            2 => Self::Bronze,
            _ => Self::Ordinal(index + 1),
        }
    }

    pub const fn is_medal(self) -> bool {
        !matches!(self, Self::Ordinal(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gold => f.write_str("🥇"),
            Self::Silver => f.write_str("🥈"),
            Self::Bronze => f.write_str("🥉"),
            Self::Ordinal(n) => write!(f, "{n}."),
        }
    }
}

/// One line of a rendered leaderboard.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedRow {
    pub rank: Rank,
    pub name: String,
    pub time: f64,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RankedRow {
    /// `12.30s`
    pub fn time_label(&self) -> String {
        format!("{:.2}s", self.time)
    }

    /// Date and `HH:MM` in `tz`, empty when the entry has no time stamp.
    pub fn recorded_label<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.recorded_at
            .map(|at| at.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Rows for `entries`, ranked as if the first one sat at `offset` in the full list.
pub fn ranked_rows(entries: &[ScoreEntry], offset: usize) -> Vec<RankedRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| RankedRow {
            rank: Rank::at_index(offset + index),
            name: entry.name.clone(),
            time: entry.time,
            recorded_at: recorded_at(entry),
        })
        .collect()
}
