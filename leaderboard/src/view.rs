use mosweeper_protocol::ListingQuery;
use serde::{Deserialize, Serialize};

use crate::{RankedRow, ScorePages};

pub const LOAD_FAILED: &str = "Failed to load";
pub const ALL_SCORES_FAILED: &str = "Failed to load scores";

/// Which ranking the leaderboard panel shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Entries recorded on the current local calendar date.
    #[default]
    Daily,
    AllTime,
}

impl Period {
    pub const fn listing_query(self) -> ListingQuery {
        match self {
            Self::Daily => ListingQuery::Daily,
            Self::AllTime => ListingQuery::Top,
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Daily => "No scores today yet!",
            Self::AllTime => "No scores yet!",
        }
    }
}

/// State of the always-visible top-N panel.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelView {
    Loading,
    Empty(&'static str),
    Failed(&'static str),
    Ranked(Vec<RankedRow>),
}

/// State of the paginated all-scores dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum AllScoresView {
    Empty(&'static str),
    Failed(&'static str),
    Pages(ScorePages),
}
