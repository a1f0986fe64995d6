use mosweeper_core::{Board, GameSummary, epoch_millis};
use mosweeper_protocol::ScoreRecord;

use crate::*;

/// A won game waiting for its score to be submitted, at most once.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedGame {
    summary: GameSummary,
    submitted: bool,
}

impl FinishedGame {
    pub fn new(summary: GameSummary) -> Self {
        Self {
            summary,
            submitted: false,
        }
    }

    /// `None` unless the board has been won.
    pub fn from_board(board: &Board) -> Option<Self> {
        board.summary().map(Self::new)
    }

    pub fn summary(&self) -> &GameSummary {
        &self.summary
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn record(&self, name: &str) -> ScoreRecord {
        self.record_at(name, epoch_millis())
    }

    pub fn record_at(&self, name: &str, now_ms: u64) -> ScoreRecord {
        ScoreRecord {
            name: name.trim().to_string(),
            time: self.summary.elapsed_secs(),
            timestamp: now_ms,
            start_time: Some(self.summary.started_at_ms),
            time_stamps: Some(self.summary.event_timestamps_ms.clone()),
            mines: Some(
                self.summary
                    .mines
                    .iter()
                    .map(|&(row, col)| [row, col])
                    .collect(),
            ),
        }
    }

    pub async fn submit<E: ScoreEndpoint>(
        &mut self,
        client: &LeaderboardClient<E>,
        name: &str,
    ) -> Result<SubmitAck> {
        self.submit_at(client, name, epoch_millis()).await
    }

    /// Sends the score once. A failed attempt leaves the game open for another try.
    pub async fn submit_at<E: ScoreEndpoint>(
        &mut self,
        client: &LeaderboardClient<E>,
        name: &str,
        now_ms: u64,
    ) -> Result<SubmitAck> {
        if self.submitted {
            return Err(LeaderboardError::AlreadySubmitted);
        }
        let ack = client.submit_at(self.record_at(name, now_ms), now_ms).await?;
        self.submitted = true;
        log::info!("Score of {:.2}s submitted", self.summary.elapsed_secs());
        Ok(ack)
    }
}
