use core::cell::RefCell;

use chrono::{DateTime, Local, TimeZone};
use mosweeper_core::epoch_millis;
use mosweeper_protocol::{ListingQuery, ScoreEntry, ScoreRecord};

use crate::*;

/// Marker returned once a record left for the endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubmitAck {
    pub submitted_at_ms: u64,
}

/// Leaderboard access for a single UI thread.
///
/// The rate limiter sits in a [`RefCell`]: every call happens on the thread driving the UI,
/// and no borrow is held across an `.await`.
#[derive(Debug)]
pub struct LeaderboardClient<E> {
    endpoint: E,
    config: LeaderboardConfig,
    limiter: RefCell<RateLimiter>,
}

impl<E: ScoreEndpoint> LeaderboardClient<E> {
    pub fn new(endpoint: E, config: LeaderboardConfig) -> Self {
        let limiter = RefCell::new(RateLimiter::new(&config.rate_limit));
        Self {
            endpoint,
            config,
            limiter,
        }
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Checks a submission against the field rules and the rate limit.
    ///
    /// Only [`Self::submit`] counts an attempt against the limit, so repeated calls here
    /// never throttle on their own.
    pub fn validate(&self, name: &str, time: f64) -> core::result::Result<(), ValidationError> {
        self.validate_at(name, time, epoch_millis())
    }

    pub fn validate_at(
        &self,
        name: &str,
        time: f64,
        now_ms: u64,
    ) -> core::result::Result<(), ValidationError> {
        self.limiter.borrow_mut().validate(name, time, now_ms)
    }

    pub async fn submit(&self, record: ScoreRecord) -> Result<SubmitAck> {
        self.submit_at(record, epoch_millis()).await
    }

    /// Trims the name, then validates and sends `record`; validation failures never reach
    /// the network.
    ///
    /// The attempt counts against the rate limit as soon as it passes validation, even if
    /// the transport then fails.
    pub async fn submit_at(&self, mut record: ScoreRecord, now_ms: u64) -> Result<SubmitAck> {
        record.name = record.name.trim().to_string();
        if let Err(err) = self.validate_at(&record.name, record.time, now_ms) {
            log::warn!("Rejected score for {:?}: {}", record.name, err);
            return Err(err.into());
        }
        self.limiter.borrow_mut().record(&record.name, now_ms);

        self.endpoint
            .post_score(&record)
            .await
            .inspect_err(|err| log::warn!("Score submission failed: {}", err))?;

        Ok(SubmitAck {
            submitted_at_ms: now_ms,
        })
    }

    /// Ranked entries for `period`, fastest first.
    pub async fn fetch_leaderboard(&self, period: Period) -> Result<Vec<ScoreEntry>> {
        self.fetch_leaderboard_at(period, &Local::now()).await
    }

    /// Same as [`Self::fetch_leaderboard`] with "today" taken from `now`.
    pub async fn fetch_leaderboard_at<Tz: TimeZone>(
        &self,
        period: Period,
        now: &DateTime<Tz>,
    ) -> Result<Vec<ScoreEntry>> {
        let mut entries = self
            .endpoint
            .fetch_listing(period.listing_query())
            .await?
            .into_entries();

        if period == Period::Daily {
            entries = filter_on_date(entries, now.date_naive(), &now.timezone());
        }
        sort_by_time(&mut entries);
        Ok(entries)
    }

    /// Every player's best entry, fastest first.
    pub async fn fetch_all_scores(&self) -> Result<Vec<ScoreEntry>> {
        let entries = self
            .endpoint
            .fetch_listing(ListingQuery::AllScores)
            .await?
            .into_entries();
        Ok(best_per_player(entries))
    }

    pub async fn load_panel(&self, period: Period) -> PanelView {
        self.load_panel_at(period, &Local::now()).await
    }

    /// Top entries for the panel; failures become a displayable state.
    pub async fn load_panel_at<Tz: TimeZone>(
        &self,
        period: Period,
        now: &DateTime<Tz>,
    ) -> PanelView {
        match self.fetch_leaderboard_at(period, now).await {
            Ok(entries) if entries.is_empty() => PanelView::Empty(period.empty_message()),
            Ok(entries) => {
                let top = &entries[..entries.len().min(self.config.top_n)];
                PanelView::Ranked(ranked_rows(top, 0))
            }
            Err(err) => {
                log::warn!("Loading {:?} leaderboard failed: {}", period, err);
                PanelView::Failed(LOAD_FAILED)
            }
        }
    }

    pub async fn load_all_scores(&self) -> AllScoresView {
        match self.fetch_all_scores().await {
            Ok(entries) if entries.is_empty() => {
                AllScoresView::Empty(Period::AllTime.empty_message())
            }
            Ok(entries) => AllScoresView::Pages(ScorePages::new(entries, self.config.page_size)),
            Err(err) => {
                log::warn!("Loading all scores failed: {}", err);
                AllScoresView::Failed(ALL_SCORES_FAILED)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use mosweeper_protocol::ListingResponse;

    /// In-memory endpoint that records posts and replays canned listings.
    #[derive(Default)]
    pub(crate) struct FakeEndpoint {
        pub(crate) posted: RefCell<Vec<ScoreRecord>>,
        pub(crate) queries: RefCell<Vec<ListingQuery>>,
        pub(crate) listing: RefCell<Vec<ScoreEntry>>,
        pub(crate) offline: bool,
    }

    impl FakeEndpoint {
        pub(crate) fn with_listing(listing: Vec<ScoreEntry>) -> Self {
            Self {
                listing: RefCell::new(listing),
                ..Default::default()
            }
        }

        pub(crate) fn offline() -> Self {
            Self {
                offline: true,
                ..Default::default()
            }
        }
    }

    impl ScoreEndpoint for FakeEndpoint {
        async fn post_score(&self, record: &ScoreRecord) -> Result<()> {
            if self.offline {
                return Err(LeaderboardError::Transport("offline".into()));
            }
            self.posted.borrow_mut().push(record.clone());
            Ok(())
        }

        async fn fetch_listing(&self, query: ListingQuery) -> Result<ListingResponse> {
            self.queries.borrow_mut().push(query);
            if self.offline {
                return Err(LeaderboardError::Transport("offline".into()));
            }
            Ok(ListingResponse {
                scores: Some(self.listing.borrow().clone()),
                leaderboard: None,
            })
        }
    }

    fn record(name: &str, time: f64) -> ScoreRecord {
        ScoreRecord {
            name: name.to_string(),
            time,
            timestamp: 0,
            start_time: None,
            time_stamps: None,
            mines: None,
        }
    }

    fn client(endpoint: FakeEndpoint) -> LeaderboardClient<FakeEndpoint> {
        LeaderboardClient::new(endpoint, LeaderboardConfig::default())
    }

    const NOW_MS: u64 = 1_740_824_100_000;

    #[tokio::test]
    async fn invalid_submission_never_reaches_the_endpoint() {
        let client = client(FakeEndpoint::default());

        let err = client.submit_at(record("", 10.0), NOW_MS).await.unwrap_err();

        assert!(matches!(
            err,
            LeaderboardError::Validation(ValidationError::NameRequired)
        ));
        assert_eq!(err.to_string(), "name required");
        assert!(client.endpoint().posted.borrow().is_empty());
    }

    #[tokio::test]
    async fn fourth_submission_within_five_minutes_is_throttled() {
        let client = client(FakeEndpoint::default());

        for i in 0..3 {
            let ack = client
                .submit_at(record("bob", 10.0), NOW_MS + i * 1000)
                .await
                .unwrap();
            assert_eq!(ack.submitted_at_ms, NOW_MS + i * 1000);
        }
        let err = client
            .submit_at(record("bob", 10.0), NOW_MS + 4000)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LeaderboardError::Validation(ValidationError::TooManySubmissions)
        ));
        assert_eq!(client.endpoint().posted.borrow().len(), 3);
    }

    #[tokio::test]
    async fn submitted_names_are_trimmed() {
        let client = client(FakeEndpoint::default());
        let padded = format!("  {}  ", "A".repeat(20));

        client.submit_at(record("  bob  ", 10.0), NOW_MS).await.unwrap();
        client.submit_at(record(&padded, 10.0), NOW_MS).await.unwrap();

        let posted: Vec<_> = client
            .endpoint()
            .posted
            .borrow()
            .iter()
            .map(|record| record.name.clone())
            .collect();
        assert_eq!(posted, vec!["bob".to_string(), "A".repeat(20)]);

        // padding does not dodge the per-name limit
        client.submit_at(record(" bob", 10.0), NOW_MS).await.unwrap();
        client.submit_at(record("bob ", 10.0), NOW_MS).await.unwrap();
        assert_eq!(
            client.validate_at("  bob", 10.0, NOW_MS),
            Err(ValidationError::TooManySubmissions)
        );
    }

    #[test]
    fn validate_alone_never_throttles() {
        let client = client(FakeEndpoint::default());
        for _ in 0..4 {
            assert_eq!(client.validate_at("bob", 10.0, NOW_MS), Ok(()));
        }
    }

    #[tokio::test]
    async fn transport_failure_is_reported_and_still_counted() {
        let client = client(FakeEndpoint::offline());

        let err = client.submit_at(record("bob", 10.0), NOW_MS).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Transport(_)));
        assert!(!err.is_validation());

        client.submit_at(record("bob", 10.0), NOW_MS).await.unwrap_err();
        client.submit_at(record("bob", 10.0), NOW_MS).await.unwrap_err();
        assert_eq!(
            client.validate_at("bob", 10.0, NOW_MS),
            Err(ValidationError::TooManySubmissions)
        );
    }

    #[tokio::test]
    async fn daily_leaderboard_keeps_todays_entries_sorted() {
        let today = DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").unwrap();
        let yesterday_ms = today.timestamp_millis() as f64 - 86_400_000.0;
        let today_ms = today.timestamp_millis() as f64;
        let client = client(FakeEndpoint::with_listing(vec![
            ScoreEntry::new("slow", 30.0).with_timestamp(today_ms),
            ScoreEntry::new("old", 1.0).with_timestamp(yesterday_ms),
            ScoreEntry::new("fast", 5.0).with_timestamp(today_ms),
        ]));

        let entries = client
            .fetch_leaderboard_at(Period::Daily, &today.with_timezone(&Utc))
            .await
            .unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "slow"]);
        assert_eq!(
            *client.endpoint().queries.borrow(),
            vec![ListingQuery::Daily]
        );
    }

    #[tokio::test]
    async fn all_time_leaderboard_is_not_date_filtered() {
        let now = DateTime::parse_from_rfc3339("2025-03-01T12:00:00+09:00").unwrap();
        let client = client(FakeEndpoint::with_listing(vec![
            ScoreEntry::new("b", 2.0),
            ScoreEntry::new("a", 1.0),
        ]));

        let entries = client
            .fetch_leaderboard_at::<FixedOffset>(Period::AllTime, &now)
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a");
        assert_eq!(*client.endpoint().queries.borrow(), vec![ListingQuery::Top]);
    }

    #[tokio::test]
    async fn all_scores_are_deduplicated() {
        let client = client(FakeEndpoint::with_listing(vec![
            ScoreEntry::new("Bob", 12.3),
            ScoreEntry::new("bob", 9.9),
            ScoreEntry::new("Alice", 20.0),
        ]));

        let best = client.fetch_all_scores().await.unwrap();

        let names: Vec<_> = best.iter().map(|e| (e.name.as_str(), e.time)).collect();
        assert_eq!(names, vec![("bob", 9.9), ("Alice", 20.0)]);
        assert_eq!(
            *client.endpoint().queries.borrow(),
            vec![ListingQuery::AllScores]
        );
    }

    #[tokio::test]
    async fn panel_shows_top_entries_with_medals() {
        let listing = (0..15)
            .map(|i| ScoreEntry::new(format!("p{i}"), 10.0 + i as f64))
            .collect();
        let client = client(FakeEndpoint::with_listing(listing));

        let view = client.load_panel_at(Period::AllTime, &Utc::now()).await;

        let PanelView::Ranked(rows) = &view else {
            panic!("expected ranked rows, got {view:?}");
        };
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].rank, Rank::Gold);
        assert_eq!(rows[9].rank, Rank::Ordinal(10));
    }

    #[tokio::test]
    async fn panel_reports_empty_and_failed_states() {
        let empty = client(FakeEndpoint::default());
        assert_eq!(
            empty.load_panel_at(Period::Daily, &Utc::now()).await,
            PanelView::Empty("No scores today yet!")
        );
        assert_eq!(
            empty.load_panel_at(Period::AllTime, &Utc::now()).await,
            PanelView::Empty("No scores yet!")
        );

        let offline = client(FakeEndpoint::offline());
        assert_eq!(
            offline.load_panel_at(Period::Daily, &Utc::now()).await,
            PanelView::Failed(LOAD_FAILED)
        );
        assert_eq!(
            offline.load_all_scores().await,
            AllScoresView::Failed(ALL_SCORES_FAILED)
        );
    }

    #[tokio::test]
    async fn all_scores_view_is_paginated() {
        let listing = (0..45)
            .map(|i| ScoreEntry::new(format!("p{i}"), 10.0 + i as f64))
            .collect();
        let client = client(FakeEndpoint::with_listing(listing));

        let AllScoresView::Pages(pages) = client.load_all_scores().await else {
            panic!("expected pages");
        };

        assert_eq!(pages.total_pages(), 3);
        assert_eq!(pages.page(3).len(), 5);
    }
}
