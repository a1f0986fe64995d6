use core::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::watch;

use crate::*;

#[cfg(not(target_arch = "wasm32"))]
mod clock {
    pub(super) use tokio::time::{Instant, sleep_until};
}

// tokio timers need `std::time::Instant`, which the browser does not provide
#[cfg(target_arch = "wasm32")]
mod clock {
    pub(super) use web_time::Instant;

    pub(super) async fn sleep_until(deadline: Instant) {
        let wait = deadline.saturating_duration_since(Instant::now());
        gloo::timers::future::sleep(wait).await;
    }
}

use clock::Instant;

/// Repeating deadline. The first tick fires immediately, later ones one period after the
/// previous tick completed. Dropping a pending `tick` keeps the deadline.
#[derive(Debug)]
struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }

    async fn tick(&mut self) {
        clock::sleep_until(self.next).await;
        self.next = Instant::now() + self.period;
    }

    /// Pushes the next tick a full period away from now.
    fn reset(&mut self) {
        self.next = Instant::now() + self.period;
    }
}

/// Tracks the local calendar date so the daily view can reload right after midnight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateWatch {
    last_date: NaiveDate,
}

impl DateWatch {
    pub fn new(today: NaiveDate) -> Self {
        Self { last_date: today }
    }

    /// Records `today` and reports whether `period` needs a reload because the date moved.
    pub fn rolled_over(&mut self, today: NaiveDate, period: Period) -> bool {
        if today == self.last_date {
            return false;
        }
        log::debug!("Local date moved from {} to {}", self.last_date, today);
        self.last_date = today;
        period == Period::Daily
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Periodic reload of the leaderboard panel.
///
/// Reloads every refresh interval, whenever the watched [`Period`] changes, and when the
/// local date rolls over while the daily view is shown. The returned future runs until the
/// period sender is dropped; dropping the future stops it as well.
#[derive(Clone, Debug)]
pub struct AutoRefresh {
    refresh_every: Duration,
    date_check_every: Duration,
    today: fn() -> NaiveDate,
}

impl AutoRefresh {
    pub fn new(config: &LeaderboardConfig) -> Self {
        Self {
            refresh_every: config.refresh_interval(),
            date_check_every: config.date_check_interval(),
            today: local_today,
        }
    }

    /// Replaces the source of the current local date.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn run<E, F>(
        self,
        client: &LeaderboardClient<E>,
        mut period: watch::Receiver<Period>,
        mut publish: F,
    ) where
        E: ScoreEndpoint,
        F: FnMut(PanelView),
    {
        let mut refresh = Ticker::new(self.refresh_every);
        let mut date_check = Ticker::new(self.date_check_every);
        let mut date_watch = DateWatch::new((self.today)());

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    let current = *period.borrow();
                    publish(client.load_panel(current).await);
                }
                _ = date_check.tick() => {
                    let current = *period.borrow();
                    if date_watch.rolled_over((self.today)(), current) {
                        publish(client.load_panel(current).await);
                    }
                }
                changed = period.changed() => {
                    if changed.is_err() {
                        log::debug!("Leaderboard view closed, auto-refresh stopped");
                        return;
                    }
                    let current = *period.borrow_and_update();
                    publish(PanelView::Loading);
                    publish(client.load_panel(current).await);
                    refresh.reset();
                }
            }
        }
    }
}
