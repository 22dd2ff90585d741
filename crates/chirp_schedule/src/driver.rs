//! Cancellable timer task that turns a [`ScheduleMode`] into post requests.

use crate::{Clock, PollOutcome, PostScheduler, ScheduleMode, Trigger};
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, trace, warn};

/// Request to publish one proactive post.
#[derive(Debug)]
pub struct PostRequest {
    /// Slot that fired, in daily-times mode.
    pub scheduled_for: Option<NaiveDateTime>,
    /// Signalled by the publisher when the attempt has finished, success or
    /// not. Present in fixed-interval mode only.
    pub done: Option<oneshot::Sender<()>>,
}

/// Owns the scheduler's timer task.
///
/// Starting again replaces the running task; stopping or dropping the driver
/// aborts it. A replaced timer never outlives its driver.
#[derive(Debug, Default)]
pub struct ScheduleDriver {
    handle: Option<JoinHandle<()>>,
    next_post_time: Arc<Mutex<Option<NaiveDateTime>>>,
}

impl ScheduleDriver {
    /// Create a stopped driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the timer task for `mode`, aborting any previous one.
    ///
    /// Requests are sent on `tx`; the task ends when the receiver is dropped.
    #[instrument(skip(self, clock, tx), fields(mode = mode.name()))]
    pub fn start<T>(&mut self, mode: ScheduleMode, clock: Arc<dyn Clock>, tx: mpsc::Sender<T>)
    where
        T: From<PostRequest> + Send + 'static,
    {
        self.stop();
        *self.next_post_time.lock() = None;

        let next = Arc::clone(&self.next_post_time);
        let handle = match mode {
            ScheduleMode::DailyTimes {
                triggers,
                poll_interval,
            } => tokio::spawn(run_daily(triggers, poll_interval, clock, tx, next)),
            ScheduleMode::FixedInterval { post_frequency } => {
                tokio::spawn(run_fixed(post_frequency, clock, tx, next))
            }
        };
        self.handle = Some(handle);
        info!("Scheduler started");
    }

    /// Abort the timer task, if running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Canceling scheduler task");
            handle.abort();
        }
    }

    /// Whether a timer task is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The next expected post time as last computed by the task.
    pub fn next_post_time(&self) -> Option<NaiveDateTime> {
        *self.next_post_time.lock()
    }
}

impl Drop for ScheduleDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_daily<T>(
    triggers: Vec<Trigger>,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<T>,
    next: Arc<Mutex<Option<NaiveDateTime>>>,
) where
    T: From<PostRequest> + Send + 'static,
{
    let mut scheduler = PostScheduler::new(triggers);
    *next.lock() = scheduler.start(clock.now());

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; polling starts one interval in.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let now = clock.now();
        match scheduler.poll_tick(now) {
            PollOutcome::PostDue { scheduled_for } => {
                *next.lock() = scheduler.next_post_time();
                let request = PostRequest {
                    scheduled_for: Some(scheduled_for),
                    done: None,
                };
                if tx.send(T::from(request)).await.is_err() {
                    warn!("Post receiver closed, stopping scheduler");
                    return;
                }
                scheduler.mark_dispatched();
            }
            PollOutcome::NotDue => trace!(%now, "Poll tick"),
        }
    }
}

async fn run_fixed<T>(
    post_frequency: Duration,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<T>,
    next: Arc<Mutex<Option<NaiveDateTime>>>,
) where
    T: From<PostRequest> + Send + 'static,
{
    loop {
        let (done_tx, done_rx) = oneshot::channel();
        let request = PostRequest {
            scheduled_for: None,
            done: Some(done_tx),
        };
        if tx.send(T::from(request)).await.is_err() {
            warn!("Post receiver closed, stopping scheduler");
            return;
        }
        // A dropped sender means the attempt ended without acknowledging.
        let _ = done_rx.await;

        let upcoming = chrono::Duration::from_std(post_frequency)
            .ok()
            .and_then(|d| clock.now().checked_add_signed(d));
        *next.lock() = upcoming;
        debug!(next_post_time = ?upcoming, "Re-arming post timer");
        tokio::time::sleep(post_frequency).await;
    }
}
