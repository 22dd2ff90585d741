//! Timer task behaviour under paused tokio time.

use chirp_schedule::{Clock, PostRequest, ScheduleDriver, ScheduleMode, Trigger};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Wall clock that advances with tokio's (paused) time.
struct TestClock {
    origin: NaiveDateTime,
    started: Instant,
}

impl TestClock {
    fn at(h: u32, m: u32) -> Arc<Self> {
        Arc::new(Self {
            origin: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            started: Instant::now(),
        })
    }
}

impl Clock for TestClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
        self.origin + elapsed
    }
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_daily_fires_on_first_poll_after_slot() {
    let clock = TestClock::at(9, 0);
    let mode = ScheduleMode::daily(
        vec![Trigger::new(9, 30).unwrap(), Trigger::new(16, 30).unwrap()],
        Duration::from_secs(7 * 60),
    )
    .unwrap();
    let (tx, mut rx) = mpsc::channel::<PostRequest>(4);

    let mut driver = ScheduleDriver::new();
    driver.start(mode, clock.clone(), tx);

    let request = rx.recv().await.unwrap();
    assert_eq!(request.scheduled_for, Some(at(9, 30)));
    assert!(request.done.is_none());
    // Polls land at 09:07, 09:14, 09:21, 09:28, 09:35.
    assert_eq!(clock.now(), at(9, 35));
    assert_eq!(driver.next_post_time(), Some(at(16, 30)));
    assert!(driver.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_fixed_posts_immediately_then_after_ack() {
    let clock = TestClock::at(12, 0);
    let frequency = Duration::from_secs(60 * 60);
    let (tx, mut rx) = mpsc::channel::<PostRequest>(4);

    let mut driver = ScheduleDriver::new();
    driver.start(ScheduleMode::fixed(frequency).unwrap(), clock.clone(), tx);

    let started = Instant::now();
    let first = rx.recv().await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(first.scheduled_for.is_none());

    // Hold the acknowledgement: nothing else may be requested meanwhile.
    tokio::time::sleep(Duration::from_secs(3 * 60 * 60)).await;
    assert!(rx.try_recv().is_err());

    let acked_at = Instant::now();
    first.done.unwrap().send(()).unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(acked_at.elapsed(), frequency);
    assert!(second.done.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_fixed_continues_when_ack_dropped() {
    let clock = TestClock::at(12, 0);
    let (tx, mut rx) = mpsc::channel::<PostRequest>(4);

    let mut driver = ScheduleDriver::new();
    driver.start(
        ScheduleMode::fixed(Duration::from_secs(60)).unwrap(),
        clock,
        tx,
    );

    drop(rx.recv().await.unwrap());
    assert!(rx.recv().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_task() {
    let clock = TestClock::at(12, 0);
    let (old_tx, mut old_rx) = mpsc::channel::<PostRequest>(4);
    let (new_tx, mut new_rx) = mpsc::channel::<PostRequest>(4);

    let mut driver = ScheduleDriver::new();
    driver.start(
        ScheduleMode::fixed(Duration::from_secs(60)).unwrap(),
        clock.clone(),
        old_tx,
    );
    driver.start(
        ScheduleMode::fixed(Duration::from_secs(60)).unwrap(),
        clock,
        new_tx,
    );

    assert!(new_rx.recv().await.is_some());
    // The aborted task dropped its sender.
    tokio::time::sleep(Duration::from_secs(120)).await;
    while let Ok(request) = old_rx.try_recv() {
        drop(request);
    }
    assert!(old_rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stop_and_drop_cancel() {
    let clock = TestClock::at(12, 0);
    let (tx, mut rx) = mpsc::channel::<PostRequest>(4);

    let mut driver = ScheduleDriver::new();
    driver.start(
        ScheduleMode::fixed(Duration::from_secs(60)).unwrap(),
        clock,
        tx,
    );
    assert!(driver.is_running());
    driver.stop();
    assert!(!driver.is_running());

    while let Ok(request) = rx.try_recv() {
        drop(request);
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_task_ends_when_receiver_closes() {
    let clock = TestClock::at(12, 0);
    let (tx, rx) = mpsc::channel::<PostRequest>(1);
    drop(rx);

    let mut driver = ScheduleDriver::new();
    driver.start(
        ScheduleMode::fixed(Duration::from_secs(60)).unwrap(),
        clock,
        tx,
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!driver.is_running());
}
