//! Periodic self-ping for hosts that sleep idle apps.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Spawn a task that GETs `url` every `period`, starting one period from now.
///
/// A ping gets at most one period to answer. Failures are logged and the
/// next ping proceeds as usual.
pub fn spawn_keep_alive(client: reqwest::Client, url: String, period: Duration) -> JoinHandle<()> {
    info!(%url, ?period, "Keeping awake");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match client.get(&url).timeout(period).send().await {
                Ok(response) => debug!(status = %response.status(), "Keep-alive ping"),
                Err(e) => warn!(error = %e, "Keep-alive ping failed"),
            }
        }
    })
}
