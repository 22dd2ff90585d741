//! Agent server: startup sequence and shutdown.

use crate::{
    Agent, AgentConfig, AgentMessage, AgentMetrics, ApiState, serve, spawn_keep_alive,
    spawn_mention_pump,
};
use chirp_core::{ContentKind, Library};
use chirp_error::ChirpResult;
use chirp_memory::{AntiRepeatMemory, MemoryStore};
use chirp_schedule::{Clock, LocalClock, ScheduleDriver};
use chirp_selection::ContentSelector;
use chirp_social::{MentionSource, SocialPlatform};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, instrument, warn};

/// Wires configuration, library, memories, platform and scheduler together.
pub struct AgentServer {
    config: AgentConfig,
    platform: Arc<dyn SocialPlatform>,
    mentions: Arc<dyn MentionSource>,
    clock: Arc<dyn Clock>,
    metrics: AgentMetrics,
    selector: Option<ContentSelector>,
    store: Option<Arc<dyn MemoryStore>>,
    bound: Option<oneshot::Sender<SocketAddr>>,
}

impl AgentServer {
    /// Creates a new server using the local wall clock.
    pub fn new(
        config: AgentConfig,
        platform: Arc<dyn SocialPlatform>,
        mentions: Arc<dyn MentionSource>,
    ) -> Self {
        Self {
            config,
            platform,
            mentions,
            clock: Arc::new(LocalClock),
            metrics: AgentMetrics::new(),
            selector: None,
            store: None,
            bound: None,
        }
    }

    /// Use a different clock for daily-times scheduling.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a specific selector, e.g. a seeded one.
    pub fn with_selector(mut self, selector: ContentSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Mirror memories to `store` instead of the configured one.
    pub fn with_memory_store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Receive the health endpoint address once it is bound.
    pub fn notify_bound(mut self, tx: oneshot::Sender<SocketAddr>) -> Self {
        self.bound = Some(tx);
        self
    }

    /// Counters updated while running.
    pub fn metrics(&self) -> AgentMetrics {
        self.metrics.clone()
    }

    async fn build_memory(
        &self,
        kind: ContentKind,
        store: Option<&Arc<dyn MemoryStore>>,
        key: Option<&String>,
    ) -> AntiRepeatMemory {
        let capacity = *self.config.memory_duration();
        let mut memory = match (store, key) {
            (Some(store), Some(key)) => {
                AntiRepeatMemory::with_store(capacity, Arc::clone(store), key.clone())
            }
            _ => AntiRepeatMemory::new(capacity),
        };

        if tokio::time::timeout(self.config.restore_period(), memory.restore())
            .await
            .is_err()
        {
            warn!(%kind, "Timed out restoring memory, starting empty");
        }
        memory
    }

    /// Start everything and run until `shutdown` resolves.
    ///
    /// Startup order: library, memories, health endpoint, mention pump,
    /// scheduler. Only configuration and library problems are returned;
    /// everything at runtime is logged and survived.
    ///
    /// # Errors
    ///
    /// Returns the error that prevented startup.
    #[instrument(skip_all, fields(handle = %self.config.handle()))]
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> ChirpResult<()> {
        info!("Starting agent");
        self.config.validate()?;
        let mode = self.config.schedule_mode()?;
        let filter = self.config.mention_filter()?;

        let library = Arc::new(Library::from_file(self.config.library_path())?);

        let store = self.store.clone().or_else(|| self.config.memory_store());
        let (post_memory, reply_memory) = tokio::join!(
            self.build_memory(
                ContentKind::Post,
                store.as_ref(),
                self.config.memory_posts_id().as_ref()
            ),
            self.build_memory(
                ContentKind::Reply,
                store.as_ref(),
                self.config.memory_replies_id().as_ref()
            ),
        );

        let (addr, health) = serve(*self.config.port(), ApiState::new(self.metrics.clone())).await?;
        if let Some(tx) = self.bound.take() {
            let _ = tx.send(addr);
        }

        let keep_alive = self.config.keep_alive_url().clone().map(|url| {
            let period = self
                .config
                .keep_alive_period()
                .unwrap_or(Duration::from_secs(5 * 60));
            spawn_keep_alive(reqwest::Client::new(), url, period)
        });

        let (tx, rx) = mpsc::channel(32);
        let mut agent = Agent::new(
            library,
            post_memory,
            reply_memory,
            Arc::clone(&self.platform),
            rx,
        )
        .with_metrics(self.metrics.clone());
        if let Some(selector) = self.selector.take() {
            agent = agent.with_selector(selector);
        }
        let agent_task = tokio::spawn(agent.run());

        let pump = spawn_mention_pump(
            Arc::clone(&self.mentions),
            filter,
            self.metrics.clone(),
            tx.clone(),
        );

        info!(mode = mode.name(), "I'm ready to post!");
        let mut driver = ScheduleDriver::new();
        driver.start(mode, Arc::clone(&self.clock), tx.clone());

        shutdown.await;
        info!("Shutdown requested");

        driver.stop();
        pump.abort();
        if let Some(keep_alive) = keep_alive {
            keep_alive.abort();
        }
        let _ = tx.send(AgentMessage::Shutdown).await;
        drop(tx);
        if let Err(e) = agent_task.await {
            warn!(error = %e, "Agent task ended abnormally");
        }
        health.abort();

        info!("Agent stopped");
        Ok(())
    }
}
