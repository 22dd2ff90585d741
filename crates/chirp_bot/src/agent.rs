//! The agent actor: selects, remembers and publishes.

use crate::AgentMetrics;
use chirp_core::{ContentItem, ContentKind, Library};
use chirp_memory::AntiRepeatMemory;
use chirp_schedule::PostRequest;
use chirp_selection::ContentSelector;
use chirp_social::{
    InboundMessage, MentionFilter, MentionSource, PostResult, SocialPlatform, publish_item,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Messages handled by the [`Agent`].
#[derive(Debug)]
pub enum AgentMessage {
    /// Publish a proactive post, then signal `done` if present.
    Post {
        /// Completion signal for fixed-interval scheduling.
        done: Option<oneshot::Sender<()>>,
    },
    /// Reply to a mention that passed the filter.
    Reply(InboundMessage),
    /// Stop the actor loop.
    Shutdown,
}

impl From<PostRequest> for AgentMessage {
    fn from(request: PostRequest) -> Self {
        Self::Post { done: request.done }
    }
}

/// Owns the library, both memories and the publisher.
///
/// Messages are processed one at a time, so every select and remember pair
/// on a memory completes before the next selection sees it.
pub struct Agent {
    library: Arc<Library>,
    post_memory: AntiRepeatMemory,
    reply_memory: AntiRepeatMemory,
    selector: ContentSelector,
    platform: Arc<dyn SocialPlatform>,
    metrics: AgentMetrics,
    rx: mpsc::Receiver<AgentMessage>,
}

impl Agent {
    /// Creates a new agent.
    pub fn new(
        library: Arc<Library>,
        post_memory: AntiRepeatMemory,
        reply_memory: AntiRepeatMemory,
        platform: Arc<dyn SocialPlatform>,
        rx: mpsc::Receiver<AgentMessage>,
    ) -> Self {
        Self {
            library,
            post_memory,
            reply_memory,
            selector: ContentSelector::from_entropy(),
            platform,
            metrics: AgentMetrics::new(),
            rx,
        }
    }

    /// Use a specific selector, e.g. a seeded one.
    pub fn with_selector(mut self, selector: ContentSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Report into an existing metrics collector.
    pub fn with_metrics(mut self, metrics: AgentMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Memory for a content kind.
    pub fn memory(&self, kind: ContentKind) -> &AntiRepeatMemory {
        match kind {
            ContentKind::Post => &self.post_memory,
            ContentKind::Reply => &self.reply_memory,
        }
    }

    /// Runs the actor loop until `Shutdown` or until every sender is gone.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Agent started");

        while let Some(message) = self.rx.recv().await {
            match message {
                AgentMessage::Post { done } => {
                    self.publish_post().await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
                AgentMessage::Reply(mention) => {
                    self.publish_reply(&mention).await;
                }
                AgentMessage::Shutdown => {
                    info!("Agent shutting down");
                    break;
                }
            }
        }
    }

    /// Select and remember an item of `kind`.
    ///
    /// The choice is remembered before anything is published, so a failed
    /// publish still counts as recent.
    fn choose(&mut self, kind: ContentKind) -> Option<ContentItem> {
        let items = self.library.items(kind);
        let memory = match kind {
            ContentKind::Post => &mut self.post_memory,
            ContentKind::Reply => &mut self.reply_memory,
        };

        match self.selector.select(items, memory) {
            Ok(selection) => {
                let item = selection.item.clone();
                memory.remember(selection.index);
                debug!(%kind, index = selection.index, "Selected content");
                Some(item)
            }
            Err(e) => {
                warn!(%kind, error = %e, "Nothing to select, skipping this cycle");
                self.metrics.record_skip();
                None
            }
        }
    }

    /// Publish one proactive post. Failures are logged, never returned.
    #[instrument(skip(self))]
    pub async fn publish_post(&mut self) -> Option<PostResult> {
        let item = self.choose(ContentKind::Post)?;
        match publish_item(self.platform.as_ref(), &self.library, &item, None).await {
            Ok(result) => {
                self.metrics.record_post();
                Some(result)
            }
            Err(e) => {
                error!(error = %e, text = %item.text(), "I tried to post, but there was an error");
                self.metrics.record_failure();
                None
            }
        }
    }

    /// Publish one reply to `mention`. Failures are logged, never returned.
    #[instrument(skip(self, mention), fields(author = %mention.author(), mention_id = %mention.id()))]
    pub async fn publish_reply(&mut self, mention: &InboundMessage) -> Option<PostResult> {
        let item = self.choose(ContentKind::Reply)?;
        match publish_item(self.platform.as_ref(), &self.library, &item, Some(mention)).await {
            Ok(result) => {
                self.metrics.record_reply();
                Some(result)
            }
            Err(e) => {
                error!(
                    error = %e,
                    text = %item.text(),
                    recipient = %mention.author(),
                    "I tried to reply, but there was an error"
                );
                self.metrics.record_failure();
                None
            }
        }
    }
}

/// Forward filtered mentions to the agent.
///
/// The task ends when the stream cannot be opened, when it ends, or when the
/// agent is gone.
pub fn spawn_mention_pump(
    source: Arc<dyn MentionSource>,
    filter: MentionFilter,
    metrics: AgentMetrics,
    tx: mpsc::Sender<AgentMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = match source.stream_mentions(filter.handle()).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Could not listen for mentions, replies are disabled");
                return;
            }
        };
        info!("I'm listening!");

        while let Some(mention) = stream.next().await {
            if !filter.should_reply(&mention) {
                continue;
            }
            metrics.record_mention();
            if tx.send(AgentMessage::Reply(mention)).await.is_err() {
                debug!("Agent stopped, closing mention stream");
                return;
            }
        }
        warn!("Mention stream ended");
    })
}
