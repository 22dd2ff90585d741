//! REST client for an X-style v2 API.

use crate::{
    InboundMessage, MediaId, MentionSource, MentionStream, PostResult, SocialPlatform,
    StatusUpdate,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chirp_error::{PublishError, PublishStep};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

/// Default API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.x.com";

/// Upper bound on a single API call unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer-token client for the platform's REST API.
///
/// Mentions are polled from the user's mention timeline rather than pushed,
/// so the stream survives transport errors by simply polling again.
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    user_id: Option<String>,
    poll_interval: Duration,
    request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct MentionPage {
    #[serde(default)]
    data: Vec<MentionData>,
    #[serde(default)]
    includes: Includes,
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct MentionData {
    id: String,
    text: String,
    author_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    newest_id: Option<String>,
}

impl MentionPage {
    /// Messages oldest first, with authors resolved to screen names.
    ///
    /// A mention whose author has no screen name in `includes` cannot be
    /// addressed, so it is dropped.
    fn into_messages(self) -> Vec<InboundMessage> {
        let names: HashMap<String, String> = self
            .includes
            .users
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();
        self.data
            .into_iter()
            .rev()
            .filter_map(|m| {
                let author = m.author_id.as_ref().and_then(|id| names.get(id).cloned());
                match author {
                    Some(author) => Some(InboundMessage::new(m.id, author, m.text)),
                    None => {
                        warn!(
                            id = %m.id,
                            author_id = ?m.author_id,
                            "Mention author has no screen name, skipping"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

impl HttpPlatform {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            user_id: None,
            poll_interval: Duration::from_secs(60),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Account whose mentions are streamed.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Delay between mention polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Give up on any single API call after `timeout`.
    ///
    /// A call that times out fails its publish step like any other error.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        step: PublishStep,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, PublishError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.access_token)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, %step, "Request failed");
                PublishError::failed(step, send_failure(&e, self.request_timeout))
            })?;
        decode(step, response).await
    }

    async fn fetch_mentions(
        &self,
        user_id: &str,
        since_id: Option<&str>,
    ) -> Result<MentionPage, PublishError> {
        let mut query = vec![
            ("expansions", "author_id".to_string()),
            ("user.fields", "username".to_string()),
        ];
        if let Some(since_id) = since_id {
            query.push(("since_id", since_id.to_string()));
        }

        let response = self
            .client
            .get(self.url(&format!("/2/users/{}/mentions", user_id)))
            .bearer_auth(&self.access_token)
            .query(&query)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                PublishError::failed(PublishStep::Stream, send_failure(&e, self.request_timeout))
            })?;
        decode(PublishStep::Stream, response).await
    }
}

fn send_failure(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("no response within {:?}", timeout)
    } else {
        format!("request failed: {}", e)
    }
}

async fn decode<T: DeserializeOwned>(
    step: PublishStep,
    response: reqwest::Response,
) -> Result<T, PublishError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(%status, %body, %step, "API returned error");
        return Err(PublishError::failed(
            step,
            format!("HTTP {}: {}", status.as_u16(), body),
        ));
    }
    response.json().await.map_err(|e| {
        error!(error = ?e, %step, "Failed to parse response");
        PublishError::failed(step, format!("failed to parse response: {}", e))
    })
}

#[async_trait]
impl SocialPlatform for HttpPlatform {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaId, PublishError> {
        let body = json!({
            "media": STANDARD.encode(&bytes),
            "media_category": "tweet_image",
        });
        let uploaded: Envelope<IdData> = self
            .post_json(PublishStep::Upload, "/2/media/upload", body)
            .await?;
        Ok(MediaId::new(uploaded.data.id))
    }

    #[instrument(skip(self, alt_text))]
    async fn attach_metadata(
        &self,
        media_id: &MediaId,
        alt_text: &str,
    ) -> Result<(), PublishError> {
        let body = json!({
            "id": media_id,
            "metadata": { "alt_text": { "text": alt_text } },
        });
        let _: serde_json::Value = self
            .post_json(PublishStep::Metadata, "/2/media/metadata", body)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, status), fields(in_reply_to = status.in_reply_to().as_deref()))]
    async fn publish_status(&self, status: StatusUpdate) -> Result<PostResult, PublishError> {
        let mut body = json!({ "text": status.text() });
        if let Some(media_id) = status.media_id() {
            body["media"] = json!({ "media_ids": [media_id] });
        }
        if let Some(reply_to) = status.in_reply_to() {
            body["reply"] = json!({ "in_reply_to_tweet_id": reply_to });
        }
        let created: Envelope<TweetData> = self
            .post_json(PublishStep::Status, "/2/tweets", body)
            .await?;
        Ok(PostResult::new(created.data.id, created.data.text))
    }

    fn platform_name(&self) -> &'static str {
        "http"
    }
}

#[async_trait]
impl MentionSource for HttpPlatform {
    #[instrument(skip(self))]
    async fn stream_mentions(&self, track_term: &str) -> Result<MentionStream, PublishError> {
        let Some(user_id) = self.user_id.clone() else {
            return Err(PublishError::failed(
                PublishStep::Stream,
                "no user id configured for the mention timeline",
            ));
        };

        let platform = self.clone();
        let track_term = track_term.to_string();
        info!(%user_id, "Listening for mentions");

        let stream = async_stream::stream! {
            let mut ticker = tokio::time::interval(platform.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Mentions that predate startup are skipped, only the cursor is kept.
            let mut primed = false;
            let mut since_id: Option<String> = None;

            loop {
                ticker.tick().await;
                let page = match platform.fetch_mentions(&user_id, since_id.as_deref()).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(error = %e, "Mention poll failed, will retry");
                        continue;
                    }
                };
                if let Some(newest) = page.meta.as_ref().and_then(|m| m.newest_id.clone()) {
                    since_id = Some(newest);
                }
                if !primed {
                    primed = true;
                    debug!(since_id = ?since_id, "Mention cursor primed");
                    continue;
                }
                for message in page.into_messages() {
                    debug!(id = %message.id(), author = %message.author(), %track_term, "Mention received");
                    yield message;
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
