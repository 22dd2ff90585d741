//! Social platform capability for the chirp agent.
//!
//! The agent only needs four remote operations, split across two traits:
//! - [`SocialPlatform`]: upload media, attach alt text, publish a status
//! - [`MentionSource`]: an endless stream of inbound mentions
//!
//! [`publish_item`] runs the sequential upload, metadata, status chain for one
//! library item. [`MentionFilter`] decides which mentions deserve a reply.
//!
//! Two implementations ship with the crate: [`HttpPlatform`] talks to an
//! X-style v2 REST API, [`NoOpPlatform`] only logs and is used for dry runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filter;
mod http;
mod message;
mod noop;
mod platform;
mod publish;

pub use filter::{MentionFilter, MentionVerdict};
pub use http::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT, HttpPlatform};
pub use message::{
    InboundMessage, MediaId, PostResult, StatusUpdate, StatusUpdateBuilder,
    StatusUpdateBuilderError,
};
pub use noop::NoOpPlatform;
pub use platform::{MAX_MEDIA_BYTES, MentionSource, MentionStream, SocialPlatform};
pub use publish::{publish_item, reply_text};
