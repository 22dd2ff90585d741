//! The chirp posting agent.
//!
//! Publishes proactive posts on a schedule and replies to mentions that carry
//! a configured signal, drawing both from a weighted content library while
//! avoiding recently used items.
//!
//! - [`AgentConfig`]: layered configuration (defaults, `chirp.toml`, environment)
//! - [`Agent`]: actor that selects, remembers and publishes, one message at a time
//! - [`AgentServer`]: startup sequence, health endpoint, mention pump, scheduler
//! - [`AgentMetrics`]: activity counters served on `/metrics`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod api;
mod config;
mod keep_alive;
mod metrics;
mod server;

pub use agent::{Agent, AgentMessage, spawn_mention_pump};
pub use api::{ApiState, create_router, serve};
pub use config::AgentConfig;
pub use keep_alive::spawn_keep_alive;
pub use metrics::{AgentMetrics, MetricsSnapshot};
pub use server::AgentServer;
