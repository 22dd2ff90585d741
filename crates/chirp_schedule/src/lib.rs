//! Post scheduling for the chirp agent.
//!
//! Two strategies, selected by [`ScheduleMode`]:
//!
//! - **Daily times**: a table of local time-of-day [`Trigger`]s. A coarse poll
//!   ([`PostScheduler::poll_tick`]) compares the wall clock against the next
//!   due slot at whole-minute resolution.
//! - **Fixed interval**: post on startup, then again `post_frequency` after
//!   each publish completes.
//!
//! [`ScheduleDriver`] runs either strategy on a cancellable tokio task and
//! emits [`PostRequest`]s over a channel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod driver;
mod mode;
mod scheduler;
mod trigger;

pub use clock::{Clock, LocalClock, compute_next_time, is_passed};
pub use driver::{PostRequest, ScheduleDriver};
pub use mode::{DEFAULT_POLL_INTERVAL, ScheduleMode};
pub use scheduler::{PollOutcome, PostScheduler, SchedulerPhase};
pub use trigger::Trigger;
