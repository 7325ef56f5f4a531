//! The polling, bot-loop avoidance and delivery engine.
//!
//! Agents poll Fizzy and push rendered messages onto a shared
//! [`DeliveryQueue`]; the [`Dispatcher`] drains it to OpenClaw on its own
//! cadence. The [`Scheduler`] wires both together.

pub mod agent;
pub mod breadcrumbs;
pub mod dispatcher;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod shutdown;

pub use agent::{Agent, Verdict};
pub use breadcrumbs::{Breadcrumbs, Step};
pub use dispatcher::{Dispatcher, DrainReport};
pub use queue::{DeliveryQueue, QueueItem};
pub use registry::BotUserRegistry;
pub use scheduler::Scheduler;
pub use shutdown::Shutdown;
