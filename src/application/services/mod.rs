//! Application Services
//!
//! The relay pipeline, in control-flow order:
//!
//! - **Listener**: ingestion loop over the platform event transport
//! - **DispatchPool**: bounded queue and worker set between ingestion and delivery
//! - **RelayController**: resolves fellow chats and delivers messages

pub mod dispatch_pool;
pub mod listener;
pub mod relay_controller;

pub use dispatch_pool::{DispatchPool, SubmitOutcome};
pub use listener::{relay_message_from, Listener};
pub use relay_controller::{RelayController, RelayService};
