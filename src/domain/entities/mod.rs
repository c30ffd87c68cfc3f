//! # Domain Entities
//!
//! Core domain types of the relay.
//!
//! - **Group**: source group to fellow chat mapping, persisted
//! - **RelayMessage**: one message on its way to a fellow chat, transient
//! - **PlatformEvent**: raw update observed on the chat platform
//!
//! ## Collaborator Traits
//!
//! Each external collaborator has a trait here; implementations live in the
//! infrastructure layer.

mod event;
mod fellow;
mod group;
mod message;

pub use event::{Chat, ChatKind, EventStream, EventTransport, PlatformEvent, PlatformMessage, Sender};
pub use fellow::DestinationGateway;
pub use group::{Group, GroupRepository};
pub use message::RelayMessage;

#[cfg(test)]
pub use event::MockEventTransport;
#[cfg(test)]
pub use fellow::MockDestinationGateway;
#[cfg(test)]
pub use group::MockGroupRepository;
