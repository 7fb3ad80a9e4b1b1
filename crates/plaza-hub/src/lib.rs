//! # plaza-hub
//!
//! The real-time broadcast hub behind the live feed.
//!
//! Many long-lived peer connections attach to a [`FeedHub`]; request
//! handlers publish a [`plaza_core::BroadcastEvent`] after each post
//! mutation commits, and the hub fans the event out to every live
//! connection. A single coordinator task owns the connection registry, so
//! registry membership needs no lock; network writes happen on independent
//! per-delivery tasks so a slow peer can only ever delay itself.
//!
//! Delivery is fire-and-forget: there is no backlog, no replay, and no
//! delivery guarantee. A peer that is disconnected while an event is
//! published misses it permanently; a reconnecting peer starts receiving
//! from its moment of attach.

#![deny(unsafe_code)]

mod connection;
mod coordinator;
mod entry;
mod hub;

pub use connection::{ConnectionError, ConnectionHandle, FeedConnection};
pub use hub::{FeedHub, HubConfig, HubError};
