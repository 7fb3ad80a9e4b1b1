//! # plaza-core
//!
//! Foundation types for the Plaza social-posting backend.
//!
//! This crate provides the shared vocabulary the other Plaza crates depend on:
//!
//! - **Branded IDs**: `UserId`, `PostId`, `ConnectionId` as newtypes for type safety
//! - **Domain types**: `Post`, `PostSnapshot`, `Creator`
//! - **Feed events**: `FeedAction` and `BroadcastEvent` (the wire frame payload)
//! - **Validation**: input checks shared by the HTTP layer

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod post;
pub mod validate;

pub use events::{BroadcastEvent, FeedAction};
pub use ids::{ConnectionId, PostId, UserId};
pub use post::{Creator, Post, PostSnapshot};
