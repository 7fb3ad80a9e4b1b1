//! # plaza-store
//!
//! `SQLite` persistence for the Plaza backend.
//!
//! - Connection pooling via `r2d2` with WAL-mode pragmas on every connection
//! - Embedded, versioned schema migrations
//! - [`UserRepository`] and [`PostRepository`] over the pooled connections

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod posts;
mod row;
pub mod users;

pub use connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use errors::{Result, StoreError};
pub use posts::{NewPost, PostPage, PostRepository, UpdatePost};
pub use users::{NewUser, UserRecord, UserRepository};
