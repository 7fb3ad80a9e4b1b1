//! Feed broadcast events.
//!
//! A [`BroadcastEvent`] is produced by a request handler after a post
//! mutation commits and is consumed synchronously by the hub's coordinator;
//! it has no independent lifecycle and is immutable once constructed.

use serde::{Deserialize, Serialize};

use crate::post::PostSnapshot;

/// What happened to the post carried by a broadcast event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedAction {
    /// A post was created.
    Create,
    /// A post was edited.
    Update,
    /// A post was deleted.
    Delete,
}

impl FeedAction {
    /// Wire name of the action (`"create"` / `"update"` / `"delete"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One feed change, fanned out to every live connection.
///
/// Serialized as a single JSON text frame:
/// `{"action":"create","post":{...}}`. For `Delete`, `post` is the snapshot
/// taken just before the row was removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// The mutation kind.
    pub action: FeedAction,
    /// Post state after the mutation (before it, for deletes).
    pub post: PostSnapshot,
}

impl BroadcastEvent {
    /// Build an event for a given action and post view.
    #[must_use]
    pub fn new(action: FeedAction, post: PostSnapshot) -> Self {
        Self { action, post }
    }
}
