//! Post domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PostId, UserId};

/// Display information about a post's author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// The author's display name.
    pub name: String,
}

/// A feed post as stored and served.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post ID.
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Optional image location (opaque string; file storage is external).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// ID of the authoring user.
    #[serde(skip)]
    pub creator_id: UserId,
    /// Resolved author display info.
    pub creator: Creator,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// The externally visible view of this post, as broadcast to feed
    /// subscribers. Identical to the HTTP representation.
    #[must_use]
    pub fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            image_url: self.image_url.clone(),
            creator: self.creator.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The externally visible fields of a post plus the creator display name.
///
/// The broadcast hub serializes and forwards this value without interpreting
/// it; it is the `post` field of every delivered feed frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSnapshot {
    /// Post ID.
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Optional image location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Author display info.
    pub creator: Creator,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_post() -> Post {
        Post {
            id: PostId::from("post_1"),
            title: "First Post".into(),
            content: "This is the first post!".into(),
            image_url: None,
            creator_id: UserId::from("user_1"),
            creator: Creator {
                name: "John Needle".into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_carries_visible_fields() {
        let post = make_post();
        let snap = post.snapshot();
        assert_eq!(snap.id, post.id);
        assert_eq!(snap.title, post.title);
        assert_eq!(snap.content, post.content);
        assert_eq!(snap.creator.name, "John Needle");
    }

    #[test]
    fn post_serializes_camel_case_without_creator_id() {
        let post = make_post();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], "post_1");
        assert_eq!(json["creator"]["name"], "John Needle");
        assert!(json["createdAt"].is_string());
        assert!(json.get("creatorId").is_none());
        assert!(json.get("creator_id").is_none());
    }

    #[test]
    fn absent_image_url_is_omitted() {
        let post = make_post();
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("imageUrl").is_none());

        let with_image = Post {
            image_url: Some("images/cook.jpg".into()),
            ..make_post()
        };
        let json = serde_json::to_value(&with_image).unwrap();
        assert_eq!(json["imageUrl"], "images/cook.jpg");
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let snap = make_post().snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: PostSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, snap.id);
        assert_eq!(back.creator, snap.creator);
    }
}
