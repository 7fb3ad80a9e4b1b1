//! Feed post repository.
//!
//! Every read joins `users` so the creator display name rides along with
//! the post, ready for broadcast snapshots.

use chrono::Utc;
use plaza_core::{Creator, Post, PostId, UserId};
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};
use crate::row::parse_timestamp;

/// Input for creating a post.
pub struct NewPost<'a> {
    /// Post title.
    pub title: &'a str,
    /// Post body.
    pub content: &'a str,
    /// Optional image location.
    pub image_url: Option<&'a str>,
    /// The authoring user.
    pub creator_id: &'a UserId,
}

/// Input for editing a post.
pub struct UpdatePost<'a> {
    /// New title.
    pub title: &'a str,
    /// New body.
    pub content: &'a str,
    /// New image location (`None` keeps the stored one).
    pub image_url: Option<&'a str>,
}

/// One page of the feed plus the overall total.
#[derive(Debug)]
pub struct PostPage {
    /// The page's posts, newest first.
    pub posts: Vec<Post>,
    /// Total number of posts across all pages.
    pub total_items: u64,
}

/// Repository for the `posts` table.
#[derive(Clone)]
pub struct PostRepository {
    pool: ConnectionPool,
}

const SELECT_POST: &str = "SELECT p.id, p.title, p.content, p.image_url, p.creator_id,
        u.name, p.created_at, p.updated_at
 FROM posts p JOIN users u ON u.id = p.creator_id";

impl PostRepository {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Insert a post and return it with the creator name resolved.
    pub fn create(&self, post: &NewPost<'_>) -> Result<Post> {
        let conn = self.pool.get()?;
        let id = PostId::new();
        let now = Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO posts (id, title, content, image_url, creator_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id.as_str(),
                post.title,
                post.content,
                post.image_url,
                post.creator_id.as_str(),
                now
            ],
        )?;
        debug!(post_id = %id, creator_id = %post.creator_id, "post created");
        drop(conn);
        self.get(&id)?.ok_or(StoreError::NotFound {
            entity: "post",
            id: id.into_inner(),
        })
    }

    /// Fetch one post by ID.
    pub fn get(&self, id: &PostId) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("{SELECT_POST} WHERE p.id = ?1"),
                params![id.as_str()],
                map_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Apply an edit and return the updated post.
    ///
    /// Fails with [`StoreError::NotFound`] when the post doesn't exist.
    pub fn update(&self, id: &PostId, update: &UpdatePost<'_>) -> Result<Post> {
        let conn = self.pool.get()?;
        let changed = conn.execute(
            "UPDATE posts
             SET title = ?1, content = ?2,
                 image_url = COALESCE(?3, image_url),
                 updated_at = ?4
             WHERE id = ?5",
            params![
                update.title,
                update.content,
                update.image_url,
                Utc::now().to_rfc3339(),
                id.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "post",
                id: id.as_str().to_owned(),
            });
        }
        drop(conn);
        self.get(id)?.ok_or(StoreError::NotFound {
            entity: "post",
            id: id.as_str().to_owned(),
        })
    }

    /// Delete a post. Fails with [`StoreError::NotFound`] when absent.
    pub fn delete(&self, id: &PostId) -> Result<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute("DELETE FROM posts WHERE id = ?1", params![id.as_str()])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "post",
                id: id.as_str().to_owned(),
            });
        }
        debug!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Fetch one feed page, newest posts first. Pages are 1-based.
    pub fn list_page(&self, page: u64, per_page: u64) -> Result<PostPage> {
        let conn = self.pool.get()?;
        let total_items: u64 =
            conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        let offset = page.saturating_sub(1) * per_page;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_POST} ORDER BY p.created_at DESC, p.id DESC LIMIT ?1 OFFSET ?2"
        ))?;
        let posts = stmt
            .query_map(params![per_page, offset], map_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(PostPage { posts, total_items })
    }
}

fn map_post(row: &Row<'_>) -> std::result::Result<Post, rusqlite::Error> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Post {
        id: PostId::from_string(row.get(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        creator_id: UserId::from_string(row.get(4)?),
        creator: Creator { name: row.get(5)? },
        created_at: parse_timestamp(6, &created_at)?,
        updated_at: parse_timestamp(7, &updated_at)?,
    })
}
