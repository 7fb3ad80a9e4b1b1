//! `/feed` routes: paginated listing and post CRUD.
//!
//! Every successful mutation publishes a [`BroadcastEvent`] to the hub
//! *after* the store commit, so feed subscribers only ever see durable
//! state. Publishing is best-effort: a hub refusal (shutdown in progress)
//! is logged and never fails the HTTP request.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use plaza_core::{BroadcastEvent, FeedAction, Post, PostId, validate};
use plaza_store::{NewPost, UpdatePost};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub(crate) struct PageQuery {
    page: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostListResponse {
    posts: Vec<Post>,
    total_items: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostInput {
    title: String,
    content: String,
    image_url: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct PostResponse {
    message: String,
    post: Post,
}

#[derive(Serialize)]
pub(crate) struct DeleteResponse {
    message: String,
}

async fn publish(state: &AppState, action: FeedAction, post: &Post) {
    if let Err(e) = state
        .hub
        .publish(BroadcastEvent::new(action, post.snapshot()))
        .await
    {
        warn!(post_id = %post.id, error = %e, "feed broadcast skipped");
    }
}

/// GET /feed/posts?page=N
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_data = state
        .posts
        .list_page(page, state.settings.server.page_size)?;
    Ok(Json(PostListResponse {
        posts: page_data.posts,
        total_items: page_data.total_items,
    }))
}

/// GET /feed/post/{id}
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .posts
        .get(&PostId::from_string(id))?
        .ok_or_else(|| ApiError::not_found("post does not exist"))?;
    Ok(Json(post))
}

/// POST /feed/post
pub(crate) async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    validate::post_title(&input.title)?;
    validate::post_content(&input.content)?;

    let post = state.posts.create(&NewPost {
        title: &input.title,
        content: &input.content,
        image_url: input.image_url.as_deref(),
        creator_id: &user_id,
    })?;

    publish(&state, FeedAction::Create, &post).await;
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "Post created successfully".into(),
            post,
        }),
    ))
}

/// PUT /feed/post/{id}
pub(crate) async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    validate::post_title(&input.title)?;
    validate::post_content(&input.content)?;

    let id = PostId::from_string(id);
    let existing = state
        .posts
        .get(&id)?
        .ok_or_else(|| ApiError::not_found("post does not exist"))?;
    if existing.creator_id != user_id {
        return Err(ApiError::forbidden("only the creator can edit a post"));
    }

    let post = state.posts.update(
        &id,
        &UpdatePost {
            title: &input.title,
            content: &input.content,
            image_url: input.image_url.as_deref(),
        },
    )?;

    publish(&state, FeedAction::Update, &post).await;
    Ok(Json(PostResponse {
        message: "Post updated successfully".into(),
        post,
    }))
}

/// DELETE /feed/post/{id}
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = PostId::from_string(id);
    // Snapshot before the row disappears; the delete event carries it.
    let existing = state
        .posts
        .get(&id)?
        .ok_or_else(|| ApiError::not_found("post does not exist"))?;
    if existing.creator_id != user_id {
        return Err(ApiError::forbidden("only the creator can delete a post"));
    }

    state.posts.delete(&id)?;
    publish(&state, FeedAction::Delete, &existing).await;
    Ok(Json(DeleteResponse {
        message: "Post deleted successfully".into(),
    }))
}
