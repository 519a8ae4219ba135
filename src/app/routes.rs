use crate::app::auth::Authorized;
use crate::app::error::ApiError;
use crate::app::state::AppState;
use crate::core::aggregate::{Aggregation, AggregationMode};
use crate::core::listing::{filter_by_title, paginate, PageRequest};
use crate::domain::model::{Comment, NewPost, PageMeta, Post, PostPatch};
use crate::utils::validation::{parse_positive_id, Validate};
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, RawQuery, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct PostsBody {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostPageBody {
    pub posts: Vec<Post>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostBody {
    pub post: Post,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentsBody {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut params = query_params(raw);
        Self {
            search: params.remove("search"),
        }
    }
}

// Kept as strings so bad numbers fall back to defaults instead of rejecting.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut params = query_params(raw);
        Self {
            page: params.remove("page"),
            limit: params.remove("limit"),
            search: params.remove("search"),
        }
    }
}

/// Decodes a query string leniently: the first occurrence of a key wins and
/// invalid UTF-8 is replaced rather than rejected.
fn query_params(raw: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

type ApiResult<T> = std::result::Result<T, ApiError>;

type RawId = std::result::Result<Path<String>, PathRejection>;
type RawBody = std::result::Result<Bytes, BytesRejection>;

// A path segment that does not even decode is as invalid as a non-numeric one.
fn path_id(raw: RawId) -> Option<i64> {
    raw.ok().and_then(|Path(raw)| parse_positive_id(&raw))
}

fn post_id(raw: RawId) -> ApiResult<i64> {
    path_id(raw).ok_or_else(|| ApiError::BadRequest("Invalid post id".to_string()))
}

fn user_id(raw: RawId) -> ApiResult<i64> {
    path_id(raw).ok_or_else(|| ApiError::BadRequest("Invalid user id".to_string()))
}

fn parse_body<T: DeserializeOwned + Validate>(body: RawBody) -> ApiResult<T> {
    let body = body?;
    let parsed: T = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid body: {}", e)))?;
    parsed
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Invalid body: {}", e)))?;
    Ok(parsed)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn list_posts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<PostsBody>> {
    let query = SearchQuery::from_raw(raw.as_deref());

    let posts = state
        .source
        .fetch_posts()
        .await
        .map_err(ApiError::upstream("Failed to fetch posts"))?;

    let posts = filter_by_title(posts, query.search.as_deref().unwrap_or_default());
    Ok(Json(PostsBody { posts }))
}

pub async fn list_posts_paginated(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<PostPageBody>> {
    let query = PageQuery::from_raw(raw.as_deref());
    let request = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());

    let posts = state
        .source
        .fetch_posts()
        .await
        .map_err(ApiError::upstream("Failed to fetch paginated posts"))?;

    let filtered = filter_by_title(posts, query.search.as_deref().unwrap_or_default());
    let (posts, meta) = paginate(filtered, request);
    Ok(Json(PostPageBody { posts, meta }))
}

pub async fn get_post(
    State(state): State<AppState>,
    raw_id: RawId,
) -> ApiResult<Json<PostBody>> {
    let id = post_id(raw_id)?;

    let post = state
        .source
        .fetch_post(id)
        .await
        .map_err(ApiError::upstream("Failed to fetch post"))?;
    Ok(Json(PostBody { post }))
}

pub async fn get_post_comments(
    State(state): State<AppState>,
    raw_id: RawId,
) -> ApiResult<Json<CommentsBody>> {
    let id = post_id(raw_id)?;

    let comments = state
        .source
        .fetch_post_comments(id)
        .await
        .map_err(ApiError::upstream("Failed to fetch comments"))?;
    Ok(Json(CommentsBody { comments }))
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    raw_id: RawId,
) -> ApiResult<Json<PostsBody>> {
    let id = user_id(raw_id)?;

    let posts = state
        .source
        .fetch_user_posts(id)
        .await
        .map_err(ApiError::upstream("Failed to fetch user posts"))?;
    Ok(Json(PostsBody { posts }))
}

pub async fn posts_n_plus_1(State(state): State<AppState>) -> ApiResult<Json<Aggregation>> {
    let aggregation = state
        .aggregator
        .run(AggregationMode::FanOut)
        .await
        .map_err(ApiError::upstream("Failed to fetch posts with comments"))?;
    Ok(Json(aggregation))
}

pub async fn posts_with_comments(State(state): State<AppState>) -> ApiResult<Json<Aggregation>> {
    let aggregation = state
        .aggregator
        .run(AggregationMode::Batched)
        .await
        .map_err(ApiError::upstream("Failed to fetch batched posts"))?;
    Ok(Json(aggregation))
}

pub async fn create_post(
    _auth: Authorized,
    State(state): State<AppState>,
    body: RawBody,
) -> ApiResult<(StatusCode, Json<PostBody>)> {
    let input: NewPost = parse_body(body)?;

    let post = state
        .source
        .create_post(input)
        .await
        .map_err(ApiError::upstream("Failed to create post"))?;
    tracing::info!("Created post {}", post.id);
    Ok((StatusCode::CREATED, Json(PostBody { post })))
}

pub async fn patch_post(
    _auth: Authorized,
    State(state): State<AppState>,
    raw_id: RawId,
    body: RawBody,
) -> ApiResult<Json<PostBody>> {
    let id = post_id(raw_id)?;
    let input: PostPatch = match body {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => PostPatch::default(),
        body => parse_body(body)?,
    };

    let post = state
        .source
        .patch_post(id, input)
        .await
        .map_err(ApiError::upstream("Failed to update post"))?;
    Ok(Json(PostBody { post }))
}

pub async fn put_post(
    _auth: Authorized,
    State(state): State<AppState>,
    raw_id: RawId,
    body: RawBody,
) -> ApiResult<Json<PostBody>> {
    let id = post_id(raw_id)?;
    let input: NewPost = parse_body(body)?;

    let post = state
        .source
        .put_post(id, input)
        .await
        .map_err(ApiError::upstream("Failed to replace post"))?;
    Ok(Json(PostBody { post }))
}

pub async fn delete_post(
    _auth: Authorized,
    State(state): State<AppState>,
    raw_id: RawId,
) -> ApiResult<StatusCode> {
    let id = post_id(raw_id)?;

    state
        .source
        .delete_post(id)
        .await
        .map_err(ApiError::upstream("Failed to delete post"))?;
    tracing::info!("Deleted post {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_first_value_wins() {
        let query = PageQuery::from_raw(Some("page=2&limit=5&page=9&search=a%20b"));
        assert_eq!(
            query,
            PageQuery {
                page: Some("2".to_string()),
                limit: Some("5".to_string()),
                search: Some("a b".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_or_undecodable_query() {
        assert_eq!(SearchQuery::from_raw(None), SearchQuery::default());
        assert_eq!(PageQuery::from_raw(Some("")), PageQuery::default());

        let query = SearchQuery::from_raw(Some("search=%FF"));
        assert_eq!(query.search.as_deref(), Some("\u{FFFD}"));
    }
}
