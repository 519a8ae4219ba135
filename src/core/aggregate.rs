//! Attaching comments to a bounded prefix of posts.
//!
//! Two strategies produce the same result:
//!
//! - **Fan-out** (`n+1`): one comment request per post, dispatched together on a
//!   `JoinSet` and reassembled in post order. `limit + 1` upstream calls.
//! - **Batched**: one request for posts and one for every comment, grouped in
//!   memory by `postId`. Always two upstream calls, at the cost of holding the
//!   whole comment collection.
//!
//! Either strategy fails as a whole when any of its upstream calls fails.

use crate::domain::model::{Comment, Post, PostWithComments};
use crate::domain::ports::PostSource;
use crate::utils::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationMode {
    #[serde(rename = "n+1")]
    FanOut,
    #[serde(rename = "batched")]
    Batched,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FanOut => "n+1",
            Self::Batched => "batched",
        }
    }
}

/// Response body of the aggregation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub mode: AggregationMode,
    pub posts: Vec<PostWithComments>,
}

#[derive(Clone)]
pub struct CommentAggregator {
    source: Arc<dyn PostSource>,
    limit: usize,
}

impl CommentAggregator {
    pub fn new(source: Arc<dyn PostSource>, limit: usize) -> Self {
        Self { source, limit }
    }

    pub async fn run(&self, mode: AggregationMode) -> Result<Aggregation> {
        let started = Instant::now();

        let posts = match mode {
            AggregationMode::FanOut => self.fan_out().await,
            AggregationMode::Batched => self.batched().await,
        }
        .inspect_err(|e| {
            tracing::warn!("{} aggregation failed: {}", mode.as_str(), e);
        })?;

        tracing::info!(
            mode = mode.as_str(),
            posts = posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregated comments"
        );

        Ok(Aggregation { mode, posts })
    }

    pub async fn fan_out(&self) -> Result<Vec<PostWithComments>> {
        let posts = self.bounded_posts().await?;
        let total = posts.len();

        let mut tasks = JoinSet::new();
        for (index, post) in posts.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            tasks.spawn(async move {
                let mut comments = source.fetch_post_comments(post.id).await?;
                comments.retain(|c| c.post_id == post.id);
                Ok::<_, ProxyError>((index, PostWithComments::new(post, comments)))
            });
        }
        tracing::debug!("Dispatched {} comment requests", total);

        // Completion order is arbitrary; slot results back by input index.
        let mut slots: Vec<Option<PostWithComments>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, item) = joined??;
            slots[index] = Some(item);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    pub async fn batched(&self) -> Result<Vec<PostWithComments>> {
        let posts = self.bounded_posts().await?;
        let comments = self.source.fetch_all_comments().await?;
        tracing::debug!(
            "Grouping {} comments across {} posts",
            comments.len(),
            posts.len()
        );

        let groups = group_by_post(comments);
        Ok(attach_comments(posts, &groups))
    }

    async fn bounded_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.source.fetch_posts().await?;
        posts.truncate(self.limit);
        Ok(posts)
    }
}

/// Groups comments by `postId`, keeping upstream order within each group.
pub fn group_by_post(comments: Vec<Comment>) -> HashMap<i64, Vec<Comment>> {
    let mut groups: HashMap<i64, Vec<Comment>> = HashMap::new();
    for comment in comments {
        groups.entry(comment.post_id).or_default().push(comment);
    }
    groups
}

pub fn attach_comments(
    posts: Vec<Post>,
    groups: &HashMap<i64, Vec<Comment>>,
) -> Vec<PostWithComments> {
    posts
        .into_iter()
        .map(|post| {
            let comments = groups.get(&post.id).cloned().unwrap_or_default();
            PostWithComments::new(post, comments)
        })
        .collect()
}
