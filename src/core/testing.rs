use crate::domain::model::{Comment, NewPost, Post, PostPatch};
use crate::domain::ports::PostSource;
use crate::utils::error::{ProxyError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory `PostSource` over fixed posts and comments.
pub(crate) struct FixtureSource {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    /// Post id whose comment lookup fails.
    pub failing_post: Option<i64>,
    /// Fails every call when set.
    pub down: bool,
    /// Delays per-post comment lookups so that lower ids finish last.
    pub staggered: bool,
    pub calls: AtomicUsize,
}

impl FixtureSource {
    pub fn new(posts: Vec<Post>, comments: Vec<Comment>) -> Self {
        Self {
            posts,
            comments,
            failing_post: None,
            down: false,
            staggered: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// `post_count` posts; post `n` gets `n % 4` comments, interleaved across posts.
    pub fn generated(post_count: i64) -> Self {
        let posts = (1..=post_count).map(post).collect();
        let mut comments = Vec::new();
        let mut next_id = 1;
        for round in 0..3 {
            for post_id in 1..=post_count {
                if post_id % 4 > round {
                    comments.push(comment(post_id, next_id));
                    next_id += 1;
                }
            }
        }
        Self::new(posts, comments)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(ProxyError::UpstreamStatus {
                status: 502,
                url: "fixture".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn post(id: i64) -> Post {
    Post {
        user_id: (id - 1) / 10 + 1,
        id,
        title: format!("post number {}", id),
        body: format!("body of post {}", id),
    }
}

pub(crate) fn comment(post_id: i64, id: i64) -> Comment {
    Comment {
        post_id,
        id,
        name: format!("comment {}", id),
        email: format!("user{}@example.com", id),
        body: format!("comment {} on post {}", id, post_id),
    }
}

#[async_trait]
impl PostSource for FixtureSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        self.record()?;
        Ok(self.posts.clone())
    }

    async fn fetch_post(&self, id: i64) -> Result<Post> {
        self.record()?;
        self.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ProxyError::UpstreamStatus {
                status: 404,
                url: format!("fixture/posts/{}", id),
            })
    }

    async fn fetch_post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.record()?;
        if self.staggered {
            let delay = 5 * (self.posts.len() as u64).saturating_sub(post_id as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing_post == Some(post_id) {
            return Err(ProxyError::UpstreamStatus {
                status: 500,
                url: format!("fixture/posts/{}/comments", post_id),
            });
        }
        Ok(self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn fetch_all_comments(&self) -> Result<Vec<Comment>> {
        self.record()?;
        Ok(self.comments.clone())
    }

    async fn fetch_user_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.record()?;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_post(&self, input: NewPost) -> Result<Post> {
        self.record()?;
        Ok(Post {
            user_id: input.user_id,
            id: self.posts.len() as i64 + 1,
            title: input.title,
            body: input.body,
        })
    }

    async fn patch_post(&self, id: i64, input: PostPatch) -> Result<Post> {
        let mut current = self.fetch_post(id).await?;
        if let Some(title) = input.title {
            current.title = title;
        }
        if let Some(body) = input.body {
            current.body = body;
        }
        if let Some(user_id) = input.user_id {
            current.user_id = user_id;
        }
        Ok(current)
    }

    async fn put_post(&self, id: i64, input: NewPost) -> Result<Post> {
        self.record()?;
        Ok(Post {
            user_id: input.user_id,
            id,
            title: input.title,
            body: input.body,
        })
    }

    async fn delete_post(&self, _id: i64) -> Result<()> {
        self.record()
    }
}
