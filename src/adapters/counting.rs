use crate::domain::model::{Comment, NewPost, Post, PostPatch};
use crate::domain::ports::PostSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a `PostSource` and counts every upstream call made through it.
pub struct CountingSource<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: PostSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the count so far and starts again from zero.
    pub fn reset(&self) -> usize {
        self.calls.swap(0, Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: PostSource> PostSource for CountingSource<S> {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        self.record();
        self.inner.fetch_posts().await
    }

    async fn fetch_post(&self, id: i64) -> Result<Post> {
        self.record();
        self.inner.fetch_post(id).await
    }

    async fn fetch_post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.record();
        self.inner.fetch_post_comments(post_id).await
    }

    async fn fetch_all_comments(&self) -> Result<Vec<Comment>> {
        self.record();
        self.inner.fetch_all_comments().await
    }

    async fn fetch_user_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.record();
        self.inner.fetch_user_posts(user_id).await
    }

    async fn create_post(&self, input: NewPost) -> Result<Post> {
        self.record();
        self.inner.create_post(input).await
    }

    async fn patch_post(&self, id: i64, input: PostPatch) -> Result<Post> {
        self.record();
        self.inner.patch_post(id, input).await
    }

    async fn put_post(&self, id: i64, input: NewPost) -> Result<Post> {
        self.record();
        self.inner.put_post(id, input).await
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        self.record();
        self.inner.delete_post(id).await
    }
}
