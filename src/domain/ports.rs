use crate::domain::model::{Comment, NewPost, Post, PostPatch};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read and write access to the upstream posts service.
///
/// Each method is a single attempt; implementations do not retry.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;
    async fn fetch_post(&self, id: i64) -> Result<Post>;
    async fn fetch_post_comments(&self, post_id: i64) -> Result<Vec<Comment>>;
    async fn fetch_all_comments(&self) -> Result<Vec<Comment>>;
    async fn fetch_user_posts(&self, user_id: i64) -> Result<Vec<Post>>;

    async fn create_post(&self, input: NewPost) -> Result<Post>;
    async fn patch_post(&self, id: i64, input: PostPatch) -> Result<Post>;
    async fn put_post(&self, id: i64, input: NewPost) -> Result<Post>;
    async fn delete_post(&self, id: i64) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn port(&self) -> u16;
    fn upstream_base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn require_auth(&self) -> bool;
    fn auth_token(&self) -> &str;
    fn aggregate_limit(&self) -> usize;
}
