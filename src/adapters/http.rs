use crate::config::ServiceConfig;
use crate::domain::model::{Comment, NewPost, Post, PostPatch};
use crate::domain::ports::PostSource;
use crate::utils::error::{ProxyError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// `PostSource` backed by a JSONPlaceholder-compatible REST service.
#[derive(Debug, Clone)]
pub struct JsonPlaceholderClient {
    base_url: String,
    client: Client,
}

impl JsonPlaceholderClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request and fails on any non-2xx status.
    async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<(String, Response)> {
        let url = self.url(path);
        tracing::debug!("Upstream {} {}", method, url);

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Upstream {} {} -> {}", method, url, status);

        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok((url, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.get(self.url(path));
        let (url, response) = self.send(Method::GET, path, request).await?;
        decode(&url, &response.bytes().await?)
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let request = self
            .client
            .request(method.clone(), self.url(path))
            .json(payload);
        let (url, response) = self.send(method, path, request).await?;
        decode(&url, &response.bytes().await?)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ProxyError::UpstreamPayload {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl PostSource for JsonPlaceholderClient {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        self.get_json("/posts").await
    }

    async fn fetch_post(&self, id: i64) -> Result<Post> {
        self.get_json(&format!("/posts/{}", id)).await
    }

    async fn fetch_post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.get_json(&format!("/posts/{}/comments", post_id)).await
    }

    async fn fetch_all_comments(&self) -> Result<Vec<Comment>> {
        self.get_json("/comments").await
    }

    async fn fetch_user_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.get_json(&format!("/users/{}/posts", user_id)).await
    }

    async fn create_post(&self, input: NewPost) -> Result<Post> {
        self.send_json(Method::POST, "/posts", &input).await
    }

    async fn patch_post(&self, id: i64, input: PostPatch) -> Result<Post> {
        self.send_json(Method::PATCH, &format!("/posts/{}", id), &input)
            .await
    }

    async fn put_post(&self, id: i64, input: NewPost) -> Result<Post> {
        self.send_json(Method::PUT, &format!("/posts/{}", id), &input)
            .await
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let path = format!("/posts/{}", id);
        let request = self.client.delete(self.url(&path));
        self.send(Method::DELETE, &path, request).await?;
        Ok(())
    }
}
