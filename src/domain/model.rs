use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: i64,
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// A post with the comments whose `postId` matches its `id`, in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

impl PostWithComments {
    pub fn new(post: Post, comments: Vec<Comment>) -> Self {
        Self { post, comments }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProxyError::validation(format!("{} cannot be blank", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(ProxyError::validation(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}

impl Validate for NewPost {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("body", &self.body)?;
        require_positive("userId", self.user_id)
    }
}

impl Validate for PostPatch {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(body) = &self.body {
            require_text("body", body)?;
        }
        if let Some(user_id) = self.user_id {
            require_positive("userId", user_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}
