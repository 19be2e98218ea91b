use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostList, Reactions};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) tags: Vec<String>,
    pub(crate) user_id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reactions: Option<Reactions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) views: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) skip: u32,
    pub(crate) limit: u32,
}

/// Внешний источник постов, которому прокси пересылает запросы.
#[async_trait]
pub(crate) trait PostUpstream: Send + Sync {
    async fn list_posts(&self, pagination: Pagination) -> Result<PostList, DomainError>;
    async fn search_posts(&self, query: &str) -> Result<PostList, DomainError>;
    async fn posts_by_user(&self, user_id: i64) -> Result<PostList, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Post, DomainError>;
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<(), DomainError>;
}
