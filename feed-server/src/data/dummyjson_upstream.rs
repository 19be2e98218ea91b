use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::data::post_upstream::{NewPost, Pagination, PostPatch, PostUpstream};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostList};

#[derive(Debug, Deserialize)]
struct PostListRow {
    posts: Vec<Post>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    skip: u32,
    #[serde(default)]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct ListQuery {
    skip: u32,
    limit: u32,
}

impl From<PostListRow> for PostList {
    fn from(row: PostListRow) -> Self {
        Self {
            posts: row.posts,
            total: row.total,
            skip: row.skip,
            limit: row.limit,
        }
    }
}

/// Клиент публичного placeholder API в формате dummyjson.
#[derive(Debug, Clone)]
pub(crate) struct DummyJsonUpstream {
    base_url: String,
    client: Client,
    delay_ms: Option<u64>,
}

impl DummyJsonUpstream {
    pub(crate) fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        delay_ms: Option<u64>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            delay_ms,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Запрос с искусственной задержкой апстрима, если она настроена.
    fn delayed(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match self.delay_ms {
            Some(delay) => request.query(&[("delay", delay)]),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, DomainError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<UpstreamErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("http status {status}"));
        Err(map_status(status, message))
    }

    async fn send_for<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, DomainError> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| DomainError::Unexpected(format!("invalid upstream body: {err}")))
    }
}

#[async_trait]
impl PostUpstream for DummyJsonUpstream {
    async fn list_posts(&self, pagination: Pagination) -> Result<PostList, DomainError> {
        debug!(skip = pagination.skip, limit = pagination.limit, "upstream list posts");
        let query = ListQuery {
            skip: pagination.skip,
            limit: pagination.limit,
        };
        let request = self
            .client
            .request(Method::GET, self.endpoint("/posts"))
            .query(&query);
        let row: PostListRow = Self::send_for(request).await?;
        Ok(row.into())
    }

    async fn search_posts(&self, query: &str) -> Result<PostList, DomainError> {
        let request = self
            .delayed(Method::GET, "/posts/search")
            .query(&[("q", query)]);
        let row: PostListRow = Self::send_for(request).await?;
        Ok(row.into())
    }

    async fn posts_by_user(&self, user_id: i64) -> Result<PostList, DomainError> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&format!("/posts/user/{user_id}")));
        let row: PostListRow = Self::send_for(request).await?;
        Ok(row.into())
    }

    async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&format!("/posts/{id}")));
        Self::send_for(request).await
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let request = self.delayed(Method::POST, "/posts/add").json(&input);
        Self::send_for(request).await
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError> {
        let request = self
            .delayed(Method::PUT, &format!("/posts/{id}"))
            .json(&patch);
        Self::send_for(request).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        let request = self.delayed(Method::DELETE, &format!("/posts/{id}"));
        Self::send(request).await?;
        Ok(())
    }
}

fn map_status(status: StatusCode, message: String) -> DomainError {
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(message),
        _ => DomainError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

fn map_transport_error(err: reqwest::Error) -> DomainError {
    DomainError::Unavailable(err.to_string())
}
