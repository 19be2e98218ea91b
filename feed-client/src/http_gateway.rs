use std::time::Duration;

use async_trait::async_trait;
use feed_core::{
    FeedError, FeedResult, FetchedPage, Item, ItemDraft, ItemPatch, ReactionKind, RemoteGateway,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{ErrorResponseDto, from_http_status, from_reqwest};

#[derive(Debug, Deserialize)]
struct ListPostsResponseDto {
    posts: Vec<Item>,
    total: i64,
}

#[derive(Serialize)]
struct ListPostsQuery {
    skip: u32,
    limit: u32,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

#[derive(Debug, Serialize)]
struct ReactionRequestDto {
    kind: ReactionKind,
}

impl From<ListPostsResponseDto> for FetchedPage {
    fn from(value: ListPostsResponseDto) -> Self {
        Self {
            items: value.posts,
            total: value.total.max(0) as u64,
        }
    }
}

#[derive(Debug, Clone)]
/// Таймауты HTTP-шлюза.
pub struct HttpTimeouts {
    /// Таймаут установки соединения.
    pub connect: Duration,
    /// Таймаут всего запроса.
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-реализация [`RemoteGateway`] поверх REST API `feed-server`.
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    /// Создаёт шлюз с базовым URL прокси и таймаутами по умолчанию.
    pub fn new(base_url: impl Into<String>) -> FeedResult<Self> {
        Self::with_timeouts(base_url, HttpTimeouts::default())
    }

    /// Создаёт шлюз с заданными таймаутами.
    pub fn with_timeouts(base_url: impl Into<String>, timeouts: HttpTimeouts) -> FeedResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()
            .map_err(|err| FeedError::Transport(format!("failed to build http client: {err}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> FeedError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.into_message(),
            Err(_) => None,
        };
        from_http_status(status, message)
    }

    async fn send(request: RequestBuilder) -> FeedResult<reqwest::Response> {
        let response = request.send().await.map_err(from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_for<TRes: DeserializeOwned>(request: RequestBuilder) -> FeedResult<TRes> {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(from_reqwest)
    }

    /// универсальный helper для запросов с json-payload
    async fn send_json<TReq, TRes>(&self, method: Method, path: &str, body: &TReq) -> FeedResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let request = self.client.request(method, self.endpoint(path)).json(body);
        Self::send_for(request).await
    }

    async fn get_list(&self, request: RequestBuilder) -> FeedResult<FetchedPage> {
        let dto: ListPostsResponseDto = Self::send_for(request).await?;
        Ok(dto.into())
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_page(&self, offset: u32, limit: u32) -> FeedResult<FetchedPage> {
        debug!(offset, limit, "GET /api/posts");
        let query = ListPostsQuery {
            skip: offset,
            limit,
        };
        let request = self
            .client
            .request(Method::GET, self.endpoint("/api/posts"))
            .query(&query);
        self.get_list(request).await
    }

    async fn fetch_one(&self, id: i64) -> FeedResult<Item> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&format!("/api/posts/{id}")));
        Self::send_for(request).await
    }

    async fn create_remote(&self, draft: ItemDraft) -> FeedResult<Item> {
        self.send_json(Method::POST, "/api/posts", &draft).await
    }

    async fn update_remote(&self, patch: ItemPatch) -> FeedResult<Item> {
        self.send_json(Method::PUT, &format!("/api/posts/{}", patch.id), &patch)
            .await
    }

    async fn delete_remote(&self, id: i64) -> FeedResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.endpoint(&format!("/api/posts/{id}")));
        Self::send(request).await?;
        Ok(())
    }

    async fn react_remote(&self, id: i64, kind: ReactionKind) -> FeedResult<Item> {
        let payload = ReactionRequestDto { kind };
        self.send_json(
            Method::POST,
            &format!("/api/posts/{id}/reactions"),
            &payload,
        )
        .await
    }

    async fn search(&self, query: &str) -> FeedResult<FetchedPage> {
        let request = self
            .client
            .request(Method::GET, self.endpoint("/api/posts/search"))
            .query(&SearchQuery { q: query });
        self.get_list(request).await
    }

    async fn fetch_by_user(&self, user_id: i64) -> FeedResult<FetchedPage> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&format!("/api/posts/user/{user_id}")));
        self.get_list(request).await
    }
}
