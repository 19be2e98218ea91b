use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::post::{
    CreatePostRequest, Post, PostList, ReactionKind, Reactions, UpdatePostRequest,
};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[validate(range(min = 1))]
    pub(crate) user_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) body: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    #[validate(range(min = 1))]
    pub(crate) user_id: Option<i64>,
    pub(crate) reactions: Option<ReactionsDto>,
    pub(crate) views: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PaginationQuery {
    pub(crate) skip: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SearchQuery {
    #[validate(length(min = 1, max = 255))]
    pub(crate) q: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReactionKindDto {
    Like,
    Dislike,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ReactionDto {
    pub(crate) kind: ReactionKindDto,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub(crate) struct ReactionsDto {
    pub(crate) likes: u32,
    pub(crate) dislikes: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) tags: Vec<String>,
    pub(crate) user_id: i64,
    pub(crate) reactions: ReactionsDto,
    pub(crate) views: u32,
    pub(crate) image_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) total: u64,
    pub(crate) skip: u32,
    pub(crate) limit: u32,
}

impl From<ReactionKindDto> for ReactionKind {
    fn from(kind: ReactionKindDto) -> Self {
        match kind {
            ReactionKindDto::Like => ReactionKind::Like,
            ReactionKindDto::Dislike => ReactionKind::Dislike,
        }
    }
}

impl From<ReactionsDto> for Reactions {
    fn from(dto: ReactionsDto) -> Self {
        Self {
            likes: dto.likes,
            dislikes: dto.dislikes,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        let image_url = post
            .image_url
            .unwrap_or_else(|| crate::domain::post::image_url_for(post.id));
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            tags: post.tags,
            user_id: post.user_id,
            reactions: ReactionsDto {
                likes: post.reactions.likes,
                dislikes: post.reactions.dislikes,
            },
            views: post.views,
            image_url,
        }
    }
}

impl From<PostList> for ListPostsResponseDto {
    fn from(list: PostList) -> Self {
        Self {
            posts: list.posts.into_iter().map(PostDto::from).collect(),
            total: list.total,
            skip: list.skip,
            limit: list.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("skip" = Option<u32>, Query, description = "Offset from the beginning (>= 0)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let result = state.feed_service.list_posts(skip, limit).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(
        ("q" = String, Query, description = "Search query")
    ),
    responses(
        (status = 200, description = "Matching posts", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let result = state.feed_service.search_posts(&query.q).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{user_id}",
    tag = "posts",
    params(
        ("user_id" = i64, Path, description = "Author id")
    ),
    responses(
        (status = 200, description = "Posts of the user", body = ListPostsResponseDto),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn posts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let result = state.feed_service.posts_by_user(user_id).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let result = state.feed_service.get_post(id).await?;

    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        body: dto.body,
        tags: dto.tags,
        user_id: dto.user_id,
    };

    let result = state.feed_service.create_post(req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        body: dto.body,
        tags: dto.tags,
        user_id: dto.user_id,
        reactions: dto.reactions.map(Reactions::from),
        views: dto.views,
    };

    let result = state.feed_service.update_post(id, req).await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.feed_service.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/reactions",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = ReactionDto,
    responses(
        (status = 200, description = "Counter incremented", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 502, description = "Upstream error")
    )
)]
pub(crate) async fn react_to_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<ReactionDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let result = state.feed_service.react(id, dto.kind.into()).await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_query_rejects_out_of_range_limit() {
        let query = PaginationQuery {
            skip: Some(0),
            limit: Some(500),
        };
        assert!(query.validate().is_err());

        let query = PaginationQuery {
            skip: None,
            limit: Some(100),
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn create_dto_decodes_camel_case_and_validates() {
        let dto: CreatePostDto = serde_json::from_str(
            r#"{ "title": "A", "body": "B", "tags": ["x"], "userId": 1 }"#,
        )
        .expect("must decode");
        assert!(dto.validate().is_ok());
        assert_eq!(dto.user_id, 1);

        let dto: CreatePostDto =
            serde_json::from_str(r#"{ "title": "", "body": "B", "userId": 1 }"#)
                .expect("must decode");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn post_dto_serializes_camel_case_with_image() {
        let post = Post {
            id: 3,
            title: "t".to_string(),
            body: "b".to_string(),
            tags: vec![],
            user_id: 9,
            reactions: Reactions::default(),
            views: 1,
            image_url: None,
        };

        let value = serde_json::to_value(PostDto::from(post)).expect("must encode");
        assert_eq!(value["userId"], 9);
        assert_eq!(value["imageUrl"], "https://picsum.photos/seed/3/800/600");
    }

    #[test]
    fn reaction_dto_accepts_lowercase_kind() {
        let dto: ReactionDto = serde_json::from_str(r#"{ "kind": "dislike" }"#).expect("must decode");
        assert_eq!(ReactionKind::from(dto.kind), ReactionKind::Dislike);
    }
}
