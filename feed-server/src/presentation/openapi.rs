use utoipa::OpenApi;

use crate::presentation::handlers::posts::{
    CreatePostDto, ListPostsResponseDto, PaginationQuery, PostDto, ReactionDto, ReactionKindDto,
    ReactionsDto, SearchQuery, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "feed-server",
        description = "Proxy over the public posts API with pagination, search and reactions"
    ),
    paths(
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::search_posts,
        crate::presentation::handlers::posts::posts_by_user,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::react_to_post
    ),
    components(
        schemas(
            CreatePostDto,
            UpdatePostDto,
            PaginationQuery,
            SearchQuery,
            PostDto,
            ReactionsDto,
            ReactionDto,
            ReactionKindDto,
            ListPostsResponseDto
        )
    ),
    tags(
        (name = "posts", description = "Post endpoints")
    )
)]
pub(crate) struct ApiDoc;
