use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    create_post, delete_post, get_post, list_posts, posts_by_user, react_to_post, search_posts,
    update_post,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/search", get(search_posts))
        .route("/user/{user_id}", get(posts_by_user))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/reactions", post(react_to_post))
}
