use std::sync::Arc;

use crate::application::feed_service::FeedService;
use crate::data::dummyjson_upstream::DummyJsonUpstream;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) feed_service: Arc<FeedService<DummyJsonUpstream>>,
}

impl AppState {
    pub(crate) fn new(feed_service: Arc<FeedService<DummyJsonUpstream>>) -> Self {
        Self { feed_service }
    }
}
