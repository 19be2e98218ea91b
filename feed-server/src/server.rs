use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::limits::apply_limits;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_app(settings, state)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

pub(crate) fn build_app(settings: &Settings, state: AppState) -> anyhow::Result<Router> {
    let app = build_router(state);
    let app = apply_limits(app, settings);
    let app = apply_trace(app);
    apply_cors(app, settings)
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::build_app;
    use crate::application::feed_service::FeedService;
    use crate::data::dummyjson_upstream::DummyJsonUpstream;
    use crate::infrastructure::settings::Settings;
    use crate::presentation::AppState;

    fn test_settings() -> Settings {
        Settings {
            http_addr: "127.0.0.1:0".to_string(),
            // запросы, доходящие до апстрима, в этих тестах не ожидаются
            upstream_url: "http://127.0.0.1:9".to_string(),
            upstream_timeout_secs: 1,
            upstream_delay_ms: None,
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            http_request_body_limit_bytes: 1024,
            http_concurrency_limit: 8,
            http_request_timeout_secs: 5,
        }
    }

    fn test_app() -> axum::Router {
        let settings = test_settings();
        let upstream = DummyJsonUpstream::new(
            settings.upstream_url.clone(),
            Duration::from_secs(settings.upstream_timeout_secs),
            None,
        )
        .expect("upstream client must build");
        let state = AppState::new(Arc::new(FeedService::new(upstream)));
        build_app(&settings, state).expect("app must build")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        serde_json::from_slice(&bytes).expect("body must be JSON")
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let response = test_app()
            .oneshot(
                Request::get("/healthz")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn list_rejects_limit_above_hundred() {
        let response = test_app()
            .oneshot(
                Request::get("/api/posts?skip=0&limit=500")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn search_rejects_empty_query() {
        let response = test_app()
            .oneshot(
                Request::get("/api/posts/search?q=")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let payload = format!(
            r#"{{"title":"t","body":"{}","userId":1}}"#,
            "x".repeat(4096)
        );
        let response = test_app()
            .oneshot(
                Request::post("/api/posts")
                    .header("content-type", "application/json")
                    .header("content-length", payload.len())
                    .body(Body::from(payload))
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn openapi_document_lists_post_routes() {
        let response = test_app()
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["paths"]["/api/posts/{id}/reactions"].is_object());
        assert!(doc["paths"]["/api/posts/search"].is_object());
    }
}
