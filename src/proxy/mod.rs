pub mod cache;
mod routes;

use crate::proxy::cache::ResponseCache;
use crate::settings::Settings;
use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use teamsync_api::client::PageFetcher;

/// Shared by every request: one HTTP client, one cache.
pub struct AppState {
    pub fetcher: PageFetcher,
    pub cache: ResponseCache,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let cache = ResponseCache::new(settings.cache_ttl, settings.cache_max_entries);
        Self::with_cache(settings, cache)
    }

    pub fn with_cache(settings: Settings, cache: ResponseCache) -> Self {
        Self {
            fetcher: PageFetcher::new(settings.upstream_timeout),
            cache,
            settings,
        }
    }
}

/// `/health`, `/proxy` and `/team-page`, served both at the root and under `/api`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/health", get(routes::health))
        .route("/proxy", get(routes::proxy))
        .route("/team-page", get(routes::team_page));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        resp.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,OPTIONS"),
        );
        resp.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        );
        resp
    } else {
        next.run(req).await
    };
    resp.headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    resp
}
