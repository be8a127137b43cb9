use crate::proxy::AppState;
use crate::proxy::cache::CachedPage;
use crate::settings::Settings;
use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{debug, error, info};
use reqwest::Url;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use teamsync_api::client::{FetchError, validate_url};

const X_CACHE: &str = "x-cache";
const TEAM_PAGE_PARAMS: [&str; 4] = ["fromId", "Team", "SeasonLabel", "siteId"];

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `GET /proxy?url=<encoded>`: the query extractor has already percent-decoded
/// `url` once; it is used as-is.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(raw) = params.get("url").map(|u| u.trim()).filter(|u| !u.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            json!({ "error": "URL parameter is required" }),
        );
    };
    let url = match validate_url(raw) {
        Ok(url) => url,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid URL parameter", "message": e.to_string() }),
            );
        }
    };

    info!("proxying {url}");
    serve_cached(&state, url.as_str(), None, "Failed to fetch URL").await
}

/// `GET /team-page?fromId&Team&SeasonLabel&siteId` against the configured
/// athletics site. Any missing parameter means the configured default query.
pub async fn team_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    const FAILURE: &str = "Failed to fetch team page";
    let url = match team_page_url(&state.settings, &params) {
        Ok(url) => url,
        Err(e) => {
            error!("bad team page base {:?}: {e}", state.settings.team_page_url);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": FAILURE, "message": e.to_string() }),
            );
        }
    };

    info!("fetching team page {url}");
    serve_cached(&state, url.as_str(), Some("text/html"), FAILURE).await
}

fn team_page_url(settings: &Settings, params: &HashMap<String, String>) -> Result<Url, FetchError> {
    let mut url = validate_url(&settings.team_page_url)?;
    let values: Option<Vec<&str>> = TEAM_PAGE_PARAMS
        .iter()
        .map(|key| params.get(*key).map(String::as_str).filter(|v| !v.is_empty()))
        .collect();

    match values {
        Some(values) => {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in TEAM_PAGE_PARAMS.iter().zip(values) {
                pairs.append_pair(key, value);
            }
        }
        None => url.set_query(Some(&settings.team_page_query)),
    }
    Ok(url)
}

async fn serve_cached(
    state: &AppState,
    url: &str,
    forced_type: Option<&'static str>,
    failure: &'static str,
) -> Response {
    if let Some(page) = state.cache.get(url) {
        debug!("cache hit for {url}");
        return page_response(page, "HIT", state, forced_type);
    }

    match state.fetcher.fetch(url).await {
        Ok(fetched) => {
            let page = CachedPage { body: fetched.body, content_type: fetched.content_type };
            state.cache.insert(url.to_owned(), page.clone());
            page_response(page, "MISS", state, forced_type)
        }
        Err(e) => {
            error!("upstream fetch failed for {url}: {e}");
            let status = if e.is_timeout() {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, json!({ "error": failure, "message": e.to_string() }))
        }
    }
}

fn page_response(
    page: CachedPage,
    cache_status: &'static str,
    state: &AppState,
    forced_type: Option<&'static str>,
) -> Response {
    let mut resp = Response::new(Body::from(page.body));
    let headers = resp.headers_mut();

    let content_type = match forced_type {
        Some(forced) => Some(HeaderValue::from_static(forced)),
        None => page.content_type.and_then(|ct| HeaderValue::from_str(&ct).ok()),
    };
    if let Some(ct) = content_type {
        headers.insert(header::CONTENT_TYPE, ct);
    }
    if let Ok(cc) = HeaderValue::from_str(&format!("public, max-age={}", state.cache.ttl().as_secs())) {
        headers.insert(header::CACHE_CONTROL, cc);
    }
    headers.insert(X_CACHE, HeaderValue::from_static(cache_status));
    resp
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, [(X_CACHE, HeaderValue::from_static("MISS"))], Json(body)).into_response()
}
