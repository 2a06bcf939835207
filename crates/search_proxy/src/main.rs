use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    error::{ErrorBody, ProxyException},
    protocol::{SearchRequest, SearchResponse, SEARCH_ROUTE},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod normalize;
mod upstream;

use api::{search_products, ApiContext};
use app_state::AppState;
use config::load_settings;
use upstream::UpstreamClient;

const MAX_SEARCH_BODY_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let upstream = UpstreamClient::new(&settings.upstream_url, settings.upstream_timeout())
        .context("failed to build upstream http client")?;
    let state = AppState {
        api: ApiContext { upstream },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, upstream = %settings.upstream_url, "search proxy listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            SEARCH_ROUTE,
            get(search_get)
                .post(search_post)
                .fallback(method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(MAX_SEARCH_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn search_get(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<SearchResponse> {
    // Repeated `query` parameters resolve to the first one.
    let query = raw.as_deref().and_then(|raw| {
        url::form_urlencoded::parse(raw.as_bytes())
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
    });
    respond(search_products(&state.api, query.as_deref()).await)
}

async fn search_post(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SearchRequest>>,
) -> ApiResult<SearchResponse> {
    let query = body.and_then(|Json(req)| req.query);
    respond(search_products(&state.api, query.as_deref()).await)
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
}

fn respond(result: Result<SearchResponse, ProxyException>) -> ApiResult<SearchResponse> {
    result.map(Json).map_err(|e| {
        let status = StatusCode::from_u16(e.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from(e)))
    })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
