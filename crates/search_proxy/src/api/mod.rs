use shared::{error::ProxyException, protocol::SearchResponse};
use tracing::{error, info, warn};

use crate::{
    normalize::normalize_listings,
    upstream::{UpstreamClient, UpstreamError},
};

pub const QUERY_REQUIRED: &str = "Query parameter is required";
pub const FETCH_FAILED: &str = "Failed to fetch data from external API";

#[derive(Clone)]
pub struct ApiContext {
    pub upstream: UpstreamClient,
}

pub async fn search_products(
    ctx: &ApiContext,
    query: Option<&str>,
) -> Result<SearchResponse, ProxyException> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Err(ProxyException::new(400, QUERY_REQUIRED));
    };

    info!(query, "proxying search");
    let payload = ctx.upstream.query(query).await.map_err(|e| match e {
        UpstreamError::Status { status, .. } => {
            warn!(status = status.as_u16(), "upstream rejected both POST and GET");
            ProxyException::new(status.as_u16(), e.to_string())
        }
        other => {
            error!(error = %other, "search upstream unavailable");
            ProxyException::new(500, FETCH_FAILED)
        }
    })?;

    let data = normalize_listings(&payload);
    info!(count = data.len(), "normalized upstream listings");
    Ok(SearchResponse { data })
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
