use super::*;
use axum::{
    body::{self, Body},
    http::Request,
    response::Response,
    routing::post,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn spawn_upstream(post_reply: Value, get_status: StatusCode) -> String {
    let app = Router::new().route(
        "/query",
        post(move || {
            let reply = post_reply.clone();
            async move { Json(reply) }
        })
        .get(move || async move { (get_status, "upstream says no") }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn test_app(upstream_url: &str) -> Router {
    let upstream = UpstreamClient::new(upstream_url, Duration::from_secs(5)).expect("client");
    build_router(Arc::new(AppState {
        api: ApiContext { upstream },
    }))
}

async fn json_body(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn post_search(body: Value) -> Request<Body> {
    Request::post(SEARCH_ROUTE)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app("http://127.0.0.1:9");
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn unsupported_methods_get_json_405() {
    let app = test_app("http://127.0.0.1:9");
    for method in ["PUT", "DELETE", "PATCH"] {
        let request = Request::builder()
            .method(method)
            .uri(SEARCH_ROUTE)
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn missing_query_is_a_400_for_both_methods() {
    let app = test_app("http://127.0.0.1:9");

    let get = Request::get(SEARCH_ROUTE).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(get).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Query parameter is required" })
    );

    let empty = Request::get(format!("{SEARCH_ROUTE}?query="))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(empty).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_search(json!({ "query": "" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let no_body = Request::post(SEARCH_ROUTE).body(Body::empty()).expect("request");
    let response = app.oneshot(no_body).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_and_get_return_normalized_data() {
    let url = spawn_upstream(
        json!({ "status": "success", "data": [{ "name": "X", "brand": "Acme" }] }),
        StatusCode::OK,
    )
    .await;
    let app = test_app(&url);

    let response = app
        .clone()
        .oneshot(post_search(json!({ "query": "beer" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], "item-0");
    assert_eq!(body["data"][0]["name"], "X");
    assert_eq!(body["data"][0]["price"], "$0.00");
    assert_eq!(body["data"][0]["rating"], 0.0);
    assert_eq!(body["data"][0]["reviewsCount"], 0);
    assert_eq!(body["data"][0]["brand"], "Acme");

    let get = Request::get(format!("{SEARCH_ROUTE}?query=beer&query=ignored"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(get).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: SearchResponse =
        serde_json::from_value(json_body(response).await).expect("search response");
    assert_eq!(parsed.data.len(), 1);
}

#[tokio::test]
async fn upstream_failure_status_reaches_the_client() {
    let url = spawn_upstream(json!("unused"), StatusCode::SERVICE_UNAVAILABLE).await;
    // Both attempts hit a path the upstream does not serve.
    let app = test_app(&format!("{url}/missing"));

    let response = app
        .oneshot(post_search(json!({ "query": "lager" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "External API error: 404 Not Found" })
    );
}

#[tokio::test]
async fn decodable_post_without_a_list_returns_empty_data() {
    let url = spawn_upstream(json!("not a list"), StatusCode::SERVICE_UNAVAILABLE).await;
    let app = test_app(&url);

    let response = app
        .oneshot(post_search(json!({ "query": "lager" })))
        .await
        .expect("response");
    // POST decoded fine, so GET is never tried.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "data": [] }));
}
