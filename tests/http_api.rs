mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cinefilter::app::{build_router, AppState};
use cinefilter::cache::SystemClock;
use cinefilter::config::Config;
use cinefilter::error::UpstreamError;
use cinefilter::pipeline::{PipelineSettings, QueryPipeline};
use cinefilter::tmdb::TmdbClient;
use common::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

fn app(fake: FakeTmdb) -> Router {
    let pipeline = QueryPipeline::new(
        Arc::new(fake),
        PipelineSettings::default(),
        Arc::new(SystemClock),
    );
    build_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

fn catalogue() -> FakeTmdb {
    FakeTmdb {
        genres: movie_genres(),
        pages: vec![vec![
            raw_item(10, "Heat", &[28, 18]),
            raw_item(11, "Collateral", &[18]),
        ]],
        providers: HashMap::from([(10, gb_flatrate(&["Netflix", "BBC iPlayer"]))]),
        ..Default::default()
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let res = app(catalogue())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_genre_names() {
    let (status, body) = get(app(catalogue()), "/genres/movie").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["Action", "Drama", "Comedy"]));
}

#[tokio::test]
async fn discover_returns_rows_with_providers() {
    let (status, body) = get(
        app(catalogue()),
        "/discover/movie?genres=Action,Drama&sort_by=rating&from_year=1997&to_year=2025&min_vote_count=10000&watch_providers=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array of rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "Heat");
    assert_eq!(rows[0]["genres"], serde_json::json!(["Action", "Drama"]));
    assert_eq!(rows[0]["release_date"], "2010-07-16");
    assert_eq!(
        rows[0]["watch_providers"],
        serde_json::json!(["Netflix", "BBC iPlayer"])
    );
    assert_eq!(rows[1]["watch_providers"], serde_json::json!([]));
    assert_eq!(
        rows[1]["trailer_search_url"],
        "https://www.youtube.com/results?search_query=Collateral+trailer"
    );
}

#[tokio::test]
async fn discover_omits_providers_when_not_requested() {
    let (status, body) = get(app(catalogue()), "/discover/movie").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array of rows");
    assert!(rows.iter().all(|r| r.get("watch_providers").is_none()));
}

#[tokio::test]
async fn inverted_year_range_is_bad_request() {
    let (status, body) = get(app(catalogue()), "/discover/tv?from_year=2020&to_year=2010").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("inverted"));
}

#[tokio::test]
async fn unknown_media_kind_is_bad_request() {
    let (status, _) = get(app(catalogue()), "/discover/books").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let mut fake = catalogue();
    fake.discover_error = Some(UpstreamError::Status {
        status: 429,
        body: "rate limited".to_string(),
    });
    let (status, body) = get(app(fake), "/discover/movie").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn unreachable_upstream_does_not_leak_api_key() {
    let config = Config::from_lookup(|key: &str| match key {
        "TMDB_API_KEY" => Some("SUPERSECRETKEY".to_string()),
        "TMDB_BASE_URL" => Some("http://127.0.0.1:1".to_string()),
        _ => None,
    })
    .unwrap();
    let pipeline = QueryPipeline::new(
        Arc::new(TmdbClient::new(&config).unwrap()),
        PipelineSettings::from(&config),
        Arc::new(SystemClock),
    );
    let app = build_router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let res = app
        .oneshot(Request::get("/discover/movie").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!body.contains("SUPERSECRETKEY"), "body leaked key: {}", body);
    assert!(!body.contains("127.0.0.1"));
}

#[tokio::test]
async fn search_requires_known_type() {
    let (status, _) = get(app(catalogue()), "/search?q=Jack&type=book").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
