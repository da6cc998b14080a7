use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::cache::SystemClock;
use crate::config::Config;
use crate::error::Error;
use crate::models::{MediaKind, SearchResults, SearchType, TitleRecord};
use crate::pipeline::{PipelineSettings, QueryPipeline};
use crate::query::{SearchCriteria, DEFAULT_FROM_YEAR};
use crate::tmdb::TmdbClient;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb = Arc::new(TmdbClient::new(&config)?);
    let pipeline = QueryPipeline::new(
        tmdb,
        PipelineSettings::from(&config),
        Arc::new(SystemClock),
    );
    info!(
        region = %config.region,
        language = %config.language,
        cache_ttl_secs = config.cache_ttl_secs,
        enrich_concurrency = config.enrich_concurrency,
        "Query pipeline ready"
    );

    let pipeline = Arc::new(pipeline);
    spawn_cache_sweeper(pipeline.clone(), config.cache_ttl_secs);

    let app = build_router(AppState { pipeline });

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn spawn_cache_sweeper(pipeline: Arc<QueryPipeline>, ttl_secs: u64) {
    let period = Duration::from_secs(ttl_secs.max(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = pipeline.purge_expired().await;
            if removed > 0 {
                debug!(removed, "Purged expired cache entries");
            }
        }
    });
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/genres/:kind", get(list_genres))
        .route("/discover/:kind", get(discover))
        .route("/search", get(search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn list_genres(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<String>>, Error> {
    let kind: MediaKind = kind.parse()?;
    let genres = state.pipeline.genres(kind).await?;
    Ok(Json(genres.names()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscoverQuery {
    pub genres: Option<String>,
    #[serde(rename = "match")]
    pub genre_match: Option<String>,
    pub sort_by: Option<String>,
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    pub min_vote_count: Option<u32>,
    pub watch_providers: Option<bool>,
    pub keywords: Option<String>,
    pub people: Option<String>,
}

impl DiscoverQuery {
    pub fn into_criteria(self, kind: MediaKind) -> Result<SearchCriteria, Error> {
        let from_year = self.from_year.unwrap_or(DEFAULT_FROM_YEAR);
        let to_year = self.to_year.unwrap_or_else(|| Utc::now().year());
        let mut criteria = SearchCriteria::for_years(kind, from_year, to_year)?;
        criteria.validate()?;

        if let Some(genres) = self.genres.as_deref() {
            criteria = criteria.with_genres(split_list(genres));
        }
        if let Some(m) = self.genre_match.as_deref() {
            criteria.genre_join = m.parse()?;
        }
        if let Some(sort) = self.sort_by.as_deref() {
            criteria.sort_by = sort.parse()?;
        }
        if let Some(min) = self.min_vote_count {
            criteria.min_vote_count = min;
        }
        criteria.fetch_availability = self.watch_providers.unwrap_or(false);
        criteria.keywords = parse_ids("keywords", self.keywords.as_deref())?;
        criteria.people = parse_ids("people", self.people.as_deref())?;
        Ok(criteria)
    }
}

async fn discover(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<DiscoverQuery>,
) -> Result<Json<Vec<TitleRecord>>, Error> {
    let kind: MediaKind = kind.parse()?;
    let criteria = params.into_criteria(kind)?;
    let rows = state.pipeline.run_query(&criteria).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResults>, Error> {
    let search_type = match params.search_type.as_deref() {
        Some(t) => t.parse()?,
        None => SearchType::Multi,
    };
    let results = state.pipeline.search(&params.q, search_type).await?;
    Ok(Json(results))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_ids(field: &str, raw: Option<&str>) -> Result<Vec<u64>, Error> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    split_list(raw)
        .iter()
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| Error::InvalidInput(format!("{} must be numeric ids, got '{}'", field, s)))
        })
        .collect()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
