#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cinefilter::cache::ManualClock;
use cinefilter::error::UpstreamError;
use cinefilter::genres::Genre;
use cinefilter::models::{DetailKind, MediaKind, SearchType, TitleSummary};
use cinefilter::project::RawItem;
use cinefilter::query::DiscoverParams;
use cinefilter::tmdb::{
    DiscoverPage, Provider, RegionProviders, SearchHit, TmdbApi, UpstreamResult, WatchProviders,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct FakeTmdb {
    pub genres: Vec<Genre>,
    pub pages: Vec<Vec<RawItem>>,
    pub discover_error: Option<UpstreamError>,
    pub providers: HashMap<u64, Result<WatchProviders, UpstreamError>>,
    pub provider_delay_ms: HashMap<u64, u64>,
    pub search_hits: Vec<SearchHit>,
    pub details: HashMap<u64, TitleSummary>,
    pub genre_calls: AtomicUsize,
    pub discover_calls: AtomicUsize,
    pub provider_calls: AtomicUsize,
    pub seen_params: Mutex<Vec<(MediaKind, DiscoverParams, u32)>>,
}

#[async_trait]
impl TmdbApi for FakeTmdb {
    async fn genres(&self, _kind: MediaKind) -> UpstreamResult<Vec<Genre>> {
        self.genre_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.genres.clone())
    }

    async fn discover(
        &self,
        kind: MediaKind,
        params: &DiscoverParams,
        page: u32,
    ) -> UpstreamResult<DiscoverPage> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_params
            .lock()
            .unwrap()
            .push((kind, params.clone(), page));
        if let Some(e) = &self.discover_error {
            return Err(e.clone());
        }
        let results = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(DiscoverPage {
            total_pages: self.pages.len().max(1) as u32,
            results,
        })
    }

    async fn watch_providers(&self, _kind: MediaKind, id: u64) -> UpstreamResult<WatchProviders> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ms) = self.provider_delay_ms.get(&id) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        self.providers
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Ok(WatchProviders::default()))
    }

    async fn search(&self, _search_type: SearchType, _term: &str) -> UpstreamResult<Vec<SearchHit>> {
        Ok(self.search_hits.clone())
    }

    async fn details(&self, _kind: DetailKind, id: u64) -> UpstreamResult<TitleSummary> {
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

pub fn movie_genres() -> Vec<Genre> {
    vec![
        Genre {
            id: 28,
            name: "Action".to_string(),
        },
        Genre {
            id: 18,
            name: "Drama".to_string(),
        },
        Genre {
            id: 35,
            name: "Comedy".to_string(),
        },
    ]
}

pub fn raw_item(id: u64, title: &str, genre_ids: &[u32]) -> RawItem {
    RawItem {
        id,
        title: title.to_string(),
        overview: format!("{} overview", title),
        poster_path: Some(format!("/{id}.jpg")),
        popularity: 100.0 - id as f64,
        release_date: Some("2010-07-16".to_string()),
        vote_average: 8.1,
        vote_count: 20_000 + id,
        genre_ids: genre_ids.to_vec(),
    }
}

pub fn gb_flatrate(names: &[&str]) -> Result<WatchProviders, UpstreamError> {
    let listing = RegionProviders {
        flatrate: Some(
            names
                .iter()
                .map(|n| Provider {
                    provider_name: n.to_string(),
                })
                .collect(),
        ),
    };
    Ok(WatchProviders {
        results: HashMap::from([("GB".to_string(), listing)]),
    })
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ))
}
