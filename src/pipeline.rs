use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{Clock, TtlCache};
use crate::config::{self, Config};
use crate::enrich;
use crate::error::{Error, Result};
use crate::genres::GenreMap;
use crate::models::{DetailKind, MediaKind, SearchResults, SearchType, TitleRecord};
use crate::project::{self, RawItem};
use crate::query::{self, SearchCriteria};
use crate::tmdb::TmdbApi;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub region: String,
    pub cache_ttl: Duration,
    pub enrich_concurrency: usize,
    pub discover_pages: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            region: config::DEFAULT_REGION.to_string(),
            cache_ttl: Duration::seconds(config::DEFAULT_CACHE_TTL_SECS as i64),
            enrich_concurrency: config::DEFAULT_ENRICH_CONCURRENCY,
            discover_pages: config::DEFAULT_DISCOVER_PAGES,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            region: config.region.clone(),
            cache_ttl: Duration::seconds(config.cache_ttl_secs.min(config::MAX_CACHE_TTL_SECS) as i64),
            enrich_concurrency: config.enrich_concurrency,
            discover_pages: config.discover_pages,
        }
    }
}

/// Criteria in, table rows out. Holds the process-wide genre and result caches.
pub struct QueryPipeline {
    api: Arc<dyn TmdbApi>,
    settings: PipelineSettings,
    genre_cache: TtlCache<MediaKind, Arc<GenreMap>>,
    result_cache: TtlCache<SearchCriteria, Vec<TitleRecord>>,
}

impl QueryPipeline {
    pub fn new(api: Arc<dyn TmdbApi>, settings: PipelineSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            genre_cache: TtlCache::new(settings.cache_ttl, clock.clone()),
            result_cache: TtlCache::new(settings.cache_ttl, clock),
            api,
            settings,
        }
    }

    pub async fn genres(&self, kind: MediaKind) -> Result<Arc<GenreMap>> {
        if let Some(map) = self.genre_cache.get(&kind).await {
            return Ok(map);
        }
        let list = self.api.genres(kind).await?;
        let map = Arc::new(GenreMap::from_genres(list));
        info!(kind = %kind, genres = map.len(), "Loaded genre list");
        self.genre_cache.insert(kind, map.clone()).await;
        Ok(map)
    }

    pub async fn run_query(&self, criteria: &SearchCriteria) -> Result<Vec<TitleRecord>> {
        if let Some(rows) = self.result_cache.get(criteria).await {
            debug!(kind = %criteria.kind, rows = rows.len(), "Query cache hit");
            return Ok(rows);
        }

        let genres = self.genres(criteria.kind).await?;
        let params = query::translate(criteria, &genres);
        let raw = self.discover_all(criteria.kind, &params).await?;
        let mut rows = project::project(&raw, &genres);

        if criteria.fetch_availability {
            info!(
                kind = %criteria.kind,
                titles = rows.len(),
                concurrency = self.settings.enrich_concurrency,
                "Fetching watch providers"
            );
            rows = enrich::enrich_all(
                self.api.as_ref(),
                criteria.kind,
                rows,
                &self.settings.region,
                self.settings.enrich_concurrency,
            )
            .await;
        }

        info!(kind = %criteria.kind, rows = rows.len(), "Query complete");
        self.result_cache.insert(criteria.clone(), rows.clone()).await;
        Ok(rows)
    }

    async fn discover_all(
        &self,
        kind: MediaKind,
        params: &query::DiscoverParams,
    ) -> Result<Vec<RawItem>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let data = self.api.discover(kind, params, page).await?;
            debug!(kind = %kind, page, results = data.results.len(), "Discovery page");
            items.extend(data.results);
            if page >= data.total_pages || page >= self.settings.discover_pages {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    /// Name search followed by one detail lookup per hit.
    pub async fn search(&self, term: &str, search_type: SearchType) -> Result<SearchResults> {
        let term = term.trim();
        if term.is_empty() {
            return Err(Error::InvalidInput("search term must not be empty".to_string()));
        }

        let hits = self.api.search(search_type, term).await?;
        let mut out = SearchResults::default();
        for hit in hits {
            let kind = match search_type {
                SearchType::Movie => DetailKind::Movie,
                SearchType::Tv => DetailKind::Tv,
                SearchType::Person => DetailKind::Person,
                SearchType::Multi => match hit.media_type.as_deref() {
                    Some("movie") => DetailKind::Movie,
                    Some("tv") => DetailKind::Tv,
                    Some("person") => DetailKind::Person,
                    other => {
                        debug!(id = hit.id, media_type = ?other, "Skipping search hit");
                        continue;
                    }
                },
            };
            let summary = match self.api.details(kind, hit.id).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(id = hit.id, kind = kind.as_path(), error = %e, "Detail lookup failed");
                    continue;
                }
            };
            match kind {
                DetailKind::Movie => out.movies.push(summary),
                DetailKind::Tv => out.tv.push(summary),
                DetailKind::Person => out.people.push(summary),
            }
        }
        Ok(out)
    }

    /// Evicts expired genre lists and query results.
    pub async fn purge_expired(&self) -> usize {
        self.genre_cache.purge_expired().await + self.result_cache.purge_expired().await
    }
}
