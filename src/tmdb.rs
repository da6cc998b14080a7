use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, UpstreamError};
use crate::genres::Genre;
use crate::models::{DetailKind, MediaKind, SearchType, TitleSummary};
use crate::project::RawItem;
use crate::query::DiscoverParams;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// The five metadata operations the pipeline relies on.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self, kind: MediaKind) -> UpstreamResult<Vec<Genre>>;
    async fn discover(
        &self,
        kind: MediaKind,
        params: &DiscoverParams,
        page: u32,
    ) -> UpstreamResult<DiscoverPage>;
    async fn watch_providers(&self, kind: MediaKind, id: u64) -> UpstreamResult<WatchProviders>;
    async fn search(&self, search_type: SearchType, term: &str) -> UpstreamResult<Vec<SearchHit>>;
    async fn details(&self, kind: DetailKind, id: u64) -> UpstreamResult<TitleSummary>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub results: Vec<RawItem>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Per-region provider listings for one title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionProviders {
    /// Subscription ("flat rate") offers only; rent and buy are ignored.
    pub flatrate: Option<Vec<Provider>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    pub provider_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    region: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let user_agent = format!("cinefilter/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build TMDB HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            api_key: config.tmdb_api_key.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> UpstreamResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "TMDB request");
        let res = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key), ("language", &self.language)])
            .query(query)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let parsed: T = serde_json::from_str(&text)?;
        Ok(parsed)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self, kind: MediaKind) -> UpstreamResult<Vec<Genre>> {
        #[derive(Deserialize)]
        struct GenreList {
            genres: Vec<Genre>,
        }

        let path = format!("/genre/{}/list", kind.as_path());
        let data: GenreList = self.get_json(&path, &[]).await?;
        Ok(data.genres)
    }

    async fn discover(
        &self,
        kind: MediaKind,
        params: &DiscoverParams,
        page: u32,
    ) -> UpstreamResult<DiscoverPage> {
        let mut query = params.to_query(kind, page);
        query.push(("region", self.region.clone()));
        let path = format!("/discover/{}", kind.as_path());
        self.get_json(&path, &query).await
    }

    async fn watch_providers(&self, kind: MediaKind, id: u64) -> UpstreamResult<WatchProviders> {
        let path = format!("/{}/{id}/watch/providers", kind.as_path());
        self.get_json(&path, &[]).await
    }

    async fn search(&self, search_type: SearchType, term: &str) -> UpstreamResult<Vec<SearchHit>> {
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            results: Vec<SearchHit>,
        }

        let path = format!("/search/{}", search_type.as_path());
        let data: SearchResponse = self
            .get_json(&path, &[("query", term.to_string())])
            .await?;
        Ok(data.results)
    }

    async fn details(&self, kind: DetailKind, id: u64) -> UpstreamResult<TitleSummary> {
        let path = format!("/{}/{id}", kind.as_path());
        let raw: RawDetails = self.get_json(&path, &[]).await?;
        Ok(raw.into_summary())
    }
}

/// Movie, TV and person detail records share this loose shape.
#[derive(Debug, Deserialize)]
struct RawDetails {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    biography: Option<String>,
}

impl RawDetails {
    fn into_summary(self) -> TitleSummary {
        TitleSummary {
            id: self.id,
            name: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.or(self.biography).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_watch_providers_by_region() {
        let value = json!({
            "id": 550,
            "results": {
                "GB": {
                    "link": "https://www.themoviedb.org/movie/550/watch?locale=GB",
                    "flatrate": [
                        { "provider_id": 8, "provider_name": "Netflix", "display_priority": 1 }
                    ],
                    "rent": [
                        { "provider_id": 2, "provider_name": "Apple TV", "display_priority": 4 }
                    ]
                },
                "US": { "buy": [] }
            }
        });
        let providers: WatchProviders = serde_json::from_value(value).expect("providers");
        let gb = providers.results.get("GB").expect("GB entry");
        let names: Vec<_> = gb
            .flatrate
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.provider_name.as_str())
            .collect();
        assert_eq!(names, vec!["Netflix"]);
        assert!(providers.results.get("US").unwrap().flatrate.is_none());
    }

    #[test]
    fn person_details_use_name_and_biography() {
        let raw: RawDetails = serde_json::from_value(json!({
            "id": 287,
            "name": "Brad Pitt",
            "biography": "An American actor."
        }))
        .expect("details");
        let summary = raw.into_summary();
        assert_eq!(summary.name, "Brad Pitt");
        assert_eq!(summary.overview, "An American actor.");
    }

    #[test]
    fn discover_page_defaults() {
        let page: DiscoverPage = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
