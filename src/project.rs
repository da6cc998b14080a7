use chrono::NaiveDate;
use serde::Deserialize;

use crate::genres::GenreMap;
use crate::models::TitleRecord;

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w1280";
const TRAILER_SEARCH_BASE: &str = "https://www.youtube.com/results?search_query=";

/// A discovery hit as the API sends it. Movie and TV field names are both accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: u64,
    #[serde(alias = "name", default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

pub fn project(items: &[RawItem], genres: &GenreMap) -> Vec<TitleRecord> {
    items.iter().map(|item| project_item(item, genres)).collect()
}

fn project_item(item: &RawItem, genres: &GenreMap) -> TitleRecord {
    TitleRecord {
        id: item.id,
        poster_url: poster_url(item.poster_path.as_deref()),
        title: item.title.clone(),
        overview: item.overview.clone(),
        popularity: item.popularity,
        release_date: item.release_date.as_deref().and_then(parse_date),
        vote_average: item.vote_average,
        vote_count: item.vote_count,
        genres: item
            .genre_ids
            .iter()
            .filter_map(|id| genres.name_for(*id))
            .map(str::to_string)
            .collect(),
        trailer_search_url: trailer_search_url(&item.title),
        watch_providers: None,
    }
}

pub fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.trim().is_empty())
        .map(|p| format!("{POSTER_BASE}{p}"))
}

/// Search-results link for "<title> trailer". Not checked against any video.
pub fn trailer_search_url(title: &str) -> String {
    let words = title
        .split_whitespace()
        .map(|w| urlencoding::encode(w).into_owned())
        .chain(std::iter::once("trailer".to_string()))
        .collect::<Vec<_>>();
    format!("{TRAILER_SEARCH_BASE}{}", words.join("+"))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
