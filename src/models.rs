use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for MediaKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "tv" | "show" | "shows" => Ok(MediaKind::Tv),
            other => Err(Error::InvalidInput(format!(
                "media kind must be 'movie' or 'tv', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    RatingDesc,
}

impl SortBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::RatingDesc => "vote_average.desc",
        }
    }
}

impl FromStr for SortBy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "popularity" | "popularity.desc" | "popular" => Ok(SortBy::PopularityDesc),
            "rating" | "vote_average.desc" | "top_rated" => Ok(SortBy::RatingDesc),
            other => Err(Error::InvalidInput(format!(
                "sort must be 'popularity' or 'rating', got '{}'",
                other
            ))),
        }
    }
}

/// How multiple genre ids combine in the discovery filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreJoin {
    /// Title has at least one of the genres.
    #[default]
    Any,
    /// Title has every genre.
    All,
}

impl GenreJoin {
    pub fn delimiter(&self) -> &'static str {
        match self {
            GenreJoin::Any => "|",
            GenreJoin::All => ",",
        }
    }
}

impl FromStr for GenreJoin {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "any" | "or" => Ok(GenreJoin::Any),
            "all" | "and" => Ok(GenreJoin::All),
            other => Err(Error::InvalidInput(format!(
                "match must be 'any' or 'all', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Movie,
    Tv,
    Person,
    Multi,
}

impl SearchType {
    pub fn as_path(&self) -> &'static str {
        match self {
            SearchType::Movie => "movie",
            SearchType::Tv => "tv",
            SearchType::Person => "person",
            SearchType::Multi => "multi",
        }
    }
}

impl FromStr for SearchType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(SearchType::Movie),
            "tv" => Ok(SearchType::Tv),
            "person" => Ok(SearchType::Person),
            "multi" => Ok(SearchType::Multi),
            other => Err(Error::InvalidInput(format!(
                "search type must be one of movie, tv, person, multi; got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Movie,
    Tv,
    Person,
}

impl DetailKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            DetailKind::Movie => "movie",
            DetailKind::Tv => "tv",
            DetailKind::Person => "person",
        }
    }
}

/// One flat table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleRecord {
    pub id: u64,
    pub poster_url: Option<String>,
    pub title: String,
    pub overview: String,
    pub popularity: f64,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genres: Vec<String>,
    pub trailer_search_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_providers: Option<Vec<String>>,
}

impl TitleRecord {
    /// Providers as a single cell, e.g. "Netflix, Disney Plus".
    pub fn watch_providers_label(&self) -> String {
        self.watch_providers
            .as_deref()
            .map(|p| p.join(", "))
            .unwrap_or_default()
    }
}

/// Name and description of a search hit, taken from its detail record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSummary {
    pub id: u64,
    pub name: String,
    pub overview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub movies: Vec<TitleSummary>,
    pub tv: Vec<TitleSummary>,
    pub people: Vec<TitleSummary>,
}
