use chrono::{Datelike, NaiveDate, Utc};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::genres::GenreMap;
use crate::models::{GenreJoin, MediaKind, SortBy};

pub const DEFAULT_MIN_VOTE_COUNT: u32 = 5000;
pub const DEFAULT_FROM_YEAR: i32 = 2000;

/// Everything a caller can filter on. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchCriteria {
    pub kind: MediaKind,
    pub genres: BTreeSet<String>,
    pub genre_join: GenreJoin,
    pub sort_by: SortBy,
    pub release_date_from: NaiveDate,
    pub release_date_to: NaiveDate,
    pub min_vote_count: u32,
    pub fetch_availability: bool,
    pub keywords: Vec<u64>,
    pub people: Vec<u64>,
}

impl SearchCriteria {
    /// Criteria covering 1 January of `from_year` to 31 December of `to_year`.
    pub fn for_years(kind: MediaKind, from_year: i32, to_year: i32) -> Result<Self> {
        let release_date_from = NaiveDate::from_ymd_opt(from_year, 1, 1)
            .ok_or_else(|| Error::InvalidInput(format!("invalid year {}", from_year)))?;
        let release_date_to = NaiveDate::from_ymd_opt(to_year, 12, 31)
            .ok_or_else(|| Error::InvalidInput(format!("invalid year {}", to_year)))?;
        Ok(Self {
            kind,
            genres: BTreeSet::new(),
            genre_join: GenreJoin::default(),
            sort_by: SortBy::default(),
            release_date_from,
            release_date_to,
            min_vote_count: DEFAULT_MIN_VOTE_COUNT,
            fetch_availability: false,
            keywords: Vec::new(),
            people: Vec::new(),
        })
    }

    /// Defaults: popularity sort, 2000 through the current year, 5000 votes.
    pub fn new(kind: MediaKind) -> Self {
        let this_year = Utc::now().year();
        Self {
            kind,
            genres: BTreeSet::new(),
            genre_join: GenreJoin::default(),
            sort_by: SortBy::default(),
            release_date_from: NaiveDate::from_ymd_opt(DEFAULT_FROM_YEAR, 1, 1)
                .unwrap_or(NaiveDate::MIN),
            release_date_to: NaiveDate::from_ymd_opt(this_year, 12, 31).unwrap_or(NaiveDate::MAX),
            min_vote_count: DEFAULT_MIN_VOTE_COUNT,
            fetch_availability: false,
            keywords: Vec::new(),
            people: Vec::new(),
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// Date ordering is checked here only; `translate` passes bounds through as given.
    pub fn validate(&self) -> Result<()> {
        if self.release_date_from > self.release_date_to {
            return Err(Error::InvalidInput(format!(
                "release date range is inverted: {} > {}",
                self.release_date_from, self.release_date_to
            )));
        }
        Ok(())
    }
}

/// Parameters for one discovery request, minus paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverParams {
    pub with_genres: Option<String>,
    pub sort_by: SortBy,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub min_vote_count: u32,
    pub with_keywords: Option<String>,
    pub with_people: Option<String>,
}

impl DiscoverParams {
    pub fn to_query(&self, kind: MediaKind, page: u32) -> Vec<(&'static str, String)> {
        let (gte, lte) = match kind {
            MediaKind::Movie => ("primary_release_date.gte", "primary_release_date.lte"),
            MediaKind::Tv => ("first_air_date.gte", "first_air_date.lte"),
        };
        let mut query = vec![
            ("sort_by", self.sort_by.as_param().to_string()),
            (gte, self.date_from.format("%Y-%m-%d").to_string()),
            (lte, self.date_to.format("%Y-%m-%d").to_string()),
            ("vote_count.gte", self.min_vote_count.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(genres) = &self.with_genres {
            query.push(("with_genres", genres.clone()));
        }
        if let Some(keywords) = &self.with_keywords {
            query.push(("with_keywords", keywords.clone()));
        }
        if kind == MediaKind::Movie {
            if let Some(people) = &self.with_people {
                query.push(("with_people", people.clone()));
            }
        }
        query
    }
}

pub fn translate(criteria: &SearchCriteria, genres: &GenreMap) -> DiscoverParams {
    let ids: Vec<String> = criteria
        .genres
        .iter()
        .filter_map(|name| genres.id_for(name))
        .map(|id| id.to_string())
        .collect();

    DiscoverParams {
        with_genres: join_ids(ids, criteria.genre_join.delimiter()),
        sort_by: criteria.sort_by,
        date_from: criteria.release_date_from,
        date_to: criteria.release_date_to,
        min_vote_count: criteria.min_vote_count,
        with_keywords: join_ids(criteria.keywords.iter().map(u64::to_string), "|"),
        with_people: join_ids(criteria.people.iter().map(u64::to_string), "|"),
    }
}

fn join_ids(ids: impl IntoIterator<Item = String>, delimiter: &str) -> Option<String> {
    let joined = ids.into_iter().collect::<Vec<_>>().join(delimiter);
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
