//! Run one discovery query against TMDB and print the resulting rows.
//! Usage:
//!   cargo run --bin discover_props -- movie [genres] [from_year] [to_year] [min_votes] [--providers] [--rating]
//!   cargo run --bin discover_props -- tv "Drama,Comedy" 2010 2020 500
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinefilter::cache::SystemClock;
use cinefilter::config::Config;
use cinefilter::models::{MediaKind, SortBy};
use cinefilter::pipeline::{PipelineSettings, QueryPipeline};
use cinefilter::query::SearchCriteria;
use cinefilter::tmdb::TmdbClient;
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().skip(1).collect();
    let flags: Vec<&str> = args
        .iter()
        .filter(|a| a.starts_with("--"))
        .map(String::as_str)
        .collect();
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    if positional.is_empty() {
        eprintln!("Usage: cargo run --bin discover_props -- <movie|tv> [genres] [from_year] [to_year] [min_votes] [--providers] [--rating]");
        std::process::exit(1);
    }

    let kind: MediaKind = positional[0].parse()?;
    let mut criteria = SearchCriteria::new(kind);
    if let (Some(from), Some(to)) = (positional.get(2), positional.get(3)) {
        let from: i32 = from.parse().context("from_year must be an integer")?;
        let to: i32 = to.parse().context("to_year must be an integer")?;
        criteria = SearchCriteria::for_years(kind, from, to)?;
    }
    if let Some(genres) = positional.get(1) {
        criteria = criteria.with_genres(genres.split(',').map(str::trim).filter(|s| !s.is_empty()));
    }
    if let Some(votes) = positional.get(4) {
        criteria.min_vote_count = votes.parse().context("min_votes must be an integer")?;
    }
    criteria.fetch_availability = flags.contains(&"--providers");
    if flags.contains(&"--rating") {
        criteria.sort_by = SortBy::RatingDesc;
    }
    criteria.validate()?;

    let config = Config::from_env()?;
    let pipeline = QueryPipeline::new(
        Arc::new(TmdbClient::new(&config)?),
        PipelineSettings::from(&config),
        Arc::new(SystemClock),
    );

    let genres = pipeline.genres(kind).await?;
    let unknown: Vec<&String> = criteria
        .genres
        .iter()
        .filter(|g| genres.id_for(g).is_none())
        .collect();
    if !unknown.is_empty() {
        eprintln!("Ignoring unknown genres: {:?}", unknown);
        eprintln!("Known genres: {}", genres.names().join(", "));
    }

    let rows = pipeline.run_query(&criteria).await?;
    let table: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "Poster": r.poster_url,
                "Title": r.title,
                "Overview": r.overview,
                "Genres": r.genres,
                "Release Date": r.release_date,
                "Popularity": r.popularity,
                "Vote Average": r.vote_average,
                "Vote Count": r.vote_count,
                "Trailer": r.trailer_search_url,
                "Where to Watch": r.watch_providers.as_ref().map(|_| r.watch_providers_label()),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&table)?);
    eprintln!("{} rows", rows.len());
    Ok(())
}
