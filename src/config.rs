use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::tmdb::TMDB_BASE;

pub const DEFAULT_REGION: &str = "GB";
pub const DEFAULT_LANGUAGE: &str = "en-GB";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 3600;
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 4;
pub const DEFAULT_DISCOVER_PAGES: u32 = 1;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3146";

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub region: String,
    pub language: String,
    pub cache_ttl_secs: u64,
    pub enrich_concurrency: usize,
    pub discover_pages: u32,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tmdb_api_key = get("TMDB_API_KEY")
            .ok_or_else(|| Error::Config("Missing required environment variable: TMDB_API_KEY".to_string()))?;

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url: get("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string()),
            region: get("TMDB_REGION")
                .map(|r| r.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            language: get("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            cache_ttl_secs: cache_ttl(get("CACHE_TTL_SECS"))?,
            enrich_concurrency: parse_or(
                "ENRICH_CONCURRENCY",
                get("ENRICH_CONCURRENCY"),
                DEFAULT_ENRICH_CONCURRENCY,
            )?
            .clamp(1, 32),
            discover_pages: parse_or("DISCOVER_PAGES", get("DISCOVER_PAGES"), DEFAULT_DISCOVER_PAGES)?
                .clamp(1, 10),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn cache_ttl(raw: Option<String>) -> Result<u64> {
    let secs = parse_or("CACHE_TTL_SECS", raw, DEFAULT_CACHE_TTL_SECS)?;
    if secs > MAX_CACHE_TTL_SECS {
        return Err(Error::Config(format!(
            "CACHE_TTL_SECS must be at most {} (30 days), got {}",
            MAX_CACHE_TTL_SECS, secs
        )));
    }
    Ok(secs)
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, v))),
    }
}
