//! Optional "where to watch" lookups, one upstream call per title.
//!
//! Failures never escape this module: every outcome other than
//! [`ProviderOutcome::Available`] becomes an empty provider list, after the
//! specific reason has been logged.
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::models::{MediaKind, TitleRecord};
use crate::tmdb::TmdbApi;

pub const MAX_PROVIDERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    Transport,
    Status(u16),
    Decode,
}

impl From<&UpstreamError> for LookupFailure {
    fn from(e: &UpstreamError) -> Self {
        match e {
            UpstreamError::Transport(_) => LookupFailure::Transport,
            UpstreamError::Status { status, .. } => LookupFailure::Status(*status),
            UpstreamError::Decode(_) => LookupFailure::Decode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// Up to five subscription providers, in upstream order.
    Available(Vec<String>),
    /// The region has data but no subscription category, or an empty one.
    NoSubscriptionProviders,
    /// The title has no listing at all for the region.
    RegionMissing,
    Failed(LookupFailure),
}

impl ProviderOutcome {
    pub fn into_names(self) -> Vec<String> {
        match self {
            ProviderOutcome::Available(names) => names,
            _ => Vec::new(),
        }
    }
}

pub async fn lookup(api: &dyn TmdbApi, kind: MediaKind, title_id: u64, region: &str) -> ProviderOutcome {
    let providers = match api.watch_providers(kind, title_id).await {
        Ok(p) => p,
        Err(e) => return ProviderOutcome::Failed(LookupFailure::from(&e)),
    };
    let Some(listing) = providers.results.get(region) else {
        return ProviderOutcome::RegionMissing;
    };
    let names: Vec<String> = listing
        .flatrate
        .as_deref()
        .unwrap_or_default()
        .iter()
        .take(MAX_PROVIDERS)
        .map(|p| p.provider_name.clone())
        .collect();
    if names.is_empty() {
        ProviderOutcome::NoSubscriptionProviders
    } else {
        ProviderOutcome::Available(names)
    }
}

/// Subscription providers for one title; empty on any failure.
pub async fn enrich(api: &dyn TmdbApi, kind: MediaKind, title_id: u64, region: &str) -> Vec<String> {
    let outcome = lookup(api, kind, title_id, region).await;
    match &outcome {
        ProviderOutcome::Available(names) => {
            debug!(title_id, region, providers = names.len(), "Found subscription providers");
        }
        ProviderOutcome::NoSubscriptionProviders => {
            debug!(title_id, region, "No subscription providers");
        }
        ProviderOutcome::RegionMissing => {
            debug!(title_id, region, "No provider listing for region");
        }
        ProviderOutcome::Failed(failure) => {
            warn!(title_id, region, failure = ?failure, "Provider lookup failed, treating as none");
        }
    }
    outcome.into_names()
}

/// Attaches providers to every record, at most `concurrency` lookups in flight.
/// Records keep their order.
pub async fn enrich_all(
    api: &dyn TmdbApi,
    kind: MediaKind,
    records: Vec<TitleRecord>,
    region: &str,
    concurrency: usize,
) -> Vec<TitleRecord> {
    stream::iter(records)
        .map(|mut record| async move {
            record.watch_providers = Some(enrich(api, kind, record.id, region).await);
            record
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
