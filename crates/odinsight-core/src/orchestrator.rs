// ── Fetch orchestrator ──
//
// Walks the registry in priority order for one query and returns the first
// non-empty, successfully transformed result. Later sources are never
// contacted once one succeeds. Source failures are logged and absorbed here.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use odinsight_api::{Query, SourceClient, SourceDescriptor};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::convert;
use crate::error::CoreError;
use crate::model::{AddressCluster, ChartRange, Language, Series, SeriesKind, Summary, TransactionRow};
use crate::registry::SourceRegistry;

/// Result of walking the registry for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// A source answered with usable data.
    Live { source: String, value: T },
    /// At least one source was tried and every one failed.
    Exhausted,
    /// No registered source declares the query.
    Unsupported,
}

impl<T> FetchOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Live { value, .. } => Some(value),
            Self::Exhausted | Self::Unsupported => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    /// Name of the source that answered.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Live { source, .. } => Some(source),
            Self::Exhausted | Self::Unsupported => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            Self::Live { source, value } => FetchOutcome::Live {
                source,
                value: f(value),
            },
            Self::Exhausted => FetchOutcome::Exhausted,
            Self::Unsupported => FetchOutcome::Unsupported,
        }
    }
}

/// Per-query priority walk over a [`SourceRegistry`].
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    client: SourceClient,
    registry: Arc<SourceRegistry>,
    clock: Arc<dyn Clock>,
}

impl FetchOrchestrator {
    pub fn new(client: SourceClient, registry: Arc<SourceRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            registry,
            clock,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn fetch_summary(&self) -> FetchOutcome<Summary> {
        self.walk(Query::Summary, |source| {
            async move {
                let payload = self
                    .client
                    .summary(source)
                    .await
                    .map_err(|e| CoreError::from_api(&source.name, e))?;
                convert::summary(&source.name, payload, self.clock.now()).map(Some)
            }
            .boxed()
        })
        .await
    }

    pub async fn fetch_series(&self, kind: SeriesKind, range: ChartRange) -> FetchOutcome<Series> {
        self.walk(Query::Series, |source| {
            async move {
                let payload = self
                    .client
                    .series(source, range.as_str(), &kind.to_string())
                    .await
                    .map_err(|e| CoreError::from_api(&source.name, e))?;
                let series = convert::series(&source.name, payload, kind, range)?;
                Ok((!series.is_empty()).then_some(series))
            }
            .boxed()
        })
        .await
    }

    /// Address clusters, not yet localized.
    pub async fn fetch_addresses(&self) -> FetchOutcome<Vec<AddressCluster>> {
        self.walk(Query::Addresses, |source| {
            async move {
                let holders = self
                    .client
                    .holders(source)
                    .await
                    .map_err(|e| CoreError::from_api(&source.name, e))?;
                let rows = convert::addresses(holders, self.clock.now());
                Ok((!rows.is_empty()).then_some(rows))
            }
            .boxed()
        })
        .await
    }

    pub async fn fetch_transactions(
        &self,
        limit: usize,
        language: Language,
    ) -> FetchOutcome<Vec<TransactionRow>> {
        self.walk(Query::Transactions, |source| {
            async move {
                let payload = self
                    .client
                    .transactions(source, limit)
                    .await
                    .map_err(|e| CoreError::from_api(&source.name, e))?;
                let mut rows = convert::transactions(&source.name, payload, language)?;
                rows.truncate(limit);
                Ok((!rows.is_empty()).then_some(rows))
            }
            .boxed()
        })
        .await
    }

    /// Probe every source in order; the name of the first reachable one.
    pub async fn find_working_source(&self) -> Option<String> {
        for source in self.registry.iter() {
            if self.client.probe(source).await {
                debug!(source = %source.name, "source reachable");
                return Some(source.name.clone());
            }
            debug!(source = %source.name, "source unreachable");
        }
        None
    }

    // ── Walk ─────────────────────────────────────────────────────────

    /// `attempt` yields `Ok(None)` for an empty result, which counts as a
    /// miss for that source.
    async fn walk<'s, T, F>(&'s self, query: Query, attempt: F) -> FetchOutcome<T>
    where
        F: Fn(&'s SourceDescriptor) -> BoxFuture<'s, Result<Option<T>, CoreError>>,
    {
        let mut attempted = 0_usize;

        for source in self.registry.serving(query) {
            attempted += 1;
            debug!(source = %source.name, %query, "trying source");
            match attempt(source).await {
                Ok(Some(value)) => {
                    debug!(source = %source.name, %query, "live data");
                    return FetchOutcome::Live {
                        source: source.name.clone(),
                        value,
                    };
                }
                Ok(None) => debug!(source = %source.name, %query, "empty result, trying next source"),
                Err(e) => warn!(source = %source.name, %query, error = %e, "source failed"),
            }
        }

        if attempted == 0 && !self.registry.is_empty() {
            debug!(%query, "no source serves this query");
            FetchOutcome::Unsupported
        } else {
            debug!(%query, attempted, "all sources exhausted");
            FetchOutcome::Exhausted
        }
    }
}
