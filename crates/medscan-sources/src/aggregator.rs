use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;
use tracing::{debug, warn};

use crate::adapters;
use crate::merge::{DEFAULT_SOURCE_PRIORITY, merge_results};
use crate::source::{DrugInfoSource, SourceError};
use medscan_types::{MergedMedicationInfo, SourceResult};

const USER_AGENT: &str = concat!("medscan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// A source exceeding this budget counts as failed for that call; it
    /// never delays the aggregate beyond the slowest in-budget source.
    pub per_source_timeout: Duration,
    /// Merge precedence, highest first.
    pub priority: Vec<String>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            per_source_timeout: Duration::from_secs(8),
            priority: DEFAULT_SOURCE_PRIORITY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Failure of one source during a lookup; diagnostic only, the aggregate
/// carries on with the sources that answered.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: SourceError,
}

#[derive(Debug)]
pub struct LookupOutcome {
    /// `None` when every source failed or none recognized the name; an
    /// expected outcome for unrecognized medications, not an error.
    pub merged: Option<MergedMedicationInfo>,
    pub failures: Vec<SourceFailure>,
}

/// Queries every configured source concurrently and reconciles the answers.
pub struct DrugInfoAggregator {
    client: Client,
    sources: Vec<Box<dyn DrugInfoSource>>,
    config: AggregatorConfig,
}

impl DrugInfoAggregator {
    /// Aggregator over the full default source set.
    pub fn new(config: AggregatorConfig) -> Result<Self, SourceError> {
        Self::with_sources(config, adapters::default_sources())
    }

    pub fn with_sources(
        config: AggregatorConfig,
        sources: Vec<Box<dyn DrugInfoSource>>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            client,
            sources,
            config,
        })
    }

    /// Dispatches all source lookups at once and waits until every one has
    /// settled (succeeded, failed, or timed out). One failing source never
    /// blocks or fails the lookup.
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        let timeout = self.config.per_source_timeout;
        let settled = join_all(self.sources.iter().map(|source| {
            let id = source.id();
            async move {
                match tokio::time::timeout(timeout, source.lookup(&self.client, name)).await {
                    Ok(outcome) => (id, outcome),
                    Err(_) => (
                        id,
                        Err(SourceError::Timeout {
                            source_id: id,
                            timeout_ms: timeout.as_millis() as u64,
                        }),
                    ),
                }
            }
        }))
        .await;

        let mut results: Vec<SourceResult> = Vec::new();
        let mut failures = Vec::new();
        for (id, outcome) in settled {
            match outcome {
                Ok(Some(result)) => results.push(result),
                Ok(None) => debug!(source = id, name, "source has no data"),
                Err(error) => {
                    warn!(source = id, name, error = %error, "source lookup failed");
                    failures.push(SourceFailure { source: id, error });
                }
            }
        }

        let merged = merge_results(name, results, &self.config.priority);
        LookupOutcome { merged, failures }
    }
}
