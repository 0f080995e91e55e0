use futures_util::future::BoxFuture;
use reqwest::Client;
use thiserror::Error;

use medscan_types::SourceResult;

pub type SourceFuture<'a> = BoxFuture<'a, Result<Option<SourceResult>, SourceError>>;

/// One external drug-information provider.
///
/// `lookup` resolves to `Ok(None)` when the provider answered but knows
/// nothing about the queried name; that is a normal outcome, distinct from a
/// transport or schema failure.
pub trait DrugInfoSource: Send + Sync {
    fn id(&self) -> &'static str;

    /// Producer-assigned ranking constant in `0.0..=1.0`, attached to every
    /// result this source emits.
    fn confidence(&self) -> f32;

    fn lookup<'a>(&'a self, client: &'a Client, name: &'a str) -> SourceFuture<'a>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_id} request failed: {source}")]
    Http {
        source_id: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{source_id} returned status {status}")]
    Status {
        source_id: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{source_id} response could not be parsed: {message}")]
    Parse {
        source_id: &'static str,
        message: String,
    },
    #[error("{source_id} timed out after {timeout_ms} ms")]
    Timeout {
        source_id: &'static str,
        timeout_ms: u64,
    },
    #[error("failed to build {source_id} query url: {message}")]
    Url {
        source_id: &'static str,
        message: String,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}
