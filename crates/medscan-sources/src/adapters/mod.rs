//! One adapter per external provider. Each adapter owns its endpoint URL and
//! the parsing of that provider's response schema, so schema drift stays out
//! of the aggregation and merge logic.

mod drugsfda;
mod fda_label;
mod medlineplus;
mod rxnav;

pub use drugsfda::DrugsFdaSource;
pub use fda_label::FdaLabelSource;
pub use medlineplus::MedlinePlusSource;
pub use rxnav::RxNavSource;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::source::{DrugInfoSource, SourceError};

/// Full default source set, in no particular order; ranking happens at merge
/// time through the configured priority list.
pub fn default_sources() -> Vec<Box<dyn DrugInfoSource>> {
    vec![
        Box::new(FdaLabelSource::default()),
        Box::new(MedlinePlusSource::default()),
        Box::new(RxNavSource::default()),
        Box::new(DrugsFdaSource::default()),
    ]
}

/// Issues one GET and decodes the JSON body. A 404 means the provider does
/// not know the queried name and maps to `Ok(None)`; every other non-success
/// status is a source failure.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    source_id: &'static str,
    url: Url,
) -> Result<Option<T>, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SourceError::Http { source_id, source })?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(SourceError::Status {
            source_id,
            status: response.status(),
        });
    }

    let decoded = response
        .json::<T>()
        .await
        .map_err(|err| SourceError::Parse {
            source_id,
            message: err.to_string(),
        })?;
    Ok(Some(decoded))
}

/// First non-blank entry of a repeated-string field, trimmed.
pub(crate) fn first_entry(values: &[String]) -> Option<String> {
    values
        .iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(|value| value.to_string())
}

pub(crate) fn parse_base(source_id: &'static str, value: &str) -> Result<Url, SourceError> {
    Url::parse(value).map_err(|err| SourceError::Url {
        source_id,
        message: err.to_string(),
    })
}
