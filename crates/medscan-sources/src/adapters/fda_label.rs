use reqwest::{Client, Url};
use serde::Deserialize;

use super::{fetch_json, first_entry, parse_base};
use crate::source::{DrugInfoSource, SourceError, SourceFuture};
use medscan_types::SourceResult;

const DEFAULT_BASE: &str = "https://api.fda.gov/drug/label.json";

/// openFDA structured product label endpoint. Richest of the configured
/// sources: usage, adverse reactions, and warnings all come from here when
/// the label exists.
pub struct FdaLabelSource {
    base: Url,
}

impl FdaLabelSource {
    pub const SOURCE_ID: &'static str = "FDA";
    pub const CONFIDENCE: f32 = 0.95;

    pub fn with_base(value: &str) -> Result<Self, SourceError> {
        Ok(Self {
            base: parse_base(Self::SOURCE_ID, value)?,
        })
    }

    fn query_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        let search = format!("openfda.generic_name:\"{name}\" openfda.brand_name:\"{name}\"");
        url.query_pairs_mut()
            .append_pair("search", &search)
            .append_pair("limit", "1");
        url
    }
}

impl Default for FdaLabelSource {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("static endpoint url"),
        }
    }
}

impl DrugInfoSource for FdaLabelSource {
    fn id(&self) -> &'static str {
        Self::SOURCE_ID
    }

    fn confidence(&self) -> f32 {
        Self::CONFIDENCE
    }

    fn lookup<'a>(&'a self, client: &'a Client, name: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            let url = self.query_url(name);
            let envelope = fetch_json::<LabelEnvelope>(client, Self::SOURCE_ID, url).await?;
            Ok(envelope.and_then(|envelope| parse(name, envelope)))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct LabelEnvelope {
    #[serde(default)]
    results: Vec<LabelRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelRecord {
    #[serde(default)]
    openfda: OpenFdaFields,
    #[serde(default)]
    indications_and_usage: Vec<String>,
    #[serde(default)]
    adverse_reactions: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFdaFields {
    #[serde(default)]
    generic_name: Vec<String>,
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    manufacturer_name: Vec<String>,
    #[serde(default)]
    route: Vec<String>,
    #[serde(default)]
    rxcui: Vec<String>,
}

fn parse(queried: &str, envelope: LabelEnvelope) -> Option<SourceResult> {
    let record = envelope.results.into_iter().next()?;
    let mut result = SourceResult::new(FdaLabelSource::SOURCE_ID, queried, FdaLabelSource::CONFIDENCE);
    result.generic_name = first_entry(&record.openfda.generic_name);
    result.brand_names = record
        .openfda
        .brand_name
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    result.manufacturer = first_entry(&record.openfda.manufacturer_name);
    result.route = first_entry(&record.openfda.route);
    result.rxcui = first_entry(&record.openfda.rxcui);
    result.used_for = first_entry(&record.indications_and_usage);
    result.side_effects = first_entry(&record.adverse_reactions);
    result.warnings = first_entry(&record.warnings);
    if result.is_empty() { None } else { Some(result) }
}
