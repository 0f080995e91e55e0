use reqwest::{Client, Url};
use serde::Deserialize;

use super::{fetch_json, parse_base};
use crate::source::{DrugInfoSource, SourceError, SourceFuture};
use medscan_types::SourceResult;

const DEFAULT_BASE: &str = "https://connect.medlineplus.gov/service";
const RXNORM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.88";

/// NIH MedlinePlus Connect. Returns consumer-health topics; the first
/// topic's summary becomes the plain-language "used for" text.
pub struct MedlinePlusSource {
    base: Url,
}

impl MedlinePlusSource {
    pub const SOURCE_ID: &'static str = "NIH_MedlinePlus";
    pub const CONFIDENCE: f32 = 0.90;

    pub fn with_base(value: &str) -> Result<Self, SourceError> {
        Ok(Self {
            base: parse_base(Self::SOURCE_ID, value)?,
        })
    }

    fn query_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("mainSearchCriteria.v.cs", RXNORM_CODE_SYSTEM)
            .append_pair("mainSearchCriteria.v.dn", name)
            .append_pair("knowledgeResponseType", "application/json");
        url
    }
}

impl Default for MedlinePlusSource {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("static endpoint url"),
        }
    }
}

impl DrugInfoSource for MedlinePlusSource {
    fn id(&self) -> &'static str {
        Self::SOURCE_ID
    }

    fn confidence(&self) -> f32 {
        Self::CONFIDENCE
    }

    fn lookup<'a>(&'a self, client: &'a Client, name: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            let url = self.query_url(name);
            let envelope = fetch_json::<ConnectEnvelope>(client, Self::SOURCE_ID, url).await?;
            Ok(envelope.and_then(|envelope| parse(name, envelope)))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConnectEnvelope {
    #[serde(default)]
    feed: ConnectFeed,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectFeed {
    #[serde(default)]
    entry: Vec<ConnectEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectEntry {
    #[serde(default)]
    title: AtomText,
    #[serde(default)]
    summary: AtomText,
}

#[derive(Debug, Default, Deserialize)]
struct AtomText {
    #[serde(rename = "_value", default)]
    value: String,
}

fn parse(queried: &str, envelope: ConnectEnvelope) -> Option<SourceResult> {
    let entry = envelope.feed.entry.into_iter().next()?;
    let mut result =
        SourceResult::new(MedlinePlusSource::SOURCE_ID, queried, MedlinePlusSource::CONFIDENCE);

    let title = entry.title.value.trim();
    if !title.is_empty() && !title.eq_ignore_ascii_case(queried) {
        result.generic_name = Some(title.to_string());
    }
    let summary = strip_markup(&entry.summary.value);
    if !summary.is_empty() {
        result.used_for = Some(summary);
    }

    if result.is_empty() { None } else { Some(result) }
}

/// Connect summaries arrive as HTML fragments; keep the prose only.
fn strip_markup(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_the_first_topic() {
        let envelope: ConnectEnvelope = serde_json::from_value(json!({
            "feed": {
                "entry": [{
                    "title": {"_value": "Aspirin"},
                    "summary": {"_value": "<p>Aspirin is used to relieve <b>mild pain</b>.</p>"}
                }]
            }
        }))
        .unwrap();

        let result = parse("aspirin", envelope).unwrap();
        assert_eq!(result.source, "NIH_MedlinePlus");
        assert_eq!(
            result.used_for.as_deref(),
            Some("Aspirin is used to relieve mild pain.")
        );
        // Title matching the query adds nothing.
        assert!(result.generic_name.is_none());
    }

    #[test]
    fn empty_feed_parses_to_none() {
        let envelope: ConnectEnvelope = serde_json::from_value(json!({"feed": {}})).unwrap();
        assert!(parse("aspirin", envelope).is_none());
    }

    #[test]
    fn strip_markup_flattens_tags_and_whitespace() {
        assert_eq!(
            strip_markup("<p>line one</p>\n<p>line  two</p>"),
            "line one line two"
        );
        assert_eq!(strip_markup("plain"), "plain");
    }
}
