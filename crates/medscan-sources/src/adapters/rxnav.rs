use reqwest::{Client, Url};
use serde::Deserialize;

use super::{fetch_json, parse_base};
use crate::source::{DrugInfoSource, SourceError, SourceFuture};
use medscan_types::SourceResult;

const DEFAULT_BASE: &str = "https://rxnav.nlm.nih.gov/REST/drugs.json";

/// NLM RxNav drug-name registry. The authority for RxNorm concept
/// identifiers (rxcui) and a secondary source for brand names.
pub struct RxNavSource {
    base: Url,
}

impl RxNavSource {
    pub const SOURCE_ID: &'static str = "RxNav_NLM";
    pub const CONFIDENCE: f32 = 0.85;

    pub fn with_base(value: &str) -> Result<Self, SourceError> {
        Ok(Self {
            base: parse_base(Self::SOURCE_ID, value)?,
        })
    }

    fn query_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("name", name);
        url
    }
}

impl Default for RxNavSource {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("static endpoint url"),
        }
    }
}

impl DrugInfoSource for RxNavSource {
    fn id(&self) -> &'static str {
        Self::SOURCE_ID
    }

    fn confidence(&self) -> f32 {
        Self::CONFIDENCE
    }

    fn lookup<'a>(&'a self, client: &'a Client, name: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            let url = self.query_url(name);
            let envelope = fetch_json::<DrugGroupEnvelope>(client, Self::SOURCE_ID, url).await?;
            Ok(envelope.and_then(|envelope| parse(name, envelope)))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct DrugGroupEnvelope {
    #[serde(rename = "drugGroup", default)]
    drug_group: DrugGroup,
}

#[derive(Debug, Default, Deserialize)]
struct DrugGroup {
    #[serde(rename = "conceptGroup", default)]
    concept_groups: Vec<ConceptGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct ConceptGroup {
    #[serde(default)]
    tty: Option<String>,
    #[serde(rename = "conceptProperties", default)]
    concept_properties: Vec<ConceptProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct ConceptProperties {
    #[serde(default)]
    rxcui: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn parse(queried: &str, envelope: DrugGroupEnvelope) -> Option<SourceResult> {
    let mut result = SourceResult::new(RxNavSource::SOURCE_ID, queried, RxNavSource::CONFIDENCE);

    let mut fallback_rxcui: Option<String> = None;
    for group in &envelope.drug_group.concept_groups {
        let tty = group.tty.as_deref().unwrap_or_default();
        for concept in &group.concept_properties {
            if fallback_rxcui.is_none() {
                fallback_rxcui = concept.rxcui.clone().filter(|v| !v.is_empty());
            }
            match tty {
                // Ingredient concepts carry the canonical generic name and
                // the rxcui consumers expect.
                "IN" => {
                    if result.generic_name.is_none() {
                        result.generic_name =
                            concept.name.clone().filter(|v| !v.trim().is_empty());
                    }
                    if result.rxcui.is_none() {
                        result.rxcui = concept.rxcui.clone().filter(|v| !v.is_empty());
                    }
                }
                "BN" => {
                    if let Some(name) = concept.name.as_deref() {
                        let name = name.trim();
                        if !name.is_empty()
                            && !result.brand_names.iter().any(|b: &String| b == name)
                        {
                            result.brand_names.push(name.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if result.rxcui.is_none() {
        result.rxcui = fallback_rxcui;
    }
    if result.is_empty() { None } else { Some(result) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ingredient_and_brand_groups() {
        let envelope: DrugGroupEnvelope = serde_json::from_value(json!({
            "drugGroup": {
                "name": "aspirin",
                "conceptGroup": [
                    {
                        "tty": "IN",
                        "conceptProperties": [{"rxcui": "1191", "name": "aspirin", "tty": "IN"}]
                    },
                    {
                        "tty": "BN",
                        "conceptProperties": [
                            {"rxcui": "215568", "name": "Bufferin", "tty": "BN"},
                            {"rxcui": "215770", "name": "Ecotrin", "tty": "BN"}
                        ]
                    }
                ]
            }
        }))
        .unwrap();

        let result = parse("aspirin", envelope).unwrap();
        assert_eq!(result.rxcui.as_deref(), Some("1191"));
        assert_eq!(result.generic_name.as_deref(), Some("aspirin"));
        assert_eq!(result.brand_names, vec!["Bufferin", "Ecotrin"]);
    }

    #[test]
    fn falls_back_to_first_concept_rxcui() {
        let envelope: DrugGroupEnvelope = serde_json::from_value(json!({
            "drugGroup": {
                "conceptGroup": [{
                    "tty": "SBD",
                    "conceptProperties": [{"rxcui": "4815", "name": "aspirin 325 MG Oral Tablet"}]
                }]
            }
        }))
        .unwrap();

        let result = parse("aspirin", envelope).unwrap();
        assert_eq!(result.rxcui.as_deref(), Some("4815"));
    }

    #[test]
    fn unknown_names_parse_to_none() {
        let envelope: DrugGroupEnvelope =
            serde_json::from_value(json!({"drugGroup": {"name": "notreal"}})).unwrap();
        assert!(parse("notreal", envelope).is_none());
    }
}
