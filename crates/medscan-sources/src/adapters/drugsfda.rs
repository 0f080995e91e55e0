use reqwest::{Client, Url};
use serde::Deserialize;

use super::{fetch_json, parse_base};
use crate::source::{DrugInfoSource, SourceError, SourceFuture};
use medscan_types::SourceResult;

const DEFAULT_BASE: &str = "https://api.fda.gov/drug/drugsfda.json";

/// openFDA drug-approvals endpoint. Sparser than the label endpoint but
/// often the only source carrying dosage form and sponsor for older
/// products.
pub struct DrugsFdaSource {
    base: Url,
}

impl DrugsFdaSource {
    pub const SOURCE_ID: &'static str = "OpenFDA";
    pub const CONFIDENCE: f32 = 0.80;

    pub fn with_base(value: &str) -> Result<Self, SourceError> {
        Ok(Self {
            base: parse_base(Self::SOURCE_ID, value)?,
        })
    }

    fn query_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        let search = format!("products.brand_name:\"{name}\" openfda.generic_name:\"{name}\"");
        url.query_pairs_mut()
            .append_pair("search", &search)
            .append_pair("limit", "1");
        url
    }
}

impl Default for DrugsFdaSource {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("static endpoint url"),
        }
    }
}

impl DrugInfoSource for DrugsFdaSource {
    fn id(&self) -> &'static str {
        Self::SOURCE_ID
    }

    fn confidence(&self) -> f32 {
        Self::CONFIDENCE
    }

    fn lookup<'a>(&'a self, client: &'a Client, name: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            let url = self.query_url(name);
            let envelope = fetch_json::<ApprovalEnvelope>(client, Self::SOURCE_ID, url).await?;
            Ok(envelope.and_then(|envelope| parse(name, envelope)))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApprovalEnvelope {
    #[serde(default)]
    results: Vec<ApprovalRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct ApprovalRecord {
    #[serde(default)]
    sponsor_name: Option<String>,
    #[serde(default)]
    products: Vec<ApprovalProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct ApprovalProduct {
    #[serde(default)]
    brand_name: Option<String>,
    #[serde(default)]
    dosage_form: Option<String>,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    active_ingredients: Vec<ActiveIngredient>,
}

#[derive(Debug, Default, Deserialize)]
struct ActiveIngredient {
    #[serde(default)]
    name: Option<String>,
}

fn parse(queried: &str, envelope: ApprovalEnvelope) -> Option<SourceResult> {
    let record = envelope.results.into_iter().next()?;
    let mut result = SourceResult::new(DrugsFdaSource::SOURCE_ID, queried, DrugsFdaSource::CONFIDENCE);
    result.manufacturer = record.sponsor_name.filter(|name| !name.trim().is_empty());

    let mut brand_names = Vec::new();
    for product in &record.products {
        if let Some(brand) = product.brand_name.as_deref() {
            let brand = brand.trim();
            if !brand.is_empty() && !brand_names.iter().any(|b: &String| b == brand) {
                brand_names.push(brand.to_string());
            }
        }
    }
    result.brand_names = brand_names;

    if let Some(product) = record.products.first() {
        result.dosage_form = product.dosage_form.clone().filter(|v| !v.trim().is_empty());
        result.route = product.route.clone().filter(|v| !v.trim().is_empty());
        result.generic_name = product
            .active_ingredients
            .first()
            .and_then(|ingredient| ingredient.name.clone())
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.to_lowercase());
    }

    if result.is_empty() { None } else { Some(result) }
}
