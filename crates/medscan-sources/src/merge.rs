use medscan_types::{MergedMedicationInfo, SourceResult};

/// Default merge precedence; unknown source identifiers sort after every
/// listed one. Deployments can override the order through configuration.
pub const DEFAULT_SOURCE_PRIORITY: &[&str] = &["FDA", "NIH_MedlinePlus", "RxNav_NLM", "OpenFDA"];

/// Reconciles the successful source answers into one record.
///
/// Results are ranked by the priority list, the merged record is seeded from
/// the highest-ranked result, and every still-empty field is filled by the
/// first later result that has a value. A filled field is never overwritten.
/// Every merged source is recorded in the order it was folded in. Returns
/// `None` when there is nothing to merge.
pub fn merge_results(
    name: &str,
    mut results: Vec<SourceResult>,
    priority: &[String],
) -> Option<MergedMedicationInfo> {
    results.retain(|result| !result.is_empty());
    if results.is_empty() {
        return None;
    }
    // Stable sort: sources sharing a rank keep their arrival order.
    results.sort_by_key(|result| priority_rank(&result.source, priority));

    let mut merged = MergedMedicationInfo::new(name);
    for result in results {
        fill(&mut merged.generic_name, result.generic_name);
        fill(&mut merged.manufacturer, result.manufacturer);
        fill(&mut merged.dosage_form, result.dosage_form);
        fill(&mut merged.route, result.route);
        fill(&mut merged.used_for, result.used_for);
        fill(&mut merged.side_effects, result.side_effects);
        fill(&mut merged.warnings, result.warnings);
        fill(&mut merged.rxcui, result.rxcui);
        if merged.brand_names.is_empty() && !result.brand_names.is_empty() {
            merged.brand_names = result.brand_names;
        }
        if !merged.sources.contains(&result.source) {
            merged.sources.push(result.source);
        }
    }
    Some(merged)
}

fn priority_rank(source: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|entry| entry == source)
        .unwrap_or(priority.len())
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }
}
