use std::path::PathBuf;
use std::sync::Arc;

use image::{GrayImage, Luma};

use medscan::scanner::Scanner;
use medscan::settings::EffectiveSettings;
use medscan_ocr::{OcrEngine, OcrError, OcrObservation, OcrRequest};
use medscan_sources::{
    AggregatorConfig, Client, DrugInfoAggregator, DrugInfoSource, SourceFuture,
};
use medscan_types::{ScanReport, SourceResult};

struct StubEngine {
    text: &'static str,
    confidence: f32,
}

impl OcrEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrObservation, OcrError> {
        Ok(OcrObservation::new(self.text.to_string(), self.confidence))
    }
}

struct FixedSource {
    id: &'static str,
    answers_to: &'static str,
    result: SourceResult,
}

impl DrugInfoSource for FixedSource {
    fn id(&self) -> &'static str {
        self.id
    }

    fn confidence(&self) -> f32 {
        self.result.confidence
    }

    fn lookup<'a>(&'a self, _client: &'a Client, name: &'a str) -> SourceFuture<'a> {
        let hit = name == self.answers_to;
        Box::pin(async move {
            if hit {
                Ok(Some(self.result.clone()))
            } else {
                Ok(None)
            }
        })
    }
}

fn fda_aspirin() -> Box<dyn DrugInfoSource> {
    let mut result = SourceResult::new("FDA", "aspirin", 0.95);
    result.generic_name = Some("aspirin".into());
    result.brand_names = vec!["Bayer Aspirin".into(), "Bufferin".into()];
    Box::new(FixedSource {
        id: "FDA",
        answers_to: "aspirin",
        result,
    })
}

fn rxnav_aspirin() -> Box<dyn DrugInfoSource> {
    let mut result = SourceResult::new("RxNav_NLM", "aspirin", 0.85);
    result.rxcui = Some("1191".into());
    result.brand_names = vec!["Ecotrin".into()];
    Box::new(FixedSource {
        id: "RxNav_NLM",
        answers_to: "aspirin",
        result,
    })
}

fn amoxicillin_source() -> Box<dyn DrugInfoSource> {
    let mut result = SourceResult::new("FDA", "amoxicillin", 0.95);
    result.generic_name = Some("amoxicillin".into());
    Box::new(FixedSource {
        id: "FDA",
        answers_to: "amoxicillin",
        result,
    })
}

fn scanner_with(
    engine: StubEngine,
    sources: Vec<Box<dyn DrugInfoSource>>,
) -> Scanner {
    let settings = EffectiveSettings::default();
    let aggregator =
        DrugInfoAggregator::with_sources(AggregatorConfig::default(), sources).unwrap();
    Scanner::with_components(Arc::new(engine), aggregator, &settings)
}

fn sample_image() -> PathBuf {
    let image = GrayImage::from_fn(32, 24, |x, y| Luma([((x * 7 + y * 11) % 256) as u8]));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("label.png");
    image.save(&path).unwrap();
    // Keep the directory alive for the duration of the test process.
    std::mem::forget(dir);
    path
}

#[tokio::test]
async fn label_text_resolves_to_a_merged_record() {
    let scanner = scanner_with(
        StubEngine {
            text: "ASPIRIN 325mg tablets",
            confidence: 88.0,
        },
        vec![fda_aspirin(), rxnav_aspirin()],
    );

    let report = scanner.scan(&sample_image()).await.unwrap();
    match report {
        ScanReport::Found {
            candidate,
            strength,
            info,
            ocr,
            ..
        } => {
            assert!(candidate.eq_ignore_ascii_case("aspirin"));
            assert_eq!(strength.as_deref(), Some("325mg"));
            assert_eq!(info.sources, vec!["FDA".to_string(), "RxNav_NLM".to_string()]);
            assert_eq!(info.brand_names, vec!["Bayer Aspirin", "Bufferin"]);
            assert_eq!(info.rxcui.as_deref(), Some("1191"));
            assert_eq!(ocr.len(), 6);
        }
        other => panic!("expected a found report, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_label_reports_no_readable_text() {
    let scanner = scanner_with(
        StubEngine {
            text: "",
            confidence: 0.0,
        },
        vec![fda_aspirin()],
    );

    let report = scanner.scan(&sample_image()).await.unwrap();
    assert!(matches!(report, ScanReport::NoReadableText { .. }));
}

#[tokio::test]
async fn misread_name_is_corrected_before_lookup() {
    let scanner = scanner_with(
        StubEngine {
            text: "Amoriedlin 500 mg capsules",
            confidence: 74.0,
        },
        vec![amoxicillin_source()],
    );

    let report = scanner.scan(&sample_image()).await.unwrap();
    match report {
        ScanReport::Found {
            candidate,
            corrected_from,
            info,
            ..
        } => {
            assert_eq!(candidate, "amoxicillin");
            assert_eq!(corrected_from.as_deref(), Some("Amoriedlin"));
            assert_eq!(info.sources, vec!["FDA".to_string()]);
        }
        other => panic!("expected a found report, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_candidate_reports_no_medication_info() {
    let scanner = scanner_with(
        StubEngine {
            text: "Blorptex 10 mg once daily",
            confidence: 60.0,
        },
        vec![fda_aspirin()],
    );

    let report = scanner.scan(&sample_image()).await.unwrap();
    match report {
        ScanReport::NoMedicationInfo { candidate, .. } => {
            assert_eq!(candidate.as_deref(), Some("Blorptex"));
        }
        other => panic!("expected a no-information report, got {other:?}"),
    }
}
