use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::task;
use tracing::{debug, warn};

use crate::cli::OcrBackendChoice;
use crate::settings::EffectiveSettings;
use medscan_extract::{
    CandidateExtractor, SelectorConfig, combine_texts, correct, normalize, select_best,
};
use medscan_ocr::{
    NoopOcrEngine, OcrEngine, OcrError, OcrRequest, RecognitionSettings, TesseractOcrEngine,
};
use medscan_preprocess::{PreprocessConfig, PreprocessError, VariantSet};
use medscan_sources::{DrugInfoAggregator, SourceError};
use medscan_types::{OcrOutcome, ScanReport, VariantSummary};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error("failed to initialize OCR engine: {0}")]
    Engine(#[from] OcrError),
    #[error("failed to initialize source lookups: {0}")]
    Sources(#[from] SourceError),
    #[error("scan worker failed: {message}")]
    Worker { message: String },
}

/// Runs the whole pipeline for one image: variants, OCR, selection,
/// extraction, correction, source lookup.
pub struct Scanner {
    engine: Arc<dyn OcrEngine>,
    extractor: CandidateExtractor,
    aggregator: DrugInfoAggregator,
    selector: SelectorConfig,
    recognition: RecognitionSettings,
    preprocess: PreprocessConfig,
    combined_text: bool,
    dump_dir: Option<PathBuf>,
}

impl Scanner {
    pub fn from_settings(settings: &EffectiveSettings) -> Result<Self, ScanError> {
        let engine = build_ocr_engine(settings.ocr_backend)?;
        let aggregator = DrugInfoAggregator::new(settings.aggregator.clone())?;
        Ok(Self::with_components(engine, aggregator, settings))
    }

    /// Seam for tests and embedders: bring your own engine and aggregator.
    pub fn with_components(
        engine: Arc<dyn OcrEngine>,
        aggregator: DrugInfoAggregator,
        settings: &EffectiveSettings,
    ) -> Self {
        Self {
            engine,
            extractor: CandidateExtractor::new(settings.extractor),
            aggregator,
            selector: settings.selector,
            recognition: settings.recognition.clone(),
            preprocess: settings.preprocess,
            combined_text: settings.combined_text,
            dump_dir: settings.dump_dir.clone(),
        }
    }

    pub async fn scan(&self, path: &Path) -> Result<ScanReport, ScanError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let outcomes = self.run_ocr(bytes).await?;
        let summaries: Vec<VariantSummary> =
            outcomes.iter().map(VariantSummary::from_outcome).collect();

        let selected = if self.combined_text {
            combine_texts(&outcomes)
        } else {
            select_best(&outcomes, &self.selector)
                .map(|outcome| outcome.text.clone())
                .unwrap_or_default()
        };
        if selected.trim().is_empty() {
            return Ok(ScanReport::NoReadableText { ocr: summaries });
        }

        let normalized = normalize(&selected);
        let candidates = self.extractor.extract(&normalized);
        debug!(count = candidates.len(), "candidates extracted");
        let Some(best) = candidates.into_iter().next() else {
            return Ok(ScanReport::NoMedicationInfo {
                candidate: None,
                ocr: summaries,
            });
        };

        let corrected = correct(&best.name).to_string();
        let corrected_from =
            (!corrected.eq_ignore_ascii_case(&best.name)).then(|| best.name.clone());
        let query = corrected.to_ascii_lowercase();

        let lookup = self.aggregator.lookup(&query).await;
        match lookup.merged {
            Some(info) => Ok(ScanReport::Found {
                candidate: corrected,
                strength: best.strength,
                frequency: best.frequency,
                corrected_from,
                info,
                ocr: summaries,
            }),
            None => Ok(ScanReport::NoMedicationInfo {
                candidate: Some(corrected),
                ocr: summaries,
            }),
        }
    }

    /// Variant rendering and OCR are blocking; both run on the blocking pool
    /// so concurrent scans never stall the runtime. The variant set is
    /// dropped inside the worker, which removes its transient files on every
    /// exit path.
    async fn run_ocr(&self, bytes: Vec<u8>) -> Result<Vec<OcrOutcome>, ScanError> {
        let engine = Arc::clone(&self.engine);
        let recognition = self.recognition.clone();
        let preprocess = self.preprocess;
        let dump_dir = self.dump_dir.clone();

        task::spawn_blocking(move || -> Result<Vec<OcrOutcome>, ScanError> {
            let variants = VariantSet::produce(&bytes, &preprocess)?;
            if let Some(dir) = dump_dir.as_deref() {
                if let Err(err) = variants.persist_to(dir) {
                    warn!(error = %err, "failed to persist variants for inspection");
                }
            }

            let mut outcomes = Vec::with_capacity(variants.variants().len());
            for variant in variants.variants() {
                let request = OcrRequest::new(variant.path(), variant.kind(), &recognition);
                let outcome = match engine.recognize(&request) {
                    Ok(observation) => {
                        OcrOutcome::new(variant.kind(), observation.text, observation.confidence)
                    }
                    Err(err) => {
                        warn!(variant = variant.kind().as_str(), error = %err, "ocr pass failed");
                        OcrOutcome::empty(variant.kind())
                    }
                };
                outcomes.push(outcome);
            }
            Ok(outcomes)
        })
        .await
        .map_err(|err| ScanError::Worker {
            message: err.to_string(),
        })?
    }
}

fn build_ocr_engine(choice: OcrBackendChoice) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match choice {
        OcrBackendChoice::Tesseract => build_tesseract_engine(),
        OcrBackendChoice::Noop => build_noop_engine(),
        OcrBackendChoice::Auto => match build_tesseract_engine() {
            Ok(engine) => Ok(engine),
            Err(err) => {
                warn!(error = %err, "tesseract unavailable, falling back to noop engine");
                build_noop_engine()
            }
        },
    }
}

fn build_tesseract_engine() -> Result<Arc<dyn OcrEngine>, OcrError> {
    let engine = TesseractOcrEngine::new();
    engine.warm_up()?;
    Ok(Arc::new(engine))
}

fn build_noop_engine() -> Result<Arc<dyn OcrEngine>, OcrError> {
    let engine = NoopOcrEngine;
    engine.warm_up()?;
    Ok(Arc::new(engine))
}
