use std::collections::HashMap;

use rusty_tesseract::{Args, Image};
use tracing::debug;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::OcrObservation;

/// Tesseract-backed engine. Recognition runs through the system `tesseract`
/// binary; `warm_up` fails early when it is not installed.
#[derive(Debug, Default)]
pub struct TesseractOcrEngine;

impl TesseractOcrEngine {
    pub fn new() -> Self {
        Self
    }

    fn args_for(&self, request: &OcrRequest<'_>) -> Args {
        let settings = request.settings();
        Args {
            lang: "eng".into(),
            config_variables: HashMap::from([(
                "tessedit_char_whitelist".into(),
                settings.char_whitelist.clone(),
            )]),
            dpi: settings.dpi,
            psm: Some(request.page_mode().psm()),
            // LSTM-only engine mode; the legacy recognizer is markedly worse
            // on curved packaging text.
            oem: Some(1),
        }
    }
}

impl OcrEngine for TesseractOcrEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn warm_up(&self) -> Result<(), OcrError> {
        let version = rusty_tesseract::get_tesseract_version()
            .map_err(|err| OcrError::backend(err.to_string()))?;
        debug!(version = version.trim(), "tesseract available");
        Ok(())
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrObservation, OcrError> {
        let image = Image::from_path(request.path()).map_err(|err| OcrError::ImageLoad {
            path: request.path().to_path_buf(),
            message: err.to_string(),
        })?;
        let args = self.args_for(request);
        let output = rusty_tesseract::image_to_data(&image, &args)
            .map_err(|err| OcrError::backend(err.to_string()))?;

        let words: Vec<RecognizedWord> = output
            .data
            .iter()
            .filter(|record| !record.text.trim().is_empty())
            .map(|record| RecognizedWord {
                block: record.block_num,
                paragraph: record.par_num,
                line: record.line_num,
                confidence: record.conf,
                text: record.text.trim().to_string(),
            })
            .collect();

        let (text, confidence) = collate(&words);
        debug!(
            variant = request.variant().as_str(),
            confidence = f64::from(confidence),
            characters = text.len(),
            "tesseract pass complete"
        );
        Ok(OcrObservation::new(text, confidence))
    }
}

struct RecognizedWord {
    block: i32,
    paragraph: i32,
    line: i32,
    confidence: f32,
    text: String,
}

/// Rebuilds line structure from the word table and averages the positive
/// word confidences (tesseract reports -1 for structural rows).
fn collate(words: &[RecognizedWord]) -> (String, f32) {
    let mut text = String::new();
    let mut current_line: Option<(i32, i32, i32)> = None;
    let mut confidence_sum = 0.0f32;
    let mut confident_words = 0u32;

    for word in words {
        let line_key = (word.block, word.paragraph, word.line);
        match current_line {
            Some(previous) if previous == line_key => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_line = Some(line_key);
        text.push_str(&word.text);

        if word.confidence > 0.0 {
            confidence_sum += word.confidence;
            confident_words += 1;
        }
    }

    let confidence = if confident_words > 0 {
        confidence_sum / confident_words as f32
    } else {
        0.0
    };
    (text, confidence)
}
