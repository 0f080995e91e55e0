use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::OcrObservation;

/// Common interface for all OCR engines.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn warm_up(&self) -> Result<(), OcrError> {
        Ok(())
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrObservation, OcrError>;
}

/// Placeholder engine used for wiring and tests; recognizes nothing.
#[derive(Debug, Default)]
pub struct NoopOcrEngine;

impl OcrEngine for NoopOcrEngine {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrObservation, OcrError> {
        Ok(OcrObservation::empty())
    }
}
