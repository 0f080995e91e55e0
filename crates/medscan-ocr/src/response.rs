/// Raw recognition output for a single variant; the pipeline tags it with
/// the variant kind it came from.
#[derive(Debug, Clone)]
pub struct OcrObservation {
    pub text: String,
    /// Mean word confidence in `0.0..=100.0`.
    pub confidence: f32,
}

impl OcrObservation {
    pub fn new(text: String, confidence: f32) -> Self {
        Self {
            text,
            confidence: confidence.clamp(0.0, 100.0),
        }
    }

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
        }
    }
}
