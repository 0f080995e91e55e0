mod backends;
mod engine;
mod error;
mod request;
mod response;

pub use backends::tesseract::TesseractOcrEngine;
pub use engine::{NoopOcrEngine, OcrEngine};
pub use error::OcrError;
pub use request::{OcrRequest, PageMode, RecognitionSettings};
pub use response::OcrObservation;
