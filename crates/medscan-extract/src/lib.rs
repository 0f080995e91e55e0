//! Text side of the scan pipeline: transcription selection, OCR-artifact
//! cleanup, medication-name candidate extraction, and misread correction.

mod candidates;
mod correct;
mod normalize;
mod select;
mod vocab;

pub use candidates::{CandidateExtractor, ExtractorConfig};
pub use correct::correct;
pub use normalize::normalize;
pub use select::{SelectorConfig, VARIANT_SEPARATOR, combine_texts, select_best};
pub use vocab::{is_known_medication, is_stop_word};
