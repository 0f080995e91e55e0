//! Image-variant production for medication-label OCR.
//!
//! One input photo becomes a fixed ordered set of differently-filtered
//! grayscale renderings, written to a scan-owned transient directory for the
//! OCR step to consume. The directory and every variant file are removed when
//! the set is dropped, on success and failure paths alike.

mod filters;
mod variant;

pub use filters::{FilterError, render};
pub use variant::{PreprocessConfig, PreprocessError, VariantImage, VariantSet};
