use std::path::Path;

use medscan_types::VariantKind;

/// Characters that appear on medication labels; everything else is noise the
/// recognizer is told not to emit.
pub const DEFAULT_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 ()-.,/:";

/// Page-segmentation hint forwarded to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Auto,
    SingleBlock,
}

impl PageMode {
    /// Box-style variants render one tight text block; the rest keep full
    /// automatic segmentation.
    pub fn for_variant(kind: VariantKind) -> Self {
        match kind {
            VariantKind::BoxOptimized | VariantKind::TextFocused => PageMode::SingleBlock,
            _ => PageMode::Auto,
        }
    }

    pub fn psm(self) -> i32 {
        match self {
            PageMode::Auto => 3,
            PageMode::SingleBlock => 6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    pub char_whitelist: String,
    pub dpi: Option<i32>,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            dpi: Some(300),
        }
    }
}

/// OCR invocation metadata for one rendered variant.
#[derive(Debug)]
pub struct OcrRequest<'a> {
    path: &'a Path,
    variant: VariantKind,
    settings: &'a RecognitionSettings,
}

impl<'a> OcrRequest<'a> {
    pub fn new(path: &'a Path, variant: VariantKind, settings: &'a RecognitionSettings) -> Self {
        Self {
            path,
            variant,
            settings,
        }
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    pub fn variant(&self) -> VariantKind {
        self.variant
    }

    pub fn settings(&self) -> &'a RecognitionSettings {
        self.settings
    }

    pub fn page_mode(&self) -> PageMode {
        PageMode::for_variant(self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_variants_use_single_block_segmentation() {
        assert_eq!(PageMode::for_variant(VariantKind::BoxOptimized), PageMode::SingleBlock);
        assert_eq!(PageMode::for_variant(VariantKind::TextFocused), PageMode::SingleBlock);
        assert_eq!(PageMode::for_variant(VariantKind::Enhanced), PageMode::Auto);
        assert_eq!(PageMode::for_variant(VariantKind::Denoise), PageMode::Auto);
    }

    #[test]
    fn default_whitelist_keeps_label_punctuation() {
        let settings = RecognitionSettings::default();
        for expected in ['(', ')', '-', '.', ',', '/', ':', ' '] {
            assert!(settings.char_whitelist.contains(expected), "missing {expected:?}");
        }
    }
}
