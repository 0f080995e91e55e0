use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use tempfile::TempDir;
use tracing::warn;

use crate::filters;
use medscan_types::VariantKind;

/// Tuning knobs for the variant filter chains. Defaults match the values the
/// chains were calibrated with; they rarely need changing per deployment.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    pub gamma: f32,
    pub contrast_boost: f32,
    pub threshold: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            gamma: 1.4,
            contrast_boost: 1.3,
            threshold: 150,
        }
    }
}

/// One rendered variant, backed by a PNG inside the owning set's directory.
#[derive(Debug)]
pub struct VariantImage {
    kind: VariantKind,
    path: PathBuf,
    width: u32,
    height: u32,
}

impl VariantImage {
    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The full variant set for one scan request. Owns the transient directory
/// holding every rendered file; dropping the set removes them all.
#[derive(Debug)]
pub struct VariantSet {
    dir: TempDir,
    variants: Vec<VariantImage>,
}

impl VariantSet {
    /// Decodes the input bytes and renders the fixed variant set.
    ///
    /// A variant whose filter chain or file write fails is skipped; the scan
    /// fails here only when the input cannot be decoded or no variant at all
    /// could be produced.
    pub fn produce(input: &[u8], config: &PreprocessConfig) -> Result<Self, PreprocessError> {
        let decoded = image::load_from_memory(input).map_err(PreprocessError::Decode)?;
        Self::from_image(&decoded.to_luma8(), config)
    }

    pub fn from_image(gray: &GrayImage, config: &PreprocessConfig) -> Result<Self, PreprocessError> {
        let dir = tempfile::tempdir().map_err(PreprocessError::Workspace)?;
        let mut variants = Vec::with_capacity(VariantKind::ALL.len());

        for kind in VariantKind::ALL {
            let rendered = match filters::render(kind, gray, config) {
                Ok(rendered) => rendered,
                Err(err) => {
                    warn!(variant = kind.as_str(), error = %err, "variant filter failed, skipping");
                    continue;
                }
            };
            let path = dir.path().join(format!("{}.png", kind.as_str()));
            if let Err(err) = rendered.save(&path) {
                warn!(variant = kind.as_str(), error = %err, "variant write failed, skipping");
                continue;
            }
            variants.push(VariantImage {
                kind,
                path,
                width: rendered.width(),
                height: rendered.height(),
            });
        }

        if variants.is_empty() {
            return Err(PreprocessError::NoVariants);
        }
        Ok(Self { dir, variants })
    }

    /// Variants in production order.
    pub fn variants(&self) -> &[VariantImage] {
        &self.variants
    }

    pub fn workspace_path(&self) -> &Path {
        self.dir.path()
    }

    /// Copies every rendered variant into `target` for offline inspection.
    pub fn persist_to(&self, target: &Path) -> std::io::Result<()> {
        fs::create_dir_all(target)?;
        for variant in &self.variants {
            let file_name = format!("{}.png", variant.kind.as_str());
            fs::copy(&variant.path, target.join(file_name))?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("failed to decode input image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to prepare variant workspace: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("no image variant could be produced")]
    NoVariants,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn sample() -> GrayImage {
        GrayImage::from_fn(24, 18, |x, y| Luma([((x * 9 + y * 5) % 256) as u8]))
    }

    #[test]
    fn produces_all_variants_in_fixed_order() {
        let set = VariantSet::from_image(&sample(), &PreprocessConfig::default()).unwrap();
        let kinds: Vec<VariantKind> = set.variants().iter().map(|v| v.kind()).collect();
        assert_eq!(kinds, VariantKind::ALL);
        for variant in set.variants() {
            assert!(variant.path().exists(), "{} missing", variant.kind().as_str());
        }
    }

    #[test]
    fn rejects_undecodable_input() {
        let result = VariantSet::produce(b"not an image", &PreprocessConfig::default());
        assert!(matches!(result, Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn drop_removes_transient_files() {
        let set = VariantSet::from_image(&sample(), &PreprocessConfig::default()).unwrap();
        let workspace = set.workspace_path().to_path_buf();
        let first = set.variants()[0].path().to_path_buf();
        drop(set);
        assert!(!first.exists());
        assert!(!workspace.exists());
    }

    #[test]
    fn persist_copies_variants_out_of_the_workspace() {
        let set = VariantSet::from_image(&sample(), &PreprocessConfig::default()).unwrap();
        let target = tempfile::tempdir().unwrap();
        set.persist_to(target.path()).unwrap();
        assert!(target.path().join("enhanced.png").exists());
        assert!(target.path().join("box-optimized.png").exists());
    }
}
