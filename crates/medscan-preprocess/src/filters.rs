use image::GrayImage;
use image::imageops;

use crate::variant::PreprocessConfig;
use medscan_types::VariantKind;

const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Applies the filter chain for one variant kind to the grayscale input.
///
/// Chains are tuned per packaging condition: `BoxOptimized` targets dark text
/// on bright boxes, `TextFocused` targets dense leaflet-style blocks.
pub fn render(
    kind: VariantKind,
    source: &GrayImage,
    config: &PreprocessConfig,
) -> Result<GrayImage, FilterError> {
    if source.width() == 0 || source.height() == 0 {
        return Err(FilterError::EmptyImage);
    }

    let rendered = match kind {
        VariantKind::Enhanced => gamma(&sharpen(&normalize(source)), config.gamma),
        VariantKind::Contrast => sharpen(&linear_contrast(&normalize(source), config.contrast_boost)),
        VariantKind::Denoise => sharpen(&normalize(&median3(source))),
        VariantKind::Sharpen => unsharp(source),
        VariantKind::BoxOptimized => sharpen(&negate(&threshold(source, config.threshold))),
        VariantKind::TextFocused => {
            median3(&sharpen(&linear_contrast(&normalize(source), config.contrast_boost)))
        }
    };
    Ok(rendered)
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("input image has zero width or height")]
    EmptyImage,
}

/// Contrast stretch: maps the observed min..max range onto 0..255.
fn normalize(image: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in image.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if max <= min {
        return image.clone();
    }
    let range = (max - min) as f32;
    map_pixels(image, |v| {
        let stretched = (v as f32 - min as f32) * 255.0 / range;
        stretched.round().clamp(0.0, 255.0) as u8
    })
}

fn linear_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    map_pixels(image, |v| {
        let adjusted = (v as f32 - 128.0) * factor + 128.0;
        adjusted.round().clamp(0.0, 255.0) as u8
    })
}

fn gamma(image: &GrayImage, value: f32) -> GrayImage {
    let exponent = 1.0 / value.max(0.05);
    map_pixels(image, |v| {
        let corrected = (v as f32 / 255.0).powf(exponent) * 255.0;
        corrected.round().clamp(0.0, 255.0) as u8
    })
}

fn sharpen(image: &GrayImage) -> GrayImage {
    imageops::filter3x3(image, &SHARPEN_KERNEL)
}

fn unsharp(image: &GrayImage) -> GrayImage {
    imageops::unsharpen(image, 1.2, 4)
}

fn threshold(image: &GrayImage, cutoff: u8) -> GrayImage {
    map_pixels(image, |v| if v >= cutoff { 255 } else { 0 })
}

fn negate(image: &GrayImage) -> GrayImage {
    map_pixels(image, |v| 255 - v)
}

/// 3x3 median with clamped edges; removes salt-and-pepper speckle without
/// smearing glyph edges the way a box blur would.
fn median3(image: &GrayImage) -> GrayImage {
    let width = image.width();
    let height = image.height();
    let mut out = GrayImage::new(width, height);
    let mut window = [0u8; 9];
    for y in 0..height {
        for x in 0..width {
            let mut idx = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window[idx] = image.get_pixel(sx, sy)[0];
                    idx += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, image::Luma([window[4]]));
        }
    }
    out
}

fn map_pixels(image: &GrayImage, op: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = op(pixel[0]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32, lo: u8, hi: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            let span = (hi - lo) as u32;
            Luma([lo + (x * span / width.max(1)) as u8])
        })
    }

    #[test]
    fn normalize_stretches_to_full_range() {
        let image = gradient(16, 4, 100, 150);
        let stretched = normalize(&image);
        let values: Vec<u8> = stretched.pixels().map(|p| p[0]).collect();
        assert_eq!(values.iter().copied().min(), Some(0));
        assert_eq!(values.iter().copied().max(), Some(255));
    }

    #[test]
    fn normalize_leaves_flat_image_alone() {
        let image = GrayImage::from_pixel(8, 8, Luma([77]));
        let stretched = normalize(&image);
        assert!(stretched.pixels().all(|p| p[0] == 77));
    }

    #[test]
    fn threshold_and_negate_invert_bright_background() {
        let image = GrayImage::from_fn(4, 1, |x, _| Luma(if x < 2 { [20] } else { [240] }));
        let binary = negate(&threshold(&image, 128));
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(3, 0)[0], 0);
    }

    #[test]
    fn median_removes_isolated_speckle() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([200]));
        image.put_pixel(2, 2, Luma([0]));
        let cleaned = median3(&image);
        assert_eq!(cleaned.get_pixel(2, 2)[0], 200);
    }

    #[test]
    fn render_rejects_empty_image() {
        let image = GrayImage::new(0, 0);
        let result = render(VariantKind::Enhanced, &image, &PreprocessConfig::default());
        assert!(matches!(result, Err(FilterError::EmptyImage)));
    }

    #[test]
    fn every_kind_renders_same_dimensions() {
        let image = gradient(12, 9, 30, 220);
        for kind in VariantKind::ALL {
            let rendered = render(kind, &image, &PreprocessConfig::default()).unwrap();
            assert_eq!(rendered.dimensions(), image.dimensions(), "{}", kind.as_str());
        }
    }
}
