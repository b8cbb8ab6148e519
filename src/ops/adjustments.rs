// ============================================================================
// ADJUSTMENT OPERATIONS — masked alpha compositing
// ============================================================================
//
// The one pixel adjustment this tool performs: scaling the alpha channel of
// every pixel inside the selection mask. Always computed from an immutable
// original buffer so repeated slider changes never compound.
// Parallelized via rayon for multi-core performance.

use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

/// Scale the alpha of every masked pixel of `original` by `factor`.
///
/// Pixels where the mask is 0 are copied through untouched; for the rest,
/// alpha becomes `round(alpha × factor)` and the color channels are kept.
/// `factor` is clamped to [0, 1] — slider overshoot fades fully rather than
/// erroring. `original` is never mutated; the result is a fresh buffer.
///
/// The mask must have the same dimensions as `original`; both are always
/// derived from the same document at commit time.
pub fn apply_opacity(original: &RgbaImage, mask: &GrayImage, factor: f32) -> RgbaImage {
    debug_assert_eq!(original.dimensions(), mask.dimensions());

    let factor = factor.clamp(0.0, 1.0);
    let w = original.width() as usize;
    let h = original.height() as usize;
    let stride = w * 4;

    let src_raw = original.as_raw();
    let mask_raw = mask.as_raw();
    let mut dst_raw = vec![0u8; w * h * 4];

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            row_out.copy_from_slice(row_in);
            let mask_row = &mask_raw[y * w..(y + 1) * w];
            for (x, &selected) in mask_row.iter().enumerate() {
                if selected > 0 {
                    let ai = x * 4 + 3;
                    row_out[ai] = (row_in[ai] as f32 * factor).round() as u8;
                }
            }
        });

    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn checker_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 40, 10, 255])
            } else {
                Rgba([0, 120, 255, 128])
            }
        })
    }

    fn left_half_mask(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| if x < w / 2 { Luma([255]) } else { Luma([0]) })
    }

    #[test]
    fn factor_one_is_identity() {
        let img = checker_image(16, 16);
        let mask = left_half_mask(16, 16);
        let out = apply_opacity(&img, &mask, 1.0);
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn factor_zero_clears_alpha_inside_only() {
        let img = checker_image(16, 16);
        let mask = left_half_mask(16, 16);
        let out = apply_opacity(&img, &mask, 0.0);
        for (x, y, p) in out.enumerate_pixels() {
            let orig = img.get_pixel(x, y);
            if x < 8 {
                assert_eq!(p.0[3], 0);
                assert_eq!(&p.0[..3], &orig.0[..3]); // colors untouched
            } else {
                assert_eq!(p, orig);
            }
        }
    }

    #[test]
    fn half_opacity_rounds_alpha() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        let out = apply_opacity(&img, &mask, 0.5);
        // 255 × 0.5 = 127.5 rounds to 128
        assert!(out.pixels().all(|p| p.0[3] == 128));
    }

    #[test]
    fn out_of_range_factors_are_clamped() {
        let img = checker_image(8, 8);
        let mask = GrayImage::from_pixel(8, 8, Luma([255]));
        assert_eq!(
            apply_opacity(&img, &mask, 1.7).as_raw(),
            apply_opacity(&img, &mask, 1.0).as_raw()
        );
        assert_eq!(
            apply_opacity(&img, &mask, -0.4).as_raw(),
            apply_opacity(&img, &mask, 0.0).as_raw()
        );
    }

    #[test]
    fn original_is_left_unchanged() {
        let img = checker_image(8, 8);
        let before = img.as_raw().clone();
        let mask = GrayImage::from_pixel(8, 8, Luma([255]));
        let _ = apply_opacity(&img, &mask, 0.25);
        assert_eq!(img.as_raw(), &before);
    }
}
