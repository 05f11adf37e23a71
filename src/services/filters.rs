//! Pixel filters over 8-bit RGB images.
//!
//! Windows are anchored at `(width / 2, height / 2)` and pixels outside the
//! image are mirrored without repeating the edge (`gfedcb|abcdefgh|gfedcba`).

use image::{GrayImage, Luma, Rgb, RgbImage};

/// A dense convolution kernel, row-major
#[derive(Debug, Clone)]
pub struct Kernel {
    width: u32,
    height: u32,
    weights: Vec<f32>,
}

impl Kernel {
    pub fn new(width: u32, height: u32, weights: Vec<f32>) -> Self {
        assert_eq!(
            weights.len(),
            (width * height) as usize,
            "kernel weights do not match its dimensions"
        );
        Self {
            width,
            height,
            weights,
        }
    }

    /// Every weight equal to `1 / (width * height)`
    pub fn normalized_box(width: u32, height: u32) -> Self {
        let area = (width * height) as usize;
        Self::new(width, height, vec![1.0 / area as f32; area])
    }
}

/// Maps an out of range coordinate back inside `0..len`
fn reflect_101(i: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }

    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * len - 2 - i;
        }
    }
    i as u32
}

fn window_offsets(size: u32) -> std::ops::RangeInclusive<i64> {
    let anchor = (size / 2) as i64;
    -anchor..=(size as i64 - 1 - anchor)
}

/// Correlates the image with `kernel`, rounding each channel to nearest.
pub fn convolve(image: &RgbImage, kernel: &Kernel) -> RgbImage {
    let (w, h) = image.dimensions();
    let xs: Vec<i64> = window_offsets(kernel.width).collect();
    let ys: Vec<i64> = window_offsets(kernel.height).collect();

    RgbImage::from_fn(w, h, |x, y| {
        let mut acc = [0f32; 3];
        for (ky, dy) in ys.iter().enumerate() {
            let sy = reflect_101(y as i64 + dy, h);
            for (kx, dx) in xs.iter().enumerate() {
                let sx = reflect_101(x as i64 + dx, w);
                let weight = kernel.weights[ky * kernel.width as usize + kx];
                let px = image.get_pixel(sx, sy);
                for c in 0..3 {
                    acc[c] += weight * px[c] as f32;
                }
            }
        }
        Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}

/// Averages each pixel over a `width x height` window.
///
/// Runs as two separable integer passes.
pub fn box_blur(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    let xs: Vec<i64> = window_offsets(width).collect();
    let ys: Vec<i64> = window_offsets(height).collect();

    // Horizontal window sums per channel
    let mut rows = vec![[0u32; 3]; (w as usize) * (h as usize)];
    for y in 0..h {
        for x in 0..w {
            let mut sum = [0u32; 3];
            for dx in &xs {
                let px = image.get_pixel(reflect_101(x as i64 + dx, w), y);
                for c in 0..3 {
                    sum[c] += px[c] as u32;
                }
            }
            rows[(y * w + x) as usize] = sum;
        }
    }

    let area = width * height;
    RgbImage::from_fn(w, h, |x, y| {
        let mut sum = [0u32; 3];
        for dy in &ys {
            let row = rows[(reflect_101(y as i64 + dy, h) * w + x) as usize];
            for c in 0..3 {
                sum[c] += row[c];
            }
        }
        Rgb(sum.map(|s| ((s + area / 2) / area) as u8))
    })
}

/// ITU-R BT.601 luma, `0.299 R + 0.587 G + 0.114 B` rounded to nearest
pub fn luma_bt601(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0.map(u32::from);
        Luma([((299 * r + 587 * g + 114 * b + 500) / 1000) as u8])
    })
}

/// Source coordinate and weight of the next sample for destination index `i`.
/// Pixel centres are aligned, so an exact 2x shrink averages 2x2 blocks.
fn linear_tap(i: u32, scale: f64, len: u32) -> (u32, u32, f64) {
    let pos = (i as f64 + 0.5) * scale - 0.5;
    let base = pos.floor();
    let (lo, frac) = if base < 0.0 {
        (0, 0.0)
    } else if base as u32 >= len - 1 {
        (len - 1, 0.0)
    } else {
        (base as u32, pos - base)
    };
    (lo, (lo + 1).min(len - 1), frac)
}

/// Bilinear resampling to `width x height`, both non-zero
pub fn resize_linear(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    let sx = w as f64 / width as f64;
    let sy = h as f64 / height as f64;
    let cols: Vec<(u32, u32, f64)> = (0..width).map(|x| linear_tap(x, sx, w)).collect();

    RgbImage::from_fn(width, height, |x, y| {
        let (x0, x1, fx) = cols[x as usize];
        let (y0, y1, fy) = linear_tap(y, sy, h);
        let (p00, p10) = (image.get_pixel(x0, y0), image.get_pixel(x1, y0));
        let (p01, p11) = (image.get_pixel(x0, y1), image.get_pixel(x1, y1));

        let mut out = [0u8; 3];
        for c in 0..3 {
            let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
            let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 3), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn test_window_offsets() {
        assert_eq!(window_offsets(5), -2..=2);
        assert_eq!(window_offsets(10), -5..=4);
        assert_eq!(window_offsets(1), 0..=0);
    }

    #[test]
    fn test_uniform_image_is_unchanged() {
        let image = RgbImage::from_pixel(7, 4, Rgb([10, 120, 250]));

        assert_eq!(box_blur(&image, 10, 10), image);
        assert_eq!(convolve(&image, &Kernel::normalized_box(5, 5)), image);
    }

    #[test]
    fn test_box_blur_averages_neighbourhood() {
        // Single bright column in the middle of a 3x1 row
        let mut image = RgbImage::new(3, 1);
        image.put_pixel(1, 0, Rgb([90, 90, 90]));

        let blurred = box_blur(&image, 3, 1);

        // Edges mirror onto the bright column: (90 + 0 + 90) / 3
        assert_eq!(blurred.get_pixel(0, 0), &Rgb([60, 60, 60]));
        assert_eq!(blurred.get_pixel(1, 0), &Rgb([30, 30, 30]));
        assert_eq!(blurred.get_pixel(2, 0), &Rgb([60, 60, 60]));
    }

    #[test]
    fn test_convolve_matches_box_blur_for_uniform_kernel() {
        let image = RgbImage::from_fn(9, 6, |x, y| Rgb([(x * 25) as u8, (y * 40) as u8, 77]));

        let by_kernel = convolve(&image, &Kernel::normalized_box(5, 5));
        let by_box = box_blur(&image, 5, 5);

        for (a, b) in by_kernel.pixels().zip(by_box.pixels()) {
            for c in 0..3 {
                assert!((a[c] as i32 - b[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_identity_kernel() {
        let image = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 3]));
        let mut weights = vec![0.0; 9];
        weights[4] = 1.0;

        assert_eq!(convolve(&image, &Kernel::new(3, 3, weights)), image);
    }

    #[test]
    fn test_luma_uses_bt601_weights() {
        let image = RgbImage::from_fn(4, 1, |x, _| {
            [Rgb([220, 90, 90]), Rgb([255, 0, 0]), Rgb([0, 255, 0]), Rgb([0, 0, 255])][x as usize]
        });

        let gray = luma_bt601(&image);
        assert_eq!(gray.get_pixel(0, 0), &Luma([129]));
        assert_eq!(gray.get_pixel(1, 0), &Luma([76]));
        assert_eq!(gray.get_pixel(2, 0), &Luma([150]));
        assert_eq!(gray.get_pixel(3, 0), &Luma([29]));
    }

    #[test]
    fn test_resize_linear_halving_averages_blocks() {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(0, 0, Rgb([100, 0, 8]));
        image.put_pixel(1, 1, Rgb([100, 40, 0]));
        image.put_pixel(2, 0, Rgb([255, 255, 255]));
        image.put_pixel(3, 0, Rgb([255, 255, 255]));
        image.put_pixel(2, 1, Rgb([255, 255, 255]));
        image.put_pixel(3, 1, Rgb([255, 255, 255]));

        let out = resize_linear(&image, 2, 1);

        assert_eq!(out.dimensions(), (2, 1));
        assert_eq!(out.get_pixel(0, 0), &Rgb([50, 10, 2]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_resize_linear_clamps_at_edges() {
        let image = RgbImage::from_fn(7, 5, |x, y| Rgb([(x * 30) as u8, (y * 50) as u8, 9]));

        let out = resize_linear(&image, 3, 2);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(resize_linear(&image, 7, 5), image);
    }
}
