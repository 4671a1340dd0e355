use image::{GrayImage, Rgb, RgbImage};
use imageproc::edges::canny;

/// Convert image to grayscale.
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Detect edges using Canny edge detector.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Edge-preserving smoothing: blurs flat regions while keeping sharp
/// boundaries intact, so later edge detection sees less noise and OCR gets a
/// cleaner crop.
///
/// Each output pixel is a weighted average over a `window`-sized
/// neighbourhood; the weight combines spatial distance and color distance,
/// so neighbours across a strong edge contribute almost nothing.
pub fn bilateral_filter(
    img: &RgbImage,
    window: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut output = RgbImage::new(w, h);
    let radius = window / 2;
    let color_denom = 2.0 * sigma_color * sigma_color;
    let space_denom = 2.0 * sigma_space * sigma_space;

    for y in 0..h {
        for x in 0..w {
            let center = img.get_pixel(x, y);
            let (cr, cg, cb) = (
                center.0[0] as f32,
                center.0[1] as f32,
                center.0[2] as f32,
            );

            let mut sum_r = 0.0f32;
            let mut sum_g = 0.0f32;
            let mut sum_b = 0.0f32;
            let mut weight_sum = 0.0f32;

            let y_start = y.saturating_sub(radius);
            let y_end = (y + radius + 1).min(h);
            let x_start = x.saturating_sub(radius);
            let x_end = (x + radius + 1).min(w);

            for ny in y_start..y_end {
                for nx in x_start..x_end {
                    let neighbor = img.get_pixel(nx, ny);
                    let dr = neighbor.0[0] as f32 - cr;
                    let dg = neighbor.0[1] as f32 - cg;
                    let db = neighbor.0[2] as f32 - cb;
                    let color_dist_sq = dr * dr + dg * dg + db * db;

                    let dx = nx as f32 - x as f32;
                    let dy = ny as f32 - y as f32;
                    let space_dist_sq = dx * dx + dy * dy;

                    let weight =
                        (-color_dist_sq / color_denom - space_dist_sq / space_denom).exp();

                    sum_r += neighbor.0[0] as f32 * weight;
                    sum_g += neighbor.0[1] as f32 * weight;
                    sum_b += neighbor.0[2] as f32 * weight;
                    weight_sum += weight;
                }
            }

            if weight_sum > 0.0 {
                output.put_pixel(
                    x,
                    y,
                    Rgb([
                        (sum_r / weight_sum).round().clamp(0.0, 255.0) as u8,
                        (sum_g / weight_sum).round().clamp(0.0, 255.0) as u8,
                        (sum_b / weight_sum).round().clamp(0.0, 255.0) as u8,
                    ]),
                );
            } else {
                output.put_pixel(x, y, *center);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilateral_preserves_uniform_image() {
        let img = RgbImage::from_pixel(20, 20, Rgb([128, 128, 128]));
        let out = bilateral_filter(&img, 13, 20.0, 20.0);
        for p in out.pixels() {
            assert_eq!(p.0, [128, 128, 128]);
        }
    }

    #[test]
    fn bilateral_preserves_hard_edges() {
        // Left half black, right half white. The edge column must stay
        // close to its original value.
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let out = bilateral_filter(&img, 13, 20.0, 20.0);
        assert!(out.get_pixel(5, 10).0[0] < 10);
        assert!(out.get_pixel(35, 10).0[0] > 245);
        assert!(out.get_pixel(19, 10).0[0] < 30);
        assert!(out.get_pixel(20, 10).0[0] > 225);
    }
}
