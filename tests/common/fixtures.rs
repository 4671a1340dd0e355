use image::{Rgb, RgbImage};

pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// Stroke thickness used by all synthetic tables.
pub const STROKE: u32 = 3;

/// Creates an all-white test image.
pub fn blank_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, PAPER)
}

/// Draws a full-height vertical ink line starting at column `x`.
pub fn vertical_stroke(img: &mut RgbImage, x: u32) {
    for y in 0..img.height() {
        for dx in 0..STROKE {
            if x + dx < img.width() {
                img.put_pixel(x + dx, y, INK);
            }
        }
    }
}

/// Draws a full-width horizontal ink line starting at row `y`.
pub fn horizontal_stroke(img: &mut RgbImage, y: u32) {
    for x in 0..img.width() {
        for dy in 0..STROKE {
            if y + dy < img.height() {
                img.put_pixel(x, y + dy, INK);
            }
        }
    }
}

/// Creates a synthetic table: a solid rectangular border at the image
/// edges plus internal gridlines at the given positions. The table spans
/// the whole image, so its corners coincide with the image corners.
pub fn bordered_table(
    width: u32,
    height: u32,
    internal_xs: &[u32],
    internal_ys: &[u32],
) -> RgbImage {
    let mut img = blank_image(width, height);
    vertical_stroke(&mut img, 0);
    vertical_stroke(&mut img, width - STROKE);
    horizontal_stroke(&mut img, 0);
    horizontal_stroke(&mut img, height - STROKE);
    for &x in internal_xs {
        vertical_stroke(&mut img, x);
    }
    for &y in internal_ys {
        horizontal_stroke(&mut img, y);
    }
    img
}
