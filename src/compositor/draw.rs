use crate::layout::LayoutRect;
use image::{Pixel, Rgba, RgbaImage};

/// Rounded-rectangle membership test in the rect's local coordinates, sampled
/// at pixel centers. No antialiasing; output must be deterministic.
fn rounded_contains(width: f32, height: f32, radius: f32, px: f32, py: f32) -> bool {
    let radius = radius.clamp(0.0, width.min(height) / 2.0);
    let dx = (px - width / 2.0).abs() - (width / 2.0 - radius);
    let dy = (py - height / 2.0).abs() - (height / 2.0 - radius);

    if dx <= 0.0 || dy <= 0.0 {
        return true;
    }
    dx * dx + dy * dy <= radius * radius
}

/// Alpha-blends `color` over every pixel inside the rounded rect.
pub fn fill_rounded_rect(img: &mut RgbaImage, rect: &LayoutRect, radius: f32, color: Rgba<u8>) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = ((rect.x + rect.width).ceil() as u32).min(img.width());
    let y1 = ((rect.y + rect.height).ceil() as u32).min(img.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let px = x as f32 + 0.5 - rect.x;
            let py = y as f32 + 0.5 - rect.y;
            if rounded_contains(rect.width, rect.height, radius, px, py) {
                img.get_pixel_mut(x, y).blend(&color);
            }
        }
    }
}

/// Copies `panel` onto `dst` at (x, y), clipped to a rounded rect covering
/// the panel. This is the compositor's clip-then-draw for the map thumbnail.
pub fn overlay_rounded(dst: &mut RgbaImage, panel: &RgbaImage, x: f32, y: f32, radius: f32) {
    let (pw, ph) = (panel.width(), panel.height());

    for py in 0..ph {
        for px in 0..pw {
            if !rounded_contains(
                pw as f32,
                ph as f32,
                radius,
                px as f32 + 0.5,
                py as f32 + 0.5,
            ) {
                continue;
            }

            let dx = x.round() as i64 + i64::from(px);
            let dy = y.round() as i64 + i64::from(py);
            if dx < 0 || dy < 0 || dx >= i64::from(dst.width()) || dy >= i64::from(dst.height()) {
                continue;
            }

            let src = *panel.get_pixel(px, py);
            dst.get_pixel_mut(dx as u32, dy as u32).blend(&src);
        }
    }
}

/// Alpha-blends `color` over the whole image (the contrast wash on the map
/// tile).
pub fn wash(img: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        pixel.blend(&color);
    }
}
