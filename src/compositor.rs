use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, ImageEncoder, Rgba, RgbaImage, codecs::jpeg::JpegEncoder};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut, draw_text_mut, text_size};
use imageproc::point::Point;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::geo::GeoLocationRecord;
use crate::layout::{LayoutRect, OverlayLayout};

mod draw;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("base image has zero width or height")]
    EmptyImage,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse font {0}")]
    InvalidFont(std::path::PathBuf),
}

const OVERLAY_BLACK: Rgba<u8> = Rgba([0, 0, 0, 115]); // 45% opacity
const MAP_WASH: Rgba<u8> = Rgba([0, 0, 0, 38]); // 15% opacity
const ICON_BLUE: Rgba<u8> = Rgba([59, 130, 246, 255]); // #3b82f6
const PIN_RED: Rgba<u8> = Rgba([239, 68, 68, 255]); // #ef4444
const MAP_FALLBACK_GREEN: Rgba<u8> = Rgba([28, 46, 11, 255]); // #1c2e0b
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const BRANDING_LABEL: &str = "Tagofy - Geotag Map Camera";
const ATTRIBUTION_LABEL: &str = "Maps";

/// Regular and bold faces for the overlay text.
pub struct OverlayFonts {
    pub regular: FontVec,
    pub bold: FontVec,
}

impl OverlayFonts {
    pub fn load(regular_path: &Path, bold_path: &Path) -> Result<Self, RenderError> {
        Ok(Self {
            regular: load_font(regular_path)?,
            bold: load_font(bold_path)?,
        })
    }
}

fn load_font(path: &Path) -> Result<FontVec, RenderError> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data).map_err(|_| RenderError::InvalidFont(path.to_path_buf()))
}

/// Burns the geotag overlay onto a photo and encodes the result as JPEG.
///
/// The renderer is pure over its inputs: the icon and satellite tile arrive
/// pre-fetched (`None` when their load failed) and every failure inside the
/// draw is replaced by a deterministic placeholder, so rendering the same
/// inputs twice produces byte-identical output.
pub struct Renderer {
    fonts: Option<OverlayFonts>,
    jpeg_quality: u8,
}

impl Renderer {
    pub fn new(fonts: Option<OverlayFonts>, jpeg_quality: u8) -> Self {
        Self {
            fonts,
            jpeg_quality,
        }
    }

    /// Loads fonts from the configured paths. A missing or unparsable font
    /// skips the overlay text rather than failing the render.
    pub fn from_config(config: &crate::OverlayConfig) -> Self {
        let fonts = match OverlayFonts::load(&config.font_regular, &config.font_bold) {
            Ok(fonts) => Some(fonts),
            Err(e) => {
                warn!("overlay fonts unavailable, text will be skipped: {}", e);
                None
            }
        };
        Self::new(fonts, config.jpeg_quality)
    }

    pub fn render(
        &self,
        base: &DynamicImage,
        geo: &GeoLocationRecord,
        icon: Option<&DynamicImage>,
        tile: Option<&DynamicImage>,
    ) -> Result<Vec<u8>, RenderError> {
        if base.width() == 0 || base.height() == 0 {
            return Err(RenderError::EmptyImage);
        }

        let mut canvas = base.to_rgba8();
        let layout = OverlayLayout::compute(canvas.width() as f32, canvas.height() as f32);

        self.draw_branding_panel(&mut canvas, &layout, icon);
        self.draw_info_panel(&mut canvas, &layout, geo);
        self.draw_map_panel(&mut canvas, &layout, tile);

        encode_jpeg(&canvas, self.jpeg_quality)
    }

    fn draw_branding_panel(
        &self,
        canvas: &mut RgbaImage,
        layout: &OverlayLayout,
        icon: Option<&DynamicImage>,
    ) {
        let s = layout.scale;
        let rect = layout.branding;
        draw::fill_rounded_rect(canvas, &rect, 10.0 * s, OVERLAY_BLACK);

        match icon {
            Some(icon) => {
                let size = (30.0 * s).round().max(1.0) as u32;
                let resized = image::imageops::resize(
                    &icon.to_rgba8(),
                    size,
                    size,
                    image::imageops::FilterType::Lanczos3,
                );
                let x = (rect.x + 10.0 * s).round() as i64;
                let y = (rect.y + (rect.height - size as f32) / 2.0).round() as i64;
                image::imageops::overlay(canvas, &resized, x, y);
            }
            None => {
                // Deterministic placeholder: blue rounded square with a
                // white dot.
                let size = 28.0 * s;
                let square = LayoutRect {
                    x: rect.x + 12.0 * s,
                    y: rect.y + (rect.height - size) / 2.0,
                    width: size,
                    height: size,
                };
                draw::fill_rounded_rect(canvas, &square, 7.0 * s, ICON_BLUE);
                draw_filled_circle_mut(
                    canvas,
                    (
                        (square.x + size / 2.0).round() as i32,
                        (rect.y + rect.height / 2.0).round() as i32,
                    ),
                    (4.0 * s).round().max(1.0) as i32,
                    WHITE,
                );
            }
        }

        if let Some(fonts) = &self.fonts {
            let scale = PxScale::from(20.0 * s);
            let (_, text_height) = text_size(scale, &fonts.bold, BRANDING_LABEL);
            let x = (rect.x + 48.0 * s).round() as i32;
            let y = (rect.y + (rect.height - text_height as f32) / 2.0).round() as i32;
            draw_text_mut(canvas, WHITE, x, y, scale, &fonts.bold, BRANDING_LABEL);
        }
    }

    fn draw_info_panel(
        &self,
        canvas: &mut RgbaImage,
        layout: &OverlayLayout,
        geo: &GeoLocationRecord,
    ) {
        let s = layout.scale;
        let rect = layout.info;
        draw::fill_rounded_rect(canvas, &rect, layout.corner_radius, OVERLAY_BLACK);

        // No room for text once the width clamp engages.
        if rect.width <= 0.0 {
            return;
        }

        let Some(fonts) = &self.fonts else {
            return;
        };

        let [heading, address, coordinates, timestamp] = geo.info_lines();
        let x = (rect.x + 22.0 * s).round() as i32;
        let heading_scale = PxScale::from(40.0 * s);
        let body_scale = PxScale::from(24.0 * s);

        let lines = [
            (&heading, &fonts.bold, heading_scale, 22.0),
            (&address, &fonts.regular, body_scale, 75.0),
            (&coordinates, &fonts.regular, body_scale, 115.0),
            (&timestamp, &fonts.regular, body_scale, 155.0),
        ];
        for (text, font, scale, offset) in lines {
            let y = (rect.y + offset * s).round() as i32;
            draw_text_mut(canvas, WHITE, x, y, scale, font, text);
        }
    }

    fn draw_map_panel(
        &self,
        canvas: &mut RgbaImage,
        layout: &OverlayLayout,
        tile: Option<&DynamicImage>,
    ) {
        let s = layout.scale;
        let rect = layout.map;
        let size = rect.width.round().max(1.0) as u32;

        // The panel is composed offscreen and then overlaid through a
        // rounded-corner mask, which stands in for the canvas clip.
        let mut panel = match tile {
            Some(tile) => {
                let mut stretched = image::imageops::resize(
                    &tile.to_rgba8(),
                    size,
                    size,
                    image::imageops::FilterType::Lanczos3,
                );
                draw::wash(&mut stretched, MAP_WASH);
                stretched
            }
            None => RgbaImage::from_pixel(size, size, MAP_FALLBACK_GREEN),
        };

        self.draw_pin(&mut panel, s);
        self.draw_attribution(&mut panel, s);

        draw::overlay_rounded(canvas, &panel, rect.x, rect.y, layout.corner_radius);
    }

    fn draw_pin(&self, panel: &mut RgbaImage, s: f32) {
        let cx = panel.width() as f32 / 2.0;
        let cy = panel.height() as f32 / 2.0;

        // Head: red circle with a white stroke, drawn as two filled circles.
        let center = (cx.round() as i32, cy.round() as i32);
        let radius = 9.0 * s;
        let stroke = 2.5 * s;
        draw_filled_circle_mut(panel, center, (radius + stroke).round().max(1.0) as i32, WHITE);
        draw_filled_circle_mut(panel, center, radius.round().max(1.0) as i32, PIN_RED);

        // Triangular stalk beneath the head, drawn last so it crosses the
        // stroke rather than hiding under it.
        let stalk = [
            Point::new((cx - 3.0 * s).round() as i32, (cy + 6.0 * s).round() as i32),
            Point::new(cx.round() as i32, (cy + 18.0 * s).round() as i32),
            Point::new((cx + 3.0 * s).round() as i32, (cy + 6.0 * s).round() as i32),
        ];
        if stalk[0] != stalk[1] && stalk[1] != stalk[2] && stalk[0] != stalk[2] {
            draw_polygon_mut(panel, &stalk, PIN_RED);
        }
    }

    fn draw_attribution(&self, panel: &mut RgbaImage, s: f32) {
        let size = panel.height() as f32;

        draw_filled_circle_mut(
            panel,
            (
                (24.0 * s).round() as i32,
                (size - 27.0 * s).round() as i32,
            ),
            (4.0 * s).round().max(1.0) as i32,
            WHITE,
        );

        if let Some(fonts) = &self.fonts {
            draw_text_mut(
                panel,
                WHITE,
                (34.0 * s).round() as i32,
                (size - 32.0 * s).round() as i32,
                PxScale::from(14.0 * s),
                &fonts.bold,
                ATTRIBUTION_LABEL,
            );
        }
    }
}

/// JPEG doesn't support alpha, so the surface is flattened to RGB first.
fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, RenderError> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.write_image(
        &rgb,
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn test_geo() -> GeoLocationRecord {
        GeoLocationRecord::fallback(
            -26.354340,
            27.834484,
            "07/01/26 08:42".to_string(),
            "UTC+02:00".to_string(),
        )
    }

    fn test_base(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 140, 160, 255]),
        ))
    }

    fn renderer() -> Renderer {
        Renderer::new(None, 95)
    }

    fn fixture_fonts() -> OverlayFonts {
        OverlayFonts::load(
            Path::new("static/DejaVuSans.ttf"),
            Path::new("static/DejaVuSans-Bold.ttf"),
        )
        .unwrap()
    }

    fn bright_pixels(
        img: &image::RgbImage,
        x_range: std::ops::Range<u32>,
        y_range: std::ops::Range<u32>,
    ) -> usize {
        y_range
            .flat_map(|y| x_range.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y)[0] > 180)
            .count()
    }

    #[test]
    fn test_render_preserves_dimensions() {
        let output = renderer()
            .render(&test_base(1200, 900), &test_geo(), None, None)
            .unwrap();

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (1200, 900));
    }

    #[test]
    fn test_render_is_deterministic() {
        let base = test_base(800, 600);
        let geo = test_geo();
        let r = renderer();

        let a = r.render(&base, &geo, None, None).unwrap();
        let b = r.render(&base, &geo, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_tile_fills_fallback_green() {
        let base = test_base(1000, 1000);
        let output = renderer().render(&base, &test_geo(), None, None).unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Map panel top area at reference scale: x in [765, 980), y in
        // [765, 980). Sample a point away from pin and attribution.
        let p = *decoded.get_pixel(950, 790);
        assert!(p[1] > p[2], "expected green-dominant fallback, got {:?}", p);
        assert!(p[0] < 80 && p[1] < 100);
    }

    #[test]
    fn test_tile_present_shows_washed_tile() {
        let base = test_base(1000, 1000);
        let tile = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            256,
            256,
            Rgba([200, 50, 50, 255]),
        ));

        let output = renderer()
            .render(&base, &test_geo(), None, Some(&tile))
            .unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Red tile darkened by the 15% wash, not the fallback green.
        let p = *decoded.get_pixel(950, 790);
        assert!(p[0] > 120, "expected washed red tile, got {:?}", p);
    }

    #[test]
    fn test_missing_icon_draws_blue_placeholder() {
        let base = test_base(1000, 1000);
        let output = renderer().render(&base, &test_geo(), None, None).unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Branding panel spans y in [715, 763) at reference scale; the
        // placeholder square sits at (32..60, 725..753) with the white dot
        // at its center, so sample off-center inside the square.
        let p = *decoded.get_pixel(38, 731);
        assert!(
            p[2] > 150 && p[2] > p[0],
            "expected blue placeholder, got {:?}",
            p
        );
    }

    #[test]
    fn test_icon_present_is_drawn_over_panel() {
        let base = test_base(1000, 1000);
        let icon = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            64,
            64,
            Rgba([10, 250, 10, 255]),
        ));

        let output = renderer()
            .render(&base, &test_geo(), Some(&icon), None)
            .unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Icon occupies a 30px square at (30, 724) at reference scale.
        let p = *decoded.get_pixel(45, 735);
        assert!(p[1] > 180, "expected green icon pixels, got {:?}", p);
    }

    #[test]
    fn test_info_lines_leave_text_pixels_at_each_offset() {
        let renderer = Renderer::new(Some(fixture_fonts()), 95);
        let output = renderer
            .render(&test_base(1000, 1000), &test_geo(), None, None)
            .unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Info panel at (20, 765) at reference scale; the four lines start
        // at offsets 22/75/115/155, so white glyph pixels must show up in
        // each band while the panel background stays dim.
        for (line, y0, y1) in [
            ("heading", 790, 824),
            ("address", 842, 864),
            ("coordinates", 882, 904),
            ("timestamp", 922, 944),
        ] {
            let count = bright_pixels(&decoded, 45..500, y0..y1);
            assert!(count > 20, "no text pixels for {} line: {}", line, count);
        }

        // Between the heading and the address line there is no text.
        assert_eq!(bright_pixels(&decoded, 45..500, 832..838), 0);
    }

    #[test]
    fn test_branding_label_is_vertically_centered_in_panel() {
        let renderer = Renderer::new(Some(fixture_fonts()), 95);
        let output = renderer
            .render(&test_base(1000, 1000), &test_geo(), None, None)
            .unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        // Label starts at x=68 inside the branding panel (y in [715, 763));
        // scanning right of the placeholder icon square.
        let count = bright_pixels(&decoded, 70..390, 715..763);
        assert!(count > 30, "no branding label pixels: {}", count);
        // Nothing spills above or below the panel.
        assert_eq!(bright_pixels(&decoded, 70..390, 700..712), 0);
    }

    #[test]
    fn test_pin_stalk_crosses_the_stroke() {
        // At 2000px wide (scale 2) the pin head sits at (215, 215) in the
        // 430px map panel with an 18px head and a 5px white stroke. The
        // point 20px below the center lies inside both the stroke band and
        // the stalk triangle, so it must come out red, not white.
        let base = test_base(2000, 1500);
        let output = renderer().render(&base, &test_geo(), None, None).unwrap();
        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();

        let p = *decoded.get_pixel(1530 + 215, 1030 + 235);
        assert!(
            p[0] > 150 && i32::from(p[0]) - i32::from(p[2]) > 60,
            "expected stalk pixels over the stroke, got {:?}",
            p
        );
    }

    #[test]
    fn test_narrow_base_still_renders() {
        let output = renderer()
            .render(&test_base(300, 400), &test_geo(), None, None)
            .unwrap();
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (300, 400));
    }

    #[test]
    fn test_zero_sized_base_is_an_error() {
        let base = DynamicImage::new_rgba8(0, 0);
        assert!(matches!(
            renderer().render(&base, &test_geo(), None, None),
            Err(RenderError::EmptyImage)
        ));
    }

    #[test]
    fn test_fonts_from_config_tolerates_missing_files() {
        let config = crate::OverlayConfig {
            font_regular: "does/not/exist.ttf".into(),
            font_bold: "does/not/exist-bold.ttf".into(),
            jpeg_quality: 95,
            branding_icon_url: String::new(),
            tile_zoom: 18,
        };
        let renderer = Renderer::from_config(&config);
        let output = renderer
            .render(&test_base(640, 480), &test_geo(), None, None)
            .unwrap();
        assert!(!output.is_empty());
    }
}
