/// All overlay dimensions are multiples of `canvas_width / REFERENCE_WIDTH`,
/// which keeps the overlay proportions identical across output resolutions.
pub const REFERENCE_WIDTH: f32 = 1000.0;

/// A panel rectangle in output-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Computed positions for the three overlay panels, plus the shared
/// scale-derived constants the compositor draws with.
#[derive(Debug, Clone, Copy)]
pub struct OverlayLayout {
    pub scale: f32,
    pub padding: f32,
    pub corner_radius: f32,
    pub gap: f32,
    pub branding: LayoutRect,
    pub info: LayoutRect,
    pub map: LayoutRect,
}

impl OverlayLayout {
    pub fn compute(canvas_width: f32, canvas_height: f32) -> Self {
        let scale = canvas_width / REFERENCE_WIDTH;
        let padding = 20.0 * scale;
        let corner_radius = 15.0 * scale;
        let gap = 2.0 * scale;

        let branding_height = 48.0 * scale;
        let branding_width = 375.0 * scale;
        let info_height = 215.0 * scale;
        let map_size = info_height;
        // Narrow canvases can push this negative; clamp and let the
        // compositor skip the info text instead of crashing.
        let info_width = (canvas_width - padding * 2.0 - map_size - gap).max(0.0);

        let info_y = canvas_height - info_height - padding;
        let branding_y = info_y - branding_height - gap;
        let map_y = info_y;

        Self {
            scale,
            padding,
            corner_radius,
            gap,
            branding: LayoutRect {
                x: padding,
                y: branding_y,
                width: branding_width,
                height: branding_height,
            },
            info: LayoutRect {
                x: padding,
                y: info_y,
                width: info_width,
                height: info_height,
            },
            map: LayoutRect {
                x: canvas_width - padding - map_size,
                y: map_y,
                width: map_size,
                height: map_size,
            },
        }
    }
}
