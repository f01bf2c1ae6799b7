use std::f64::consts::PI;

const TILE_SERVER: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile";

/// A slippy-map tile address in the standard Web Mercator tiling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoordinate {
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
}

impl TileCoordinate {
    /// Esri World Imagery URL for this tile. The path order is zoom/row/column.
    pub fn url(&self) -> String {
        format!("{}/{}/{}/{}", TILE_SERVER, self.zoom, self.y, self.x)
    }
}

/// Maps a coordinate pair to the tile containing it.
///
/// Valid for |lat| below the Mercator cutoff (~85.05 degrees); the capture
/// point is fixed well inside that range.
pub fn tile_for(lat: f64, lon: f64, zoom: u32) -> TileCoordinate {
    let n = (1u64 << zoom) as f64;
    let lat_rad = lat.to_radians();

    let x = ((lon + 180.0) / 360.0 * n).floor() as u32;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as u32;

    TileCoordinate { zoom, x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_at_zoom_one() {
        // Zoom 1 is a 2x2 grid; (0, 0) lands in the south-east quadrant.
        assert_eq!(
            tile_for(0.0, 0.0, 1),
            TileCoordinate { zoom: 1, x: 1, y: 1 }
        );
    }

    #[test]
    fn test_capture_point_at_zoom_18() {
        let tile = tile_for(-26.354340, 27.834484, 18);
        assert_eq!(tile.x, 151340);
        assert_eq!(tile.y, 150977);
        assert_eq!(tile.zoom, 18);
    }

    #[test]
    fn test_deterministic() {
        let a = tile_for(-26.354340, 27.834484, 18);
        let b = tile_for(-26.354340, 27.834484, 18);
        assert_eq!(a, b);
    }

    #[test]
    fn test_northern_hemisphere_lower_y() {
        let north = tile_for(52.5, 13.4, 10);
        let south = tile_for(-52.5, 13.4, 10);
        assert!(north.y < south.y);
    }

    #[test]
    fn test_url_puts_row_before_column() {
        let tile = TileCoordinate {
            zoom: 18,
            x: 151340,
            y: 150977,
        };
        assert_eq!(
            tile.url(),
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/18/150977/151340"
        );
    }
}
