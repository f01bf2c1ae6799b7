use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::assets::{AsyncHttpClient, fetch_image};
use crate::compositor::{RenderError, Renderer};
use crate::geo::GeoLocationRecord;
use crate::tile::tile_for;

/// One-shot transform: load the photo, fetch the branding icon and the
/// satellite tile (each independently fallible, absorbed into a placeholder),
/// render the overlay, write the tagged JPEG.
///
/// The only failures that surface are an undecodable base image and an
/// unwritable output; a missing remote asset never fails the run.
pub async fn tag_photo<C: AsyncHttpClient>(
    client: &C,
    renderer: &Renderer,
    geo: &GeoLocationRecord,
    icon_url: &str,
    tile_zoom: u32,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let base = image::open(input)?;
    info!(
        input = %input.display(),
        width = base.width(),
        height = base.height(),
        "photo loaded"
    );

    // Two awaited loads, in sequence; drawing happens only after both settle.
    let icon = match fetch_image(client, icon_url).await {
        Ok(icon) => Some(icon),
        Err(e) => {
            warn!("branding icon unavailable, using placeholder: {}", e);
            None
        }
    };

    let tile = tile_for(geo.latitude, geo.longitude, tile_zoom);
    let tile_image = match fetch_image(client, &tile.url()).await {
        Ok(img) => Some(img),
        Err(e) => {
            warn!("satellite tile {:?} unavailable, using fallback fill: {}", tile, e);
            None
        }
    };

    let jpeg = renderer.render(&base, geo, icon.as_ref(), tile_image.as_ref())?;

    let filename = format!(
        "tagofy_photo_{}.jpg",
        chrono::Utc::now().timestamp_millis()
    );
    let output_path = output_dir.join(filename);
    std::fs::write(&output_path, &jpeg)?;
    info!(output = %output_path.display(), bytes = jpeg.len(), "tagged photo written");

    Ok(output_path)
}
