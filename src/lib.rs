use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod assets;
pub mod compositor;
pub mod geo;
pub mod geocode;
pub mod layout;
pub mod pipeline;
pub mod tile;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub app: AppConfig,
    pub capture: CaptureConfig,
    pub geocode: GeocodeConfig,
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

/// The fixed capture point the overlay is generated for.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Fixed offset label rendered after the timestamp, e.g. "UTC+02:00".
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeConfig {
    /// Falls back to the GEMINI_API_KEY environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverlayConfig {
    pub font_regular: PathBuf,
    pub font_bold: PathBuf,
    pub jpeg_quality: u8,
    pub branding_icon_url: String,
    pub tile_zoom: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "Tagofy".to_string(),
                log_level: "info".to_string(),
            },
            capture: CaptureConfig {
                latitude: -26.354340,
                longitude: 27.834484,
                timezone: "UTC+02:00".to_string(),
            },
            geocode: GeocodeConfig {
                api_key: None,
                model: "gemini-3-flash-preview".to_string(),
            },
            overlay: OverlayConfig {
                font_regular: PathBuf::from("static/DejaVuSans.ttf"),
                font_bold: PathBuf::from("static/DejaVuSans-Bold.ttf"),
                jpeg_quality: 95,
                branding_icon_url: "https://thabisot33.github.io/maps/icon.png".to_string(),
                tile_zoom: 18,
            },
        }
    }
}
