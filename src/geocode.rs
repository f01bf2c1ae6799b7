use crate::geo::{
    FALLBACK_ADDRESS, FALLBACK_CITY, FALLBACK_COUNTRY, FALLBACK_PROVINCE, GeoLocationRecord,
};
use chrono::{DateTime, Local};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocode API key is not set")]
    MissingApiKey,

    #[error("http: {0}")]
    Http(String),

    #[error("geocode api error {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty geocode response")]
    EmptyResponse,
}

/// Best-effort place-name fields returned by the geocoder. Every field is
/// optional; missing ones fall back to the fixed defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub full_address: Option<String>,
}

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reverse geocoder that asks a Gemini model for place-name fields as JSON.
pub struct GeminiGeocoder {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGeocoder {
    /// Uses the configured key, falling back to the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, GeocodeError> {
        let api_key = api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or(GeocodeError::MissingApiKey)?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    pub async fn geocode(&self, lat: f64, lon: f64) -> Result<PlaceDetails, GeocodeError> {
        let prompt = format!(
            "Find the location details for latitude {lat} and longitude {lon}. \
             Provide the result in a clean JSON format with these fields: \
             city, province, country, full_address. \
             Example: {{ \"city\": \"Lenasia\", \"province\": \"Gauteng\", \
             \"country\": \"South Africa\", \"full_address\": \"Anchorville, 1827\" }}"
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_URL, self.model, self.api_key
        );

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeocodeError::Api { status, body });
        }

        let response = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        parse_place_details(&response)
    }
}

/// Pulls the model's JSON text out of the generate-content envelope and
/// parses it into place fields.
fn parse_place_details(response: &serde_json::Value) -> Result<PlaceDetails, GeocodeError> {
    let text = response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or(GeocodeError::EmptyResponse)?;

    Ok(serde_json::from_str(text)?)
}

/// Builds the record a single render consumes: live geocode fields with
/// per-field fallbacks, or the full fallback record when the adapter is
/// unavailable or fails. The compositor never sees a geocode failure.
pub async fn resolve_location(
    geocoder: Option<&GeminiGeocoder>,
    lat: f64,
    lon: f64,
    now: DateTime<Local>,
    timezone: &str,
) -> GeoLocationRecord {
    let timestamp = now.format("%d/%m/%y %H:%M").to_string();

    let details = match geocoder {
        Some(geocoder) => match geocoder.geocode(lat, lon).await {
            Ok(details) => details,
            Err(e) => {
                warn!("geocoding failed, using fallback location: {}", e);
                PlaceDetails::default()
            }
        },
        None => PlaceDetails::default(),
    };

    GeoLocationRecord {
        latitude: lat,
        longitude: lon,
        city: details.city.unwrap_or_else(|| FALLBACK_CITY.to_string()),
        province: details
            .province
            .unwrap_or_else(|| FALLBACK_PROVINCE.to_string()),
        country: details
            .country
            .unwrap_or_else(|| FALLBACK_COUNTRY.to_string()),
        address: details
            .full_address
            .unwrap_or_else(|| FALLBACK_ADDRESS.to_string()),
        timestamp,
        timezone: timezone.to_string(),
    }
}
