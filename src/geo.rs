/// Resolved location details for a single render. Built once per session by
/// the geocode adapter (or from the fixed fallback) and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub province: String,
    pub country: String,
    pub address: String,
    /// Display-formatted, minute precision, e.g. "07/01/26 08:42".
    pub timestamp: String,
    /// Fixed offset label, e.g. "UTC+02:00".
    pub timezone: String,
}

pub const FALLBACK_CITY: &str = "Lenasia";
pub const FALLBACK_PROVINCE: &str = "Gauteng";
pub const FALLBACK_COUNTRY: &str = "South Africa";
pub const FALLBACK_ADDRESS: &str = "Anchorville, , 1827, Gauteng, South Africa";

/// Characters of the country name kept in the info-panel heading before the
/// ellipsis.
const HEADING_COUNTRY_CHARS: usize = 10;

impl GeoLocationRecord {
    /// The single substitution point for the no-data path: every field that
    /// geocoding would have filled gets its fixed default.
    pub fn fallback(latitude: f64, longitude: f64, timestamp: String, timezone: String) -> Self {
        Self {
            latitude,
            longitude,
            city: FALLBACK_CITY.to_string(),
            province: FALLBACK_PROVINCE.to_string(),
            country: FALLBACK_COUNTRY.to_string(),
            address: FALLBACK_ADDRESS.to_string(),
            timestamp,
            timezone,
        }
    }

    /// Info-panel heading: "City, Province, Truncated C..." with the country
    /// cut to a fixed prefix so long names never overflow the panel.
    pub fn heading(&self) -> String {
        let country: String = self.country.chars().take(HEADING_COUNTRY_CHARS).collect();
        format!("{}, {}, {}...", self.city, self.province, country)
    }

    /// The four info-panel text lines, in draw order.
    pub fn info_lines(&self) -> [String; 4] {
        [
            self.heading(),
            self.address.clone(),
            format!("Lat: {:.6}, Long: {:.6}", self.latitude, self.longitude),
            format!("{} {}", self.timestamp, self.timezone),
        ]
    }
}
