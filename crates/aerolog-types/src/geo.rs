//! Geographic coordinates and destination ingestion.
//!
//! Positions arrive from the host as raw latitude/longitude floats and are
//! passed through unchecked. Destinations are different: hosts encode them in
//! several shapes (an object, a two-element array, or a delimited string such
//! as `"52.31,4.76"`). They are converted into a [`Destination`] exactly once,
//! when a frame is ingested, so downstream code never re-parses text.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Errors produced while converting destination input into coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoParseError {
    /// The input did not contain exactly two coordinate components.
    #[error("expected 2 coordinate components, found {found}")]
    WrongArity {
        /// Number of components found.
        found: usize,
    },

    /// A component could not be parsed as a number.
    #[error("coordinate component {component:?} is not a number")]
    NotANumber {
        /// The offending component text.
        component: String,
    },

    /// The coordinates are not finite or fall outside the valid ranges.
    #[error("coordinates ({lat}, {lon}) are outside lat [-90, 90] / lon [-180, 180]")]
    OutOfRange {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },

    /// The input had a shape that cannot encode a coordinate pair.
    #[error("unsupported destination encoding: {found}")]
    Unsupported {
        /// Short description of what was found.
        found: String,
    },
}

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point without validating the coordinates.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn checked(lat: f64, lon: f64) -> Result<Self, GeoParseError> {
        let point = Self { lat, lon };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(GeoParseError::OutOfRange { lat, lon })
        }
    }

    /// Whether both coordinates are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Parse a delimited `"lat,lon"` or `"lat lon"` string.
    pub fn parse(text: &str) -> Result<Self, GeoParseError> {
        let components: Vec<&str> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();

        let [lat_text, lon_text] = components.as_slice() else {
            return Err(GeoParseError::WrongArity {
                found: components.len(),
            });
        };

        let lat = parse_component(lat_text)?;
        let lon = parse_component(lon_text)?;
        Self::checked(lat, lon)
    }
}

fn parse_component(text: &str) -> Result<f64, GeoParseError> {
    text.parse::<f64>().map_err(|_err| GeoParseError::NotANumber {
        component: text.to_owned(),
    })
}

/// Destination of an entity, as resolved at ingestion time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Destination {
    /// The host did not report a destination.
    #[default]
    Unknown,
    /// A valid destination point.
    At(GeoPoint),
    /// The host reported a destination that could not be converted.
    Invalid {
        /// The original input. Out-of-range coordinates are kept as a
        /// `[lat, lon]` pair.
        raw: serde_json::Value,
        /// Why the conversion failed.
        reason: GeoParseError,
    },
}

impl Destination {
    /// Convert a legacy delimited string into a destination.
    ///
    /// Blank text means "no destination"; anything else must parse as a
    /// valid coordinate pair or becomes [`Destination::Invalid`].
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Unknown;
        }
        match GeoPoint::parse(text) {
            Ok(point) => Self::At(point),
            Err(reason) => Self::Invalid {
                raw: serde_json::Value::String(text.to_owned()),
                reason,
            },
        }
    }

    /// Convert explicit coordinates into a destination, validating ranges.
    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        match GeoPoint::checked(lat, lon) {
            Ok(point) => Self::At(point),
            Err(reason) => Self::Invalid {
                raw: serde_json::json!([lat, lon]),
                reason,
            },
        }
    }

    /// The destination point, if one is known and valid.
    pub const fn point(&self) -> Option<GeoPoint> {
        match self {
            Self::At(point) => Some(*point),
            Self::Unknown | Self::Invalid { .. } => None,
        }
    }
}

impl From<GeoPoint> for Destination {
    fn from(point: GeoPoint) -> Self {
        Self::from_coordinates(point.lat, point.lon)
    }
}

/// Accepted wire shapes for a destination.
#[derive(Deserialize)]
#[serde(untagged)]
enum DestinationInput {
    Point(GeoPoint),
    Pair([f64; 2]),
    Text(String),
    Other(serde_json::Value),
}

impl From<DestinationInput> for Destination {
    fn from(input: DestinationInput) -> Self {
        match input {
            DestinationInput::Point(point) => Self::from_coordinates(point.lat, point.lon),
            DestinationInput::Pair([lat, lon]) => Self::from_coordinates(lat, lon),
            DestinationInput::Text(text) => Self::from_text(&text),
            DestinationInput::Other(value) => Self::Invalid {
                reason: GeoParseError::Unsupported {
                    found: value_kind(&value).to_owned(),
                },
                raw: value,
            },
        }
    }
}

const fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = Option::<DestinationInput>::deserialize(deserializer)?;
        Ok(input.map_or(Self::Unknown, Self::from))
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => serializer.serialize_none(),
            Self::At(point) => point.serialize(serializer),
            Self::Invalid { raw, .. } => raw.serialize(serializer),
        }
    }
}
