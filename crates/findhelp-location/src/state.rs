//! Location state types.

use std::sync::LazyLock;

use findhelp_core::Coordinate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

static ZIP_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{5})(?:-\d{4})?$").expect("valid regex"));

/// A validated 5-digit US postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Accepts `12345` or ZIP+4 `12345-6789` (surrounding whitespace
    /// ignored) and keeps the first five digits.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidZip`] for anything else.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let trimmed = input.trim();
        ZIP_FORMAT
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_owned()))
            .ok_or_else(|| LocationError::InvalidZip {
                input: input.to_owned(),
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ZipCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).map_err(|e| e.to_string())
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

impl std::fmt::Display for ZipCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address fragments obtained by reverse-geocoding a device position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAddress {
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

/// Where the user is, as far as the app knows.
///
/// Exactly one variant is active. A `ZipCode` state always carries the
/// coordinate its zip resolved to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LocationState {
    #[default]
    None,
    Loading,
    Error {
        message: String,
    },
    ZipCode {
        zip_code: ZipCode,
        location: Coordinate,
    },
    Coordinates {
        latitude: f64,
        longitude: f64,
        location: Option<PartialAddress>,
    },
}

impl LocationState {
    /// The coordinate this state points at, if resolved.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationState::ZipCode { location, .. } => Some(*location),
            LocationState::Coordinates {
                latitude,
                longitude,
                ..
            } => Some(Coordinate::new(*latitude, *longitude)),
            LocationState::None | LocationState::Loading | LocationState::Error { .. } => None,
        }
    }

    /// A usable postal code: the zip itself, or a 5-digit postal code from a
    /// reverse-geocoded device position.
    #[must_use]
    pub fn postal_code(&self) -> Option<ZipCode> {
        match self {
            LocationState::ZipCode { zip_code, .. } => Some(zip_code.clone()),
            LocationState::Coordinates {
                location: Some(address),
                ..
            } => address
                .postal_code
                .as_deref()
                .and_then(|p| ZipCode::parse(p).ok()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinate().is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, LocationState::Loading)
    }
}

impl std::fmt::Display for LocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationState::None => write!(f, "no location"),
            LocationState::Loading => write!(f, "locating..."),
            LocationState::Error { message } => write!(f, "error: {message}"),
            LocationState::ZipCode { zip_code, location } => {
                write!(f, "zip {zip_code} ({location})")
            }
            LocationState::Coordinates {
                latitude,
                longitude,
                location,
            } => {
                write!(f, "device {latitude:.5},{longitude:.5}")?;
                if let Some(address) = location {
                    let parts: Vec<&str> = [
                        address.city.as_deref(),
                        address.region.as_deref(),
                        address.postal_code.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    if !parts.is_empty() {
                        write!(f, " ({})", parts.join(", "))?;
                    }
                }
                Ok(())
            }
        }
    }
}
