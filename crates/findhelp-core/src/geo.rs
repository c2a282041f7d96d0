//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3959.0;
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Miles => EARTH_RADIUS_MILES,
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
        }
    }

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }
}

/// Haversine great-circle distance between two coordinates, rounded to two
/// decimal places.
///
/// Returns exactly `0.0` for identical points and is symmetric in its
/// arguments.
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate, unit: DistanceUnit) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_hundredths(unit.earth_radius() * c)
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOWNTOWN_SB: Coordinate = Coordinate::new(34.419_25, -119.708_08);
    const MONTECITO: Coordinate = Coordinate::new(34.449_34, -119.603_97);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance(DOWNTOWN_SB, DOWNTOWN_SB, DistanceUnit::Miles), 0.0);
        assert_eq!(distance(MONTECITO, MONTECITO, DistanceUnit::Kilometers), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (DOWNTOWN_SB, MONTECITO),
            (Coordinate::new(40.712_8, -74.006_0), Coordinate::new(34.052_2, -118.243_7)),
            (Coordinate::new(-33.868_8, 151.209_3), Coordinate::new(51.507_4, -0.127_8)),
        ];
        for (a, b) in pairs {
            for unit in [DistanceUnit::Miles, DistanceUnit::Kilometers] {
                assert_eq!(distance(a, b, unit), distance(b, a, unit));
            }
        }
    }

    #[test]
    fn downtown_to_montecito_is_about_six_miles() {
        let miles = distance(DOWNTOWN_SB, MONTECITO, DistanceUnit::Miles);
        assert!((6.0..=6.8).contains(&miles), "got {miles}");
    }

    #[test]
    fn kilometers_use_larger_value() {
        let miles = distance(DOWNTOWN_SB, MONTECITO, DistanceUnit::Miles);
        let km = distance(DOWNTOWN_SB, MONTECITO, DistanceUnit::Kilometers);
        assert!((km / miles - 1.609).abs() < 0.01, "ratio {}", km / miles);
    }

    #[test]
    fn new_york_to_los_angeles_is_continental() {
        let miles = distance(
            Coordinate::new(40.712_8, -74.006_0),
            Coordinate::new(34.052_2, -118.243_7),
            DistanceUnit::Miles,
        );
        assert!((2440.0..=2460.0).contains(&miles), "got {miles}");
    }

    #[test]
    fn result_is_rounded_to_hundredths() {
        let miles = distance(DOWNTOWN_SB, MONTECITO, DistanceUnit::Miles);
        assert_eq!((miles * 100.0).round() / 100.0, miles);
    }
}
