//! Resolves "where is the user" into a [`LocationState`].
//!
//! The [`LocationResolver`] turns either a device position or a typed zip
//! code into a normalized location, persists it through a
//! [`findhelp_core::KeyValueStore`], and restores it on the next start.

pub mod error;
pub mod geolocation;
mod persist;
pub mod resolver;
pub mod state;

pub use error::LocationError;
pub use geolocation::{DevicePosition, Geolocator, Permission, StaticGeolocator};
pub use resolver::LocationResolver;
pub use state::{LocationState, PartialAddress, ZipCode};
