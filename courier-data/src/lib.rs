//! HTTP adapters for the courier engine's collaborator traits.
//!
//! The core crate only defines [`courier_core::Geocoder`] and
//! [`courier_core::ReverseGeocoder`]. This crate implements them against
//! the Kakao Local API and OpenStreetMap Nominatim.

pub mod geocoding;
