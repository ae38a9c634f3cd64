//! Nominatim search response types.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use courier_core::Place;
use serde::Deserialize;

use super::kakao::parse_location;

/// One entry of a `format=json` search response.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub display_name: Option<String>,
    pub lat: String,
    pub lon: String,
}

/// Convert search results into places.
///
/// Nominatim only offers a display name, which doubles as the address.
/// Entries without one are named after the query.
pub fn into_places(results: Vec<NominatimPlace>, query: &str) -> Vec<Place> {
    results
        .into_iter()
        .filter_map(|item| {
            let location = parse_location(&item.lon, &item.lat)?;
            let name = item
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| query.to_owned());
            Some(Place {
                address: name.clone(),
                name,
                location,
            })
        })
        .collect()
}
