//! Kakao Local API response types.
//!
//! Coordinates arrive as decimal strings (`x` is longitude, `y` latitude).
//! Documents whose coordinates do not parse or fall out of range are
//! skipped rather than failing the whole response.
//!
//! See: <https://developers.kakao.com/docs/latest/en/local/dev-guide>

use courier_core::{Coordinate, Place};
use serde::Deserialize;

/// Response of `/v2/local/search/keyword.json`.
#[derive(Debug, Deserialize)]
pub struct KeywordResponse {
    #[serde(default)]
    pub documents: Vec<KeywordDocument>,
}

/// A business or landmark matching the keyword.
#[derive(Debug, Deserialize)]
pub struct KeywordDocument {
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub address_name: String,
    #[serde(default)]
    pub road_address_name: String,
    pub x: String,
    pub y: String,
}

/// Response of `/v2/local/search/address.json`.
#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    #[serde(default)]
    pub documents: Vec<AddressDocument>,
}

/// A postal address matching the query.
#[derive(Debug, Deserialize)]
pub struct AddressDocument {
    #[serde(default)]
    pub address_name: String,
    pub road_address: Option<NamedAddress>,
    pub x: String,
    pub y: String,
}

/// Any Kakao address object; only the formatted name is used.
#[derive(Debug, Deserialize)]
pub struct NamedAddress {
    #[serde(default)]
    pub address_name: String,
}

/// Response of `/v2/local/geo/coord2address.json`.
#[derive(Debug, Deserialize)]
pub struct Coord2AddressResponse {
    #[serde(default)]
    pub documents: Vec<Coord2AddressDocument>,
}

/// Addresses known for a coordinate.
#[derive(Debug, Deserialize)]
pub struct Coord2AddressDocument {
    pub road_address: Option<NamedAddress>,
    pub address: Option<NamedAddress>,
}

impl KeywordResponse {
    /// Convert documents into places, road address first.
    pub fn into_places(self) -> Vec<Place> {
        self.documents
            .into_iter()
            .filter_map(|doc| {
                let location = parse_location(&doc.x, &doc.y)?;
                let address = first_non_empty([
                    &doc.road_address_name,
                    &doc.address_name,
                    &doc.place_name,
                ])?;
                let name = first_non_empty([&doc.place_name, &address])?;
                Some(Place {
                    name,
                    address,
                    location,
                })
            })
            .collect()
    }
}

impl AddressResponse {
    /// Convert documents into places named after their lot address.
    pub fn into_places(self) -> Vec<Place> {
        self.documents
            .into_iter()
            .filter_map(|doc| {
                let location = parse_location(&doc.x, &doc.y)?;
                let road = doc
                    .road_address
                    .map(|road| road.address_name)
                    .unwrap_or_default();
                let address = first_non_empty([&road, &doc.address_name])?;
                let name = first_non_empty([&doc.address_name, &address])?;
                Some(Place {
                    name,
                    address,
                    location,
                })
            })
            .collect()
    }
}

impl Coord2AddressResponse {
    /// Road address of the first document, else its lot address.
    pub fn into_address(self) -> Option<String> {
        let doc = self.documents.into_iter().next()?;
        let road = doc.road_address.map(|a| a.address_name).unwrap_or_default();
        let lot = doc.address.map(|a| a.address_name).unwrap_or_default();
        first_non_empty([&road, &lot])
    }
}

pub(crate) fn parse_location(x: &str, y: &str) -> Option<Coordinate> {
    let lng = x.trim().parse::<f64>().ok()?;
    let lat = y.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lng)
        .inspect_err(|err| log::debug!("skipping geocoding result: {err}"))
        .ok()
}

fn first_non_empty<const N: usize>(candidates: [&String; N]) -> Option<String> {
    candidates
        .into_iter()
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keyword_documents_prefer_road_address() {
        let json = r#"{
            "meta": {"total_count": 1},
            "documents": [{
                "place_name": "Seoul City Hall",
                "address_name": "Seoul Jung-gu Taepyeongno 1-ga 31",
                "road_address_name": "Seoul Jung-gu Sejong-daero 110",
                "x": "126.97794",
                "y": "37.56648"
            }]
        }"#;
        let response: KeywordResponse = serde_json::from_str(json).expect("should deserialise");
        let places = response.into_places();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Seoul City Hall");
        assert_eq!(places[0].address, "Seoul Jung-gu Sejong-daero 110");
        assert_eq!(places[0].location.lat(), 37.56648);
        assert_eq!(places[0].location.lng(), 126.97794);
    }

    #[rstest]
    fn keyword_documents_fall_back_to_lot_address() {
        let json = r#"{"documents": [{
            "place_name": "Market",
            "address_name": "Jongno-gu Yeji-dong 6-1",
            "road_address_name": "",
            "x": "127.0", "y": "37.57"
        }]}"#;
        let response: KeywordResponse = serde_json::from_str(json).expect("should deserialise");
        let places = response.into_places();
        assert_eq!(places[0].address, "Jongno-gu Yeji-dong 6-1");
    }

    #[rstest]
    #[case("abc", "37.5")]
    #[case("127.0", "")]
    #[case("127.0", "95.0")]
    fn unusable_coordinates_are_skipped(#[case] x: &str, #[case] y: &str) {
        let json = serde_json::json!({
            "documents": [{ "place_name": "Bad", "x": x, "y": y }]
        });
        let response: KeywordResponse = serde_json::from_value(json).expect("should deserialise");
        assert!(response.into_places().is_empty());
    }

    #[rstest]
    fn address_documents_use_road_address_when_present() {
        let json = r#"{"documents": [{
            "address_name": "Gangnam-gu Yeoksam-dong 737",
            "road_address": {"address_name": "Gangnam-gu Teheran-ro 152"},
            "x": "127.0364", "y": "37.5002"
        }]}"#;
        let response: AddressResponse = serde_json::from_str(json).expect("should deserialise");
        let places = response.into_places();
        assert_eq!(places[0].name, "Gangnam-gu Yeoksam-dong 737");
        assert_eq!(places[0].address, "Gangnam-gu Teheran-ro 152");
    }

    #[rstest]
    fn address_documents_without_road_address_use_lot_address() {
        let json = r#"{"documents": [{
            "address_name": "Jeju-si Aewol-eup 1",
            "road_address": null,
            "x": "126.33", "y": "33.46"
        }]}"#;
        let response: AddressResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.into_places()[0].address, "Jeju-si Aewol-eup 1");
    }

    #[rstest]
    #[case(
        r#"{"documents":[{"road_address":{"address_name":"Sejong-daero 110"},"address":{"address_name":"Taepyeongno 31"}}]}"#,
        Some("Sejong-daero 110")
    )]
    #[case(
        r#"{"documents":[{"road_address":null,"address":{"address_name":"Taepyeongno 31"}}]}"#,
        Some("Taepyeongno 31")
    )]
    #[case(r#"{"documents":[]}"#, None)]
    #[case(r#"{"documents":[{"road_address":null,"address":null}]}"#, None)]
    fn reverse_lookup_prefers_road_address(#[case] json: &str, #[case] expected: Option<&str>) {
        let response: Coord2AddressResponse =
            serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.into_address().as_deref(), expected);
    }
}
