//! Links for navigating to and sharing a collection point.

use reqwest::Url;

use crate::model::{CollectionPoint, Coordinate};

const MAP_SEARCH_URL: &str = "https://maps.google.com/";

/// Map-search deep link centered on `coordinate`.
#[must_use]
pub fn directions_url(coordinate: Coordinate) -> Option<Url> {
    let mut url = Url::parse(MAP_SEARCH_URL).ok()?;
    url.set_query(Some(&format!("q={},{}", coordinate.lat, coordinate.lng)));
    Some(url)
}

/// Plain-text message for sharing a point's location.
#[must_use]
pub fn share_text(point: &CollectionPoint) -> String {
    match directions_url(point.coordinate) {
        Some(url) => format!("{} - {} ({url})", point.name, point.address),
        None => format!("{} - {}", point.name, point.address),
    }
}
