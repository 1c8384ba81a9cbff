use serde::Deserialize;
use serde_json::Value;

// Address search (GeoJSON features):
// [
//   {
//     "geometry": { "coordinates": [130.4017, 33.5903], "type": "Point" },
//     "type": "Feature",
//     "properties": { "addressCode": "", "title": "福岡県福岡市中央区天神一丁目" }
//   }
// ]

#[derive(Debug, Deserialize)]
pub(crate) struct AddressCandidate {
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<Value>,
}

// Postal-code lookup:
// { "status": 200, "length": 1, "items": [ { "zipcode": "8100001", "address": "..." } ] }

#[derive(Debug, Deserialize)]
pub(crate) struct PostalLookup {
    #[serde(default)]
    pub items: Vec<PostalItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostalItem {
    #[serde(default)]
    pub zipcode: Value,
}

// Postal-code geocoder (coordinates come back as strings):
// { "response": { "location": [ { "x": "130.399", "y": "33.591", "postal": "8100001" } ] } }

#[derive(Debug, Deserialize)]
pub(crate) struct PostalGeocode {
    pub response: PostalGeocodeBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostalGeocodeBody {
    #[serde(default)]
    pub location: Vec<PostalLocation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostalLocation {
    #[serde(default)]
    pub x: Value,
    #[serde(default)]
    pub y: Value,
}

/// Number or numeric string; anything else is `None`.
pub(crate) fn coordinate(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

const POSTAL_CODE_DIGITS: usize = 7;

/// Postal codes arrive as either strings or bare integers; integers lose their
/// leading zeros and get them back here.
pub(crate) fn postal_code(value: &Value) -> Option<String> {
    let code = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_u64() {
            Some(code) => format!("{code:0width$}", width = POSTAL_CODE_DIGITS),
            None => n.to_string(),
        },
        _ => return None,
    };
    (!code.is_empty()).then_some(code)
}
