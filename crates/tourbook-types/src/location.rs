//! Location entries and the content of a `location` block.
//!
//! A location block always carries exactly one `mainLocation` plus zero or
//! more `alternativeLocations` the author can promote. Locations are not
//! independently addressable: they live and die with their block.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Highest accepted `price_level` (inclusive).
pub const MAX_PRICE_LEVEL: u8 = 4;

/// A single place within a location block.
///
/// Optional fields serialize as `null` rather than being omitted, so the
/// canonical JSON form always has every key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Free-form time slot, e.g. `"9-10"`.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Photo URIs (usually compressed data URIs).
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Interest tag ids.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    /// 0 (free) to [`MAX_PRICE_LEVEL`].
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub approx_cost: Option<String>,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    /// Unmodeled keys, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    /// Field names that identify a legacy flat location payload.
    pub const FIELD_NAMES: [&'static str; 12] = [
        "time",
        "title",
        "address",
        "description",
        "photos",
        "recommendations",
        "category",
        "interests",
        "price_level",
        "approx_cost",
        "city_id",
        "city_name",
    ];

    /// Location with just a title, everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Content of a `location` block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_location: Location,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternative_locations: Vec<Location>,
}

impl LocationContent {
    pub fn new(main_location: Location) -> Self {
        Self {
            main_location,
            alternative_locations: Vec::new(),
        }
    }

    /// Total number of places (main + alternatives).
    pub fn place_count(&self) -> usize {
        1 + self.alternative_locations.len()
    }
}

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_photos_decode_as_empty() {
        let loc: Location = serde_json::from_value(json!({"title": "Pier", "photos": null})).unwrap();
        assert_eq!(loc.title, "Pier");
        assert!(loc.photos.is_empty());
    }

    #[test]
    fn test_optional_fields_serialize_as_null() {
        let value = serde_json::to_value(Location::titled("Pier")).unwrap();
        assert_eq!(value["city_id"], serde_json::Value::Null);
        assert_eq!(value["city_name"], serde_json::Value::Null);
        assert_eq!(value["photos"], json!([]));
    }

    #[test]
    fn test_content_uses_camel_case_keys() {
        let content = LocationContent::new(Location::titled("Museum"));
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["mainLocation"]["title"], "Museum");
        assert_eq!(value["alternativeLocations"], json!([]));
        assert_eq!(content.place_count(), 1);
    }
}
