//! Read-boundary normalization of persisted block content.
//!
//! Location content has two persisted shapes: the canonical
//! `{mainLocation, alternativeLocations}` pair and an older flat shape where
//! the single location's fields sit directly on the content object. Both are
//! mapped to [`LocationContent`] here, once, when data is read. Writes always
//! use the canonical shape, so legacy data is never written back.
//!
//! The other block types have not changed schema. They are decoded with
//! field defaults; keys this client does not model are carried along in each
//! payload's `extra` map so a later write preserves them.
//!
//! Decoding never fails. A field whose value has the wrong type (a string
//! `price_level`, an unknown divider style) is dropped and takes its default,
//! with a `warn!` naming the field; the rest of the payload is kept. Content
//! that is not a JSON object at all becomes the registry default.
//!
//! Normalization is idempotent: feeding the JSON form of a normalized value
//! back in produces the same value.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::registry::default_content;
use crate::{BlockContent, BlockType, Location, LocationContent};

const MAIN_KEY: &str = "mainLocation";
const ALTERNATIVES_KEY: &str = "alternativeLocations";

/// Convert raw (possibly legacy) location content into canonical form.
pub fn normalize_location(raw: &Value) -> LocationContent {
    let Some(object) = raw.as_object() else {
        if !raw.is_null() {
            warn!("location content is not an object ({raw}), using default");
        }
        return LocationContent::default();
    };

    if object.is_empty() {
        return LocationContent::default();
    }

    if object.contains_key(MAIN_KEY) || object.contains_key(ALTERNATIVES_KEY) {
        let main_location = object.get(MAIN_KEY).map(decode_location).unwrap_or_default();
        let alternative_locations = match object.get(ALTERNATIVES_KEY) {
            Some(Value::Array(items)) => items.iter().map(decode_location).collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!("alternativeLocations is not an array ({other}), dropping");
                Vec::new()
            }
        };
        return LocationContent {
            main_location,
            alternative_locations,
        };
    }

    // Legacy flat shape: the object itself is the only location
    if Location::FIELD_NAMES.iter().any(|key| object.contains_key(*key)) {
        return LocationContent::new(decode_location(raw));
    }

    warn!("location content has no recognizable fields, using default");
    LocationContent::default()
}

/// Normalize raw persisted content for a block of `block_type`.
///
/// `null` or non-object content yields the registry default for the type.
pub fn normalize_content(block_type: BlockType, raw: &Value) -> BlockContent {
    if block_type.needs_normalization() {
        return BlockContent::Location(normalize_location(raw));
    }
    let Some(object) = raw.as_object() else {
        if !raw.is_null() {
            warn!(%block_type, "content is not an object ({raw}), using default");
        }
        return default_content(block_type);
    };
    if let Ok(content) = BlockContent::from_json(block_type, raw.clone()) {
        return content;
    }

    match block_type {
        BlockType::Title => BlockContent::Title(decode_fields(block_type, object)),
        BlockType::Text => BlockContent::Text(decode_fields(block_type, object)),
        BlockType::PhotoText => BlockContent::PhotoText(decode_fields(block_type, object)),
        BlockType::Slide => BlockContent::Slide(decode_fields(block_type, object)),
        BlockType::ThreeColumns => BlockContent::ThreeColumns(decode_fields(block_type, object)),
        BlockType::Photo => BlockContent::Photo(decode_fields(block_type, object)),
        BlockType::Divider => BlockContent::Divider(decode_fields(block_type, object)),
        BlockType::Location => BlockContent::Location(normalize_location(raw)),
    }
}

fn decode_location(value: &Value) -> Location {
    match value {
        Value::Null => Location::default(),
        Value::Object(object) => decode_fields(BlockType::Location, object),
        other => {
            warn!("location entry is not an object ({other}), replacing with default");
            Location::default()
        }
    }
}

/// Decode `object` as `T`, dropping any field that does not fit.
///
/// Fields are admitted one at a time; a field whose addition makes the
/// decode fail is left out and takes its default.
fn decode_fields<T>(block_type: BlockType, object: &Map<String, Value>) -> T
where
    T: DeserializeOwned + Default,
{
    let whole = Value::Object(object.clone());
    if let Ok(decoded) = T::deserialize(&whole) {
        return decoded;
    }

    let mut fields = Map::new();
    for (key, value) in object {
        fields.insert(key.clone(), value.clone());
        let candidate = Value::Object(fields.clone());
        if let Err(e) = T::deserialize(&candidate) {
            warn!(%block_type, field = %key, "dropping undecodable field ({e})");
            fields.remove(key);
        }
    }
    T::deserialize(&Value::Object(fields)).unwrap_or_default()
}
