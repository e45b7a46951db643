//! Place-search collaborator.
//!
//! Results only ever feed [`Location`](tourbook_blocks::Location) fields via
//! [`Place::to_patch`]; the place schema is not validated beyond defaulting
//! optional fields.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use tourbook_blocks::LocationPatch;

/// A place as returned by the search service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Place {
    pub place_id: String,
    pub title: String,
    pub address: String,
    pub photos: Vec<String>,
    pub price_level: Option<u8>,
    pub approx_cost: Option<String>,
    pub city_id: Option<String>,
    pub city_name: Option<String>,
}

impl Place {
    /// Fields to merge into a location when the author picks this place.
    pub fn to_patch(&self) -> LocationPatch {
        LocationPatch {
            title: Some(self.title.clone()),
            address: Some(self.address.clone()),
            photos: Some(self.photos.iter().filter(|p| !p.is_empty()).cloned().collect()),
            price_level: Some(self.price_level),
            approx_cost: Some(self.approx_cost.clone()),
            city_id: Some(self.city_id.clone()),
            city_name: Some(self.city_name.clone()),
            ..LocationPatch::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaceError {
    #[error("place not found: {0}")]
    NotFound(String),
    #[error("place search failed: {0}")]
    Service(String),
}

/// Search and lookup of places, optionally biased towards a city.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str, city_bias: Option<&str>) -> Result<Vec<Place>, PlaceError>;

    async fn details(&self, place_id: &str) -> Result<Place, PlaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourbook_blocks::{Location, LocationEditor, LocationContent};

    #[test]
    fn test_partial_place_json_defaults() {
        let place: Place = serde_json::from_str(r#"{"place_id": "p1", "title": "Café"}"#).unwrap();
        assert_eq!(place.title, "Café");
        assert!(place.photos.is_empty());
        assert_eq!(place.city_id, None);
    }

    #[test]
    fn test_patch_fills_location_fields_only() {
        let place = Place {
            place_id: "p1".into(),
            title: "Time Out Market".into(),
            address: "Av. 24 de Julho".into(),
            photos: vec!["https://img/1".into(), String::new()],
            price_level: Some(2),
            approx_cost: Some("€15".into()),
            city_id: Some("lis".into()),
            city_name: Some("Lisbon".into()),
        };
        let mut location = Location {
            time: Some("12-13".into()),
            description: Some("lunch".into()),
            ..Location::default()
        };
        place.to_patch().apply_to(&mut location);

        assert_eq!(location.title, "Time Out Market");
        assert_eq!(location.photos, vec!["https://img/1".to_string()]);
        assert_eq!(location.price_level, Some(2));
        assert_eq!(location.city_name.as_deref(), Some("Lisbon"));
        assert_eq!(location.time.as_deref(), Some("12-13"));
        assert_eq!(location.description.as_deref(), Some("lunch"));
    }

    struct OnePlace;

    #[async_trait]
    impl PlaceSearch for OnePlace {
        async fn search(&self, query: &str, _city_bias: Option<&str>) -> Result<Vec<Place>, PlaceError> {
            Ok(vec![Place {
                place_id: "p1".into(),
                title: query.to_string(),
                ..Place::default()
            }])
        }

        async fn details(&self, place_id: &str) -> Result<Place, PlaceError> {
            Err(PlaceError::NotFound(place_id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_search_result_into_selected_alternative() {
        let mut editor = LocationEditor::new(LocationContent::default());
        editor.add_alternative();
        let places = OnePlace.search("Miradouro", Some("lis")).await.unwrap();
        editor.update_current(places[0].to_patch());

        assert_eq!(editor.content().alternative_locations[0].title, "Miradouro");
        assert_eq!(editor.content().main_location.title, "");
        assert!(OnePlace.details("zzz").await.is_err());
    }
}
