use std::collections::BTreeMap;

use foundation::PlaceId;
use serde::{Deserialize, Serialize};

/// Where the client fetches the location hierarchy from.
pub const LOCATIONS_PATH: &str = "/data/locations.json";

/// A selectable place, flattened out of the country/state/city hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(rename = "geoJsonPath")]
    pub geo_json_path: String,
}

impl Place {
    pub fn place_id(&self) -> PlaceId {
        PlaceId::new(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    #[serde(rename = "geoJsonPath")]
    pub geo_json_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
    #[serde(rename = "geoJsonPath")]
    pub geo_json_path: String,
    #[serde(default)]
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(rename = "geoJsonPath")]
    pub geo_json_path: String,
    #[serde(default)]
    pub states: Vec<State>,
}

/// The `locations.json` document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsDocument {
    #[serde(default)]
    pub countries: Vec<Country>,
}

impl LocationsDocument {
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(raw).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    /// Depth-first flattening: each country, then its states, then each state's cities.
    pub fn flatten(&self) -> Vec<Place> {
        let mut out = Vec::new();
        for country in &self.countries {
            out.push(Place {
                id: country.id.clone(),
                name: country.name.clone(),
                geo_json_path: country.geo_json_path.clone(),
            });
            for state in &country.states {
                out.push(Place {
                    id: state.id.clone(),
                    name: state.name.clone(),
                    geo_json_path: state.geo_json_path.clone(),
                });
                for city in &state.cities {
                    out.push(Place {
                        id: city.id.clone(),
                        name: city.name.clone(),
                        geo_json_path: city.geo_json_path.clone(),
                    });
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateId(String),
    Corrupt(String),
    Unavailable(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::DuplicateId(id) => write!(f, "duplicate place id: {id}"),
            CatalogError::Corrupt(msg) => write!(f, "locations document corrupt: {msg}"),
            CatalogError::Unavailable(msg) => write!(f, "locations unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Immutable, flat place catalog.
///
/// Keeps document order for presentation and an id index for lookups.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaceCatalog {
    places: Vec<Place>,
    index: BTreeMap<PlaceId, usize>,
}

impl PlaceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_places(places: Vec<Place>) -> Result<Self, CatalogError> {
        let mut index = BTreeMap::new();
        for (i, place) in places.iter().enumerate() {
            if index.insert(place.place_id(), i).is_some() {
                return Err(CatalogError::DuplicateId(place.id.clone()));
            }
        }
        Ok(Self { places, index })
    }

    pub fn from_document(doc: &LocationsDocument) -> Result<Self, CatalogError> {
        Self::from_places(doc.flatten())
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Self::from_document(&LocationsDocument::from_json(raw)?)
    }

    pub fn get(&self, id: &PlaceId) -> Option<&Place> {
        self.index.get(id).map(|&i| &self.places[i])
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.index.contains_key(id)
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Display label for a selection: known names joined by ", ", unknown ids skipped.
    pub fn label_for(&self, ids: &[PlaceId]) -> String {
        ids.iter()
            .filter_map(|id| self.get(id))
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "countries": [{
            "id": "br", "name": "Brasil", "geoJsonPath": "/data/br.geojson",
            "states": [{
                "id": "sp", "name": "Sao Paulo", "geoJsonPath": "/data/sp.geojson",
                "cities": [
                    { "id": "sp-capital", "name": "Sao Paulo (capital)", "geoJsonPath": "/data/sp-capital.geojson" },
                    { "id": "campinas", "name": "Campinas", "geoJsonPath": "/data/campinas.geojson" }
                ]
            }, {
                "id": "rj", "name": "Rio de Janeiro", "geoJsonPath": "/data/rj.geojson"
            }]
        }]
    }"#;

    #[test]
    fn flattens_depth_first_in_document_order() {
        let catalog = PlaceCatalog::from_json(DOC).unwrap();
        let ids: Vec<&str> = catalog.places().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["br", "sp", "sp-capital", "campinas", "rj"]);
    }

    #[test]
    fn lookup_by_id() {
        let catalog = PlaceCatalog::from_json(DOC).unwrap();
        let rj = catalog.get(&PlaceId::new("rj")).unwrap();
        assert_eq!(rj.geo_json_path, "/data/rj.geojson");
        assert!(catalog.get(&PlaceId::new("mg")).is_none());
    }

    #[test]
    fn missing_levels_are_empty() {
        let catalog = PlaceCatalog::from_json(r#"{"countries":[{"id":"br","name":"Brasil","geoJsonPath":"/b"}]}"#)
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(PlaceCatalog::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_ids_reused_across_levels() {
        let raw = r#"{"countries":[{"id":"df","name":"Brasil","geoJsonPath":"/b",
            "states":[{"id":"df","name":"Distrito Federal","geoJsonPath":"/df"}]}]}"#;
        assert_eq!(
            PlaceCatalog::from_json(raw),
            Err(CatalogError::DuplicateId("df".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            PlaceCatalog::from_json("{\"countries\": 3}"),
            Err(CatalogError::Corrupt(_))
        ));
    }

    #[test]
    fn label_joins_known_names() {
        let catalog = PlaceCatalog::from_json(DOC).unwrap();
        let label = catalog.label_for(&[PlaceId::new("rj"), PlaceId::new("nope"), PlaceId::new("br")]);
        assert_eq!(label, "Rio de Janeiro, Brasil");
    }
}
