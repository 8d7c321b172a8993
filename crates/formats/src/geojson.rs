use foundation::Aabb2;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    Json(String),
    NotFeatureCollection,
    NoPolygon,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Json(msg) => write!(f, "invalid geojson: {msg}"),
            GeometryError::NotFeatureCollection => write!(f, "geojson is not a FeatureCollection"),
            GeometryError::NoPolygon => write!(f, "geojson has no polygon outer ring"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Boundary geometry of one place.
///
/// `data` is handed to the renderer untouched; the outer rings are kept only
/// to position the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceGeometry {
    pub data: Value,
    outer_rings: Vec<Vec<[f64; 2]>>,
}

impl PlaceGeometry {
    pub fn from_json(raw: &str) -> Result<Self, GeometryError> {
        let data: Value = serde_json::from_str(raw).map_err(|e| GeometryError::Json(e.to_string()))?;
        Self::from_value(data)
    }

    pub fn from_value(data: Value) -> Result<Self, GeometryError> {
        if data.get("type").and_then(|t| t.as_str()) != Some("FeatureCollection") {
            return Err(GeometryError::NotFeatureCollection);
        }
        let features = data
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or(GeometryError::NotFeatureCollection)?;

        let mut outer_rings = Vec::new();
        for feature in features {
            let Some(geometry) = feature.get("geometry") else {
                continue;
            };
            let coords = geometry.get("coordinates");
            match geometry.get("type").and_then(|t| t.as_str()) {
                Some("Polygon") => {
                    if let Some(ring) = coords.and_then(first_ring) {
                        outer_rings.push(ring);
                    }
                }
                Some("MultiPolygon") => {
                    let polygons = coords.and_then(|c| c.as_array()).into_iter().flatten();
                    outer_rings.extend(polygons.filter_map(first_ring));
                }
                _ => {}
            }
        }

        if outer_rings.iter().all(|r| r.is_empty()) {
            return Err(GeometryError::NoPolygon);
        }
        Ok(Self { data, outer_rings })
    }

    pub fn outer_rings(&self) -> &[Vec<[f64; 2]>] {
        &self.outer_rings
    }

    /// Bounds across every polygon's outer ring.
    pub fn bounds(&self) -> Option<Aabb2> {
        let mut out: Option<Aabb2> = None;
        for ring in &self.outer_rings {
            let Some(b) = Aabb2::from_ring(ring) else {
                continue;
            };
            match &mut out {
                Some(acc) => {
                    acc.extend(b.min);
                    acc.extend(b.max);
                }
                None => out = Some(b),
            }
        }
        out
    }
}

fn first_ring(polygon: &Value) -> Option<Vec<[f64; 2]>> {
    let ring = polygon.as_array()?.first()?.as_array()?;
    // Positions may carry a third (altitude) ordinate; only lng/lat matter here.
    Some(
        ring.iter()
            .filter_map(|p| {
                let p = p.as_array()?;
                Some([p.first()?.as_f64()?, p.get(1)?.as_f64()?])
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::LngLat;
    use pretty_assertions::assert_eq;

    fn square() -> &'static str {
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
            "geometry":{"type":"Polygon","coordinates":[[[0,0],[0,2],[2,2],[2,0],[0,0]]]}}]}"#
    }

    #[test]
    fn square_polygon_bounds() {
        let g = PlaceGeometry::from_json(square()).unwrap();
        let b = g.bounds().unwrap();
        assert_eq!(b.corners(), [[0.0, 0.0], [2.0, 2.0]]);
        assert_eq!(b.center(), LngLat::new(1.0, 1.0));
    }

    #[test]
    fn multipolygon_bounds_cover_every_part() {
        let raw = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "geometry":{"type":"MultiPolygon","coordinates":[
                [[[0,0],[0,1],[1,1],[0,0]]],
                [[[5,5,10],[5,6,10],[6,6,10],[5,5,10]]]
            ]}}]}"#;
        let g = PlaceGeometry::from_json(raw).unwrap();
        assert_eq!(g.outer_rings().len(), 2);
        assert_eq!(g.bounds().unwrap().corners(), [[0.0, 0.0], [6.0, 6.0]]);
    }

    #[test]
    fn keeps_raw_document_for_renderer() {
        let g = PlaceGeometry::from_json(square()).unwrap();
        assert_eq!(g.data["features"][0]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn rejects_non_collections_and_point_only_data() {
        assert_eq!(
            PlaceGeometry::from_json(r#"{"type":"Feature"}"#),
            Err(GeometryError::NotFeatureCollection)
        );
        let points = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "geometry":{"type":"Point","coordinates":[1,2]}}]}"#;
        assert_eq!(PlaceGeometry::from_json(points), Err(GeometryError::NoPolygon));
        assert!(matches!(PlaceGeometry::from_json("not json"), Err(GeometryError::Json(_))));
    }
}
