use serde_json::{Value, json};

/// A named data source on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    GeoJson { data: Value },
    Vector { url: String },
    RasterDem { url: String, tile_size: u32, max_zoom: u32 },
}

impl SourceSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSpec::GeoJson { .. } => "geojson",
            SourceSpec::Vector { .. } => "vector",
            SourceSpec::RasterDem { .. } => "raster-dem",
        }
    }

    /// Style-spec JSON as the renderer's `addSource` expects it.
    pub fn to_style_json(&self) -> Value {
        match self {
            SourceSpec::GeoJson { data } => json!({ "type": "geojson", "data": data }),
            SourceSpec::Vector { url } => json!({ "type": "vector", "url": url }),
            SourceSpec::RasterDem {
                url,
                tile_size,
                max_zoom,
            } => json!({
                "type": "raster-dem",
                "url": url,
                "tileSize": tile_size,
                "maxzoom": max_zoom,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Fill { color: String, opacity: f64 },
    Line { color: String, width: f64 },
}

/// A styled layer drawing one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    /// Layer inside a vector tile source, if any.
    pub source_layer: Option<String>,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn fill(id: impl Into<String>, source: impl Into<String>, color: &str, opacity: f64) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_layer: None,
            paint: Paint::Fill {
                color: color.to_string(),
                opacity,
            },
        }
    }

    pub fn line(id: impl Into<String>, source: impl Into<String>, color: &str, width: f64) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_layer: None,
            paint: Paint::Line {
                color: color.to_string(),
                width,
            },
        }
    }

    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        match self.paint {
            Paint::Fill { .. } => "fill",
            Paint::Line { .. } => "line",
        }
    }

    /// Style-spec JSON as the renderer's `addLayer` expects it.
    pub fn to_style_json(&self) -> Value {
        let paint = match &self.paint {
            Paint::Fill { color, opacity } => json!({ "fill-color": color, "fill-opacity": opacity }),
            Paint::Line { color, width } => json!({ "line-color": color, "line-width": width }),
        };
        let mut out = json!({
            "id": self.id,
            "type": self.kind(),
            "source": self.source,
            "paint": paint,
        });
        if let Some(source_layer) = &self.source_layer {
            out["source-layer"] = json!(source_layer);
        }
        out
    }
}
