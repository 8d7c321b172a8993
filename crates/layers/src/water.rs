use crate::layer::{LayerSpec, SourceSpec};
use crate::surface::{MapSurface, SurfaceError, remove_layer_if_present, remove_source_if_present};

pub const WATER_SOURCE_ID: &str = "water-source";
pub const WATER_LAYER_ID: &str = "water-layer";
pub const WATER_TILES_URL: &str = "mapbox://mapbox.mapbox-streets-v8";

/// Lakes/rivers highlight drawn from the streets vector tiles.
pub fn set_water_visible<S: MapSurface + ?Sized>(surface: &S, visible: bool) -> Result<(), SurfaceError> {
    if visible {
        if !surface.has_source(WATER_SOURCE_ID)? {
            surface.add_source(
                WATER_SOURCE_ID,
                &SourceSpec::Vector {
                    url: WATER_TILES_URL.to_string(),
                },
            )?;
        }
        if !surface.has_layer(WATER_LAYER_ID)? {
            surface.add_layer(
                &LayerSpec::fill(WATER_LAYER_ID, WATER_SOURCE_ID, "#4A90E2", 0.6).with_source_layer("water"),
            )?;
        }
    } else {
        remove_layer_if_present(surface, WATER_LAYER_ID)?;
        remove_source_if_present(surface, WATER_SOURCE_ID)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::InMemorySurface;

    #[test]
    fn toggling_on_twice_adds_once() {
        let map = InMemorySurface::new();
        set_water_visible(&map, true).unwrap();
        set_water_visible(&map, true).unwrap();
        assert_eq!(map.source_ids(), vec![WATER_SOURCE_ID.to_string()]);
        assert_eq!(map.layer_ids(), vec![WATER_LAYER_ID.to_string()]);
        assert_eq!(map.style_mutations(), 2);
    }

    #[test]
    fn toggling_off_removes_layer_before_source() {
        let map = InMemorySurface::new();
        set_water_visible(&map, true).unwrap();
        set_water_visible(&map, false).unwrap();
        assert!(map.source_ids().is_empty());
        assert!(map.layer_ids().is_empty());
        set_water_visible(&map, false).unwrap();
        assert_eq!(map.style_mutations(), 4);
    }
}
