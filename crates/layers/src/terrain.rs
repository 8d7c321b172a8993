use crate::layer::SourceSpec;
use crate::surface::{MapSurface, SurfaceError};

pub const DEM_SOURCE_ID: &str = "mapbox-dem";
pub const DEM_URL: &str = "mapbox://mapbox.mapbox-terrain-dem-v1";
pub const TERRAIN_EXAGGERATION: f64 = 1.5;

/// 3D terrain, installed once the map reports it has loaded.
pub fn enable_terrain<S: MapSurface + ?Sized>(surface: &S) -> Result<(), SurfaceError> {
    if !surface.has_source(DEM_SOURCE_ID)? {
        surface.add_source(
            DEM_SOURCE_ID,
            &SourceSpec::RasterDem {
                url: DEM_URL.to_string(),
                tile_size: 512,
                max_zoom: 14,
            },
        )?;
    }
    surface.set_terrain(DEM_SOURCE_ID, TERRAIN_EXAGGERATION)
}
