pub mod geojson;
pub mod public_config;

pub use geojson::*;
pub use public_config::*;
