pub mod layer;
pub mod overlay;
pub mod reconciler;
pub mod surface;
pub mod terrain;
pub mod water;

pub use layer::*;
pub use overlay::*;
pub use reconciler::*;
pub use surface::*;
