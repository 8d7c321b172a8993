pub mod camera;
pub mod layout;
pub mod routes;
pub mod selection;
pub mod weather;

pub use camera::*;
pub use layout::*;
pub use routes::*;
pub use selection::*;
pub use weather::*;
