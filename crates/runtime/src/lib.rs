pub mod cancel;
pub mod debounce;
pub mod event_bus;

pub use cancel::*;
pub use debounce::*;
pub use event_bus::*;
