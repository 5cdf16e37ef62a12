pub mod cursor;
pub mod engine;
pub mod event;
pub mod panel;
pub mod surface;

pub use cursor::*;
pub use engine::*;
pub use event::*;
pub use panel::*;
pub use surface::*;
