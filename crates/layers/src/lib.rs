pub mod binder;
pub mod interactive;

pub use binder::*;
pub use interactive::*;
