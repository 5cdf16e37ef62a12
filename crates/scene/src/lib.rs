pub mod components;
pub mod feature;
pub mod picking;
pub mod selection;

pub use feature::*;
pub use selection::*;
