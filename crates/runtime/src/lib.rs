pub mod queue;
pub mod trace;

pub use queue::*;
pub use trace::*;
