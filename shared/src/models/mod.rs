//! Domain models for the Maize Advisor

mod farmer;
mod rainfall;
mod recommendation;
mod soil;

pub use farmer::*;
pub use rainfall::*;
pub use recommendation::*;
pub use soil::*;
