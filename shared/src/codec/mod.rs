//! Feature encoding shared by training exports and serving

mod features;
mod scaling;
mod vocabulary;

pub use features::*;
pub use scaling::*;
pub use vocabulary::*;
