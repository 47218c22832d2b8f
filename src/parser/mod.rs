pub mod gpx;
pub mod metadata;
pub mod scan;

#[cfg(test)]
pub(crate) mod fixtures;

pub use gpx::*;
pub use metadata::*;
pub use scan::*;
