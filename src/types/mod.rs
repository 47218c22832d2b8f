pub mod gps;
pub mod track;

pub use gps::*;
pub use track::*;
