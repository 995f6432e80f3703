//! Interaction on top of the map: AOI drawing, marker picking and the
//! outbound selection edge.

pub mod aoi;
pub mod picking;
pub mod selection;

pub use aoi::*;
pub use picking::*;
pub use selection::*;
