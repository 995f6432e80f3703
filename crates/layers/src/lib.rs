//! The float marker layer: which records are visible and how the viewport's
//! markers are kept in sync with them.

pub mod filter;
pub mod floats;
pub mod symbology;

pub use filter::*;
pub use floats::*;
pub use symbology::*;
