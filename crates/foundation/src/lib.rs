pub mod bounds;
pub mod handles;
pub mod math;
pub mod range;
pub mod shapes;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use handles::*;
pub use math::{LatLon, haversine_m};
pub use range::*;
pub use shapes::*;
