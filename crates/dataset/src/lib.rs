//! Float records and the session dataset.
//!
//! A dataset is produced once per session by a [`FloatSource`] and never
//! mutated afterwards; updates replace it wholesale.

pub mod dataset;
pub mod export;
pub mod generator;
pub mod record;

pub use dataset::*;
pub use export::*;
pub use generator::*;
pub use record::*;
