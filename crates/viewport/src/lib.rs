//! Map viewport: exclusive owner of the renderer instance and the camera.
//!
//! Other components reach the renderer only through [`MapViewport`] methods,
//! so the mount/teardown lifecycle is enforced in one place.

pub mod camera;
pub mod headless;
pub mod renderer;
pub mod viewport;

pub use camera::*;
pub use renderer::*;
pub use viewport::*;
