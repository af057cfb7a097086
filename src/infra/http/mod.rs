//! HTTP surface.

pub mod middleware;
pub mod public;

pub use public::{HttpState, build_router};
