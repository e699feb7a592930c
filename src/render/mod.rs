//! Layer rendering and the composition engine.

pub(crate) mod engine;
pub(crate) mod layer;
