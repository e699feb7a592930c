//! External asset collaborators: fetching images and nested compositions, and caching decoded
//! rasters.

pub(crate) mod cache;
pub(crate) mod fetch;
#[cfg(feature = "http")]
pub(crate) mod http;
