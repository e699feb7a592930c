pub(crate) mod composition;
pub(crate) mod model;
pub(crate) mod params;
