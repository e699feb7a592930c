//! Placement: turning a raster's natural size and a layer's anchor fields into a canvas rectangle.

pub(crate) mod placement;
