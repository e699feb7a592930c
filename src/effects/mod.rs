//! Pixel kernels: blend-mode compositing and stencils.

pub(crate) mod blend;
pub(crate) mod mask;
