pub(crate) mod frame;
pub(crate) mod mask;
pub(crate) mod pixels;
pub(crate) mod placement;
pub(crate) mod renderer;
