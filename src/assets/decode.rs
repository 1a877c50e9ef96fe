use anyhow::Context;

use crate::assets::raster::RasterImage;
use crate::foundation::error::RavenResult;

/// Decode encoded image bytes (PNG, JPEG, ...) into a [`RasterImage`].
///
/// Decoding belongs to the host application; the transition session only ever receives the
/// decoded result.
pub fn decode_image(bytes: &[u8]) -> RavenResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Read and decode an image file.
pub fn load_image(path: impl AsRef<std::path::Path>) -> RavenResult<RasterImage> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
