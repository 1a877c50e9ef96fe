use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{RavenError, RavenResult};
use std::sync::Arc;

/// A pre-decoded raster image ready to be painted onto a surface.
///
/// Pixels are stored once as a premultiplied `vello_cpu` pixmap and shared between clones, so
/// handing the same image to several sessions does not copy pixel data.
#[derive(Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RasterImage {
    /// Build an image from tightly packed premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: &[u8]) -> RavenResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        if bytes.len() != (width as usize) * (height as usize) * 4 {
            return Err(RavenError::validation(format!(
                "image byte length {} does not match {width}x{height} rgba8",
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| {
                vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
            })
            .collect::<Vec<_>>();
        let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(vello_cpu::Pixmap::from_parts_with_opacity(
                pixels,
                w,
                h,
                may_have_opacities,
            )),
        })
    }

    /// Build an image from straight-alpha RGBA8 bytes (as produced by most decoders).
    pub fn from_straight_rgba8(width: u32, height: u32, mut bytes: Vec<u8>) -> RavenResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(width, height, &bytes)
    }

    /// A uniformly colored image.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> RavenResult<Self> {
        checked_dims(width, height)?;
        let px = color.to_array();
        let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
        for c in bytes.chunks_exact_mut(4) {
            c.copy_from_slice(&px);
        }
        Self::from_premul_rgba8(width, height, &bytes)
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixel bytes.
    pub fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Return `true` when both handles share the same pixel storage.
    pub fn same_pixels(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap)
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

fn checked_dims(width: u32, height: u32) -> RavenResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(RavenError::validation(format!(
            "image must have non-zero dimensions, got {width}x{height}"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| RavenError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RavenError::validation("image height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
