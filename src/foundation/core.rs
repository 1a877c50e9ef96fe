use crate::foundation::error::{RavenError, RavenResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Largest surface edge the CPU rasterizer can address.
pub const MAX_SURFACE_EDGE: u32 = u16::MAX as u32;
/// Largest surface area accepted; each surface holds four bytes per pixel.
pub const MAX_SURFACE_PIXELS: usize = 8192 * 8192;

/// Output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero edges that fit the rasterizer.
    pub fn new(width: u32, height: u32) -> RavenResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Reject zero or oversized dimensions.
    pub fn validate(self) -> RavenResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RavenError::validation(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_SURFACE_EDGE || self.height > MAX_SURFACE_EDGE {
            return Err(RavenError::validation(format!(
                "canvas {}x{} exceeds the {MAX_SURFACE_EDGE}px edge limit",
                self.width, self.height
            )));
        }
        if self.pixel_count() > MAX_SURFACE_PIXELS {
            return Err(RavenError::validation(format!(
                "canvas {}x{} exceeds the {MAX_SURFACE_PIXELS} pixel limit",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width as `f64`.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub(crate) fn edges_u16(self) -> RavenResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| RavenError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| RavenError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channel bytes in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
