use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{RavenError, RavenResult};

/// Where an image lands on a surface: top-left corner plus drawn size, in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Left edge (may be negative when the image overflows horizontally).
    pub dx: f64,
    /// Top edge (may be negative when the image overflows vertically).
    pub dy: f64,
    /// Drawn width.
    pub dw: f64,
    /// Drawn height.
    pub dh: f64,
}

impl Placement {
    /// Draw rectangle in surface coordinates.
    pub fn rect(self) -> Rect {
        Rect::new(self.dx, self.dy, self.dx + self.dw, self.dy + self.dh)
    }

    /// Map image pixel space `(0..iw, 0..ih)` onto the draw rectangle.
    pub fn image_transform(self, iw: u32, ih: u32) -> Affine {
        Affine::translate(Vec2::new(self.dx, self.dy))
            * Affine::scale_non_uniform(self.dw / f64::from(iw), self.dh / f64::from(ih))
    }
}

/// Scale an `iw x ih` image uniformly so it covers `canvas`, centered.
///
/// The axis where the image is relatively larger keeps overflowing the surface, so the surface is
/// always fully covered and the other axis is cropped. Zero-sized images are rejected.
pub fn contained_fit(iw: u32, ih: u32, canvas: Canvas) -> RavenResult<Placement> {
    if iw == 0 || ih == 0 {
        return Err(RavenError::validation(format!(
            "cannot place a zero-sized image ({iw}x{ih})"
        )));
    }
    canvas.validate()?;

    let w = canvas.width_f64();
    let h = canvas.height_f64();
    let img_ratio = f64::from(iw) / f64::from(ih);
    let canvas_ratio = w / h;

    let (dw, dh) = if img_ratio > canvas_ratio {
        (h * img_ratio, h)
    } else {
        (w, w / img_ratio)
    };
    Ok(Placement {
        dx: (w - dw) / 2.0,
        dy: (h - dh) / 2.0,
        dw,
        dh,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/placement.rs"]
mod tests;
