use crate::animation::ease::Ease;
use crate::assets::raster::RasterImage;
use crate::assets::silhouette::Silhouette;
use crate::flock::generator::Flock;
use crate::foundation::core::Canvas;
use crate::foundation::error::{RavenError, RavenResult};
use crate::foundation::math::unit_to_u8;
use crate::render::frame::FrameRGBA;
use crate::render::mask::{affine_to_cpu, bezpath_to_cpu, stamp_flock};
use crate::render::pixels::{
    AlphaBlur, alpha_coverage, clear_to_transparent, destination_in, overlay_uniform,
    premul_over_in_place,
};
use crate::render::placement::contained_fit;

/// Normalized time after which the closing black overlay starts.
pub const FADE_START: f64 = 0.85;
/// Opacity of the closing overlay at `t = 1`.
pub const FADE_MAX_OPACITY: f64 = 0.9;

/// Opacity of the closing black overlay at normalized time `t`.
pub fn fade_opacity(t: f64) -> f64 {
    if t <= FADE_START {
        return 0.0;
    }
    ((t - FADE_START) / (1.0 - FADE_START)).clamp(0.0, 1.0) * FADE_MAX_OPACITY
}

/// Options for [`FrameRenderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererOpts {
    /// Curve mapping transition time to flock progress.
    pub ease: Ease,
    /// Gaussian sigma (pixels) used to soften silhouette edges on the mask; `0` disables.
    pub mask_blur_sigma: f64,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            ease: Ease::InOutCubic,
            mask_blur_sigma: 0.8,
        }
    }
}

/// Everything a frame draws from, borrowed for the duration of one render.
#[derive(Clone, Copy, Debug)]
pub struct FrameScene<'a> {
    /// Source image, visible wherever the mask is empty.
    pub image_a: Option<&'a RasterImage>,
    /// Destination image, revealed through the mask.
    pub image_b: Option<&'a RasterImage>,
    /// Flock driving the mask.
    pub flock: &'a Flock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Surface {
    Primary,
    Mask,
    CompositedB,
}

/// CPU frame renderer owning the primary, mask and composited-B surfaces.
///
/// Only [`FrameRenderer::render_frame`] mutates the surfaces; readers get copies through
/// [`FrameRenderer::frame`].
pub struct FrameRenderer {
    canvas: Canvas,
    opts: RendererOpts,
    primary: vello_cpu::Pixmap,
    mask: vello_cpu::Pixmap,
    composited_b: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    silhouette: vello_cpu::kurbo::BezPath,
    blur: Option<AlphaBlur>,
    last_t: Option<f64>,
}

impl FrameRenderer {
    /// Allocate surfaces for `canvas` and stamp ravens with the built-in silhouette.
    pub fn new(canvas: Canvas, opts: RendererOpts) -> RavenResult<Self> {
        Self::with_silhouette(canvas, opts, &Silhouette::raven()?)
    }

    /// Allocate surfaces for `canvas` and stamp ravens with `silhouette`.
    pub fn with_silhouette(
        canvas: Canvas,
        opts: RendererOpts,
        silhouette: &Silhouette,
    ) -> RavenResult<Self> {
        let (w, h) = canvas.edges_u16()?;
        canvas.validate()?;
        let blur = AlphaBlur::new(opts.mask_blur_sigma)?;
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            blur_radius = blur.as_ref().map_or(0, AlphaBlur::radius),
            "renderer surfaces allocated"
        );
        Ok(Self {
            canvas,
            opts,
            primary: vello_cpu::Pixmap::new(w, h),
            mask: vello_cpu::Pixmap::new(w, h),
            composited_b: vello_cpu::Pixmap::new(w, h),
            ctx: None,
            silhouette: bezpath_to_cpu(silhouette.path()),
            blur,
            last_t: None,
        })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Renderer options.
    pub fn opts(&self) -> RendererOpts {
        self.opts
    }

    /// Normalized time of the most recent render, if any.
    pub fn last_t(&self) -> Option<f64> {
        self.last_t
    }

    /// Reallocate all three surfaces for a new size. The primary surface is left transparent.
    pub fn resize(&mut self, canvas: Canvas) -> RavenResult<()> {
        if canvas == self.canvas {
            return Ok(());
        }
        canvas.validate()?;
        let (w, h) = canvas.edges_u16()?;
        self.primary = vello_cpu::Pixmap::new(w, h);
        self.mask = vello_cpu::Pixmap::new(w, h);
        self.composited_b = vello_cpu::Pixmap::new(w, h);
        self.ctx = None;
        self.canvas = canvas;
        self.last_t = None;
        Ok(())
    }

    /// Render the transition at normalized time `t` onto the primary surface.
    ///
    /// Steps run strictly in order: clear, image A, mask rebuild, masked image B, closing fade.
    /// `t = 0` always yields the rest frame (image A, empty mask).
    pub fn render_frame(&mut self, t: f64, scene: &FrameScene<'_>) -> RavenResult<()> {
        if !t.is_finite() {
            return Err(RavenError::validation(format!(
                "normalized time must be finite, got {t}"
            )));
        }
        let t = t.clamp(0.0, 1.0);

        clear_to_transparent(self.primary.data_as_u8_slice_mut());
        if let Some(a) = scene.image_a {
            self.paint_image(Surface::Primary, a)?;
        }

        self.build_mask(t, scene.flock)?;

        if let Some(b) = scene.image_b {
            clear_to_transparent(self.composited_b.data_as_u8_slice_mut());
            self.paint_image(Surface::CompositedB, b)?;
            destination_in(
                self.composited_b.data_as_u8_slice_mut(),
                self.mask.data_as_u8_slice(),
            )?;
            premul_over_in_place(
                self.primary.data_as_u8_slice_mut(),
                self.composited_b.data_as_u8_slice(),
            )?;
        }

        let fade = fade_opacity(t);
        if fade > 0.0 {
            overlay_uniform(
                self.primary.data_as_u8_slice_mut(),
                [0, 0, 0, unit_to_u8(fade)],
            );
        }

        self.last_t = Some(t);
        Ok(())
    }

    /// Clear the mask and stamp every raven of `flock` at normalized time `t`.
    pub fn build_mask(&mut self, t: f64, flock: &Flock) -> RavenResult<()> {
        clear_to_transparent(self.mask.data_as_u8_slice_mut());
        if flock.is_empty() {
            return Ok(());
        }
        let ease = self.opts.ease;
        self.with_ctx_mut(|this, ctx| {
            stamp_flock(ctx, &this.silhouette, flock.ravens(), t, ease);
            ctx.flush();
            ctx.render_to_pixmap(this.surface_mut(Surface::Mask));
            Ok(())
        })?;
        if let Some(blur) = self.blur.as_mut() {
            blur.apply(
                self.mask.data_as_u8_slice_mut(),
                self.canvas.width,
                self.canvas.height,
            );
        }
        Ok(())
    }

    /// Copy of the primary surface.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.primary.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Fraction of the surface covered by the current mask, in `[0, 1]`.
    pub fn mask_coverage(&self) -> f64 {
        alpha_coverage(self.mask.data_as_u8_slice())
    }

    fn paint_image(&mut self, target: Surface, image: &RasterImage) -> RavenResult<()> {
        let placement = contained_fit(image.width(), image.height(), self.canvas)?;
        let transform = placement.image_transform(image.width(), image.height());
        self.with_ctx_mut(|this, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(image.paint());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(image.width()),
                f64::from(image.height()),
            ));
            ctx.flush();
            ctx.render_to_pixmap(this.surface_mut(target));
            Ok(())
        })
    }

    fn surface_mut(&mut self, s: Surface) -> &mut vello_cpu::Pixmap {
        match s {
            Surface::Primary => &mut self.primary,
            Surface::Mask => &mut self.mask,
            Surface::CompositedB => &mut self.composited_b,
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> RavenResult<R>,
    ) -> RavenResult<R> {
        let (width, height) = self.canvas.edges_u16()?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
