//! Software pixel operations on premultiplied RGBA8 buffers.
//!
//! These cover the compositing steps the vector rasterizer does not: stencil masking, plain
//! source-over of whole surfaces, the uniform fade overlay and the mask edge blur.

use crate::foundation::error::{RavenError, RavenResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) fn clear_to_transparent(buf: &mut [u8]) {
    buf.fill(0);
}

/// Keep `dst` only where `mask` has alpha coverage ("destination-in").
///
/// Mask color channels are ignored; uncovered pixels become fully transparent and fully covered
/// pixels are left untouched.
pub(crate) fn destination_in(dst: &mut [u8], mask: &[u8]) -> RavenResult<()> {
    check_same_len(dst, mask, "destination_in")?;
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        match m[3] {
            255 => {}
            0 => d.fill(0),
            w => {
                let w16 = u16::from(w);
                for c in d.iter_mut() {
                    *c = mul_div255_u8(u16::from(*c), w16);
                }
            }
        }
    }
    Ok(())
}

/// Source-over of `src` onto `dst`, both premultiplied.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> RavenResult<()> {
    check_same_len(dst, src, "premul_over_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = s[3].saturating_add(mul_div255_u8(d[3] as u16, inv));
        for c in 0..3 {
            let dc = mul_div255_u8(d[c] as u16, inv);
            d[c] = s[c].saturating_add(dc);
        }
    }
    Ok(())
}

/// Source-over of one uniform premultiplied color across the whole buffer.
pub(crate) fn overlay_uniform(dst: &mut [u8], color: [u8; 4]) {
    let sa = u16::from(color[3]);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - sa;
    for d in dst.chunks_exact_mut(4) {
        d[3] = color[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            d[c] = color[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
}

/// Mean alpha coverage in `[0, 1]`.
pub(crate) fn alpha_coverage(buf: &[u8]) -> f64 {
    let px = buf.len() / 4;
    if px == 0 {
        return 0.0;
    }
    let sum: u64 = buf.chunks_exact(4).map(|p| u64::from(p[3])).sum();
    sum as f64 / (px as f64 * 255.0)
}

fn check_same_len(a: &[u8], b: &[u8], what: &str) -> RavenResult<()> {
    if a.len() != b.len() || !a.len().is_multiple_of(4) {
        return Err(RavenError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// Separable Gaussian blur over the alpha plane of a white coverage mask.
#[derive(Debug, Clone)]
pub(crate) struct AlphaBlur {
    kernel_q16: Vec<u32>,
    plane: Vec<u8>,
    tmp: Vec<u8>,
}

impl AlphaBlur {
    /// Build a blur for `sigma` pixels; returns `None` when `sigma` is zero.
    pub(crate) fn new(sigma: f64) -> RavenResult<Option<Self>> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(RavenError::validation(
                "mask blur sigma must be finite and >= 0",
            ));
        }
        if sigma == 0.0 {
            return Ok(None);
        }
        let radius = (sigma * 3.0).ceil().max(1.0) as u32;
        Ok(Some(Self {
            kernel_q16: gaussian_kernel_q16(radius, sigma)?,
            plane: Vec::new(),
            tmp: Vec::new(),
        }))
    }

    pub(crate) fn radius(&self) -> usize {
        self.kernel_q16.len() / 2
    }

    /// Blur alpha in place and rewrite color channels so the mask stays premultiplied white.
    pub(crate) fn apply(&mut self, rgba: &mut [u8], width: u32, height: u32) {
        let n = (width as usize) * (height as usize);
        if rgba.len() != n * 4 || n == 0 {
            return;
        }
        self.plane.clear();
        self.plane.extend(rgba.chunks_exact(4).map(|px| px[3]));
        self.tmp.resize(n, 0);

        horizontal_blur_q16(&self.plane, &mut self.tmp, width, height, &self.kernel_q16);
        vertical_blur_q16(&self.tmp, &mut self.plane, width, height, &self.kernel_q16);

        for (px, &a) in rgba.chunks_exact_mut(4).zip(self.plane.iter()) {
            px.fill(a);
        }
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> RavenResult<Vec<u32>> {
    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(RavenError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push rounding drift into the center tap so the kernel sums to exactly 1.0 in Q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                acc += u64::from(kw) * u64::from(src[row + sx as usize]);
            }
            dst[row + x as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixels.rs"]
mod tests;
