use crate::animation::ease::Ease;
use crate::assets::silhouette::SILHOUETTE_CENTER;
use crate::flock::generator::Raven;
use crate::foundation::core::{Affine, Vec2};
use std::f64::consts::{PI, TAU};

/// Where and how one raven is stamped at a given moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RavenPose {
    /// Raven-local progress in `[0, 1]` after its start delay.
    pub local_t: f64,
    /// Horizontal center in surface pixels.
    pub x: f64,
    /// Vertical center in surface pixels.
    pub y: f64,
    /// Uniform scale applied to the authored silhouette.
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
}

impl RavenPose {
    /// Compute the pose of `raven` at eased flock progress `eased`.
    ///
    /// `speed` scales the interpolation factor rather than elapsed time, so fast ravens can travel
    /// past `end_x` before their local progress reaches 1.
    pub fn at(raven: &Raven, eased: f64) -> Self {
        let span = 1.0 - raven.delay;
        let local_t = if span > 0.0 {
            ((eased - raven.delay) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let x = raven.start_x + (raven.end_x - raven.start_x) * local_t * raven.speed;
        let y = raven.y
            + (local_t * TAU + raven.wobble_phase).sin() * (8.0 + 18.0 * (1.0 - raven.size));
        let scale = (0.25 + 0.25 * raven.size) * (0.5 + 0.5 * (0.7 + 0.3 * local_t));
        let rotation = raven.rotation + (local_t * 3.0 * PI + raven.wobble_phase).sin() * 0.12;
        Self {
            local_t,
            x,
            y,
            scale,
            rotation,
        }
    }

    /// Silhouette-space to surface-space transform: `translate * rotate * scale * recenter`.
    pub fn stamp_transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(-SILHOUETTE_CENTER.to_vec2())
    }
}

/// Poses for every raven of a flock at normalized transition time `t`, in paint order.
pub fn flock_poses(
    ravens: &[Raven],
    t: f64,
    ease: Ease,
) -> impl Iterator<Item = RavenPose> + '_ {
    let eased = ease.apply(t);
    ravens.iter().map(move |r| RavenPose::at(r, eased))
}

/// Stamp every pose of the flock onto a cleared render context as opaque white silhouettes.
///
/// The caller owns clearing the destination pixmap and rendering the context into it.
pub(crate) fn stamp_flock(
    ctx: &mut vello_cpu::RenderContext,
    silhouette: &vello_cpu::kurbo::BezPath,
    ravens: &[Raven],
    t: f64,
    ease: Ease,
) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    for pose in flock_poses(ravens, t, ease) {
        ctx.set_transform(affine_to_cpu(pose.stamp_transform()));
        ctx.fill_path(silhouette);
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(
    path: &crate::foundation::core::BezPath,
) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
