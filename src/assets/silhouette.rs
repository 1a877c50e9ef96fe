use crate::foundation::core::{BezPath, Point, Rect};
use crate::foundation::error::{RavenError, RavenResult};
use kurbo::Shape;

/// Edge length of the square box the raven outline is authored in.
pub const SILHOUETTE_BOX: f64 = 512.0;

/// Midpoint of the authoring box; stamps rotate and scale around it.
pub const SILHOUETTE_CENTER: Point = Point::new(SILHOUETTE_BOX / 2.0, SILHOUETTE_BOX / 2.0);

// Raven in flight, facing right: beak, crown, raised wing, tail fan, lowered wing, belly.
const RAVEN_PATH_D: &str = "M496 236 L452 226 \
    C438 212 418 208 400 214 C372 222 350 238 322 246 \
    C292 200 246 120 168 72 C196 138 214 196 226 252 \
    C180 246 120 250 40 262 C92 278 150 286 204 288 \
    C226 318 242 372 236 440 C290 380 318 322 330 290 \
    C362 292 390 286 412 272 C428 262 440 252 452 248 Z";

/// The static raven outline stamped once per flock member.
#[derive(Clone, Debug)]
pub struct Silhouette {
    path: BezPath,
}

impl Silhouette {
    /// Parse the built-in raven outline.
    pub fn raven() -> RavenResult<Self> {
        Self::from_svg_path(RAVEN_PATH_D)
    }

    /// Parse a custom outline from SVG path data authored in the same 512x512 box.
    pub fn from_svg_path(d: &str) -> RavenResult<Self> {
        let path = BezPath::from_svg(d.trim())
            .map_err(|e| RavenError::validation(format!("invalid silhouette path: {e}")))?;
        if path.elements().is_empty() {
            return Err(RavenError::validation("silhouette path is empty"));
        }
        Ok(Self { path })
    }

    /// Outline in authoring coordinates.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Bounding box in authoring coordinates.
    pub fn bounds(&self) -> Rect {
        self.path.bounding_box()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/silhouette.rs"]
mod tests;
