use crate::geometry::{Bounds, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Screen size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Pan/zoom state: `screen = graph * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f32, y: f32, k: f32) -> Self {
        Self {
            x,
            y,
            k: clamp_zoom(k),
        }
    }

    pub fn apply(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    pub fn invert(&self, point: Vec2) -> Vec2 {
        Vec2::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }

    /// Multiply the zoom by `factor`, keeping the graph point under the
    /// screen `anchor` fixed. A NaN factor leaves the transform unchanged.
    pub fn scale_by(&self, factor: f32, anchor: Vec2) -> Self {
        if factor.is_nan() {
            return *self;
        }
        let k = clamp_zoom(self.k * factor);
        let graph_point = self.invert(anchor);
        Self {
            x: anchor.x - graph_point.x * k,
            y: anchor.y - graph_point.y * k,
            k,
        }
    }

    pub fn translate_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }

    /// Transform placing the graph `point` at the viewport center.
    pub fn centered_on(point: Vec2, k: f32, viewport: Viewport) -> Self {
        let k = clamp_zoom(k);
        let center = viewport.center();
        Self {
            x: center.x - point.x * k,
            y: center.y - point.y * k,
            k,
        }
    }

    /// Transform fitting `bounds` inside the viewport with `padding` pixels
    /// on every side. Never zooms past 1.0.
    pub fn fit(bounds: Bounds, viewport: Viewport, padding: f32) -> Self {
        let usable_w = (viewport.width - 2.0 * padding).max(1.0);
        let usable_h = (viewport.height - 2.0 * padding).max(1.0);
        let k = (usable_w / bounds.width().max(1.0))
            .min(usable_h / bounds.height().max(1.0))
            .min(1.0);
        Self::centered_on(bounds.center(), k, viewport)
    }

    pub fn interpolate(from: Self, to: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: from.x + (to.x - from.x) * t,
            y: from.y + (to.y - from.y) * t,
            k: from.k + (to.k - from.k) * t,
        }
    }
}

/// Clamp a zoom level into `[MIN_ZOOM, MAX_ZOOM]`. Infinities saturate;
/// NaN falls back to 1.0.
pub fn clamp_zoom(k: f32) -> f32 {
    if k.is_nan() {
        1.0
    } else {
        k.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Zoom factor for a wheel delta; positive deltas zoom out.
pub fn wheel_zoom_factor(delta_y: f32) -> f32 {
    2f32.powf(-delta_y * 0.002)
}
