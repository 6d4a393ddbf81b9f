use serde::{Deserialize, Serialize};

use crate::config::ZoomLimits;

/// Pan/zoom state: `screen = canvas * scale + translate`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    pub fn screen_to_canvas(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        let canvas_x = (screen_x - self.translate_x) / self.scale;
        let canvas_y = (screen_y - self.translate_y) / self.scale;
        (canvas_x, canvas_y)
    }

    pub fn canvas_to_screen(&self, canvas_x: f64, canvas_y: f64) -> (f64, f64) {
        let screen_x = canvas_x * self.scale + self.translate_x;
        let screen_y = canvas_y * self.scale + self.translate_y;
        (screen_x, screen_y)
    }

    /// Zoom one step towards `delta_sign`, keeping the canvas point under the
    /// pointer fixed on screen. A zero or non-finite delta is a no-op.
    pub fn zoom_at(&mut self, pointer_x: f64, pointer_y: f64, delta_sign: f64, limits: &ZoomLimits) {
        if delta_sign == 0.0 || !delta_sign.is_finite() {
            return;
        }
        let (canvas_x, canvas_y) = self.screen_to_canvas(pointer_x, pointer_y);

        self.scale = limits.clamp(self.scale + delta_sign.signum() * limits.step);

        self.translate_x = pointer_x - canvas_x * self.scale;
        self.translate_y = pointer_y - canvas_y * self.scale;
    }

    /// Pan in screen space; the delta is not divided by scale.
    pub fn pan(&mut self, delta_x: f64, delta_y: f64) {
        self.translate_x += delta_x;
        self.translate_y += delta_y;
    }

    pub fn zoom_in(&mut self, limits: &ZoomLimits) {
        self.scale = limits.clamp(self.scale + limits.step);
    }

    pub fn zoom_out(&mut self, limits: &ZoomLimits) {
        self.scale = limits.clamp(self.scale - limits.step);
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// CSS transform for the layer holding node boxes (origin at top-left).
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Bounding rect of the canvas element in client coordinates, supplied by
/// the host for each gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Client (document) coordinates to element-relative screen coordinates.
    /// `None` while the element has no size, e.g. before it is mounted.
    pub fn to_local(&self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((client_x - self.left, client_y - self.top))
    }
}
