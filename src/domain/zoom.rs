use std::fmt;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const DEFAULT_ZOOM: f32 = 1.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Render scale factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Zoom(f32);

impl Zoom {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    pub fn zoom_in(self) -> Self {
        Self::new(Self::snap(self.0 + ZOOM_STEP))
    }

    pub fn zoom_out(self) -> Self {
        Self::new(Self::snap(self.0 - ZOOM_STEP))
    }

    // Keeps repeated steps from drifting (0.1 is not exact in binary).
    fn snap(value: f32) -> f32 {
        (value * 100.0).round() / 100.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
