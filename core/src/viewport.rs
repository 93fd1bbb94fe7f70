use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Renderable area in device-independent pixels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn scaled(self, factor: u32) -> (u32, u32) {
        (
            self.width.saturating_mul(factor),
            self.height.saturating_mul(factor),
        )
    }
}

/// Sole writer of the [`Viewport`]. Everything else reads copies.
#[derive(Debug)]
pub struct ViewportSizer {
    viewport: Viewport,
}

impl ViewportSizer {
    pub fn new(initial: Viewport) -> Self {
        Self { viewport: initial }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Republishes the container's measured box. A missing or unusable
    /// measurement keeps the previous size. Returns whether the size changed.
    pub fn observe(&mut self, measured: Option<(f64, f64)>) -> bool {
        let Some((width, height)) = measured else {
            warn!("container has no bounding box, keeping {:?}", self.viewport);
            return false;
        };
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            warn!("ignoring container size {width}x{height}");
            return false;
        }
        let next = Viewport::new(width.round() as u32, height.round() as u32);
        if next == self.viewport {
            return false;
        }
        debug!(
            "viewport {}x{} -> {}x{}",
            self.viewport.width, self.viewport.height, next.width, next.height
        );
        self.viewport = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_rounds_measured_box() {
        let mut sizer = ViewportSizer::new(Viewport::square(500));
        assert!(sizer.observe(Some((320.4, 240.6))));
        assert_eq!(sizer.viewport(), Viewport::new(320, 241));
    }

    #[test]
    fn observe_reports_unchanged_size() {
        let mut sizer = ViewportSizer::new(Viewport::square(500));
        assert!(!sizer.observe(Some((500.0, 500.0))));
    }

    #[test]
    fn unusable_measurements_keep_previous_viewport() {
        let mut sizer = ViewportSizer::new(Viewport::new(640, 480));
        assert!(!sizer.observe(None));
        assert!(!sizer.observe(Some((f64::NAN, 10.0))));
        assert!(!sizer.observe(Some((-1.0, 10.0))));
        assert_eq!(sizer.viewport(), Viewport::new(640, 480));
    }

    #[test]
    fn zero_sized_container_is_accepted() {
        let mut sizer = ViewportSizer::new(Viewport::square(500));
        assert!(sizer.observe(Some((0.0, 0.0))));
        assert!(sizer.viewport().is_empty());
    }

    #[test]
    fn scaled_multiplies_both_axes() {
        assert_eq!(Viewport::new(7, 3).scaled(3), (21, 9));
    }
}
