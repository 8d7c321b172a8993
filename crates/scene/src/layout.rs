use std::time::Duration;

/// Width of the navigation drawer.
pub const DRAWER_WIDTH_PX: f64 = 280.0;
/// Viewports narrower than this are laid out as mobile.
pub const MOBILE_BREAKPOINT_PX: f64 = 900.0;
/// Wait for the drawer animation before asking the map to resize.
pub const SIDEBAR_RESIZE_DELAY: Duration = Duration::from_millis(300);

/// Layout state owned by the composition root and passed to whoever needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    sidebar_open: bool,
    controls_open: bool,
    viewport_width_px: f64,
}

impl LayoutState {
    pub fn new(viewport_width_px: f64) -> Self {
        let mut s = Self {
            sidebar_open: false,
            controls_open: true,
            viewport_width_px,
        };
        s.controls_open = !s.is_mobile();
        s
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn controls_open(&self) -> bool {
        self.controls_open
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport_width_px < MOBILE_BREAKPOINT_PX
    }

    /// Flips the sidebar. The map should be resized once the returned delay elapses.
    pub fn toggle_sidebar(&mut self) -> Duration {
        self.sidebar_open = !self.sidebar_open;
        SIDEBAR_RESIZE_DELAY
    }

    pub fn toggle_controls(&mut self) {
        self.controls_open = !self.controls_open;
    }

    /// Crossing the mobile breakpoint resets the controls panel to its default.
    pub fn set_viewport_width(&mut self, width_px: f64) {
        let was_mobile = self.is_mobile();
        self.viewport_width_px = width_px;
        if was_mobile != self.is_mobile() {
            self.controls_open = !self.is_mobile();
        }
    }

    /// Left offset of the main area. On mobile the drawer overlays the content.
    pub fn main_margin_left_px(&self) -> f64 {
        if self.sidebar_open && !self.is_mobile() {
            DRAWER_WIDTH_PX
        } else {
            0.0
        }
    }

    pub fn main_width_css(&self) -> String {
        if self.main_margin_left_px() > 0.0 {
            format!("calc(100vw - {DRAWER_WIDTH_PX}px)")
        } else {
            "100vw".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_sidebar_pushes_content() {
        let mut layout = LayoutState::new(1280.0);
        assert!(layout.controls_open());
        assert_eq!(layout.toggle_sidebar(), SIDEBAR_RESIZE_DELAY);
        assert!(layout.sidebar_open());
        assert_eq!(layout.main_margin_left_px(), 280.0);
        assert_eq!(layout.main_width_css(), "calc(100vw - 280px)");
    }

    #[test]
    fn mobile_sidebar_overlays_content() {
        let mut layout = LayoutState::new(400.0);
        assert!(!layout.controls_open());
        layout.toggle_sidebar();
        assert_eq!(layout.main_margin_left_px(), 0.0);
        assert_eq!(layout.main_width_css(), "100vw");
    }

    #[test]
    fn breakpoint_crossing_resets_controls() {
        let mut layout = LayoutState::new(1280.0);
        layout.toggle_controls();
        layout.set_viewport_width(1000.0);
        assert!(!layout.controls_open());
        layout.set_viewport_width(500.0);
        assert!(!layout.controls_open());
        layout.set_viewport_width(1200.0);
        assert!(layout.controls_open());
    }
}
