use crate::visual::{ElementId, RenderSurface, ScrollBehavior, VisualState, class};

/// Floating "back to top" button.
pub struct ScrollTopControl {
    pub element: ElementId,
}

impl ScrollTopControl {
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }

    pub fn state(visible: bool) -> VisualState {
        VisualState::new().class(class::VISIBLE, visible)
    }

    /// Re-activating mid-animation just restarts the browser's smooth scroll.
    pub fn activate(&self, surface: &mut dyn RenderSurface) {
        surface.scroll_to(0.0, ScrollBehavior::Smooth);
    }
}
