//! # Desired visual state and reconciliation
//!
//! Nothing in the site logic writes to the page directly. Handlers build a
//! `VisualState` per element (the classes that must be on or off, the inline
//! styles that must hold) and hand it to the `Reconciler`, which remembers
//! what it last applied and only forwards differences to the
//! `RenderSurface`. Applying the same state twice is a no-op.
//!
//! Classes and styles a state does not mention are left alone, so several
//! handlers can own different aspects of one element.

use std::collections::HashMap;

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::error::Result;
use crate::geometry::Transform;

new_key_type! {
    /// Handle to a page element owned by the render surface.
    pub struct ElementId;
}

pub mod class {
    pub const ACTIVE: &str = "active";
    pub const VISIBLE: &str = "visible";
    pub const FADE_IN: &str = "fade-in";
    pub const MENU_OPEN: &str = "menu-open";
    pub const TOUCH_ACTIVE: &str = "touch-active";
    pub const TOAST: &str = "toast";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProp {
    Transform,
    Opacity,
    Background,
    BoxShadow,
    Transition,
}

impl StyleProp {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProp::Transform => "transform",
            StyleProp::Opacity => "opacity",
            StyleProp::Background => "background",
            StyleProp::BoxShadow => "box-shadow",
            StyleProp::Transition => "transition",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The presentation primitives the site needs from a page.
pub trait RenderSurface {
    fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()>;
    fn set_style(&mut self, el: ElementId, prop: StyleProp, value: &str) -> Result<()>;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
    /// Appends a fresh toast element carrying `message` and returns it.
    fn create_toast(&mut self, message: &str) -> Result<ElementId>;
    fn remove_element(&mut self, el: ElementId);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualState {
    pub classes: SmallVec<[(&'static str, bool); 4]>,
    pub styles: SmallVec<[(StyleProp, String); 4]>,
}

impl VisualState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, name: &'static str, on: bool) -> Self {
        self.classes.retain(|(c, _)| *c != name);
        self.classes.push((name, on));
        self
    }

    pub fn style(mut self, prop: StyleProp, value: impl Into<String>) -> Self {
        self.styles.retain(|(p, _)| *p != prop);
        self.styles.push((prop, value.into()));
        self
    }

    pub fn transform(self, t: Transform) -> Self {
        self.style(StyleProp::Transform, t.to_css())
    }

    pub fn opacity(self, v: f64) -> Self {
        self.style(StyleProp::Opacity, v.to_string())
    }
}

#[derive(Default)]
struct Applied {
    classes: HashMap<&'static str, bool>,
    styles: HashMap<StyleProp, String>,
}

#[derive(Default)]
pub struct Reconciler {
    applied: HashMap<ElementId, Applied>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes reached the surface.
    pub fn apply(
        &mut self,
        surface: &mut dyn RenderSurface,
        el: ElementId,
        desired: &VisualState,
    ) -> usize {
        let applied = self.applied.entry(el).or_default();
        let mut writes = 0;

        for &(name, on) in &desired.classes {
            if applied.classes.get(name) == Some(&on) {
                continue;
            }
            match surface.set_class(el, name, on) {
                Ok(()) => {
                    applied.classes.insert(name, on);
                    writes += 1;
                }
                Err(e) => log::debug!("class `{name}` not applied: {e}"),
            }
        }

        for (prop, value) in &desired.styles {
            if applied.styles.get(prop) == Some(value) {
                continue;
            }
            match surface.set_style(el, *prop, value) {
                Ok(()) => {
                    applied.styles.insert(*prop, value.clone());
                    writes += 1;
                }
                Err(e) => log::debug!("style `{}` not applied: {e}", prop.css_name()),
            }
        }

        writes
    }

    /// Applies several elements' states within one synchronous call, so the
    /// page never renders a frame that holds only part of the batch.
    pub fn apply_batch(
        &mut self,
        surface: &mut dyn RenderSurface,
        batch: &[(ElementId, VisualState)],
    ) -> usize {
        batch
            .iter()
            .map(|(el, state)| self.apply(surface, *el, state))
            .sum()
    }

    /// Drops remembered state, e.g. after the element left the page.
    pub fn forget(&mut self, el: ElementId) {
        self.applied.remove(&el);
    }

    pub fn class_of(&self, el: ElementId, name: &str) -> Option<bool> {
        self.applied.get(&el)?.classes.get(name).copied()
    }

    pub fn style_of(&self, el: ElementId, prop: StyleProp) -> Option<&str> {
        self.applied.get(&el)?.styles.get(&prop).map(String::as_str)
    }
}
