//! One-shot reveal of regions as they scroll into view.
//!
//! A region reveals the first time its intersection ratio with the
//! (bottom-shrunk) viewport meets the threshold. The verdict can come from
//! geometry (`observe`) or straight from an `IntersectionObserver` entry
//! (`on_intersection`); both end in the same monotonic flag.

use web_time::Duration;

use crate::config::RevealConfig;
use crate::geometry::{Transform, Viewport};
use crate::region::{RegionId, RegionKind, RegionRegistry};
use crate::visual::{ElementId, StyleProp, VisualState, class};

const HIDDEN_OFFSET_PX: f64 = 30.0;
const CHILD_TRANSITION: &str = "all 0.6s ease";

#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredChild {
    pub element: ElementId,
    pub ordinal: usize,
    pub delay: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealEvent {
    pub region: RegionId,
    pub element: ElementId,
    /// Empty unless the region is grouped.
    pub children: Vec<StaggeredChild>,
}

pub struct RevealTracker {
    threshold: f64,
    margin_bottom: f64,
}

impl RevealTracker {
    pub fn new(cfg: &RevealConfig) -> Self {
        Self {
            threshold: cfg.threshold,
            margin_bottom: cfg.margin_bottom,
        }
    }

    pub fn observe(
        &self,
        registry: &mut RegionRegistry,
        id: RegionId,
        viewport: &Viewport,
    ) -> Option<RevealEvent> {
        let region = registry.get(id)?;
        if region.is_revealed() {
            return None;
        }
        let ratio = viewport.intersection_ratio(region.bounds, self.margin_bottom);
        if ratio < self.threshold || ratio <= 0.0 {
            return None;
        }
        self.reveal(registry, id)
    }

    /// Runs `observe` over every region in document order.
    pub fn observe_all(
        &self,
        registry: &mut RegionRegistry,
        viewport: &Viewport,
    ) -> Vec<RevealEvent> {
        let ids: Vec<RegionId> = registry.iter().map(|(id, _)| id).collect();
        ids.into_iter()
            .filter_map(|id| self.observe(registry, id, viewport))
            .collect()
    }

    /// Feeds a browser intersection verdict. The observer is created with our
    /// threshold, so `is_intersecting` already means "crossed it".
    pub fn on_intersection(
        &self,
        registry: &mut RegionRegistry,
        id: RegionId,
        is_intersecting: bool,
    ) -> Option<RevealEvent> {
        if !is_intersecting {
            return None;
        }
        self.reveal(registry, id)
    }

    fn reveal(&self, registry: &mut RegionRegistry, id: RegionId) -> Option<RevealEvent> {
        if !registry.mark_revealed(id) {
            return None;
        }
        let region = registry.get(id)?;
        let children = match &region.kind {
            RegionKind::Plain => Vec::new(),
            RegionKind::Grouped { children, stagger } => children
                .iter()
                .enumerate()
                .map(|(i, &element)| StaggeredChild {
                    element,
                    ordinal: i,
                    delay: *stagger * i as u32,
                })
                .collect(),
        };
        log::debug!(
            "region #{} revealed ({} staggered children)",
            region.ordinal,
            children.len()
        );
        Some(RevealEvent {
            region: id,
            element: region.element,
            children,
        })
    }
}

/// Every tracked region starts faded out.
pub fn initial_region_state() -> VisualState {
    VisualState::new().class(class::FADE_IN, true)
}

pub fn revealed_region_state() -> VisualState {
    VisualState::new().class(class::VISIBLE, true)
}

/// Grouped children wait below their final position until their turn.
pub fn hidden_child_state() -> VisualState {
    VisualState::new()
        .opacity(0.0)
        .transform(Transform::TranslateY(HIDDEN_OFFSET_PX))
        .style(StyleProp::Transition, CHILD_TRANSITION)
}

pub fn revealed_child_state() -> VisualState {
    VisualState::new()
        .opacity(1.0)
        .transform(Transform::TranslateY(0.0))
}
