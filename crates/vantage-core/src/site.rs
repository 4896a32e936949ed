//! # Site
//!
//! `Site` owns every piece of page state and exposes one named handler per
//! browser signal. A runner binds those handlers once at start-up, forwards
//! events with the current time, and calls `tick` when `next_deadline`
//! passes. All presentation goes through the `Reconciler`.
//!
//! ```rust,ignore
//! let mut site = Site::new(SiteConfig::default(), surface);
//! site.mount(layout);
//! // on every scroll event
//! site.on_scroll(window_scroll_y, clock.now());
//! // when the armed timeout fires
//! site.tick(clock.now());
//! ```

use web_time::{Duration, Instant};

use crate::config::SiteConfig;
use crate::geometry::{Bounds, Transform, Viewport};
use crate::menu::{MenuController, MenuElements, MenuInput, MenuState, MenuVisuals};
use crate::region::{RegionId, RegionKind, RegionRegistry, RegionSpec};
use crate::reveal::{self, RevealEvent, RevealTracker};
use crate::scroll::{ParallaxKind, ScrollInputs, ScrollState, ScrollStyle, SectionGeometry};
use crate::scroll_top::ScrollTopControl;
use crate::signal::Signal;
use crate::throttle::FrameThrottle;
use crate::timers::TimerQueue;
use crate::toast::{Notifier, ToastStep};
use crate::visual::{ElementId, Reconciler, RenderSurface, ScrollBehavior, VisualState, class};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerOwner {
    Region(RegionId),
    Press(ElementId),
    Touch(ElementId),
    Toast(ElementId),
    Scroll,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimerAction {
    RevealChild(ElementId),
    RestoreScale(ElementId),
    ReleaseTouch(ElementId),
    Toast(ElementId, ToastStep),
    TrailingScroll,
}

#[derive(Clone, Debug)]
pub struct NavLink {
    pub element: ElementId,
    pub href: String,
}

#[derive(Clone, Copy, Debug)]
pub struct ParallaxTarget {
    pub element: ElementId,
    pub kind: ParallaxKind,
}

/// Everything the runner found on the page. Missing pieces are `None` or
/// empty and the matching behavior is skipped.
#[derive(Clone, Debug, Default)]
pub struct SiteLayout {
    pub navbar: Option<ElementId>,
    pub menu: Option<MenuElements>,
    pub scroll_top: Option<ElementId>,
    pub nav_links: Vec<NavLink>,
    pub sections: Vec<SectionGeometry>,
    pub parallax: Vec<ParallaxTarget>,
    pub regions: Vec<RegionSpec>,
    pub viewport_height: f64,
}

pub struct Site<S: RenderSurface> {
    config: SiteConfig,
    surface: S,
    reconciler: Reconciler,
    regions: RegionRegistry,
    tracker: RevealTracker,
    scroll: ScrollState,
    throttle: FrameThrottle,
    menu: MenuController,
    notifier: Notifier,
    timers: TimerQueue<TimerOwner, TimerAction>,

    navbar: Option<ElementId>,
    menu_elements: Option<MenuElements>,
    scroll_top: Option<ScrollTopControl>,
    nav_links: Vec<NavLink>,
    sections: Vec<SectionGeometry>,
    parallax_elements: Vec<ElementId>,
    parallax_kinds: Vec<ParallaxKind>,
    viewport_height: f64,
    stopped: bool,
}

impl<S: RenderSurface> Site<S> {
    pub fn new(config: SiteConfig, surface: S) -> Self {
        Self {
            tracker: RevealTracker::new(&config.reveal),
            throttle: FrameThrottle::new(config.throttle_interval()),
            notifier: Notifier::new(&config.toast),
            config,
            surface,
            reconciler: Reconciler::new(),
            regions: RegionRegistry::new(),
            scroll: ScrollState::new(),
            menu: MenuController::new(),
            timers: TimerQueue::new(),
            navbar: None,
            menu_elements: None,
            scroll_top: None,
            nav_links: Vec::new(),
            sections: Vec::new(),
            parallax_elements: Vec::new(),
            parallax_kinds: Vec::new(),
            viewport_height: 0.0,
            stopped: false,
        }
    }

    /// Adopts the page layout and applies the initial visual state.
    /// Mounting again re-registers regions. A grouped region that was already
    /// revealed drops its pending child reveals and shows every child at once.
    pub fn mount(&mut self, layout: SiteLayout) {
        self.navbar = layout.navbar;
        self.menu_elements = layout.menu;
        self.scroll_top = layout.scroll_top.map(ScrollTopControl::new);
        self.nav_links = layout.nav_links;
        self.sections = layout.sections;
        (self.parallax_elements, self.parallax_kinds) = layout
            .parallax
            .into_iter()
            .map(|p| (p.element, p.kind))
            .unzip();
        self.viewport_height = layout.viewport_height;

        for spec in layout.regions {
            if let Some(existing) = self.regions.by_element(spec.element) {
                self.timers.cancel_owner(&TimerOwner::Region(existing));
            }
            let element = spec.element;
            let children = match &spec.kind {
                RegionKind::Grouped { children, .. } => children.clone(),
                RegionKind::Plain => Vec::new(),
            };
            let id = self.regions.register(spec);
            let revealed = self.regions.get(id).is_some_and(|r| r.is_revealed());

            self.reconciler
                .apply(&mut self.surface, element, &reveal::initial_region_state());
            // a revealed region never fires again, so its children are shown now
            let child_state = if revealed {
                reveal::revealed_child_state()
            } else {
                reveal::hidden_child_state()
            };
            for child in children {
                self.reconciler.apply(&mut self.surface, child, &child_state);
            }
        }

        log::info!(
            "mounted: {} regions, {} sections, {} nav links, {} parallax targets",
            self.regions.len(),
            self.sections.len(),
            self.nav_links.len(),
            self.parallax_elements.len()
        );
    }

    pub fn region_for(&self, el: ElementId) -> Option<RegionId> {
        self.regions.by_element(el)
    }

    pub fn regions(&self) -> &RegionRegistry {
        &self.regions
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    pub fn menu_signal(&self) -> Signal<MenuState> {
        self.menu.state_signal()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // --- scroll ---

    /// Raw scroll event; coalesced by the frame throttle.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) {
        match self.throttle.offer(offset, now) {
            Some(v) => {
                self.timers.cancel_owner(&TimerOwner::Scroll);
                self.sample_scroll(v);
            }
            None => {
                if let Some(at) = self.throttle.trailing_deadline()
                    && !self.timers.has_pending(&TimerOwner::Scroll)
                {
                    self.timers
                        .schedule(TimerOwner::Scroll, at, TimerAction::TrailingScroll);
                }
            }
        }
    }

    /// Processes one scroll sample immediately.
    pub fn sample_scroll(&mut self, offset: f64) -> ScrollStyle {
        let sample = self.scroll.sample(offset);
        let style = ScrollStyle::compute(
            &sample,
            &ScrollInputs {
                viewport_height: self.viewport_height,
                sections: &self.sections,
                parallax: &self.parallax_kinds,
            },
            &self.config.scroll,
        );
        self.apply_scroll_style(&style);
        style
    }

    fn apply_scroll_style(&mut self, style: &ScrollStyle) {
        if let Some(navbar) = self.navbar {
            self.reconciler
                .apply(&mut self.surface, navbar, &style.navbar_state());
        }

        let active = style.active_id(&self.sections).map(|id| format!("#{id}"));
        for link in &self.nav_links {
            let on = active.as_deref() == Some(link.href.as_str());
            self.reconciler.apply(
                &mut self.surface,
                link.element,
                &VisualState::new().class(class::ACTIVE, on),
            );
        }

        for (el, value) in self.parallax_elements.iter().zip(&style.parallax) {
            if let Some(v) = value {
                self.reconciler.apply(
                    &mut self.surface,
                    *el,
                    &VisualState::new().transform(Transform::TranslateY(*v)),
                );
            }
        }

        if let Some(control) = &self.scroll_top {
            self.reconciler.apply(
                &mut self.surface,
                control.element,
                &ScrollTopControl::state(style.scroll_top_visible),
            );
        }
    }

    /// New window size or reflowed sections. Re-applies the last offset.
    pub fn on_resize(
        &mut self,
        viewport_height: f64,
        sections: Vec<SectionGeometry>,
        parallax: Vec<ParallaxKind>,
    ) {
        self.viewport_height = viewport_height;
        self.sections = sections;
        if parallax.len() == self.parallax_kinds.len() {
            self.parallax_kinds = parallax;
        } else {
            log::warn!(
                "resize reported {} parallax targets, expected {}; keeping old geometry",
                parallax.len(),
                self.parallax_kinds.len()
            );
        }
        let last = self.scroll.last_offset();
        // re-sampling the same offset reads as "not moving down"
        self.sample_scroll(last);
    }

    // --- reveal ---

    /// An `IntersectionObserver` entry for a tracked element.
    pub fn on_intersection(&mut self, el: ElementId, is_intersecting: bool, now: Instant) {
        let Some(id) = self.regions.by_element(el) else {
            log::debug!("intersection for untracked element {el:?}");
            return;
        };
        if let Some(ev) = self
            .tracker
            .on_intersection(&mut self.regions, id, is_intersecting)
        {
            self.apply_reveal(ev, now);
        }
    }

    /// Geometry-driven reveal, for runners without an observer.
    pub fn reveal_visible(&mut self, viewport: &Viewport, now: Instant) -> usize {
        let events = self.tracker.observe_all(&mut self.regions, viewport);
        let n = events.len();
        for ev in events {
            self.apply_reveal(ev, now);
        }
        n
    }

    pub fn update_region_bounds(&mut self, el: ElementId, bounds: Bounds) {
        if let Some(id) = self.regions.by_element(el) {
            self.regions.set_bounds(id, bounds);
        }
    }

    fn apply_reveal(&mut self, ev: RevealEvent, now: Instant) {
        self.reconciler
            .apply(&mut self.surface, ev.element, &reveal::revealed_region_state());
        let owner = TimerOwner::Region(ev.region);
        self.timers.cancel_owner(&owner);
        for child in &ev.children {
            self.timers.schedule(
                owner,
                now + child.delay,
                TimerAction::RevealChild(child.element),
            );
        }
        self.tick(now);
    }

    // --- menu ---

    pub fn menu_input(&mut self, input: MenuInput) -> Option<MenuVisuals> {
        let visuals = self.menu.handle(input)?;
        if let Some(elements) = self.menu_elements {
            self.reconciler
                .apply_batch(&mut self.surface, &elements.batch(visuals));
        }
        Some(visuals)
    }

    /// Document-level click. `inside_menu` is true when the target lies in
    /// the toggle control or the menu panel.
    pub fn on_document_click(&mut self, inside_menu: bool) {
        if !inside_menu {
            self.menu_input(MenuInput::OutsideClick);
        }
    }

    pub fn on_key(&mut self, key: &str) {
        if key == "Escape" {
            self.menu_input(MenuInput::Escape);
        }
    }

    // --- navigation ---

    pub fn on_scroll_top_click(&mut self) {
        if let Some(control) = &self.scroll_top {
            control.activate(&mut self.surface);
        }
    }

    /// In-page anchor. `target_top` is `None` when the anchor points nowhere.
    pub fn on_anchor_click(&mut self, target_top: Option<f64>) -> bool {
        let Some(top) = target_top else {
            return false;
        };
        self.surface
            .scroll_to(top - self.config.anchor_offset, ScrollBehavior::Smooth);
        true
    }

    // --- gallery ---

    pub fn on_gallery_click(&mut self, el: ElementId, now: Instant) {
        let owner = TimerOwner::Press(el);
        self.timers.cancel_owner(&owner);
        self.reconciler.apply(
            &mut self.surface,
            el,
            &VisualState::new().transform(Transform::Scale(self.config.gallery.press_scale)),
        );
        self.timers.schedule(
            owner,
            now + Duration::from_millis(self.config.gallery.press_ms),
            TimerAction::RestoreScale(el),
        );
    }

    pub fn on_gallery_touch_start(&mut self, el: ElementId) {
        self.timers.cancel_owner(&TimerOwner::Touch(el));
        self.reconciler.apply(
            &mut self.surface,
            el,
            &VisualState::new().class(class::TOUCH_ACTIVE, true),
        );
    }

    pub fn on_gallery_touch_end(&mut self, el: ElementId, now: Instant) {
        let owner = TimerOwner::Touch(el);
        self.timers.cancel_owner(&owner);
        self.timers.schedule(
            owner,
            now + Duration::from_millis(self.config.gallery.touch_release_ms),
            TimerAction::ReleaseTouch(el),
        );
    }

    // --- toast ---

    /// Shows `message` as a toast, replacing any toast still on screen.
    pub fn notify(&mut self, message: &str, now: Instant) -> Option<ElementId> {
        if self.stopped {
            log::debug!("toast after shutdown ignored");
            return None;
        }
        let el = match self.surface.create_toast(message) {
            Ok(el) => el,
            Err(e) => {
                log::warn!("toast suppressed: {e}");
                return None;
            }
        };
        let plan = self.notifier.begin(el, now);
        if let Some(old) = plan.superseded {
            self.timers.cancel_owner(&TimerOwner::Toast(old));
            self.surface.remove_element(old);
            self.reconciler.forget(old);
        }
        self.reconciler.apply(&mut self.surface, el, &plan.initial);
        for (at, step) in plan.steps {
            self.timers
                .schedule(TimerOwner::Toast(el), at, TimerAction::Toast(el, step));
        }
        Some(el)
    }

    /// Drops every pending timer and takes the current toast off the page.
    /// Nothing is scheduled afterwards, so later `notify` calls are refused.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.timers.clear();
        if let Some(el) = self.notifier.dismiss() {
            self.surface.remove_element(el);
            self.reconciler.forget(el);
        }
    }

    // --- timers ---

    /// Runs every timed action due at `now` and returns the next deadline.
    pub fn tick(&mut self, now: Instant) -> Option<Instant> {
        for (_, action) in self.timers.drain_due(now) {
            self.run(action, now);
        }
        self.timers.next_deadline()
    }

    fn run(&mut self, action: TimerAction, now: Instant) {
        match action {
            TimerAction::RevealChild(el) => {
                self.reconciler
                    .apply(&mut self.surface, el, &reveal::revealed_child_state());
            }
            TimerAction::RestoreScale(el) => {
                self.reconciler.apply(
                    &mut self.surface,
                    el,
                    &VisualState::new().transform(Transform::Scale(1.0)),
                );
            }
            TimerAction::ReleaseTouch(el) => {
                self.reconciler.apply(
                    &mut self.surface,
                    el,
                    &VisualState::new().class(class::TOUCH_ACTIVE, false),
                );
            }
            TimerAction::Toast(el, step) => match self.notifier.step(el, step) {
                Some(state) => {
                    self.reconciler.apply(&mut self.surface, el, &state);
                }
                None => {
                    self.surface.remove_element(el);
                    self.reconciler.forget(el);
                }
            },
            TimerAction::TrailingScroll => {
                if let Some(v) = self.throttle.flush(now) {
                    self.sample_scroll(v);
                }
            }
        }
    }
}
