//! # Scroll-derived styles
//!
//! Everything the page does on scroll, other than reveals, is a pure function
//! of one `ScrollSample` plus the geometry of the sections and parallax
//! targets:
//!
//! - navbar emphasis (background/shadow) past `emphasis_distance`;
//! - navbar hidden while scrolling down past `hide_distance`, shown on any
//!   upward (or zero) motion;
//! - the active section: the last one, in document order, whose top minus
//!   `lookahead` is at or above the scroll offset;
//! - parallax offsets for the hero and for secondary images, the latter only
//!   while their section is within one viewport height of the screen;
//! - scroll-to-top control visibility.
//!
//! ```rust
//! use vantage_core::config::ScrollConfig;
//! use vantage_core::geometry::Bounds;
//! use vantage_core::scroll::*;
//!
//! let mut state = ScrollState::new();
//! let sample = state.sample(200.0);
//! let inputs = ScrollInputs {
//!     viewport_height: 800.0,
//!     sections: &[],
//!     parallax: &[ParallaxKind::Hero],
//! };
//! let style = ScrollStyle::compute(&sample, &inputs, &ScrollConfig::default());
//! assert_eq!(style.parallax, vec![Some(-100.0)]);
//! ```

use crate::config::ScrollConfig;
use crate::geometry::{Bounds, Transform};
use crate::visual::{StyleProp, VisualState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub delta: f64,
    pub direction: Direction,
}

/// Last seen offset; the only scroll memory the site keeps.
#[derive(Clone, Debug, Default)]
pub struct ScrollState {
    last: f64,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, offset: f64) -> ScrollSample {
        let delta = offset - self.last;
        self.last = offset;
        ScrollSample {
            offset,
            delta,
            direction: if delta > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            },
        }
    }

    pub fn last_offset(&self) -> f64 {
        self.last
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionGeometry {
    pub id: Option<String>,
    pub bounds: Bounds,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParallaxKind {
    Hero,
    /// An image inside a section; `section` is that section's bounds.
    Secondary { section: Bounds },
}

pub struct ScrollInputs<'a> {
    pub viewport_height: f64,
    pub sections: &'a [SectionGeometry],
    pub parallax: &'a [ParallaxKind],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavEmphasis {
    Normal,
    Emphasized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavVisibility {
    Shown,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollStyle {
    pub emphasis: NavEmphasis,
    pub visibility: NavVisibility,
    /// Index into `ScrollInputs::sections`.
    pub active_section: Option<usize>,
    /// One entry per parallax target; `None` leaves the element as it is.
    pub parallax: Vec<Option<f64>>,
    pub scroll_top_visible: bool,
}

impl ScrollStyle {
    pub fn compute(sample: &ScrollSample, inputs: &ScrollInputs, cfg: &ScrollConfig) -> Self {
        let offset = sample.offset;

        let emphasis = if offset > cfg.emphasis_distance {
            NavEmphasis::Emphasized
        } else {
            NavEmphasis::Normal
        };

        let visibility = if sample.direction == Direction::Down && offset > cfg.hide_distance {
            NavVisibility::Hidden
        } else {
            NavVisibility::Shown
        };

        Self {
            emphasis,
            visibility,
            active_section: active_section(offset, inputs.sections, cfg.lookahead),
            parallax: inputs
                .parallax
                .iter()
                .map(|kind| parallax_offset(offset, inputs.viewport_height, *kind, cfg))
                .collect(),
            scroll_top_visible: offset > cfg.scroll_top_distance,
        }
    }

    pub fn active_id<'a>(&self, sections: &'a [SectionGeometry]) -> Option<&'a str> {
        sections.get(self.active_section?)?.id.as_deref()
    }

    pub fn navbar_state(&self) -> VisualState {
        let (background, shadow) = match self.emphasis {
            NavEmphasis::Emphasized => {
                ("rgba(255, 255, 255, 0.98)", "0 2px 25px rgba(0, 0, 0, 0.15)")
            }
            NavEmphasis::Normal => ("rgba(255, 255, 255, 0.95)", "0 2px 20px rgba(0, 0, 0, 0.1)"),
        };
        let shift = match self.visibility {
            NavVisibility::Hidden => Transform::TranslateYPercent(-100.0),
            NavVisibility::Shown => Transform::TranslateY(0.0),
        };
        VisualState::new()
            .style(StyleProp::Background, background)
            .style(StyleProp::BoxShadow, shadow)
            .transform(shift)
    }
}

pub fn active_section(offset: f64, sections: &[SectionGeometry], lookahead: f64) -> Option<usize> {
    sections
        .iter()
        .rposition(|s| s.bounds.top - lookahead <= offset)
}

pub fn parallax_offset(
    offset: f64,
    viewport_height: f64,
    kind: ParallaxKind,
    cfg: &ScrollConfig,
) -> Option<f64> {
    match kind {
        ParallaxKind::Hero => Some(offset * cfg.hero_rate),
        ParallaxKind::Secondary { section } => {
            let in_range =
                offset > section.top - viewport_height && offset < section.bottom();
            in_range.then(|| (offset - section.top + viewport_height) * cfg.secondary_rate)
        }
    }
}
