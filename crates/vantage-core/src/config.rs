//! Site configuration.
//!
//! Every distance, rate, selector and timing the page behavior depends on
//! lives here. The defaults reproduce the stock site; a page can override any
//! subset by embedding JSON, e.g.
//!
//! ```rust
//! use vantage_core::config::SiteConfig;
//!
//! let cfg = SiteConfig::from_json(r#"{ "scroll": { "emphasis_distance": 64 } }"#).unwrap();
//! assert_eq!(cfg.scroll.emphasis_distance, 64.0);
//! assert_eq!(cfg.scroll.hide_distance, 300.0);
//! ```

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub scroll: ScrollConfig,
    pub reveal: RevealConfig,
    pub toast: ToastConfig,
    pub gallery: GalleryConfig,
    pub selectors: Selectors,
    /// Height of the fixed navbar subtracted from anchor scroll targets.
    pub anchor_offset: f64,
    /// Minimum spacing between processed scroll samples.
    pub throttle_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            reveal: RevealConfig::default(),
            toast: ToastConfig::default(),
            gallery: GalleryConfig::default(),
            selectors: Selectors::default(),
            anchor_offset: 80.0,
            throttle_ms: 16,
        }
    }
}

impl SiteConfig {
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

/// Inputs to the pure scroll style computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Past this offset the navbar switches to its emphasized style.
    pub emphasis_distance: f64,
    /// Scrolling down past this offset hides the navbar.
    pub hide_distance: f64,
    /// A section becomes active this many pixels before its top is reached.
    pub lookahead: f64,
    pub hero_rate: f64,
    pub secondary_rate: f64,
    /// Past this offset the scroll-to-top control is shown.
    pub scroll_top_distance: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            emphasis_distance: 100.0,
            hide_distance: 300.0,
            lookahead: 200.0,
            hero_rate: -0.5,
            secondary_rate: 0.1,
            scroll_top_distance: 300.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    /// Shrinks the observer root from the bottom so reveals fire a bit early.
    pub margin_bottom: f64,
    /// Elements that fade in on their own.
    pub selectors: Vec<String>,
    pub groups: Vec<StaggerGroup>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            margin_bottom: 100.0,
            selectors: [
                ".section-header",
                ".about-content",
                ".contact-content",
                ".service-card",
                ".gallery-item",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            groups: vec![
                StaggerGroup {
                    selector: ".services-grid".into(),
                    child_selector: ".service-card".into(),
                    stagger_ms: 150,
                },
                StaggerGroup {
                    selector: ".gallery-grid".into(),
                    child_selector: ".gallery-item".into(),
                    stagger_ms: 100,
                },
            ],
        }
    }
}

impl RevealConfig {
    /// Root margin in the form `IntersectionObserverInit.rootMargin` expects.
    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.margin_bottom)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaggerGroup {
    pub selector: String,
    pub child_selector: String,
    pub stagger_ms: u64,
}

impl StaggerGroup {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub enter_delay_ms: u64,
    pub display_ms: u64,
    pub exit_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enter_delay_ms: 100,
            display_ms: 3000,
            exit_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub press_scale: f64,
    pub press_ms: u64,
    pub touch_release_ms: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            press_scale: 0.95,
            press_ms: 150,
            touch_release_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub navbar: String,
    pub nav_links: String,
    pub hamburger: String,
    pub nav_menu: String,
    pub sections: String,
    pub scroll_top: String,
    pub hero: String,
    pub parallax: String,
    pub gallery_items: String,
    pub anchors: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: ".navbar".into(),
            nav_links: ".nav-link".into(),
            hamburger: ".hamburger".into(),
            nav_menu: ".nav-menu".into(),
            sections: "section".into(),
            scroll_top: "#scrollTop".into(),
            hero: ".hero".into(),
            parallax: ".about-image img, .contact-image img".into(),
            gallery_items: ".gallery-item".into(),
            anchors: "a[href^=\"#\"]".into(),
        }
    }
}
