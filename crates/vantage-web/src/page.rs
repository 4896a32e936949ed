//! Page-level helpers that don't need a DOM.

use vantage_core::{Duration, SiteConfig};

/// Element id that may hold a JSON `SiteConfig`.
pub const DEFAULT_CONFIG_ELEMENT: &str = "vantage-config";

/// Parses an embedded config block, falling back to defaults.
pub fn config_from_text(text: Option<&str>) -> SiteConfig {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("ignoring embedded config: {e}");
            SiteConfig::default()
        }
    }
}

/// Milliseconds for a `setTimeout` that must not fire before `wait` has
/// elapsed.
pub fn timeout_delay_ms(wait: Duration) -> i32 {
    wait.as_micros().div_ceil(1000).min(i32::MAX as u128) as i32
}

/// The element id an in-page link points at. A bare `#` points nowhere.
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}
