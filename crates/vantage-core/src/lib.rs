//! # Vantage core
//!
//! Page behavior for a static site, kept free of any DOM so it can be driven
//! and tested with synthetic geometry. The pieces:
//!
//! - `RegionRegistry` + `RevealTracker`: one-shot reveal of page regions as
//!   they scroll into view, with staggered children for grids.
//! - `ScrollStyle::compute`: pure function from a scroll sample to navbar
//!   emphasis/visibility, the active section, parallax offsets and the
//!   scroll-to-top control.
//! - `MenuController`: the mobile menu's open/closed state.
//! - `Notifier`: toast lifecycle.
//! - `Reconciler`: the single place that writes presentation, through a
//!   `RenderSurface` implemented by the runner.
//! - `Site`: owns all of the above and exposes one handler per browser
//!   signal.
//!
//! ## Driving a site
//!
//! ```rust,ignore
//! use vantage_core::*;
//!
//! let mut site = Site::new(SiteConfig::default(), my_surface);
//! site.mount(layout);
//! site.on_scroll(420.0, clock.now());
//! site.menu_input(MenuInput::Toggle);
//! if let Some(at) = site.tick(clock.now()) {
//!     // arm a native timeout for `at`
//! }
//! ```
//!
//! Time is always passed in. Runners use `SystemClock`; tests use
//! `ManualClock` and step it by hand.

pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod menu;
pub mod region;
pub mod reveal;
pub mod scroll;
pub mod scroll_top;
pub mod signal;
pub mod site;
pub mod tests;
pub mod throttle;
pub mod timers;
pub mod toast;
pub mod visual;

pub use clock::*;
pub use config::SiteConfig;
pub use effects::*;
pub use error::{Error, Result};
pub use geometry::*;
pub use menu::{MenuController, MenuElements, MenuInput, MenuState, MenuVisuals};
pub use region::{Region, RegionId, RegionKind, RegionRegistry, RegionSpec};
pub use reveal::{RevealEvent, RevealTracker};
pub use scroll::*;
pub use signal::*;
pub use site::*;
pub use visual::*;

pub use web_time::{Duration, Instant};
