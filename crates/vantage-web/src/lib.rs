//! Browser runner for Vantage.
//!
//! On `wasm32` this crate exports `start(WebOptions)`, which scans the page,
//! binds every listener once, and hands back a `SiteHandle` that can show
//! toasts and tear everything down again. Other targets only get the
//! DOM-free helpers in `page`.

pub mod page;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod listeners;
#[cfg(target_arch = "wasm32")]
mod observer;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::*;
