//! Reveal tracking through `IntersectionObserver`.

use vantage_core::Dispose;
use vantage_core::config::RevealConfig;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// Observes `targets` with the reveal threshold and margin and reports
/// `(element, is_intersecting)` for every entry.
pub fn observe(
    cfg: &RevealConfig,
    targets: &[Element],
    mut on_entry: impl FnMut(Element, bool) + 'static,
) -> Result<Dispose, JsValue> {
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                on_entry(entry.target(), entry.is_intersecting());
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(cfg.threshold));
    init.set_root_margin(&cfg.root_margin());
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for target in targets {
        observer.observe(target);
    }
    log::debug!("observing {} reveal targets", targets.len());

    Ok(Dispose::new(move || {
        observer.disconnect();
        drop(callback);
    }))
}
