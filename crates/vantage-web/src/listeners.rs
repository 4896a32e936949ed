//! Event listener binding. Every listener comes back as a `Dispose` that
//! detaches it and frees the closure.

use vantage_core::Dispose;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

pub fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Dispose, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(detach(target.clone(), kind, closure))
}

/// For scroll and touch: the handler never calls `preventDefault`.
pub fn listen_passive(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Dispose, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let opts = AddEventListenerOptions::new();
    opts.set_passive(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &opts,
    )?;
    Ok(detach(target.clone(), kind, closure))
}

fn detach(target: EventTarget, kind: &'static str, closure: Closure<dyn FnMut(Event)>) -> Dispose {
    Dispose::new(move || {
        let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        drop(closure);
    })
}
