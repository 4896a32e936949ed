//! `RenderSurface` over the live DOM.

use slotmap::SlotMap;
use vantage_core::{ElementId, Error, RenderSurface, Result, ScrollBehavior, StyleProp};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, ScrollToOptions, Window};

// Opacity, transform and transition are left to the reconciler.
const TOAST_BASE_CSS: &str = "position: fixed; bottom: 2rem; left: 50%; \
    background: linear-gradient(135deg, #667eea, #764ba2); color: white; \
    padding: 1rem 2rem; border-radius: 50px; z-index: 10000; \
    box-shadow: 0 10px 25px rgba(0, 0, 0, 0.2);";

pub struct DomSurface {
    window: Window,
    document: Document,
    elements: SlotMap<ElementId, Element>,
}

fn reason(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

impl DomSurface {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            elements: SlotMap::with_key(),
        }
    }

    /// Hands out one id per element; adopting the same element twice returns
    /// the first id.
    pub fn adopt(&mut self, el: Element) -> ElementId {
        if let Some(id) = self.lookup(&el) {
            return id;
        }
        self.elements.insert(el)
    }

    pub fn lookup(&self, el: &Element) -> Option<ElementId> {
        self.elements
            .iter()
            .find_map(|(id, known)| (known == el).then_some(id))
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn html(&self, id: ElementId) -> Result<&HtmlElement> {
        self.elements
            .get(id)
            .and_then(|e| e.dyn_ref::<HtmlElement>())
            .ok_or_else(|| Error::surface("set_style", "not an HTML element"))
    }
}

impl RenderSurface for DomSurface {
    fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()> {
        let element = self
            .elements
            .get(el)
            .ok_or_else(|| Error::surface("set_class", "unknown element"))?;
        element
            .class_list()
            .toggle_with_force(class, on)
            .map(|_| ())
            .map_err(|e| Error::surface("set_class", reason(e)))
    }

    fn set_style(&mut self, el: ElementId, prop: StyleProp, value: &str) -> Result<()> {
        self.html(el)?
            .style()
            .set_property(prop.css_name(), value)
            .map_err(|e| Error::surface("set_style", reason(e)))
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let opts = ScrollToOptions::new();
        opts.set_top(top);
        opts.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&opts);
    }

    fn create_toast(&mut self, message: &str) -> Result<ElementId> {
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::surface("create_toast", "no document body"))?;
        let toast = self
            .document
            .create_element("div")
            .map_err(|e| Error::surface("create_toast", reason(e)))?;
        toast.set_class_name(vantage_core::class::TOAST);
        toast.set_text_content(Some(message));
        toast
            .set_attribute("style", TOAST_BASE_CSS)
            .map_err(|e| Error::surface("create_toast", reason(e)))?;
        body.append_child(&toast)
            .map_err(|e| Error::surface("create_toast", reason(e)))?;
        Ok(self.adopt(toast))
    }

    fn remove_element(&mut self, el: ElementId) {
        if let Some(element) = self.elements.remove(el) {
            element.remove();
        }
    }
}
