//! Web runner (wasm32): scans the page once, binds named handlers, and drives
//! the site's timer queue with a single re-armed `setTimeout`.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::{Context, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Node, Window};

use vantage_core::{
    Bounds, Clock, Dispose, DisposeBag, ElementId, Error, Instant, MenuElements, MenuInput,
    NavLink, ParallaxKind, ParallaxTarget, RegionKind, RegionSpec, SectionGeometry, Site,
    SiteConfig, SiteLayout, SystemClock,
};

use crate::dom::DomSurface;
use crate::listeners::{listen, listen_passive};
use crate::{observer, page};

#[wasm_bindgen]
pub struct WebOptions {
    config_element_id: String,
}

#[wasm_bindgen]
impl WebOptions {
    #[wasm_bindgen(constructor)]
    pub fn new(config_element_id: Option<String>) -> Self {
        Self {
            config_element_id: config_element_id
                .unwrap_or_else(|| page::DEFAULT_CONFIG_ELEMENT.to_string()),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn config_element_id(&self) -> String {
        self.config_element_id.clone()
    }
}

/// Live site returned by `start`.
#[wasm_bindgen]
pub struct SiteHandle {
    driver: Rc<Driver>,
    bindings: DisposeBag,
}

#[wasm_bindgen]
impl SiteHandle {
    /// Shows a toast; returns false if the page could not host one or the
    /// site was stopped.
    pub fn notify(&self, message: &str) -> bool {
        self.driver
            .with_site(|site, now| site.notify(message, now).is_some())
    }

    #[wasm_bindgen(getter)]
    pub fn menu_open(&self) -> bool {
        self.driver.site.borrow().menu_state().is_open()
    }

    /// Detaches every listener, the observer and the pending timeout, and
    /// takes any toast off the page.
    pub fn stop(&self) {
        self.bindings.dispose();
        self.driver.site.borrow_mut().shutdown();
        log::info!("site stopped");
    }
}

#[wasm_bindgen]
pub fn start(options: WebOptions) -> Result<SiteHandle, JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let _ = console_log::init_with_level(log::Level::Info);

    start_site(&options).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

fn js(e: JsValue) -> anyhow::Error {
    anyhow!("{}", e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

// --- page scan ---

struct Scan {
    layout: SiteLayout,
    hamburger: Option<Element>,
    nav_menu: Option<Element>,
    scroll_top: Option<Element>,
    nav_links: Vec<Element>,
    anchors: Vec<Element>,
    gallery: Vec<(ElementId, Element)>,
    reveal_targets: Vec<Element>,
    geometry: Geometry,
}

/// Elements whose offsets are re-read on resize.
struct Geometry {
    sections: Vec<Element>,
    /// `None` for the hero, else the section holding the image.
    parallax_sections: Vec<Option<Element>>,
    regions: Vec<(ElementId, Element)>,
}

fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => node_list(&list),
        Err(_) => {
            log::warn!("invalid selector `{selector}`");
            Vec::new()
        }
    }
}

fn query_within(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(|list| node_list(&list))
        .unwrap_or_default()
}

fn node_list(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

fn query_one(root: &Document, selector: &str) -> Option<Element> {
    let found = root.query_selector(selector).ok().flatten();
    if found.is_none() {
        log::warn!("{}", Error::MissingElement(selector.to_string()));
    }
    found
}

fn bounds_of(el: &Element) -> Bounds {
    match el.dyn_ref::<HtmlElement>() {
        Some(h) => Bounds::new(f64::from(h.offset_top()), f64::from(h.offset_height())),
        None => Bounds::default(),
    }
}

fn parallax_kind(section: Option<&Element>) -> ParallaxKind {
    match section {
        None => ParallaxKind::Hero,
        Some(s) => ParallaxKind::Secondary {
            section: bounds_of(s),
        },
    }
}

fn scan(
    window: &Window,
    doc: &Document,
    surface: &mut DomSurface,
    cfg: &SiteConfig,
) -> Scan {
    let sel = &cfg.selectors;

    let navbar = query_one(doc, &sel.navbar).map(|e| surface.adopt(e));
    let hamburger = query_one(doc, &sel.hamburger);
    let nav_menu = query_one(doc, &sel.nav_menu);
    let menu = match (&hamburger, &nav_menu, doc.body()) {
        (Some(h), Some(m), Some(body)) => Some(MenuElements {
            toggle: surface.adopt(h.clone()),
            panel: surface.adopt(m.clone()),
            body: surface.adopt(body.into()),
        }),
        _ => None,
    };
    let scroll_top = query_one(doc, &sel.scroll_top);

    let nav_links = query_all(doc, &sel.nav_links);
    let nav_link_state = nav_links
        .iter()
        .filter_map(|el| {
            let href = el.get_attribute("href")?;
            Some(NavLink {
                element: surface.adopt(el.clone()),
                href,
            })
        })
        .collect();

    let sections = query_all(doc, &sel.sections);
    let section_geometry = sections
        .iter()
        .map(|el| SectionGeometry {
            id: Some(el.id()).filter(|id| !id.is_empty()),
            bounds: bounds_of(el),
        })
        .collect();

    let mut parallax = Vec::new();
    let mut parallax_sections = Vec::new();
    for hero in query_all(doc, &sel.hero) {
        parallax.push(ParallaxTarget {
            element: surface.adopt(hero),
            kind: ParallaxKind::Hero,
        });
        parallax_sections.push(None);
    }
    for img in query_all(doc, &sel.parallax) {
        let Some(section) = img.closest(&sel.sections).ok().flatten() else {
            log::warn!("parallax target outside any section; skipped");
            continue;
        };
        parallax.push(ParallaxTarget {
            element: surface.adopt(img),
            kind: parallax_kind(Some(&section)),
        });
        parallax_sections.push(Some(section));
    }

    // one combined query keeps document order
    let reveal_selector = cfg
        .reveal
        .selectors
        .iter()
        .chain(cfg.reveal.groups.iter().map(|g| &g.selector))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let reveal_targets = if reveal_selector.is_empty() {
        Vec::new()
    } else {
        query_all(doc, &reveal_selector)
    };
    let mut regions = Vec::new();
    let mut region_elements = Vec::new();
    for el in &reveal_targets {
        let group = cfg
            .reveal
            .groups
            .iter()
            .find(|g| el.matches(&g.selector).unwrap_or(false));
        let kind = match group {
            Some(g) => RegionKind::Grouped {
                children: query_within(el, &g.child_selector)
                    .into_iter()
                    .map(|c| surface.adopt(c))
                    .collect(),
                stagger: g.stagger(),
            },
            None => RegionKind::Plain,
        };
        let element = surface.adopt(el.clone());
        regions.push(RegionSpec {
            element,
            bounds: bounds_of(el),
            kind,
        });
        region_elements.push((element, el.clone()));
    }

    let gallery = query_all(doc, &sel.gallery_items)
        .into_iter()
        .map(|el| (surface.adopt(el.clone()), el))
        .collect();

    let layout = SiteLayout {
        navbar,
        menu,
        scroll_top: scroll_top.clone().map(|e| surface.adopt(e)),
        nav_links: nav_link_state,
        sections: section_geometry,
        parallax,
        regions,
        viewport_height: viewport_height(window),
    };

    Scan {
        layout,
        hamburger,
        nav_menu,
        scroll_top,
        nav_links,
        anchors: query_all(doc, &sel.anchors),
        gallery,
        reveal_targets,
        geometry: Geometry {
            sections,
            parallax_sections,
            regions: region_elements,
        },
    }
}

fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

// --- driver ---

struct Driver {
    window: Window,
    site: RefCell<Site<DomSurface>>,
    clock: SystemClock,
    geometry: Geometry,
    menu_nodes: Option<(Element, Element)>,
    armed: Cell<Option<(Instant, i32)>>,
    wake: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Driver {
    fn with_site<R>(&self, f: impl FnOnce(&mut Site<DomSurface>, Instant) -> R) -> R {
        let now = self.clock.now();
        let out = f(&mut self.site.borrow_mut(), now);
        self.rearm(now);
        out
    }

    /// Keeps exactly one timeout armed for the earliest pending deadline.
    fn rearm(&self, now: Instant) {
        let Some(next) = self.site.borrow().next_deadline() else {
            return;
        };
        if let Some((at, _)) = self.armed.get()
            && at <= next
        {
            return;
        }
        if let Some((_, handle)) = self.armed.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let wake = self.wake.borrow();
        let Some(cb) = wake.as_ref() else {
            return;
        };
        let delay = page::timeout_delay_ms(next.saturating_duration_since(now));
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay)
        {
            Ok(handle) => self.armed.set(Some((next, handle))),
            Err(e) => log::warn!("timer not armed: {e:?}"),
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }
}

fn install_wake(driver: &Rc<Driver>) {
    let weak: Weak<Driver> = Rc::downgrade(driver);
    let wake = Closure::<dyn FnMut()>::new(move || {
        if let Some(d) = weak.upgrade() {
            d.armed.set(None);
            d.with_site(|site, now| {
                site.tick(now);
            });
        }
    });
    *driver.wake.borrow_mut() = Some(wake);
}

// --- handlers ---

fn on_scroll(d: &Driver, _e: Event) {
    let y = d.scroll_y();
    d.with_site(|site, now| site.on_scroll(y, now));
}

fn on_resize(d: &Driver, _e: Event) {
    let height = viewport_height(&d.window);
    let sections = d
        .geometry
        .sections
        .iter()
        .map(|el| SectionGeometry {
            id: Some(el.id()).filter(|id| !id.is_empty()),
            bounds: bounds_of(el),
        })
        .collect();
    let parallax = d
        .geometry
        .parallax_sections
        .iter()
        .map(|s| parallax_kind(s.as_ref()))
        .collect();
    d.with_site(|site, _| {
        for (id, el) in &d.geometry.regions {
            site.update_region_bounds(*id, bounds_of(el));
        }
        site.on_resize(height, sections, parallax);
    });
}

fn on_toggle_click(d: &Driver, _e: Event) {
    d.with_site(|site, _| site.menu_input(MenuInput::Toggle));
}

fn on_nav_link_click(d: &Driver, _e: Event) {
    d.with_site(|site, _| site.menu_input(MenuInput::LinkSelected));
}

fn on_document_click(d: &Driver, e: Event) {
    let Some((toggle, panel)) = d.menu_nodes.as_ref() else {
        return;
    };
    let target = e.target().and_then(|t| t.dyn_into::<Node>().ok());
    let inside = toggle.contains(target.as_ref()) || panel.contains(target.as_ref());
    d.with_site(|site, _| site.on_document_click(inside));
}

fn on_keydown(d: &Driver, e: Event) {
    let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
        return;
    };
    d.with_site(|site, _| site.on_key(&key));
}

fn on_scroll_top_click(d: &Driver, _e: Event) {
    d.with_site(|site, _| site.on_scroll_top_click());
}

fn on_anchor_click(d: &Driver, e: Event) {
    e.prevent_default();
    let href = e
        .current_target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|a| a.get_attribute("href"));
    d.with_site(|site, _| {
        let top = href
            .as_deref()
            .and_then(page::anchor_target)
            .and_then(|id| site.surface().document().get_element_by_id(id))
            .map(|target| bounds_of(&target).top);
        site.on_anchor_click(top);
    });
}

fn on_intersection(d: &Driver, el: Element, is_intersecting: bool) {
    d.with_site(|site, now| {
        if let Some(id) = site.surface().lookup(&el) {
            site.on_intersection(id, is_intersecting, now);
        }
    });
}

fn handler(driver: &Rc<Driver>, f: fn(&Driver, Event)) -> impl FnMut(Event) + 'static {
    let driver = driver.clone();
    move |e| f(&driver, e)
}

fn element_handler(
    driver: &Rc<Driver>,
    id: ElementId,
    f: fn(&mut Site<DomSurface>, ElementId, Instant),
) -> impl FnMut(Event) + 'static {
    let driver = driver.clone();
    move |_| driver.with_site(|site, now| f(site, id, now))
}

// --- start ---

fn start_site(options: &WebOptions) -> anyhow::Result<SiteHandle> {
    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let config = page::config_from_text(
        document
            .get_element_by_id(&options.config_element_id)
            .and_then(|e| e.text_content())
            .as_deref(),
    );

    let mut surface = DomSurface::new(window.clone(), document.clone());
    let scan = scan(&window, &document, &mut surface, &config);
    let Scan {
        layout,
        hamburger,
        nav_menu,
        scroll_top,
        nav_links,
        anchors,
        gallery,
        reveal_targets,
        geometry,
    } = scan;

    let mut site = Site::new(config.clone(), surface);
    site.mount(layout);

    let driver = Rc::new(Driver {
        window: window.clone(),
        site: RefCell::new(site),
        clock: SystemClock,
        geometry,
        menu_nodes: hamburger.clone().zip(nav_menu.clone()),
        armed: Cell::new(None),
        wake: RefCell::new(None),
    });
    install_wake(&driver);

    let bindings = DisposeBag::new();
    let win: &EventTarget = window.as_ref();
    let doc: &EventTarget = document.as_ref();

    bindings.add(listen_passive(win, "scroll", handler(&driver, on_scroll)).map_err(js)?);
    bindings.add(listen_passive(win, "resize", handler(&driver, on_resize)).map_err(js)?);
    bindings.add(listen(doc, "click", handler(&driver, on_document_click)).map_err(js)?);
    bindings.add(listen(doc, "keydown", handler(&driver, on_keydown)).map_err(js)?);

    if let Some(toggle) = &hamburger {
        bindings.add(listen(toggle, "click", handler(&driver, on_toggle_click)).map_err(js)?);

        let toggle = toggle.clone();
        let signal = driver.site.borrow().menu_signal();
        let sub = signal.subscribe(move |state| {
            let expanded = if state.is_open() { "true" } else { "false" };
            let _ = toggle.set_attribute("aria-expanded", expanded);
        });
        bindings.add(Dispose::new(move || signal.unsubscribe(sub)));
    }
    for link in &nav_links {
        bindings.add(listen(link, "click", handler(&driver, on_nav_link_click)).map_err(js)?);
    }
    for anchor in &anchors {
        bindings.add(listen(anchor, "click", handler(&driver, on_anchor_click)).map_err(js)?);
    }
    if let Some(button) = &scroll_top {
        bindings.add(
            listen(button, "click", handler(&driver, on_scroll_top_click)).map_err(js)?,
        );
    }
    for (id, item) in &gallery {
        bindings.add(
            listen(
                item,
                "click",
                element_handler(&driver, *id, |site, id, now| site.on_gallery_click(id, now)),
            )
            .map_err(js)?,
        );
        bindings.add(
            listen_passive(
                item,
                "touchstart",
                element_handler(&driver, *id, |site, id, _| site.on_gallery_touch_start(id)),
            )
            .map_err(js)?,
        );
        bindings.add(
            listen_passive(
                item,
                "touchend",
                element_handler(&driver, *id, |site, id, now| {
                    site.on_gallery_touch_end(id, now)
                }),
            )
            .map_err(js)?,
        );
    }

    if !reveal_targets.is_empty() {
        let d = driver.clone();
        bindings.add(
            observer::observe(&config.reveal, &reveal_targets, move |el, hit| {
                on_intersection(&d, el, hit)
            })
            .map_err(js)?,
        );
    }

    {
        let d = driver.clone();
        bindings.add(Dispose::new(move || {
            if let Some((_, handle)) = d.armed.take() {
                d.window.clear_timeout_with_handle(handle);
            }
            d.wake.borrow_mut().take();
        }));
    }

    let y = driver.scroll_y();
    driver.with_site(|site, _| {
        site.sample_scroll(y);
    });

    log::info!("site started with {} bindings", bindings.len());
    Ok(SiteHandle { driver, bindings })
}
