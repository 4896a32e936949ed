#[cfg(test)]
pub(crate) mod support {
    use slotmap::SlotMap;

    use crate::error::{Error, Result};
    use crate::visual::{ElementId, RenderSurface, ScrollBehavior, StyleProp};

    /// Render surface that records every write as a readable line.
    #[derive(Default)]
    pub struct RecordingSurface {
        names: SlotMap<ElementId, String>,
        ops: Vec<String>,
        pub scrolls: Vec<(f64, ScrollBehavior)>,
        pub removed: Vec<ElementId>,
        pub refuse_toasts: bool,
        pub fail_writes: bool,
        toasts: usize,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn element(&mut self, name: &str) -> ElementId {
            self.names.insert(name.to_string())
        }

        pub fn ops(&self) -> &[String] {
            &self.ops
        }

        pub fn clear(&mut self) {
            self.ops.clear();
        }

        fn name(&self, el: ElementId) -> &str {
            self.names.get(el).map(String::as_str).unwrap_or("?")
        }
    }

    impl RenderSurface for RecordingSurface {
        fn set_class(&mut self, el: ElementId, class: &str, on: bool) -> Result<()> {
            if self.fail_writes {
                return Err(Error::surface("set_class", "detached"));
            }
            let line = format!("{}.class.{class} = {on}", self.name(el));
            self.ops.push(line);
            Ok(())
        }

        fn set_style(&mut self, el: ElementId, prop: StyleProp, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(Error::surface("set_style", "detached"));
            }
            let line = format!("{}.style.{} = {value}", self.name(el), prop.css_name());
            self.ops.push(line);
            Ok(())
        }

        fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
            self.scrolls.push((top, behavior));
        }

        fn create_toast(&mut self, message: &str) -> Result<ElementId> {
            if self.refuse_toasts {
                return Err(Error::surface("create_toast", "no document body"));
            }
            self.toasts += 1;
            let el = self.element(&format!("toast{}", self.toasts));
            let line = format!("create {}: {message}", self.name(el));
            self.ops.push(line);
            Ok(el)
        }

        fn remove_element(&mut self, el: ElementId) {
            let line = format!("remove {}", self.name(el));
            self.ops.push(line);
            self.removed.push(el);
        }
    }

    pub fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::support::*;
    use crate::config::SiteConfig;
    use crate::effects::{Dispose, DisposeBag};
    use crate::geometry::{Bounds, Viewport};
    use crate::menu::{MenuElements, MenuInput, MenuState};
    use crate::region::{RegionKind, RegionSpec};
    use crate::scroll::{ParallaxKind, SectionGeometry};
    use crate::site::{NavLink, ParallaxTarget, Site, SiteLayout};
    use crate::visual::{ElementId, Reconciler, ScrollBehavior, StyleProp, VisualState, class};
    use crate::{Clock, ManualClock};
    use std::cell::RefCell;
    use std::rc::Rc;
    use web_time::{Duration, Instant};

    struct Page {
        site: Site<RecordingSurface>,
        clock: ManualClock,
        navbar: ElementId,
        hero: ElementId,
        menu: MenuElements,
        links: Vec<ElementId>,
        grid: ElementId,
        cards: Vec<ElementId>,
        scroll_top: ElementId,
    }

    fn page() -> Page {
        init_logs();
        let mut s = RecordingSurface::new();
        let navbar = s.element("navbar");
        let hero = s.element("hero");
        let menu = MenuElements {
            toggle: s.element("hamburger"),
            panel: s.element("nav-menu"),
            body: s.element("body"),
        };
        let links: Vec<_> = ["home", "about", "services"]
            .iter()
            .map(|id| s.element(&format!("link-{id}")))
            .collect();
        let grid = s.element("grid");
        let cards: Vec<_> = (0..5).map(|i| s.element(&format!("card{i}"))).collect();
        let scroll_top = s.element("scroll-top");

        let sections = vec![
            SectionGeometry {
                id: Some("home".into()),
                bounds: Bounds::new(0.0, 600.0),
            },
            SectionGeometry {
                id: Some("about".into()),
                bounds: Bounds::new(600.0, 800.0),
            },
            SectionGeometry {
                id: Some("services".into()),
                bounds: Bounds::new(1400.0, 1000.0),
            },
        ];

        let layout = SiteLayout {
            navbar: Some(navbar),
            menu: Some(menu),
            scroll_top: Some(scroll_top),
            nav_links: ["home", "about", "services"]
                .iter()
                .zip(&links)
                .map(|(id, &element)| NavLink {
                    element,
                    href: format!("#{id}"),
                })
                .collect(),
            sections,
            parallax: vec![ParallaxTarget {
                element: hero,
                kind: ParallaxKind::Hero,
            }],
            regions: vec![RegionSpec {
                element: grid,
                bounds: Bounds::new(1500.0, 600.0),
                kind: RegionKind::Grouped {
                    children: cards.clone(),
                    stagger: Duration::from_millis(100),
                },
            }],
            viewport_height: 800.0,
        };

        let mut site = Site::new(SiteConfig::default(), s);
        site.mount(layout);
        Page {
            site,
            clock: ManualClock::new(Instant::now()),
            navbar,
            hero,
            menu,
            links,
            grid,
            cards,
            scroll_top,
        }
    }

    fn style(p: &Page, el: ElementId, prop: StyleProp) -> Option<String> {
        p.site.reconciler().style_of(el, prop).map(str::to_string)
    }

    fn menu_flags(p: &Page) -> [Option<bool>; 3] {
        let r = p.site.reconciler();
        [
            r.class_of(p.menu.toggle, class::ACTIVE),
            r.class_of(p.menu.panel, class::ACTIVE),
            r.class_of(p.menu.body, class::MENU_OPEN),
        ]
    }

    #[test]
    fn hero_parallax_follows_scroll() {
        let mut p = page();
        p.site.sample_scroll(0.0);
        assert_eq!(
            style(&p, p.hero, StyleProp::Transform).as_deref(),
            Some("translateY(0px)")
        );
        p.site.sample_scroll(200.0);
        assert_eq!(
            style(&p, p.hero, StyleProp::Transform).as_deref(),
            Some("translateY(-100px)")
        );
    }

    #[test]
    fn navbar_emphasis_and_visibility() {
        let mut p = page();
        p.site.sample_scroll(50.0);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Background).as_deref(),
            Some("rgba(255, 255, 255, 0.95)")
        );
        p.site.sample_scroll(150.0);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Background).as_deref(),
            Some("rgba(255, 255, 255, 0.98)")
        );
        p.site.sample_scroll(120.0);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Transform).as_deref(),
            Some("translateY(0px)")
        );
        p.site.sample_scroll(700.0);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Transform).as_deref(),
            Some("translateY(-100%)")
        );
        p.site.sample_scroll(650.0);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Transform).as_deref(),
            Some("translateY(0px)")
        );
    }

    #[test]
    fn exactly_one_nav_link_is_active() {
        let mut p = page();
        p.site.sample_scroll(450.0);
        let r = p.site.reconciler();
        let active: Vec<_> = p
            .links
            .iter()
            .map(|&l| r.class_of(l, class::ACTIVE))
            .collect();
        assert_eq!(active, vec![Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn scroll_top_control_visibility_and_activation() {
        let mut p = page();
        p.site.sample_scroll(301.0);
        assert_eq!(
            p.site.reconciler().class_of(p.scroll_top, class::VISIBLE),
            Some(true)
        );
        p.site.sample_scroll(300.0);
        assert_eq!(
            p.site.reconciler().class_of(p.scroll_top, class::VISIBLE),
            Some(false)
        );

        p.site.on_scroll_top_click();
        p.site.on_scroll_top_click();
        assert_eq!(
            p.site.surface().scrolls,
            vec![(0.0, ScrollBehavior::Smooth), (0.0, ScrollBehavior::Smooth)]
        );
    }

    #[test]
    fn escape_clears_all_menu_flags_in_one_update() {
        let mut p = page();
        p.site.menu_input(MenuInput::Toggle);
        assert_eq!(menu_flags(&p), [Some(true); 3]);

        p.site.surface_mut().clear();
        p.site.on_key("Escape");
        assert_eq!(p.site.menu_state(), MenuState::Closed);
        assert_eq!(menu_flags(&p), [Some(false); 3]);
        insta::assert_snapshot!(p.site.surface().ops().join("\n"), @r"
        hamburger.class.active = false
        nav-menu.class.active = false
        body.class.menu-open = false
        ");
    }

    #[test]
    fn menu_flags_never_diverge() {
        let mut p = page();
        let inputs = [
            MenuInput::Toggle,
            MenuInput::LinkSelected,
            MenuInput::LinkSelected,
            MenuInput::Toggle,
            MenuInput::Toggle,
            MenuInput::Toggle,
            MenuInput::OutsideClick,
            MenuInput::Escape,
            MenuInput::Toggle,
        ];
        for input in inputs {
            p.site.menu_input(input);
            let flags = menu_flags(&p);
            let open = p.site.menu_state().is_open();
            if flags != [None; 3] {
                assert_eq!(flags, [Some(open); 3], "after {input:?}");
            }
        }
    }

    #[test]
    fn clicks_inside_the_menu_keep_it_open() {
        let mut p = page();
        p.site.menu_input(MenuInput::Toggle);
        p.site.on_document_click(true);
        assert_eq!(p.site.menu_state(), MenuState::Open);
        p.site.on_document_click(false);
        assert_eq!(p.site.menu_state(), MenuState::Closed);
    }

    #[test]
    fn other_keys_leave_the_menu_alone() {
        let mut p = page();
        p.site.menu_input(MenuInput::Toggle);
        p.site.on_key("Enter");
        assert_eq!(p.site.menu_state(), MenuState::Open);
    }

    #[test]
    fn menu_signal_sees_site_transitions() {
        let mut p = page();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        p.site
            .menu_signal()
            .subscribe(move |s| sink.borrow_mut().push(*s));
        p.site.menu_input(MenuInput::Toggle);
        p.site.on_key("Escape");
        assert_eq!(*seen.borrow(), vec![MenuState::Open, MenuState::Closed]);
    }

    #[test]
    fn grouped_children_reveal_one_stagger_apart() {
        let mut p = page();
        let t0 = p.clock.now();
        for &card in &p.cards {
            assert_eq!(style(&p, card, StyleProp::Opacity).as_deref(), Some("0"));
        }

        p.site.on_intersection(p.grid, true, t0);
        assert_eq!(
            p.site.reconciler().class_of(p.grid, class::VISIBLE),
            Some(true)
        );

        let mut applied_at: Vec<Option<Instant>> = vec![None; p.cards.len()];
        for _ in 0..=80 {
            let now = p.clock.now();
            p.site.tick(now);
            for (i, &card) in p.cards.iter().enumerate() {
                if applied_at[i].is_none()
                    && style(&p, card, StyleProp::Opacity).as_deref() == Some("1")
                {
                    applied_at[i] = Some(now);
                }
            }
            p.clock.advance(Duration::from_millis(10));
        }

        let times: Vec<Instant> = applied_at.into_iter().map(Option::unwrap).collect();
        assert_eq!(times[0], t0);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(100));
        }
    }

    #[test]
    fn reveal_does_not_fire_twice() {
        let mut p = page();
        let t0 = p.clock.now();
        let far = Viewport::new(1400.0, 1200.0, 800.0);
        assert_eq!(p.site.reveal_visible(&far, t0), 1);
        assert_eq!(p.site.reveal_visible(&far, t0), 0);
        assert_eq!(p.site.reveal_visible(&Viewport::new(0.0, 1200.0, 800.0), t0), 0);
        p.site.on_intersection(p.grid, false, t0);
        let id = p.site.region_for(p.grid).unwrap();
        assert!(p.site.regions().get(id).unwrap().is_revealed());
    }

    #[test]
    fn remount_mid_stagger_shows_every_child() {
        let mut p = page();
        let t0 = p.clock.now();
        p.site.on_intersection(p.grid, true, t0);
        // card0 applied immediately, the rest are pending
        assert_eq!(style(&p, p.cards[1], StyleProp::Opacity).as_deref(), Some("0"));

        p.site.mount(SiteLayout {
            regions: vec![RegionSpec {
                element: p.grid,
                bounds: Bounds::new(1500.0, 600.0),
                kind: RegionKind::Grouped {
                    children: p.cards.clone(),
                    stagger: Duration::from_millis(100),
                },
            }],
            ..SiteLayout::default()
        });
        assert_eq!(p.site.next_deadline(), None);
        p.site.on_intersection(p.grid, true, t0 + Duration::from_millis(50));
        p.site.tick(t0 + Duration::from_secs(10));
        let opacities: Vec<_> = p
            .cards
            .iter()
            .map(|&c| style(&p, c, StyleProp::Opacity))
            .collect();
        assert_eq!(opacities, vec![Some("1".to_string()); 5]);
    }

    #[test]
    fn remount_before_reveal_keeps_children_hidden() {
        let mut p = page();
        p.site.mount(SiteLayout {
            regions: vec![RegionSpec {
                element: p.grid,
                bounds: Bounds::new(1500.0, 600.0),
                kind: RegionKind::Grouped {
                    children: p.cards.clone(),
                    stagger: Duration::from_millis(100),
                },
            }],
            ..SiteLayout::default()
        });
        for &card in &p.cards {
            assert_eq!(style(&p, card, StyleProp::Opacity).as_deref(), Some("0"));
        }
    }

    #[test]
    fn anchor_clicks_scroll_below_the_navbar() {
        let mut p = page();
        assert!(p.site.on_anchor_click(Some(600.0)));
        assert!(!p.site.on_anchor_click(None));
        assert_eq!(p.site.surface().scrolls, vec![(520.0, ScrollBehavior::Smooth)]);
    }

    #[test]
    fn gallery_press_restores_after_delay() {
        let mut p = page();
        let item = p.cards[2];
        let t0 = p.clock.now();
        p.site.on_gallery_click(item, t0);
        assert_eq!(style(&p, item, StyleProp::Transform).as_deref(), Some("scale(0.95)"));

        // a second press restarts the timer
        p.site.on_gallery_click(item, t0 + Duration::from_millis(100));
        p.site.tick(t0 + Duration::from_millis(160));
        assert_eq!(style(&p, item, StyleProp::Transform).as_deref(), Some("scale(0.95)"));
        p.site.tick(t0 + Duration::from_millis(250));
        assert_eq!(style(&p, item, StyleProp::Transform).as_deref(), Some("scale(1)"));
    }

    #[test]
    fn touch_release_is_delayed_and_cancelled_by_new_touch() {
        let mut p = page();
        let item = p.cards[0];
        let t0 = p.clock.now();
        p.site.on_gallery_touch_start(item);
        p.site.on_gallery_touch_end(item, t0);
        p.site.on_gallery_touch_start(item);
        p.site.tick(t0 + Duration::from_millis(400));
        assert_eq!(
            p.site.reconciler().class_of(item, class::TOUCH_ACTIVE),
            Some(true)
        );
        p.site.on_gallery_touch_end(item, t0 + Duration::from_millis(400));
        p.site.tick(t0 + Duration::from_millis(700));
        assert_eq!(
            p.site.reconciler().class_of(item, class::TOUCH_ACTIVE),
            Some(false)
        );
    }

    #[test]
    fn toast_lifecycle() {
        let mut p = page();
        let t0 = p.clock.now();
        let toast = p.site.notify("Copied!", t0).unwrap();
        assert_eq!(style(&p, toast, StyleProp::Opacity).as_deref(), Some("0"));

        p.site.tick(t0 + Duration::from_millis(100));
        assert_eq!(style(&p, toast, StyleProp::Opacity).as_deref(), Some("1"));
        assert_eq!(
            style(&p, toast, StyleProp::Transform).as_deref(),
            Some("translateX(-50%) translateY(-10px)")
        );

        p.site.tick(t0 + Duration::from_millis(3000));
        assert_eq!(style(&p, toast, StyleProp::Opacity).as_deref(), Some("0"));
        assert!(p.site.surface().removed.is_empty());

        p.site.tick(t0 + Duration::from_millis(3300));
        assert_eq!(p.site.surface().removed, vec![toast]);
        assert_eq!(p.site.next_deadline(), None);
    }

    #[test]
    fn new_toast_replaces_the_current_one() {
        let mut p = page();
        let t0 = p.clock.now();
        let first = p.site.notify("one", t0).unwrap();
        let second = p.site.notify("two", t0 + Duration::from_millis(50)).unwrap();
        assert_eq!(p.site.surface().removed, vec![first]);

        p.site.tick(t0 + Duration::from_secs(10));
        assert_eq!(p.site.surface().removed, vec![first, second]);
        assert!(
            !p.site
                .surface()
                .ops()
                .iter()
                .any(|op| op == "toast1.style.opacity = 1")
        );
    }

    #[test]
    fn shutdown_removes_the_toast_and_refuses_new_ones() {
        let mut p = page();
        let t0 = p.clock.now();
        let toast = p.site.notify("Sent", t0).unwrap();
        p.site.on_gallery_click(p.cards[0], t0);

        p.site.shutdown();
        assert_eq!(p.site.surface().removed, vec![toast]);
        assert_eq!(p.site.next_deadline(), None);
        assert_eq!(p.site.notify("late", t0 + Duration::from_secs(1)), None);
        assert_eq!(p.site.next_deadline(), None);
    }

    #[test]
    fn toast_is_suppressed_without_a_surface() {
        let mut p = page();
        p.site.surface_mut().refuse_toasts = true;
        assert_eq!(p.site.notify("nope", p.clock.now()), None);
        assert_eq!(p.site.next_deadline(), None);
    }

    #[test]
    fn scroll_bursts_are_throttled_with_trailing_sample() {
        let mut p = page();
        let t0 = p.clock.now();
        p.site.on_scroll(50.0, t0);
        p.site.on_scroll(150.0, t0 + Duration::from_millis(5));
        // the second sample is parked
        assert_eq!(
            style(&p, p.navbar, StyleProp::Background).as_deref(),
            Some("rgba(255, 255, 255, 0.95)")
        );
        let at = p.site.next_deadline().unwrap();
        assert_eq!(at, t0 + Duration::from_millis(16));
        p.site.tick(at);
        assert_eq!(
            style(&p, p.navbar, StyleProp::Background).as_deref(),
            Some("rgba(255, 255, 255, 0.98)")
        );
    }

    #[test]
    fn resize_reapplies_with_new_geometry() {
        let mut p = page();
        p.site.sample_scroll(450.0);
        p.site.on_resize(
            800.0,
            vec![
                SectionGeometry {
                    id: Some("home".into()),
                    bounds: Bounds::new(0.0, 1200.0),
                },
                SectionGeometry {
                    id: Some("about".into()),
                    bounds: Bounds::new(1200.0, 800.0),
                },
            ],
            vec![ParallaxKind::Hero],
        );
        assert_eq!(
            p.site.reconciler().class_of(p.links[0], class::ACTIVE),
            Some(true)
        );
        assert_eq!(
            p.site.reconciler().class_of(p.links[1], class::ACTIVE),
            Some(false)
        );
    }

    #[test]
    fn pages_without_navbar_menu_or_scroll_top_still_work() {
        init_logs();
        let mut s = RecordingSurface::new();
        let hero = s.element("hero");
        let mut site = Site::new(SiteConfig::default(), s);
        site.mount(SiteLayout {
            parallax: vec![ParallaxTarget {
                element: hero,
                kind: ParallaxKind::Hero,
            }],
            viewport_height: 800.0,
            ..SiteLayout::default()
        });

        site.sample_scroll(400.0);
        site.menu_input(MenuInput::Toggle);
        assert_eq!(site.menu_state(), MenuState::Open);
        site.on_key("Escape");
        assert_eq!(site.menu_state(), MenuState::Closed);
        site.on_scroll_top_click();

        assert!(site.surface().scrolls.is_empty());
        assert_eq!(site.surface().ops(), ["hero.style.transform = translateY(-200px)"]);
    }

    #[test]
    fn failed_writes_are_retried_on_the_next_pass() {
        let mut s = RecordingSurface::new();
        let card = s.element("card");
        let state = VisualState::new().opacity(1.0);
        let mut r = Reconciler::new();

        s.fail_writes = true;
        assert_eq!(r.apply(&mut s, card, &state), 0);
        assert_eq!(r.style_of(card, StyleProp::Opacity), None);

        s.fail_writes = false;
        assert_eq!(r.apply(&mut s, card, &state), 1);
        assert_eq!(r.apply(&mut s, card, &state), 0);
        assert_eq!(s.ops(), ["card.style.opacity = 1"]);
    }

    #[test]
    fn config_overrides_merge_with_defaults() {
        let cfg = SiteConfig::from_json(
            r#"{ "anchor_offset": 64, "toast": { "display_ms": 1500 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.anchor_offset, 64.0);
        assert_eq!(cfg.toast.display_ms, 1500);
        assert_eq!(cfg.toast.exit_ms, 300);
        assert_eq!(cfg.reveal.root_margin(), "0px 0px -100px 0px");

        assert!(SiteConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn dispose_bag_runs_once_in_reverse() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let bag = DisposeBag::new();
        for i in 0..3 {
            let order = order.clone();
            bag.add(Dispose::new(move || order.borrow_mut().push(i)));
        }
        assert_eq!(bag.len(), 3);
        bag.dispose();
        bag.dispose();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert!(bag.is_empty());
    }
}
