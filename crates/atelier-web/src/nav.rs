// Header chrome: current-page highlighting and the mobile menu overlay.

use atelier_core::page;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::MOBILE_NAV_BREAKPOINT_PX;
use crate::dom;

pub fn init(document: &web::Document) {
    highlight_current_page(document);
    wire_mobile_menu(document);
}

fn highlight_current_page(document: &web::Document) {
    let page = document
        .body()
        .and_then(|body| body.dataset().get("page"))
        .unwrap_or_default();
    for link in dom::query_all(document, ".primary-nav a") {
        let href = link.get_attribute("href").unwrap_or_default();
        let item = link.closest("li").ok().flatten();
        if page::is_link_active(&page, &href) {
            let _ = link.set_attribute("aria-current", "page");
            if let Some(item) = &item {
                let _ = item.set_attribute("data-active", "true");
            }
        } else {
            let _ = link.remove_attribute("aria-current");
            if let Some(item) = &item {
                let _ = item.remove_attribute("data-active");
            }
        }
    }
}

#[derive(Clone)]
struct MobileMenu {
    nav: web::Element,
    toggle: web::HtmlElement,
    overlay: web::HtmlElement,
    body: web::HtmlElement,
}

impl MobileMenu {
    fn is_open(&self) -> bool {
        self.overlay.dataset().get("state").as_deref() == Some("open")
    }

    fn open(&self) {
        let _ = self.toggle.set_attribute("aria-expanded", "true");
        let _ = self.nav.class_list().add_1("is-open");
        dom::set_dataset(&self.overlay, "state", "open");
        let _ = self.overlay.set_attribute("aria-hidden", "false");
        let _ = self.body.class_list().add_1("nav-open");
        if let Some(first) = self
            .overlay
            .query_selector("a")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
        {
            dom::focus_no_scroll(&first);
        }
    }

    fn close(&self) {
        let _ = self.toggle.set_attribute("aria-expanded", "false");
        let _ = self.nav.class_list().remove_1("is-open");
        dom::set_dataset(&self.overlay, "state", "closed");
        let _ = self.overlay.set_attribute("aria-hidden", "true");
        let _ = self.body.class_list().remove_1("nav-open");
    }
}

fn wire_mobile_menu(document: &web::Document) {
    let (Some(nav), Some(toggle), Some(overlay), Some(body)) = (
        dom::query::<web::Element>(document, ".primary-nav"),
        dom::query::<web::HtmlElement>(document, ".nav-toggle"),
        dom::query::<web::HtmlElement>(document, ".nav-overlay"),
        document.body(),
    ) else {
        return;
    };
    let menu = MobileMenu {
        nav,
        toggle,
        overlay,
        body,
    };

    {
        let m = menu.clone();
        dom::listen(menu.toggle.as_ref(), "click", move |_| {
            if m.is_open() {
                m.close();
            } else {
                m.open();
            }
        });
    }

    {
        let m = menu.clone();
        dom::listen(menu.overlay.as_ref(), "click", move |event| {
            let Some(target) = event.target() else {
                return;
            };
            if target.dyn_ref::<web::HtmlAnchorElement>().is_some() {
                m.close();
                return;
            }
            let overlay_target: &web::EventTarget = m.overlay.as_ref();
            if *overlay_target == target {
                m.close();
            }
        });
    }

    {
        let m = menu.clone();
        let toggle = menu.toggle.clone();
        dom::listen_keydown(document.as_ref(), move |event| {
            if event.key() == "Escape" && m.is_open() {
                m.close();
                dom::focus_no_scroll(&toggle);
            }
        });
    }

    // taps on the always-visible inline links also dismiss the overlay
    if let Some(inline) = dom::query::<web::Element>(document, ".nav-inline") {
        let m = menu.clone();
        dom::listen(inline.as_ref(), "click", move |event| {
            let hit_link = event
                .target()
                .map_or(false, |t| t.dyn_ref::<web::HtmlAnchorElement>().is_some());
            if hit_link {
                m.close();
            }
        });
    }

    if let Some(window) = web::window() {
        let m = menu.clone();
        dom::listen(window.as_ref(), "resize", move |_| {
            let width = web::window()
                .and_then(|w| w.inner_width().ok())
                .and_then(|value| value.as_f64())
                .unwrap_or(0.0);
            if width > MOBILE_NAV_BREAKPOINT_PX && m.is_open() {
                m.close();
            }
        });
    }
}
