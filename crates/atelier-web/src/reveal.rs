// Scroll-triggered reveal for the work cards on the home page.

use atelier_core::page::reveal_delay_seconds;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

use crate::constants::{REVEAL_ROOT_MARGIN, REVEAL_THRESHOLD};
use crate::dom;

pub fn init(document: &web::Document) {
    let cards = dom::query_all(document, r#"[data-animate="work-card"]"#);
    if cards.is_empty() {
        return;
    }

    for card in &cards {
        apply_delay(card);
    }

    // Reduced motion, or no observer support: content is never held back.
    if dom::prefers_reduced_motion() {
        reveal_all(&cards);
        return;
    }
    let Some(observer) = build_observer() else {
        reveal_all(&cards);
        return;
    };
    for card in &cards {
        observer.observe(card);
    }
}

fn reveal_all(cards: &[web::Element]) {
    for card in cards {
        let _ = card.class_list().add_1("is-visible");
    }
}

fn apply_delay(card: &web::Element) {
    let Some(card) = card.dyn_ref::<web::HtmlElement>() else {
        return;
    };
    let delay = card.dataset().get("delay");
    if let Some(seconds) = reveal_delay_seconds(delay.as_deref()) {
        let _ = card
            .style()
            .set_property("--work-delay", &format!("{seconds}s"));
    }
}

fn build_observer() -> Option<web::IntersectionObserver> {
    let callback = Closure::wrap(Box::new(
        |entries: js_sys::Array, observer: web::IntersectionObserver| {
            for entry in entries.iter() {
                let entry: web::IntersectionObserverEntry = entry.unchecked_into();
                if entry.is_intersecting() {
                    let target = entry.target();
                    let _ = target.class_list().add_1("is-visible");
                    observer.unobserve(&target);
                }
            }
        },
    ) as Box<dyn FnMut(_, _)>);

    let options = web::IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from(REVEAL_THRESHOLD));
    options.set_root_margin(REVEAL_ROOT_MARGIN);
    let observer =
        web::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .ok()?;
    callback.forget();
    Some(observer)
}
