// Thin wrappers over web-sys lookups and listener wiring. Every lookup
// returns Option so pages that lack a section skip its features quietly.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn element_by_id<T: JsCast>(document: &web::Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

pub fn query<T: JsCast>(root: &web::Document, selector: &str) -> Option<T> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<T>().ok())
}

pub fn query_all(root: &web::Document, selector: &str) -> Vec<web::Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web::Element>().ok())
        .collect()
}

pub fn listen(target: &web::EventTarget, kind: &str, handler: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn listen_passive(
    target: &web::EventTarget,
    kind: &str,
    handler: impl FnMut(web::Event) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    let options = web::AddEventListenerOptions::new();
    options.set_passive(true);
    let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    );
    closure.forget();
}

pub fn listen_keydown(
    target: &web::EventTarget,
    handler: impl FnMut(web::KeyboardEvent) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    let _ = target.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn prefers_reduced_motion() -> bool {
    web::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

pub fn set_text(target: &Option<web::Element>, text: &str) {
    if let Some(el) = target {
        el.set_text_content(Some(text));
    }
}

pub fn set_dataset(target: &web::HtmlElement, key: &str, value: &str) {
    let _ = target.dataset().set(key, value);
}

pub fn focus_no_scroll(target: &web::HtmlElement) {
    let options = web::FocusOptions::new();
    options.set_prevent_scroll(true);
    let _ = target.focus_with_options(&options);
}
