#![cfg(target_arch = "wasm32")]

mod constants;
mod dom;
mod gallery;
mod nav;
mod net;
mod player;
mod reveal;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("atelier-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    nav::init(&document);
    reveal::init(&document);
    stamp_year(&document);

    // each of these finds nothing to do on pages without its markup
    player::init(&document).await;
    gallery::init(&document).await;

    Ok(())
}

fn stamp_year(document: &web::Document) {
    if let Some(year_el) = dom::query::<web::Element>(document, "[data-year]") {
        let year = js_sys::Date::new_0().get_full_year();
        year_el.set_text_content(Some(&year.to_string()));
    }
}
