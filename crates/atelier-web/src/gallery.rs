// Video gallery: placeholders with lazy thumbnails, swapped for a real
// YouTube embed only when the visitor asks for one.

use atelier_core::video::{embed_url, VideoItem};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{GALLERY_ROOT_MARGIN, VIDEOS_LOAD_ERROR, VIDEOS_URL};
use crate::dom;
use crate::net;

const IFRAME_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

pub async fn init(document: &web::Document) {
    let Some(list) = document.get_element_by_id("video-list") else {
        return;
    };
    let videos: Vec<VideoItem> = match net::fetch_json(VIDEOS_URL).await {
        Ok(videos) => videos,
        Err(err) => {
            log::error!("[gallery] failed to load videos: {err:?}");
            list.set_inner_html(&format!("<p>{VIDEOS_LOAD_ERROR}</p>"));
            return;
        }
    };
    log::info!("[gallery] loaded {} videos", videos.len());

    let observer = build_thumbnail_observer();
    for video in &videos {
        let Some((article, placeholder, img)) = build_card(document, video) else {
            continue;
        };
        let _ = list.append_child(&article);
        wire_interaction(document, &placeholder);
        match &observer {
            Some(observer) => observer.observe(&placeholder),
            // no observer support: load thumbnails eagerly
            None => hydrate_thumbnail(&img, &video.thumbnail),
        }
    }
}

fn build_card(
    document: &web::Document,
    video: &VideoItem,
) -> Option<(web::Element, web::HtmlElement, web::HtmlImageElement)> {
    let article = document.create_element("article").ok()?;
    article.set_class_name("video-card");
    let _ = article.set_attribute("role", "listitem");

    let placeholder: web::HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
    placeholder.set_class_name("lite-youtube");
    dom::set_dataset(&placeholder, "videoId", &video.id);
    dom::set_dataset(&placeholder, "title", &video.title);
    dom::set_dataset(&placeholder, "thumbnail", &video.thumbnail);
    let _ = placeholder.set_attribute("role", "button");
    let _ = placeholder.set_attribute("tabindex", "0");
    let _ = placeholder.set_attribute("aria-label", &format!("Play {}", video.title));

    let img: web::HtmlImageElement = document.create_element("img").ok()?.dyn_into().ok()?;
    img.set_alt(&format!("{} preview", video.title));
    let _ = img.set_attribute("decoding", "async");
    let _ = img.set_attribute("loading", "lazy");
    let _ = placeholder.append_child(&img);

    let info = document.create_element("div").ok()?;
    info.set_class_name("video-info");
    let title = document.create_element("h3").ok()?;
    title.set_text_content(Some(&video.title));
    let description = document.create_element("p").ok()?;
    description.set_text_content(Some(&video.description));
    let meta = document.create_element("p").ok()?;
    meta.set_class_name("video-meta");
    meta.set_text_content(Some(&video.meta_line()));
    let _ = info.append_child(&title);
    let _ = info.append_child(&description);
    let _ = info.append_child(&meta);

    let _ = article.append_child(&placeholder);
    let _ = article.append_child(&info);
    Some((article, placeholder, img))
}

fn hydrate_thumbnail(img: &web::HtmlImageElement, src: &str) {
    if img.dataset().get("loaded").as_deref() == Some("true") {
        return;
    }
    img.set_src(src);
    dom::set_dataset(img, "loaded", "true");
}

fn inject_iframe(document: &web::Document, placeholder: &web::HtmlElement) {
    if placeholder.dataset().get("embedded").as_deref() == Some("true") {
        return;
    }
    let Some(video_id) = placeholder.dataset().get("videoId") else {
        return;
    };
    let Ok(iframe) = document.create_element("iframe") else {
        return;
    };
    let title = placeholder
        .dataset()
        .get("title")
        .unwrap_or_else(|| "YouTube video".to_string());
    let _ = iframe.set_attribute("src", &embed_url(&video_id));
    let _ = iframe.set_attribute("title", &title);
    let _ = iframe.set_attribute("frameborder", "0");
    let _ = iframe.set_attribute("allow", IFRAME_ALLOW);
    let _ = iframe.set_attribute("allowfullscreen", "");
    let _ = iframe.set_attribute("loading", "lazy");
    placeholder.set_inner_html("");
    let _ = placeholder.append_child(&iframe);
    dom::set_dataset(placeholder, "embedded", "true");
}

fn wire_interaction(document: &web::Document, placeholder: &web::HtmlElement) {
    {
        let document = document.clone();
        let placeholder_click = placeholder.clone();
        dom::listen(placeholder.as_ref(), "click", move |_| {
            inject_iframe(&document, &placeholder_click);
        });
    }
    {
        let document = document.clone();
        let placeholder_key = placeholder.clone();
        dom::listen_keydown(placeholder.as_ref(), move |event| {
            if event.key() == "Enter" || event.key() == " " {
                event.prevent_default();
                inject_iframe(&document, &placeholder_key);
            }
        });
    }
}

fn build_thumbnail_observer() -> Option<web::IntersectionObserver> {
    let callback = Closure::wrap(Box::new(
        |entries: js_sys::Array, observer: web::IntersectionObserver| {
            for entry in entries.iter() {
                let entry: web::IntersectionObserverEntry = entry.unchecked_into();
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                let thumbnail = target
                    .dyn_ref::<web::HtmlElement>()
                    .and_then(|holder| holder.dataset().get("thumbnail"));
                let img = target
                    .query_selector("img")
                    .ok()
                    .flatten()
                    .and_then(|el| el.dyn_into::<web::HtmlImageElement>().ok());
                if let (Some(thumbnail), Some(img)) = (thumbnail, img) {
                    hydrate_thumbnail(&img, &thumbnail);
                }
                observer.unobserve(&target);
            }
        },
    ) as Box<dyn FnMut(_, _)>);

    let options = web::IntersectionObserverInit::new();
    options.set_root_margin(GALLERY_ROOT_MARGIN);
    let observer =
        web::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .ok()?;
    callback.forget();
    Some(observer)
}
