//! Binds the playback coordinator to the page: builds the track cards,
//! registers the hero / bar / card mirrors and routes user input into
//! coordinator operations.

mod audio;
mod frame;
mod surfaces;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use atelier_core::{Coordinator, SurfaceId, Track};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{TRACKS_LOAD_ERROR, TRACKS_URL};
use crate::dom;
use crate::net;
use audio::ElementAudio;
use surfaces::{BarSurface, CardSurface, HeroSurface, TransportControls};

pub struct PlayerContext {
    coordinator: RefCell<Coordinator<ElementAudio>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    frame_id: Cell<Option<i32>>,
}

pub type SharedPlayer = Rc<PlayerContext>;

/// Every input handler funnels through here: run one coordinator operation,
/// then reconcile the animation loop with the state it left behind.
fn with_coordinator<R>(
    ctx: &SharedPlayer,
    operate: impl FnOnce(&mut Coordinator<ElementAudio>) -> R,
) -> R {
    let result = operate(&mut ctx.coordinator.borrow_mut());
    frame::sync(ctx);
    result
}

pub async fn init(document: &web::Document) {
    let Some(list) = dom::element_by_id::<web::HtmlElement>(document, "track-list") else {
        return;
    };

    let ctx: SharedPlayer = Rc::new(PlayerContext {
        coordinator: RefCell::new(Coordinator::new(dom::prefers_reduced_motion())),
        tick: RefCell::new(None),
        frame_id: Cell::new(None),
    });
    frame::install(&ctx);

    let hero = HeroSurface::from_document(document);
    let bar = BarSurface::from_document(document);
    let hero_controls = hero.controls();
    let bar_controls = bar.controls();
    let (hero_id, bar_id) = {
        let mut coordinator = ctx.coordinator.borrow_mut();
        (
            coordinator.add_surface(Box::new(hero)),
            coordinator.add_surface(Box::new(bar)),
        )
    };
    wire_transport(&ctx, &hero_controls, hero_id);
    wire_transport(&ctx, &bar_controls, bar_id);

    let tracks: Vec<Track> = match net::fetch_json(TRACKS_URL).await {
        Ok(tracks) => tracks,
        Err(err) => {
            log::error!("[player] failed to load tracks: {err:?}");
            list.set_inner_html(&format!("<p>{TRACKS_LOAD_ERROR}</p>"));
            return;
        }
    };

    for track in &tracks {
        let Some(card) = build_card(document, track) else {
            continue;
        };
        let Ok(element) = web::HtmlAudioElement::new_with_src(&track.audio) else {
            continue;
        };
        element.set_preload("metadata");

        // the slot this track will occupy once added below
        let index = ctx.coordinator.borrow().track_count();
        audio::wire_media_events(&ctx, index, &element);
        let handle = ElementAudio::new(element, rejection_callback(&ctx, index));
        {
            let mut coordinator = ctx.coordinator.borrow_mut();
            coordinator.add_track(track.clone(), handle);
            coordinator.add_surface(Box::new(CardSurface::new(
                index,
                card.article.clone(),
                card.play.clone(),
                card.time.clone(),
            )));
        }
        wire_card(&ctx, index, &card, hero_controls.play.clone());
        let _ = list.append_child(&card.article);
    }

    let count = ctx.coordinator.borrow().track_count();
    if count > 0 {
        with_coordinator(&ctx, |coordinator| coordinator.set_active(0));
    }
    log::info!("[player] loaded {count} tracks");
}

fn rejection_callback(ctx: &SharedPlayer, index: usize) -> Rc<dyn Fn(String)> {
    let ctx = Rc::clone(ctx);
    Rc::new(move |reason: String| {
        with_coordinator(&ctx, |coordinator| {
            coordinator.handle_play_failure(index, &reason);
        });
    })
}

fn wire_transport(ctx: &SharedPlayer, controls: &TransportControls, id: SurfaceId) {
    if let Some(play) = &controls.play {
        let ctx = Rc::clone(ctx);
        dom::listen(play.as_ref(), "click", move |_| {
            with_coordinator(&ctx, |coordinator| {
                let _ = coordinator.toggle_playback();
            });
        });
    }
    if let Some(seek) = &controls.seek {
        wire_seeking_flag(seek);
        let ctx = Rc::clone(ctx);
        let slider = seek.clone();
        dom::listen(seek.as_ref(), "input", move |_| {
            let ratio = slider.value_as_number();
            with_coordinator(&ctx, |coordinator| {
                if let Some(index) = coordinator.active() {
                    coordinator.seek(index, ratio);
                }
            });
        });
    }
    if let Some(volume) = &controls.volume {
        let ctx = Rc::clone(ctx);
        let slider = volume.clone();
        dom::listen(volume.as_ref(), "input", move |_| {
            let value = slider.value_as_number();
            with_coordinator(&ctx, |coordinator| {
                coordinator.set_volume(value, Some(id));
            });
        });
    }
}

// The surfaces skip sliders flagged `data-seeking` so a drag in progress is
// never overwritten; these listeners maintain that flag.
fn wire_seeking_flag(slider: &web::HtmlInputElement) {
    let set = |flag: &'static str| {
        let slider = slider.clone();
        move |_: web::Event| dom::set_dataset(&slider, "seeking", flag)
    };
    for kind in ["pointerdown", "mousedown"] {
        dom::listen(slider.as_ref(), kind, set("true"));
    }
    dom::listen_passive(slider.as_ref(), "touchstart", set("true"));
    for kind in ["pointerup", "pointercancel", "mouseup", "touchend", "blur"] {
        dom::listen(slider.as_ref(), kind, set("false"));
    }
}

struct CardParts {
    article: web::HtmlElement,
    play: Option<web::HtmlElement>,
    time: Option<web::Element>,
}

fn build_card(document: &web::Document, track: &Track) -> Option<CardParts> {
    let article: web::HtmlElement = document.create_element("article").ok()?.dyn_into().ok()?;
    article.set_class_name("track-card");
    let _ = article.set_attribute("role", "listitem");
    article.set_tab_index(0);

    let media = document.create_element("div").ok()?;
    media.set_class_name("track-media");

    let wrapper = document.create_element("div").ok()?;
    wrapper.set_class_name("track-cover-wrapper");
    let cover: web::HtmlImageElement = document.create_element("img").ok()?.dyn_into().ok()?;
    cover.set_src(&track.cover);
    cover.set_alt(&format!("{} cover art", track.title));
    cover.set_width(120);
    cover.set_height(120);
    let _ = cover.set_attribute("loading", "lazy");
    let _ = wrapper.append_child(&cover);

    let meta = document.create_element("div").ok()?;
    meta.set_class_name("track-meta");
    let title = document.create_element("h3").ok()?;
    title.set_text_content(Some(&track.title));
    let summary = document.create_element("p").ok()?;
    summary.set_text_content(Some(&track.card_summary()));
    let _ = meta.append_child(&title);
    let _ = meta.append_child(&summary);

    let _ = media.append_child(&wrapper);
    let _ = media.append_child(&meta);

    let actions = document.create_element("div").ok()?;
    actions.set_class_name("track-actions");
    let play: web::HtmlElement = document.create_element("button").ok()?.dyn_into().ok()?;
    play.set_class_name("track-play");
    let _ = play.set_attribute("type", "button");
    dom::set_dataset(&play, "state", "play");
    let _ = play.set_attribute("aria-label", &format!("Play {}", track.title));
    let time = document.create_element("span").ok()?;
    time.set_class_name("track-time");
    time.set_text_content(Some("0:00 / 0:00"));
    let _ = actions.append_child(&play);
    let _ = actions.append_child(&time);

    let _ = article.append_child(&media);
    let _ = article.append_child(&actions);

    Some(CardParts {
        article,
        play: Some(play),
        time: Some(time),
    })
}

fn wire_card(
    ctx: &SharedPlayer,
    index: usize,
    card: &CardParts,
    hero_play: Option<web::HtmlElement>,
) {
    {
        let ctx = Rc::clone(ctx);
        dom::listen(card.article.as_ref(), "click", move |_| {
            with_coordinator(&ctx, |coordinator| coordinator.activate(index));
        });
    }
    {
        let ctx = Rc::clone(ctx);
        dom::listen(card.article.as_ref(), "focusin", move |_| {
            with_coordinator(&ctx, |coordinator| coordinator.set_active(index));
        });
    }
    {
        let ctx = Rc::clone(ctx);
        dom::listen_keydown(card.article.as_ref(), move |event| {
            if event.key() == "Enter" || event.key() == " " {
                event.prevent_default();
                with_coordinator(&ctx, |coordinator| coordinator.activate(index));
                if let Some(play) = &hero_play {
                    dom::focus_no_scroll(play);
                }
            }
        });
    }
    if let Some(button) = &card.play {
        let ctx = Rc::clone(ctx);
        dom::listen(button.as_ref(), "click", move |event| {
            event.stop_propagation();
            with_coordinator(&ctx, |coordinator| {
                if coordinator.playing() == Some(index) {
                    coordinator.pause(index);
                } else {
                    let _ = coordinator.play(index);
                }
            });
        });
    }
}
