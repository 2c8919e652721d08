//! `HtmlAudioElement` backend for the coordinator.

use std::rc::Rc;

use atelier_core::{AudioHandle, PlaybackError};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use super::{with_coordinator, SharedPlayer};
use crate::dom;

/// Wraps one `<audio>` element. `play()` can be refused twice: synchronously
/// (no source, detached element) or later when the returned promise rejects
/// (autoplay policy). The late refusal is routed through `on_start_rejected`
/// because by then the coordinator has already moved on.
pub struct ElementAudio {
    element: web::HtmlAudioElement,
    on_start_rejected: Rc<dyn Fn(String)>,
}

impl ElementAudio {
    pub fn new(element: web::HtmlAudioElement, on_start_rejected: Rc<dyn Fn(String)>) -> Self {
        Self {
            element,
            on_start_rejected,
        }
    }
}

impl AudioHandle for ElementAudio {
    fn play(&mut self) -> Result<(), PlaybackError> {
        let promise = self
            .element
            .play()
            .map_err(|err| PlaybackError::new(format!("{err:?}")))?;
        let rejected = Rc::clone(&self.on_start_rejected);
        spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                rejected(format!("{err:?}"));
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn seek_to(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn paused(&self) -> bool {
        self.element.paused()
    }
}

/// Media element lifecycle events feed back into the coordinator. The
/// browser queues these, so none of them run inside one of our own borrows.
pub fn wire_media_events(ctx: &SharedPlayer, index: usize, element: &web::HtmlAudioElement) {
    let target: &web::EventTarget = element.as_ref();
    {
        let ctx = Rc::clone(ctx);
        dom::listen(target, "ended", move |_| {
            with_coordinator(&ctx, |coordinator| coordinator.handle_ended(index));
        });
    }
    {
        // fires for our own pauses too; the coordinator sorts that out
        let ctx = Rc::clone(ctx);
        dom::listen(target, "pause", move |_| {
            with_coordinator(&ctx, |coordinator| coordinator.handle_external_pause(index));
        });
    }
    {
        let ctx = Rc::clone(ctx);
        dom::listen(target, "loadedmetadata", move |_| {
            ctx.coordinator.borrow().handle_metadata_loaded(index);
        });
    }
    {
        let ctx = Rc::clone(ctx);
        dom::listen(target, "timeupdate", move |_| {
            ctx.coordinator.borrow().handle_time_update(index);
        });
    }
}
