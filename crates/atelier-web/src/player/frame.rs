//! Animation-frame loop for the pulse bars and the smooth clock.
//!
//! The loop is armed only while something is audible and is cancelled
//! outright when playback stops, so an idle page schedules no frames.

use std::rc::Rc;

use atelier_core::FrameDirective;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use super::SharedPlayer;

/// Builds the tick closure once and parks it in the context. The closure
/// re-arms itself while the coordinator reports more frames are wanted.
pub fn install(ctx: &SharedPlayer) {
    let tick_ctx = Rc::clone(ctx);
    *ctx.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        tick_ctx.frame_id.set(None);
        if tick_ctx.coordinator.borrow().frame() == FrameDirective::Continue {
            request_frame(&tick_ctx);
        }
    }) as Box<dyn FnMut()>));
}

/// Reconcile the loop with the coordinator: arm it when something is
/// playing (and motion is allowed), cancel any pending frame otherwise.
/// The surfaces already received their reset by the time this runs.
pub fn sync(ctx: &SharedPlayer) {
    if ctx.coordinator.borrow().should_animate() {
        request_frame(ctx);
    } else {
        cancel(ctx);
    }
}

fn request_frame(ctx: &SharedPlayer) {
    if ctx.frame_id.get().is_some() {
        return;
    }
    let Some(window) = web::window() else {
        return;
    };
    let tick = ctx.tick.borrow();
    let Some(closure) = tick.as_ref() else {
        return;
    };
    if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        ctx.frame_id.set(Some(id));
    }
}

fn cancel(ctx: &SharedPlayer) {
    if let (Some(window), Some(id)) = (web::window(), ctx.frame_id.take()) {
        let _ = window.cancel_animation_frame(id);
    }
}
