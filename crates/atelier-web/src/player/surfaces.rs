//! DOM mirrors registered with the coordinator.
//!
//! Every element handle is optional: a page that renders only part of the
//! player UI still works, the missing pieces are simply never written to.

use atelier_core::{format_time, pulse_scale, Insight, SurfaceUpdate, Track, PULSE_IDLE_SCALE};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

/// Clonable handles to the interactive controls of a hero or bar surface,
/// handed to the wiring code before the surface itself moves into the
/// coordinator.
pub struct TransportControls {
    pub play: Option<web::HtmlElement>,
    pub seek: Option<web::HtmlInputElement>,
    pub volume: Option<web::HtmlInputElement>,
}

/// The large header player: cover art, track details, transport, pulse
/// bars and the production-insight panel.
pub struct HeroSurface {
    container: Option<web::HtmlElement>,
    cover: Option<web::HtmlImageElement>,
    title: Option<web::Element>,
    description: Option<web::Element>,
    details: Option<web::Element>,
    play: Option<web::HtmlElement>,
    seek: Option<web::HtmlInputElement>,
    current: Option<web::Element>,
    duration: Option<web::Element>,
    volume: Option<web::HtmlInputElement>,
    pulses: Vec<web::HtmlElement>,
    insight: Option<InsightPanel>,
}

impl HeroSurface {
    pub fn from_document(document: &web::Document) -> Self {
        let pulses: Vec<web::HtmlElement> = dom::query_all(document, ".music-hero__pulse span")
            .into_iter()
            .filter_map(|el| el.dyn_into::<web::HtmlElement>().ok())
            .collect();
        for bar in &pulses {
            set_pulse(bar, PULSE_IDLE_SCALE);
        }
        Self {
            container: dom::query(document, ".music-hero"),
            cover: dom::element_by_id(document, "hero-cover"),
            title: dom::element_by_id(document, "hero-title"),
            description: dom::element_by_id(document, "hero-description"),
            details: dom::element_by_id(document, "hero-details"),
            play: dom::element_by_id(document, "hero-play"),
            seek: dom::element_by_id(document, "hero-seek"),
            current: dom::element_by_id(document, "hero-current"),
            duration: dom::element_by_id(document, "hero-duration"),
            volume: dom::element_by_id(document, "hero-volume"),
            pulses,
            insight: InsightPanel::from_document(document),
        }
    }

    pub fn controls(&self) -> TransportControls {
        TransportControls {
            play: self.play.clone(),
            seek: self.seek.clone(),
            volume: self.volume.clone(),
        }
    }

    fn show_track(&self, track: &Track) {
        if let Some(cover) = &self.cover {
            cover.set_src(&track.cover);
            cover.set_alt(&format!("{} cover art", track.title));
        }
        dom::set_text(&self.title, &track.title);
        dom::set_text(&self.description, &track.description);
        dom::set_text(&self.details, &track.byline());
        if let Some(panel) = &self.insight {
            match track.insight() {
                Some(insight) => panel.show(insight),
                None => panel.hide(),
            }
        }
    }
}

impl atelier_core::PlayerSurface for HeroSurface {
    fn apply(&self, update: &SurfaceUpdate) {
        match update {
            SurfaceUpdate::ActiveTrack { track, .. } => self.show_track(track),
            SurfaceUpdate::Transport { playing } => {
                if let Some(container) = &self.container {
                    dom::set_dataset(container, "state", if *playing { "playing" } else { "idle" });
                }
                sync_transport_button(&self.play, *playing);
            }
            SurfaceUpdate::Time {
                is_active,
                current,
                duration,
                ratio,
                ..
            } => {
                if *is_active {
                    dom::set_text(&self.current, &format_time(*current));
                    dom::set_text(&self.duration, &format_time(*duration));
                    sync_seek_slider(&self.seek, *ratio);
                }
            }
            SurfaceUpdate::Volume { value } => sync_volume_slider(&self.volume, *value),
            SurfaceUpdate::Pulse { elapsed } => {
                for (index, bar) in self.pulses.iter().enumerate() {
                    set_pulse(bar, pulse_scale(*elapsed, index));
                }
            }
            SurfaceUpdate::PulseReset => {
                for bar in &self.pulses {
                    set_pulse(bar, PULSE_IDLE_SCALE);
                }
            }
            SurfaceUpdate::TrackTransport { .. } => {}
        }
    }
}

/// The slim now-playing bar pinned to the bottom of the page.
pub struct BarSurface {
    container: Option<web::HtmlElement>,
    title: Option<web::Element>,
    play: Option<web::HtmlElement>,
    seek: Option<web::HtmlInputElement>,
    current: Option<web::Element>,
    duration: Option<web::Element>,
    volume: Option<web::HtmlInputElement>,
}

impl BarSurface {
    pub fn from_document(document: &web::Document) -> Self {
        Self {
            container: dom::element_by_id(document, "now-playing"),
            title: dom::element_by_id(document, "bar-title"),
            play: dom::element_by_id(document, "bar-play"),
            seek: dom::element_by_id(document, "bar-seek"),
            current: dom::element_by_id(document, "bar-current"),
            duration: dom::element_by_id(document, "bar-duration"),
            volume: dom::element_by_id(document, "bar-volume"),
        }
    }

    pub fn controls(&self) -> TransportControls {
        TransportControls {
            play: self.play.clone(),
            seek: self.seek.clone(),
            volume: self.volume.clone(),
        }
    }
}

impl atelier_core::PlayerSurface for BarSurface {
    fn apply(&self, update: &SurfaceUpdate) {
        match update {
            SurfaceUpdate::ActiveTrack { track, .. } => {
                dom::set_text(&self.title, &track.title);
            }
            SurfaceUpdate::Transport { playing } => {
                if let Some(container) = &self.container {
                    dom::set_dataset(container, "state", if *playing { "playing" } else { "idle" });
                }
                sync_transport_button(&self.play, *playing);
            }
            SurfaceUpdate::Time {
                is_active,
                current,
                duration,
                ratio,
                ..
            } => {
                if *is_active {
                    dom::set_text(&self.current, &format_time(*current));
                    dom::set_text(&self.duration, &format_time(*duration));
                    sync_seek_slider(&self.seek, *ratio);
                }
            }
            SurfaceUpdate::Volume { value } => sync_volume_slider(&self.volume, *value),
            SurfaceUpdate::Pulse { .. }
            | SurfaceUpdate::PulseReset
            | SurfaceUpdate::TrackTransport { .. } => {}
        }
    }
}

/// One generated track card: active marker, its own little transport and
/// clock.
pub struct CardSurface {
    index: usize,
    article: web::HtmlElement,
    play: Option<web::HtmlElement>,
    time: Option<web::Element>,
}

impl CardSurface {
    pub fn new(
        index: usize,
        article: web::HtmlElement,
        play: Option<web::HtmlElement>,
        time: Option<web::Element>,
    ) -> Self {
        Self {
            index,
            article,
            play,
            time,
        }
    }
}

impl atelier_core::PlayerSurface for CardSurface {
    fn apply(&self, update: &SurfaceUpdate) {
        match update {
            SurfaceUpdate::ActiveTrack { index, .. } => {
                let _ = self
                    .article
                    .class_list()
                    .toggle_with_force("is-active", *index == self.index);
            }
            SurfaceUpdate::TrackTransport { index, playing } => {
                if *index == self.index {
                    sync_transport_button(&self.play, *playing);
                }
            }
            SurfaceUpdate::Time {
                index,
                current,
                duration,
                ..
            } => {
                if *index == self.index {
                    dom::set_text(
                        &self.time,
                        &format!("{} / {}", format_time(*current), format_time(*duration)),
                    );
                }
            }
            SurfaceUpdate::Transport { .. }
            | SurfaceUpdate::Volume { .. }
            | SurfaceUpdate::Pulse { .. }
            | SurfaceUpdate::PulseReset => {}
        }
    }
}

/// Collapsible production-notes panel inside the hero. Hidden entirely for
/// tracks that ship no insight data.
struct InsightPanel {
    document: web::Document,
    container: web::HtmlElement,
    toggle: web::HtmlElement,
    body: web::HtmlElement,
}

impl InsightPanel {
    fn from_document(document: &web::Document) -> Option<Self> {
        let container: web::HtmlElement = dom::element_by_id(document, "hero-insight")?;
        let toggle: web::HtmlElement = dom::element_by_id(document, "hero-insight-toggle")?;
        let body: web::HtmlElement = dom::element_by_id(document, "hero-insight-body")?;
        wire_toggle(&toggle, &body);
        Some(Self {
            document: document.clone(),
            container,
            toggle,
            body,
        })
    }

    /// Rebuild the panel body for a new track and collapse it.
    fn show(&self, insight: &Insight) {
        self.body.set_inner_html("");
        if let Some(notes) = insight.notes.as_deref().filter(|notes| !notes.is_empty()) {
            if let Ok(paragraph) = self.document.create_element("p") {
                paragraph.set_class_name("insight-notes");
                paragraph.set_text_content(Some(notes));
                let _ = self.body.append_child(&paragraph);
            }
        }
        self.append_list("Process", "ol", &insight.steps);
        self.append_list("Gear", "ul", &insight.gear);
        self.append_list("Media", "ul", &insight.media);
        self.collapse();
        let _ = self.container.remove_attribute("hidden");
    }

    fn hide(&self) {
        self.collapse();
        let _ = self.container.set_attribute("hidden", "");
    }

    fn collapse(&self) {
        let _ = self.toggle.set_attribute("aria-expanded", "false");
        let _ = self.body.set_attribute("hidden", "");
    }

    fn append_list(&self, heading: &str, list_tag: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let (Ok(section), Ok(label), Ok(list)) = (
            self.document.create_element("section"),
            self.document.create_element("h4"),
            self.document.create_element(list_tag),
        ) else {
            return;
        };
        label.set_text_content(Some(heading));
        let _ = section.append_child(&label);
        for item in items {
            if let Ok(entry) = self.document.create_element("li") {
                entry.set_text_content(Some(item));
                let _ = list.append_child(&entry);
            }
        }
        let _ = section.append_child(&list);
        let _ = self.body.append_child(&section);
    }
}

fn wire_toggle(toggle: &web::HtmlElement, body: &web::HtmlElement) {
    let toggle = toggle.clone();
    let body = body.clone();
    dom::listen(toggle.clone().as_ref(), "click", move |_| {
        let expanded = toggle.get_attribute("aria-expanded").as_deref() == Some("true");
        let _ = toggle.set_attribute("aria-expanded", if expanded { "false" } else { "true" });
        if expanded {
            let _ = body.set_attribute("hidden", "");
        } else {
            let _ = body.remove_attribute("hidden");
        }
    });
}

fn sync_transport_button(button: &Option<web::HtmlElement>, playing: bool) {
    if let Some(button) = button {
        dom::set_dataset(button, "state", if playing { "pause" } else { "play" });
        let _ = button.set_attribute("aria-label", if playing { "Pause" } else { "Play" });
    }
}

/// A slider mid-drag keeps its position; writing to it would fight the
/// pointer.
fn sync_seek_slider(slider: &Option<web::HtmlInputElement>, ratio: f64) {
    if let Some(slider) = slider {
        if slider.dataset().get("seeking").as_deref() == Some("true") {
            return;
        }
        slider.set_value(&format!("{ratio}"));
    }
}

fn sync_volume_slider(slider: &Option<web::HtmlInputElement>, value: f64) {
    if let Some(slider) = slider {
        slider.set_value(&format!("{value}"));
    }
}

fn set_pulse(bar: &web::HtmlElement, scale: f64) {
    let _ = bar
        .style()
        .set_property("--pulse-scale", &format!("{scale:.3}"));
}
