//! Playback coordination for the music page.
//!
//! The coordinator owns one handle per track plus the page-wide facts the
//! UI mirrors everywhere: which track the hero describes, which track (if
//! any) is audible, and the master volume. It is platform-free; the web
//! crate supplies `HtmlAudioElement`-backed handles and DOM surfaces, and
//! native tests supply in-memory fakes.

use thiserror::Error;

use crate::track::Track;

/// Volume applied to every handle until a slider says otherwise.
pub const DEFAULT_MASTER_VOLUME: f64 = 0.85;

/// Resting bar height multiplier when nothing is audible.
pub const PULSE_IDLE_SCALE: f64 = 0.35;
const PULSE_SPAN: f64 = 0.7;
const PULSE_BASE_RATE: f64 = 1.6;
const PULSE_RATE_STEP: f64 = 0.2;

/// Raised when the audio backend refuses to start playback, typically
/// autoplay policy or a missing source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("playback start rejected: {reason}")]
pub struct PlaybackError {
    pub reason: String,
}

impl PlaybackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Cued at the start, nothing heard yet (also the post-`reset` state).
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Imperative playback backend driven by the coordinator.
pub trait AudioHandle {
    /// Request playback. Only synchronous refusals surface here; a backend
    /// whose start call settles later reports failure through
    /// [`Coordinator::handle_play_failure`].
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn current_time(&self) -> f64;
    /// Reported length in seconds, `NaN` until metadata is known.
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;
}

/// Identifies a registered surface so a change can skip the surface it
/// originated from (a slider being dragged must not be written back).
pub type SurfaceId = usize;

/// One UI-facing consequence of a coordinator transition.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceUpdate {
    /// The hero and now-playing mirrors describe this track from now on.
    ActiveTrack { index: usize, track: Track },
    /// Transport state of a single track (per-card play buttons).
    TrackTransport { index: usize, playing: bool },
    /// Whether anything on the page is audible (hero and bar transports).
    Transport { playing: bool },
    /// Clock state of one track.
    Time {
        index: usize,
        is_active: bool,
        current: f64,
        duration: f64,
        ratio: f64,
    },
    Volume { value: f64 },
    /// Animation frame while something is audible.
    Pulse { elapsed: f64 },
    /// Bars fall back to their idle height.
    PulseReset,
}

/// A view that mirrors coordinator state. Surfaces only render; they never
/// call back into the coordinator.
pub trait PlayerSurface {
    fn apply(&self, update: &SurfaceUpdate);
}

/// What the animation loop should do after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDirective {
    Continue,
    Stop,
}

struct TrackState<H> {
    track: Track,
    handle: H,
    phase: PlaybackPhase,
}

/// Enforces the page-wide playback rules: at most one track audible, one
/// track active in the hero, one master volume. All mutation funnels
/// through these methods, and every observable consequence is broadcast to
/// the registered surfaces. Out-of-range indices are ignored.
pub struct Coordinator<H: AudioHandle> {
    tracks: Vec<TrackState<H>>,
    surfaces: Vec<Box<dyn PlayerSurface>>,
    active: Option<usize>,
    playing: Option<usize>,
    master_volume: f64,
    reduced_motion: bool,
}

impl<H: AudioHandle> Coordinator<H> {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            tracks: Vec::new(),
            surfaces: Vec::new(),
            active: None,
            playing: None,
            master_volume: DEFAULT_MASTER_VOLUME,
            reduced_motion,
        }
    }

    /// Register a track. The handle inherits the current master volume so
    /// late additions sound like everything else.
    pub fn add_track(&mut self, track: Track, mut handle: H) -> usize {
        handle.set_volume(self.master_volume);
        self.tracks.push(TrackState {
            track,
            handle,
            phase: PlaybackPhase::Idle,
        });
        self.tracks.len() - 1
    }

    pub fn add_surface(&mut self, surface: Box<dyn PlayerSurface>) -> SurfaceId {
        self.surfaces.push(surface);
        self.surfaces.len() - 1
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index).map(|state| &state.track)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn playing(&self) -> Option<usize> {
        self.playing
    }

    pub fn phase(&self, index: usize) -> Option<PlaybackPhase> {
        self.tracks.get(index).map(|state| state.phase)
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    /// True while the pulse loop should run.
    pub fn should_animate(&self) -> bool {
        self.playing.is_some() && !self.reduced_motion
    }

    /// Point the hero and bar mirrors at a track without touching playback.
    /// Re-syncs the clock and re-applies the master volume to its handle.
    pub fn set_active(&mut self, index: usize) {
        if index >= self.tracks.len() {
            return;
        }
        self.active = Some(index);
        let volume = self.master_volume;
        self.tracks[index].handle.set_volume(volume);
        let update = SurfaceUpdate::ActiveTrack {
            index,
            track: self.tracks[index].track.clone(),
        };
        self.publish(&update);
        self.sync_time(index);
        self.publish(&SurfaceUpdate::Transport {
            playing: self.anything_audible(),
        });
    }

    /// Start a track, pausing whichever other track was audible first.
    /// On refusal nothing is marked playing and the transports stay quiet.
    pub fn play(&mut self, index: usize) -> Result<(), PlaybackError> {
        if index >= self.tracks.len() {
            return Ok(());
        }
        if let Some(prev) = self.playing {
            if prev != index {
                self.tracks[prev].handle.pause();
                self.tracks[prev].phase = PlaybackPhase::Paused;
                self.playing = None;
                self.publish(&SurfaceUpdate::TrackTransport {
                    index: prev,
                    playing: false,
                });
            }
        }
        self.set_active(index);
        match self.tracks[index].handle.play() {
            Ok(()) => {
                self.tracks[index].phase = PlaybackPhase::Playing;
                self.playing = Some(index);
                self.publish(&SurfaceUpdate::TrackTransport {
                    index,
                    playing: true,
                });
                self.publish(&SurfaceUpdate::Transport { playing: true });
                Ok(())
            }
            Err(err) => {
                log::warn!("[player] could not start track {index}: {err}");
                self.publish(&SurfaceUpdate::TrackTransport {
                    index,
                    playing: false,
                });
                self.publish(&SurfaceUpdate::Transport {
                    playing: self.anything_audible(),
                });
                Err(err)
            }
        }
    }

    /// Pause a track. Safe to call when it is already paused.
    pub fn pause(&mut self, index: usize) {
        let Some(state) = self.tracks.get_mut(index) else {
            return;
        };
        state.handle.pause();
        if state.phase == PlaybackPhase::Playing {
            state.phase = PlaybackPhase::Paused;
        }
        if self.playing == Some(index) {
            self.playing = None;
            self.publish(&SurfaceUpdate::PulseReset);
        }
        self.publish(&SurfaceUpdate::TrackTransport {
            index,
            playing: false,
        });
        self.publish(&SurfaceUpdate::Transport {
            playing: self.anything_audible(),
        });
    }

    /// Pause and rewind to the start, returning the track to [`PlaybackPhase::Idle`].
    pub fn reset(&mut self, index: usize) {
        if index >= self.tracks.len() {
            return;
        }
        self.pause(index);
        let state = &mut self.tracks[index];
        state.handle.seek_to(0.0);
        state.phase = PlaybackPhase::Idle;
        self.sync_time(index);
    }

    /// Hero and bar play buttons: pause the active track if it is audible,
    /// otherwise play it. With no active track yet, start the first one.
    pub fn toggle_playback(&mut self) -> Result<(), PlaybackError> {
        let Some(active) = self.active else {
            if self.tracks.is_empty() {
                return Ok(());
            }
            return self.play(0);
        };
        if self.playing == Some(active) && !self.tracks[active].handle.paused() {
            self.pause(active);
            Ok(())
        } else {
            self.play(active)
        }
    }

    /// Card clicks: make a track the hero subject and cue it at the start
    /// without playing, silencing whatever else was audible.
    pub fn activate(&mut self, index: usize) {
        if index >= self.tracks.len() {
            return;
        }
        if let Some(playing) = self.playing {
            if playing != index {
                self.pause(playing);
            }
        }
        self.set_active(index);
        self.reset(index);
    }

    /// Scrub to `ratio` (0..=1) of the track's duration. Ignored while the
    /// duration is still unknown or the ratio is not a number.
    pub fn seek(&mut self, index: usize, ratio: f64) {
        if !ratio.is_finite() {
            return;
        }
        let Some(state) = self.tracks.get_mut(index) else {
            return;
        };
        let duration = state.handle.duration();
        if !duration.is_finite() {
            return;
        }
        state.handle.seek_to(ratio.clamp(0.0, 1.0) * duration);
        self.sync_time(index);
    }

    /// Clamp to [0, 1], apply to every handle, and mirror to every volume
    /// slider except the one the change came from.
    pub fn set_volume(&mut self, value: f64, origin: Option<SurfaceId>) {
        if !value.is_finite() {
            return;
        }
        let volume = value.clamp(0.0, 1.0);
        self.master_volume = volume;
        for state in &mut self.tracks {
            state.handle.set_volume(volume);
        }
        self.publish_except(&SurfaceUpdate::Volume { value: volume }, origin);
    }

    /// One animation frame: emit the pulse (unless motion is reduced) and
    /// the clock for the audible track. Tells the loop whether to re-arm.
    pub fn frame(&self) -> FrameDirective {
        let Some(index) = self.playing else {
            self.publish(&SurfaceUpdate::PulseReset);
            return FrameDirective::Stop;
        };
        if self.tracks[index].handle.paused() {
            self.publish(&SurfaceUpdate::PulseReset);
            return FrameDirective::Stop;
        }
        if !self.reduced_motion {
            self.publish(&SurfaceUpdate::Pulse {
                elapsed: self.tracks[index].handle.current_time(),
            });
        }
        self.sync_time(index);
        FrameDirective::Continue
    }

    /// `ended` event: a finished track behaves exactly like an explicit reset.
    pub fn handle_ended(&mut self, index: usize) {
        self.reset(index);
    }

    /// `pause` event from outside the coordinator (OS media keys, another
    /// tab taking over). Drops the playing pointer if it still points here.
    pub fn handle_external_pause(&mut self, index: usize) {
        if self.playing != Some(index) {
            return;
        }
        self.playing = None;
        if let Some(state) = self.tracks.get_mut(index) {
            if state.phase == PlaybackPhase::Playing {
                state.phase = PlaybackPhase::Paused;
            }
        }
        self.publish(&SurfaceUpdate::PulseReset);
        self.publish(&SurfaceUpdate::TrackTransport {
            index,
            playing: false,
        });
        self.publish(&SurfaceUpdate::Transport { playing: false });
    }

    /// Late refusal of an earlier start request. Rolls the optimistic
    /// transition back so nothing claims to be playing.
    pub fn handle_play_failure(&mut self, index: usize, reason: &str) {
        if index >= self.tracks.len() {
            return;
        }
        log::warn!("[player] playback start rejected for track {index}: {reason}");
        if self.playing == Some(index) {
            self.playing = None;
            self.publish(&SurfaceUpdate::PulseReset);
        }
        let state = &mut self.tracks[index];
        if state.phase == PlaybackPhase::Playing {
            state.phase = if state.handle.current_time() > 0.0 {
                PlaybackPhase::Paused
            } else {
                PlaybackPhase::Idle
            };
        }
        self.publish(&SurfaceUpdate::TrackTransport {
            index,
            playing: false,
        });
        self.publish(&SurfaceUpdate::Transport {
            playing: self.anything_audible(),
        });
    }

    /// `loadedmetadata` event: the duration just became known.
    pub fn handle_metadata_loaded(&self, index: usize) {
        self.sync_time(index);
    }

    /// `timeupdate` event. Only the audible track refreshes its clock this
    /// way; seeks and resets sync explicitly.
    pub fn handle_time_update(&self, index: usize) {
        if self.playing == Some(index) {
            self.sync_time(index);
        }
    }

    fn anything_audible(&self) -> bool {
        self.playing
            .and_then(|index| self.tracks.get(index))
            .map_or(false, |state| !state.handle.paused())
    }

    fn sync_time(&self, index: usize) {
        let Some(state) = self.tracks.get(index) else {
            return;
        };
        let current = state.handle.current_time();
        let duration = state.handle.duration();
        let mut ratio = current / duration;
        if !ratio.is_finite() {
            ratio = 0.0;
        }
        self.publish(&SurfaceUpdate::Time {
            index,
            is_active: self.active == Some(index),
            current,
            duration,
            ratio,
        });
    }

    fn publish(&self, update: &SurfaceUpdate) {
        self.publish_except(update, None);
    }

    fn publish_except(&self, update: &SurfaceUpdate, skip: Option<SurfaceId>) {
        for (id, surface) in self.surfaces.iter().enumerate() {
            if Some(id) != skip {
                surface.apply(update);
            }
        }
    }
}

/// Height multiplier for one bar of the pulse visualization. Each bar gets
/// a slightly faster rate and a phase offset so they never move in lockstep.
pub fn pulse_scale(elapsed: f64, bar: usize) -> f64 {
    let offset = bar as f64;
    (elapsed * (PULSE_BASE_RATE + offset * PULSE_RATE_STEP) + offset)
        .sin()
        .abs()
        * PULSE_SPAN
        + PULSE_IDLE_SCALE
}
