// Host-side tests for the playback coordinator, with an in-memory audio
// backend and a recording surface standing in for media elements and DOM.

use std::cell::RefCell;
use std::rc::Rc;

use atelier_core::format::format_time;
use atelier_core::player::{
    pulse_scale, AudioHandle, Coordinator, FrameDirective, PlaybackError, PlaybackPhase,
    PlayerSurface, SurfaceUpdate, DEFAULT_MASTER_VOLUME, PULSE_IDLE_SCALE,
};
use atelier_core::track::Track;

fn track(title: &str) -> Track {
    Track {
        title: title.to_string(),
        description: format!("{title} description"),
        year: Some(2024),
        cover: format!("assets/covers/{title}.webp"),
        audio: format!("assets/audio/{title}.mp3"),
        insight: None,
    }
}

#[derive(Debug)]
struct FakeState {
    position: f64,
    duration: f64,
    volume: f64,
    paused: bool,
    reject_play: bool,
    play_calls: u32,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            paused: true,
            reject_play: false,
            play_calls: 0,
        }
    }
}

#[derive(Clone)]
struct FakeAudio(Rc<RefCell<FakeState>>);

impl FakeAudio {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(FakeState::default())))
    }

    fn with_duration(seconds: f64) -> Self {
        let fake = Self::new();
        fake.0.borrow_mut().duration = seconds;
        fake
    }
}

impl AudioHandle for FakeAudio {
    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut state = self.0.borrow_mut();
        state.play_calls += 1;
        if state.reject_play {
            return Err(PlaybackError::new("autoplay blocked"));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().paused = true;
    }

    fn seek_to(&mut self, seconds: f64) {
        self.0.borrow_mut().position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().position
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn paused(&self) -> bool {
        self.0.borrow().paused
    }
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<SurfaceUpdate>>>);

impl Recorder {
    fn updates(&self) -> Vec<SurfaceUpdate> {
        self.0.borrow().clone()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn last_volume(&self) -> Option<f64> {
        self.updates().iter().rev().find_map(|update| match update {
            SurfaceUpdate::Volume { value } => Some(*value),
            _ => None,
        })
    }

    fn last_time(&self) -> Option<(f64, f64, f64)> {
        self.updates().iter().rev().find_map(|update| match update {
            SurfaceUpdate::Time {
                current,
                duration,
                ratio,
                ..
            } => Some((*current, *duration, *ratio)),
            _ => None,
        })
    }

    fn saw_pulse_reset(&self) -> bool {
        self.updates()
            .iter()
            .any(|update| matches!(update, SurfaceUpdate::PulseReset))
    }

    fn claims_anything_playing(&self) -> bool {
        self.updates().iter().any(|update| {
            matches!(
                update,
                SurfaceUpdate::Transport { playing: true }
                    | SurfaceUpdate::TrackTransport { playing: true, .. }
            )
        })
    }
}

impl PlayerSurface for Recorder {
    fn apply(&self, update: &SurfaceUpdate) {
        self.0.borrow_mut().push(update.clone());
    }
}

fn coordinator_with_tracks(count: usize) -> (Coordinator<FakeAudio>, Vec<FakeAudio>, Recorder) {
    let mut coordinator = Coordinator::new(false);
    let fakes: Vec<FakeAudio> = (0..count)
        .map(|i| {
            let fake = FakeAudio::with_duration(200.0);
            coordinator.add_track(track(&format!("track-{i}")), fake.clone());
            fake
        })
        .collect();
    let recorder = Recorder::default();
    coordinator.add_surface(Box::new(recorder.clone()));
    (coordinator, fakes, recorder)
}

#[test]
fn at_most_one_track_is_audible_after_any_switching() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(3);
    coordinator.play(0).unwrap();
    coordinator.play(2).unwrap();
    coordinator.play(1).unwrap();
    coordinator.play(2).unwrap();

    let audible = fakes.iter().filter(|fake| !fake.paused()).count();
    assert_eq!(audible, 1, "exactly one element may be unpaused");
    assert_eq!(coordinator.playing(), Some(2));
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Paused));
    assert_eq!(coordinator.phase(1), Some(PlaybackPhase::Paused));
    assert_eq!(coordinator.phase(2), Some(PlaybackPhase::Playing));
}

#[test]
fn switching_tracks_pauses_previous_before_claiming_next() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(2);
    coordinator.play(0).unwrap();
    recorder.clear();
    coordinator.play(1).unwrap();

    assert!(fakes[0].paused());
    assert!(!fakes[1].paused());
    assert_eq!(coordinator.active(), Some(1));

    let updates = recorder.updates();
    let stopped = updates
        .iter()
        .position(|update| {
            matches!(
                update,
                SurfaceUpdate::TrackTransport {
                    index: 0,
                    playing: false
                }
            )
        })
        .expect("previous card was never told it stopped");
    let started = updates
        .iter()
        .position(|update| {
            matches!(
                update,
                SurfaceUpdate::TrackTransport {
                    index: 1,
                    playing: true
                }
            )
        })
        .expect("next card was never told it started");
    assert!(stopped < started, "pause must be mirrored before play");
}

#[test]
fn play_is_idempotent_while_already_playing() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(2);
    coordinator.play(0).unwrap();
    coordinator.play(0).unwrap();

    assert_eq!(coordinator.playing(), Some(0));
    assert!(!fakes[0].paused());
    assert_eq!(fakes.iter().filter(|fake| !fake.paused()).count(), 1);
    // the second request goes through to the element, which treats it as a no-op
    assert_eq!(fakes[0].0.borrow().play_calls, 2);
}

#[test]
fn resume_after_pause_keeps_position() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().position = 42.0;
    coordinator.pause(0);

    assert!(fakes[0].paused());
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Paused));
    assert_eq!(coordinator.playing(), None);

    coordinator.play(0).unwrap();
    assert!(!fakes[0].paused());
    assert_eq!(fakes[0].current_time(), 42.0);
}

#[test]
fn pausing_an_already_paused_track_changes_nothing_visible() {
    let (mut coordinator, _fakes, recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    coordinator.pause(0);
    let phase = coordinator.phase(0);

    recorder.clear();
    coordinator.pause(0);

    assert_eq!(coordinator.phase(0), phase);
    assert_eq!(coordinator.playing(), None);
    assert!(!recorder.claims_anything_playing());
}

#[test]
fn registration_applies_the_default_master_volume() {
    let mut coordinator = Coordinator::new(false);
    let fake = FakeAudio::new();
    coordinator.add_track(track("first"), fake.clone());
    assert_eq!(fake.0.borrow().volume, DEFAULT_MASTER_VOLUME);
}

#[test]
fn volume_mirrors_everywhere_except_the_origin_slider() {
    let mut coordinator = Coordinator::new(false);
    let fake = FakeAudio::with_duration(100.0);
    coordinator.add_track(track("solo"), fake.clone());
    let hero = Recorder::default();
    let bar = Recorder::default();
    let hero_id = coordinator.add_surface(Box::new(hero.clone()));
    coordinator.add_surface(Box::new(bar.clone()));

    coordinator.set_volume(1.7, Some(hero_id));

    assert_eq!(coordinator.master_volume(), 1.0, "clamped to the top");
    assert_eq!(fake.0.borrow().volume, 1.0);
    assert_eq!(bar.last_volume(), Some(1.0));
    assert_eq!(hero.last_volume(), None, "origin must not be written back");
}

#[test]
fn volume_applies_to_tracks_registered_later() {
    let mut coordinator: Coordinator<FakeAudio> = Coordinator::new(false);
    coordinator.set_volume(0.3, None);
    let fake = FakeAudio::new();
    coordinator.add_track(track("late"), fake.clone());
    assert_eq!(fake.0.borrow().volume, 0.3);
}

#[test]
fn non_finite_volume_is_ignored() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.set_volume(f64::NAN, None);
    assert_eq!(coordinator.master_volume(), DEFAULT_MASTER_VOLUME);
    assert_eq!(fakes[0].0.borrow().volume, DEFAULT_MASTER_VOLUME);
}

#[test]
fn seek_scrubs_to_the_requested_share_of_the_duration() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(1);
    coordinator.set_active(0);
    recorder.clear();

    coordinator.seek(0, 0.5);

    assert_eq!(fakes[0].current_time(), 100.0);
    let (current, _duration, ratio) = recorder.last_time().expect("clock was not refreshed");
    assert_eq!(current, 100.0);
    assert_eq!(ratio, 0.5);
    assert_eq!(format_time(current), "1:40");
}

#[test]
fn seek_clamps_the_ratio_into_range() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.seek(0, 1.5);
    assert_eq!(fakes[0].current_time(), 200.0);
    coordinator.seek(0, -0.25);
    assert_eq!(fakes[0].current_time(), 0.0);
}

#[test]
fn seek_is_ignored_without_metadata_or_with_bad_input() {
    let mut coordinator = Coordinator::new(false);
    let unready = FakeAudio::new();
    coordinator.add_track(track("loading"), unready.clone());
    let recorder = Recorder::default();
    coordinator.add_surface(Box::new(recorder.clone()));

    coordinator.seek(0, 0.5);
    assert_eq!(unready.current_time(), 0.0, "duration still unknown");
    assert!(recorder.updates().is_empty());

    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.seek(0, f64::NAN);
    coordinator.seek(0, f64::INFINITY);
    assert_eq!(fakes[0].current_time(), 0.0);
}

#[test]
fn a_finished_track_rewinds_and_offers_play_again() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().position = 200.0;
    // the element pauses itself at the end, then `ended` arrives
    fakes[0].0.borrow_mut().paused = true;
    recorder.clear();
    coordinator.handle_external_pause(0);
    coordinator.handle_ended(0);

    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Idle));
    assert_eq!(coordinator.playing(), None);
    assert_eq!(fakes[0].current_time(), 0.0);
    assert!(recorder.saw_pulse_reset());

    let (current, _duration, ratio) = recorder.last_time().expect("clock was not reset");
    assert_eq!(format_time(current), "0:00");
    assert_eq!(ratio, 0.0);
    assert!(!recorder.claims_anything_playing());
}

#[test]
fn toggle_with_no_active_track_starts_the_first() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(2);
    coordinator.toggle_playback().unwrap();
    assert_eq!(coordinator.active(), Some(0));
    assert_eq!(coordinator.playing(), Some(0));
    assert!(!fakes[0].paused());
}

#[test]
fn toggle_alternates_between_pause_and_resume() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.toggle_playback().unwrap();
    assert_eq!(coordinator.playing(), Some(0));

    coordinator.toggle_playback().unwrap();
    assert_eq!(coordinator.playing(), None);
    assert!(fakes[0].paused());
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Paused));

    coordinator.toggle_playback().unwrap();
    assert_eq!(coordinator.playing(), Some(0));
    assert!(!fakes[0].paused());
}

#[test]
fn toggle_with_no_tracks_is_a_noop() {
    let mut coordinator: Coordinator<FakeAudio> = Coordinator::new(false);
    coordinator.toggle_playback().unwrap();
    assert_eq!(coordinator.active(), None);
    assert_eq!(coordinator.playing(), None);
}

#[test]
fn rejected_start_never_claims_to_be_playing() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(1);
    fakes[0].0.borrow_mut().reject_play = true;

    let result = coordinator.play(0);

    assert!(matches!(result, Err(PlaybackError { .. })));
    assert_eq!(coordinator.playing(), None);
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Idle));
    assert!(!recorder.claims_anything_playing());
    // the hero still switched so the silence is attributable
    assert_eq!(coordinator.active(), Some(0));
}

#[test]
fn late_start_rejection_rolls_the_transition_back() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    // promise settled with a refusal: the element never left paused
    fakes[0].0.borrow_mut().paused = true;
    recorder.clear();
    coordinator.handle_play_failure(0, "NotAllowedError");

    assert_eq!(coordinator.playing(), None);
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Idle));
    assert!(recorder.saw_pulse_reset());
    assert!(!recorder.claims_anything_playing());
}

#[test]
fn late_rejection_of_a_resume_returns_to_paused() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().position = 30.0;
    coordinator.pause(0);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().paused = true;

    coordinator.handle_play_failure(0, "NotAllowedError");
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Paused));
    assert_eq!(fakes[0].current_time(), 30.0);
}

#[test]
fn external_pause_releases_the_playing_pointer() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(2);
    coordinator.play(0).unwrap();
    recorder.clear();

    // stale event for a track that is not the one playing
    coordinator.handle_external_pause(1);
    assert_eq!(coordinator.playing(), Some(0));

    fakes[0].0.borrow_mut().paused = true;
    coordinator.handle_external_pause(0);
    assert_eq!(coordinator.playing(), None);
    assert_eq!(coordinator.phase(0), Some(PlaybackPhase::Paused));
    assert!(recorder.saw_pulse_reset());
}

#[test]
fn reduced_motion_suppresses_pulses_but_not_the_clock() {
    let mut coordinator = Coordinator::new(true);
    let fake = FakeAudio::with_duration(90.0);
    coordinator.add_track(track("calm"), fake.clone());
    let recorder = Recorder::default();
    coordinator.add_surface(Box::new(recorder.clone()));

    coordinator.play(0).unwrap();
    assert!(!coordinator.should_animate());

    recorder.clear();
    fake.0.borrow_mut().position = 10.0;
    assert_eq!(coordinator.frame(), FrameDirective::Continue);
    coordinator.handle_time_update(0);

    let updates = recorder.updates();
    assert!(updates
        .iter()
        .all(|update| !matches!(update, SurfaceUpdate::Pulse { .. })));
    assert!(updates
        .iter()
        .any(|update| matches!(update, SurfaceUpdate::Time { current, .. } if *current == 10.0)));
}

#[test]
fn frame_emits_pulses_while_audible_and_stops_after_pause() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(1);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().position = 3.5;

    assert_eq!(coordinator.frame(), FrameDirective::Continue);
    assert!(recorder
        .updates()
        .iter()
        .any(|update| matches!(update, SurfaceUpdate::Pulse { elapsed } if *elapsed == 3.5)));

    coordinator.pause(0);
    recorder.clear();
    assert_eq!(coordinator.frame(), FrameDirective::Stop);
    assert!(recorder.saw_pulse_reset());
    assert!(recorder
        .updates()
        .iter()
        .all(|update| !matches!(update, SurfaceUpdate::Pulse { .. })));
}

#[test]
fn set_active_describes_a_track_without_playing_it() {
    let (mut coordinator, fakes, recorder) = coordinator_with_tracks(2);
    coordinator.set_active(1);

    assert_eq!(coordinator.active(), Some(1));
    assert_eq!(coordinator.playing(), None);
    assert!(fakes[1].paused());

    let updates = recorder.updates();
    assert!(updates.iter().any(|update| matches!(
        update,
        SurfaceUpdate::ActiveTrack { index: 1, track } if track.title == "track-1"
    )));
    assert!(updates.iter().any(|update| matches!(
        update,
        SurfaceUpdate::Time {
            index: 1,
            is_active: true,
            ..
        }
    )));
}

#[test]
fn activating_a_card_cues_it_and_silences_the_rest() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(2);
    coordinator.play(0).unwrap();
    fakes[0].0.borrow_mut().position = 12.0;

    coordinator.activate(1);

    assert!(fakes[0].paused());
    assert_eq!(fakes[0].current_time(), 12.0, "silenced track keeps its spot");
    assert_eq!(coordinator.active(), Some(1));
    assert_eq!(coordinator.playing(), None);
    assert_eq!(coordinator.phase(1), Some(PlaybackPhase::Idle));
    assert_eq!(fakes[1].current_time(), 0.0);
}

#[test]
fn out_of_range_indices_are_ignored() {
    let (mut coordinator, fakes, _recorder) = coordinator_with_tracks(1);
    coordinator.play(5).unwrap();
    coordinator.pause(5);
    coordinator.seek(5, 0.5);
    coordinator.set_active(5);
    coordinator.activate(5);
    coordinator.handle_ended(5);
    coordinator.handle_play_failure(5, "whatever");

    assert_eq!(coordinator.active(), None);
    assert_eq!(coordinator.playing(), None);
    assert!(fakes[0].paused());
}

#[test]
fn pulse_scale_stays_in_band_and_bars_drift_apart() {
    for bar in 0..4 {
        for step in 0..400 {
            let elapsed = step as f64 * 0.05;
            let value = pulse_scale(elapsed, bar);
            assert!(
                (PULSE_IDLE_SCALE - 1e-9..=1.05 + 1e-9).contains(&value),
                "bar {bar} out of band at t={elapsed}: {value}"
            );
        }
    }
    // sin(0) = 0, so bar zero rests exactly at the idle height
    assert!((pulse_scale(0.0, 0) - PULSE_IDLE_SCALE).abs() < 1e-9);
    assert_ne!(pulse_scale(1.0, 0), pulse_scale(1.0, 1));
}
