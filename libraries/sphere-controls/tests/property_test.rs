//! Property-based tests for playback synchronization
//!
//! Uses proptest to verify the position/scrubber invariants across random
//! input sequences.

use proptest::prelude::*;
use sphere_controls::{
    format_time, progress_percent, MediaSource, PlaybackSyncController, PlayerConfig,
    PreloadCoordinator, PreloadStatus,
};

// ===== Helpers =====

struct SimMedia {
    time: f64,
    duration: f64,
    muted: bool,
}

impl MediaSource for SimMedia {
    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

fn controller(duration: f64) -> PlaybackSyncController<SimMedia> {
    let media = SimMedia {
        time: 0.0,
        duration,
        muted: true,
    };
    PlaybackSyncController::new(media, &PlayerConfig::default())
}

#[derive(Debug, Clone)]
enum Input {
    Tick(f64),
    BeginScrub,
    Preview(f64),
    Commit(f64),
    Seek(f64),
    TogglePlay,
    ResolvePlay(bool),
    ToggleMute,
}

fn arbitrary_input(duration: f64) -> impl Strategy<Value = Input> {
    prop_oneof![
        (0.0..=duration).prop_map(Input::Tick),
        Just(Input::BeginScrub),
        (-50.0..duration + 50.0).prop_map(Input::Preview),
        (-50.0..duration + 50.0).prop_map(Input::Commit),
        (-120.0f64..120.0).prop_map(Input::Seek),
        Just(Input::TogglePlay),
        any::<bool>().prop_map(Input::ResolvePlay),
        Just(Input::ToggleMute),
    ]
}

fn inputs() -> impl Strategy<Value = (f64, Vec<Input>)> {
    (1.0f64..7200.0).prop_flat_map(|duration| {
        (
            Just(duration),
            prop::collection::vec(arbitrary_input(duration), 1..60),
        )
    })
}

fn apply(ctl: &mut PlaybackSyncController<SimMedia>, duration: f64, input: &Input) {
    match *input {
        Input::Tick(t) => {
            ctl.media_mut().time = t;
            ctl.on_time_update(t, duration);
        }
        Input::BeginScrub => ctl.begin_scrub(),
        Input::Preview(p) => {
            ctl.update_scrub_preview(p);
        }
        Input::Commit(p) => {
            ctl.commit_scrub(p);
        }
        Input::Seek(d) => {
            ctl.seek_relative(d);
        }
        Input::TogglePlay => {
            ctl.toggle_play_pause();
        }
        Input::ResolvePlay(ok) => {
            let outcome = if ok { Ok(()) } else { Err("rejected".to_string()) };
            ctl.resolve_play(outcome).ok();
        }
        Input::ToggleMute => {
            ctl.toggle_mute();
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: without scrubbing, the view is exactly the derived formulas
    #[test]
    fn ticks_derive_label_and_progress(
        duration in 1.0f64..7200.0,
        ticks in prop::collection::vec(0.0f64..1.0, 1..40)
    ) {
        let mut ctl = controller(duration);
        for fraction in ticks {
            let t = fraction * duration;
            prop_assert!(ctl.on_time_update(t, duration));

            let view = ctl.view();
            prop_assert_eq!(view.current_label, format_time(t));
            prop_assert_eq!(view.progress_percent, progress_percent(t, duration));
            prop_assert_eq!(ctl.state().current_position_secs, t);
        }
    }

    /// Property: ticks during a scrub never move the committed position
    #[test]
    fn scrub_freezes_position(
        duration in 1.0f64..7200.0,
        start in 0.0f64..1.0,
        ticks in prop::collection::vec(0.0f64..1.0, 0..40),
        preview in 0.0f64..1.0
    ) {
        let mut ctl = controller(duration);
        ctl.on_time_update(start * duration, duration);
        let frozen = ctl.state().current_position_secs;

        ctl.begin_scrub();
        for fraction in ticks {
            prop_assert!(!ctl.on_time_update(fraction * duration, duration));
            prop_assert_eq!(ctl.state().current_position_secs, frozen);
        }

        ctl.update_scrub_preview(preview * duration);
        prop_assert_eq!(ctl.state().current_position_secs, frozen);
        prop_assert_eq!(ctl.displayed_position(), preview * duration);
    }

    /// Property: commit followed by one tick equals a plain tick
    #[test]
    fn commit_then_tick_is_idempotent(
        duration in 1.0f64..7200.0,
        fraction in 0.0f64..=1.0
    ) {
        let p = fraction * duration;

        let mut scrubbed = controller(duration);
        scrubbed.begin_scrub();
        scrubbed.commit_scrub(p);
        scrubbed.on_time_update(p, duration);

        let mut direct = controller(duration);
        direct.on_time_update(p, duration);

        prop_assert_eq!(scrubbed.state(), direct.state());
        prop_assert_eq!(scrubbed.view(), direct.view());
    }

    /// Property: relative seeks always land inside [0, duration]
    #[test]
    fn seek_stays_in_bounds(
        duration in 1.0f64..7200.0,
        fraction in 0.0f64..=1.0,
        delta in -10_000.0f64..10_000.0
    ) {
        let mut ctl = controller(duration);
        ctl.media_mut().time = fraction * duration;

        let target = ctl.seek_relative(delta).unwrap();
        prop_assert!((0.0..=duration).contains(&target));
        prop_assert_eq!(target, (fraction * duration + delta).clamp(0.0, duration));
    }

    /// Property: any input sequence keeps position within the duration and
    /// the view consistent with the state
    #[test]
    fn invariants_hold_for_any_sequence((duration, seq) in inputs()) {
        let mut ctl = controller(duration);
        for input in &seq {
            apply(&mut ctl, duration, input);

            let state = *ctl.state();
            prop_assert!(state.current_position_secs >= 0.0);
            prop_assert!(state.current_position_secs <= state.duration_secs);
            if !state.is_scrubbing {
                prop_assert_eq!(ctl.displayed_position(), state.current_position_secs);
                prop_assert_eq!(
                    ctl.view().progress_percent,
                    progress_percent(state.current_position_secs, state.duration_secs)
                );
            }
        }
    }

    /// Property: a play request resolves at most once per toggle
    #[test]
    fn play_is_single_outstanding((duration, seq) in inputs()) {
        let mut ctl = controller(duration);
        for input in &seq {
            let was_pending = ctl.is_play_pending();
            let was_playing = ctl.state().is_playing;
            apply(&mut ctl, duration, input);

            if was_pending {
                if let Input::TogglePlay = input {
                    prop_assert!(ctl.is_play_pending());
                    prop_assert_eq!(ctl.state().is_playing, was_playing);
                }
            }
            prop_assert!(!(ctl.is_play_pending() && ctl.state().is_playing));
        }
    }

    /// Property: once a retried preload is Ready, stale outcomes change nothing
    #[test]
    fn stale_preload_outcomes_are_ignored(
        failures in 1usize..5,
        stale in prop::collection::vec((0usize..5, any::<bool>()), 0..20)
    ) {
        let mut preload = PreloadCoordinator::new();
        let mut attempts = Vec::new();
        for _ in 0..failures {
            let attempt = preload.start("/v/tour.mp4").unwrap();
            preload.on_load_error(attempt, "network");
            attempts.push(attempt);
        }
        let last = preload.start("/v/tour.mp4").unwrap();
        prop_assert!(preload.on_playable(last));

        for (index, succeeded) in stale {
            let attempt = attempts[index % attempts.len()];
            if succeeded {
                prop_assert!(!preload.on_playable(attempt));
            } else {
                prop_assert!(preload.on_load_error(attempt, "late").is_none());
            }
        }
        prop_assert_eq!(preload.status(), PreloadStatus::Ready);
    }
}
