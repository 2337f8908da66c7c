//! Real-time engine whose musical character can be retargeted while playing.
//!
//! The engine is split in two halves that share one `Arc`:
//!
//! - [`LiveControl`] is a cloneable handle for the control side. It publishes
//!   target parameters as immutable snapshots and flips a packed
//!   running/generation word for start and stop. None of its methods block.
//! - [`LiveRenderer`] lives in the audio callback. It is the only writer of
//!   the smoothed parameters and the sample position, and it never locks,
//!   allocates or logs while producing frames.

use crate::constants::*;
use crate::frame::StereoFrame;
use crate::music::{pattern, MusicParams, Scale};
use arc_swap::ArcSwap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Anything that can fill a device buffer with stereo frames on demand.
///
/// Implementations must fill every frame of `out` before returning and must
/// not keep a reference to it afterwards.
pub trait FrameSource: Send {
    fn produce_frames(&mut self, out: &mut [StereoFrame]);
}

const RUNNING_BIT: u64 = 1;

#[inline]
fn is_running_word(word: u64) -> bool {
    word & RUNNING_BIT != 0
}

// Bits 1.. count transitions, bit 0 is the running flag. Packing both into
// one word means the renderer can never see a new generation without the
// matching flag.
struct Shared {
    targets: ArcSwap<MusicParams>,
    state: AtomicU64,
}

/// Control-side handle: start, stop and retarget the engine from any thread.
#[derive(Clone)]
pub struct LiveControl {
    shared: Arc<Shared>,
}

impl LiveControl {
    /// Enter the running state. Restarting while running counts as a stop
    /// followed by a start: the position rewinds and smoothing re-snaps.
    pub fn start(&self) {
        let prev = self
            .shared
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |w| {
                Some((((w >> 1) + 1) << 1) | RUNNING_BIT)
            })
            .unwrap_or_else(|w| w);
        log::debug!(
            "live engine started{}",
            if is_running_word(prev) { " (restart)" } else { "" }
        );
    }

    /// Enter the stopped state. A no-op when already stopped.
    pub fn stop(&self) {
        let changed = self
            .shared
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |w| {
                is_running_word(w).then(|| ((w >> 1) + 1) << 1)
            })
            .is_ok();
        if changed {
            log::debug!("live engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        is_running_word(self.shared.state.load(Ordering::Acquire))
    }

    /// Publish new targets. Smoothed values and position are left alone;
    /// the renderer glides toward the new targets on its next calls.
    pub fn set_parameters(&self, params: MusicParams) {
        let current = self.shared.targets.load();
        let next = params.sanitized(current.tempo_bpm);
        log::trace!("live targets -> {next:?}");
        self.shared.targets.store(Arc::new(next));
    }

    pub fn targets(&self) -> MusicParams {
        **self.shared.targets.load()
    }
}

/// Continuous parameters that glide toward their targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothedParams {
    pub tempo_bpm: f32,
    pub mood: f32,
    pub rhythm: f32,
    pub perc_level: f32,
}

impl SmoothedParams {
    fn snap(targets: &MusicParams) -> Self {
        Self {
            tempo_bpm: targets.tempo_bpm,
            mood: targets.mood,
            rhythm: targets.rhythm,
            perc_level: targets.perc_level,
        }
    }

    fn step_toward(&mut self, targets: &MusicParams, amount: f32) {
        let glide = |cur: f32, target: f32| cur + (target - cur) * amount;
        self.tempo_bpm = glide(self.tempo_bpm, targets.tempo_bpm);
        self.mood = glide(self.mood, targets.mood);
        self.rhythm = glide(self.rhythm, targets.rhythm);
        self.perc_level = glide(self.perc_level, targets.perc_level);
    }
}

/// Callback-side half of the engine.
pub struct LiveRenderer {
    shared: Arc<Shared>,
    seen_state: u64,
    smoothed: SmoothedParams,
    position: u64,
    rng: StdRng,
}

impl LiveRenderer {
    /// Frames produced since the last start (or stop).
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn smoothed(&self) -> SmoothedParams {
        self.smoothed
    }

    // Pick up start/stop transitions published since the previous call.
    fn sync_state(&mut self) -> bool {
        let word = self.shared.state.load(Ordering::Acquire);
        if word != self.seen_state {
            self.seen_state = word;
            self.position = 0;
            if is_running_word(word) {
                self.smoothed = SmoothedParams::snap(&self.shared.targets.load());
            }
        }
        is_running_word(word)
    }
}

impl FrameSource for LiveRenderer {
    fn produce_frames(&mut self, out: &mut [StereoFrame]) {
        if !self.sync_state() {
            out.fill(StereoFrame::SILENCE);
            return;
        }

        let targets = self.shared.targets.load();
        self.smoothed.step_toward(&targets, SMOOTHING_STEP);
        let SmoothedParams {
            tempo_bpm,
            mood,
            perc_level,
            ..
        } = self.smoothed;

        let scale = Scale::from_key(targets.key_index, targets.is_minor);
        let pat = pattern(targets.pattern_id);
        let beat_len = SAMPLE_RATE as f64 / (tempo_bpm as f64 / 60.0);
        let gate_period = (beat_len as u64).max(1);
        let sr = SAMPLE_RATE as f64;

        for frame in out.iter_mut() {
            let pos = self.position;
            let t = pos as f64 / sr;

            let beat_index = (pos as f64 / beat_len) as u64 % 4;
            let freq = scale.degree(pat[beat_index as usize]) as f64;
            let osc = (TAU * freq * t).sin() as f32;

            let shimmer = (self.rng.gen::<f32>() - 0.5) * LIVE_SHIMMER_GAIN * mood;
            let drum = if pos % gate_period < LIVE_DRUM_GATE_SAMPLES {
                (self.rng.gen::<f32>() - 0.5) * perc_level
            } else {
                0.0
            };
            let mix = osc * LIVE_TONE_GAIN + shimmer + drum;

            let pan = (t * LIVE_PAN_RATE).sin() as f32;
            *frame = StereoFrame::new(
                mix * (1.0 - LIVE_PAN_DEPTH * pan),
                mix * (1.0 + LIVE_PAN_DEPTH * pan),
            );
            self.position += 1;
        }
    }
}

/// Owner of both halves, built once per session.
pub struct LiveEngine {
    pub control: LiveControl,
    pub renderer: LiveRenderer,
}

impl LiveEngine {
    pub fn new(initial: MusicParams) -> Self {
        Self::with_rng(initial, StdRng::from_entropy())
    }

    pub fn with_seed(initial: MusicParams, seed: u64) -> Self {
        Self::with_rng(initial, StdRng::seed_from_u64(seed))
    }

    fn with_rng(initial: MusicParams, rng: StdRng) -> Self {
        let targets = initial.sanitized(MusicParams::default().tempo_bpm);
        let shared = Arc::new(Shared {
            targets: ArcSwap::from_pointee(targets),
            state: AtomicU64::new(0),
        });
        Self {
            control: LiveControl {
                shared: Arc::clone(&shared),
            },
            renderer: LiveRenderer {
                shared,
                seen_state: 0,
                smoothed: SmoothedParams::snap(&targets),
                position: 0,
                rng,
            },
        }
    }

    pub fn into_parts(self) -> (LiveControl, LiveRenderer) {
        (self.control, self.renderer)
    }
}

impl Default for LiveEngine {
    fn default() -> Self {
        Self::new(MusicParams::default())
    }
}
