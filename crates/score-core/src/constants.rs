// Shared audio tuning constants used by the offline composer and the live engine.

// Timing
pub const SAMPLE_RATE: u32 = 44_100; // fixed output rate for both modes
pub const SAMPLE_RATE_F32: f32 = SAMPLE_RATE as f32;

// Pitch
pub const REFERENCE_PITCH_HZ: f32 = 261.63; // C4, root for key index 0

// Parameter bounds
pub const TEMPO_MIN_BPM: f32 = 20.0;
pub const TEMPO_MAX_BPM: f32 = 400.0;
pub const KEY_INDEX_LIMIT: i32 = 60; // five octaves either side of the reference pitch
pub const MAX_DURATION_SECS: f32 = 600.0; // ten minutes of stereo PCM

// Melody layer
pub const MIN_NOTE_SAMPLES: usize = 200;
pub const MELODY_LOWPASS_ALPHA: f32 = 0.2;
pub const MELODY_ECHO_DECAY: f32 = 0.4;

// Bass layer
pub const BASS_GAIN: f32 = 0.3;
pub const BASS_LOWPASS_ALPHA: f32 = 0.1;
pub const BASS_BEATS_PER_NOTE: usize = 2;

// Percussion layer
pub const MIN_HIT_SAMPLES: usize = 400;
pub const PERC_GAIN: f32 = 0.9;
pub const PERC_ECHO_DECAY: f32 = 0.3;

// Shared echo tap
pub const ECHO_DELAY_SECS: f32 = 0.12;

// Texture layers, added after the first normalization
pub const SHIMMER_GAIN: f32 = 0.3;
pub const ARPEGGIO_GAIN: f32 = 0.25;

// Stereo image
pub const HAAS_SHIFT_SAMPLES: usize = 200;
pub const HAAS_BLEND: f32 = 0.1; // share of the time-shifted copy in each channel
pub const OFFLINE_PAN_DEPTH: f32 = 0.4;
pub const OFFLINE_PAN_SPEED_BASE: f32 = 0.00015;
pub const OFFLINE_PAN_SPEED_MOOD: f32 = 0.0001;

// Normalization
pub const PEAK_FLOOR: f32 = 1e-6; // guards division on silent mixes

// Live engine
pub const SMOOTHING_STEP: f32 = 0.02; // fraction of the remaining distance per callback
pub const LIVE_TONE_GAIN: f32 = 0.5;
pub const LIVE_SHIMMER_GAIN: f32 = 0.05;
pub const LIVE_DRUM_GATE_SAMPLES: u64 = 300;
pub const LIVE_PAN_DEPTH: f32 = 0.35;
pub const LIVE_PAN_RATE: f64 = 2.0; // radians per second

#[inline]
pub fn echo_delay_samples() -> usize {
    (ECHO_DELAY_SECS * SAMPLE_RATE_F32) as usize
}
