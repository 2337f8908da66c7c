use crate::constants::{
    KEY_INDEX_LIMIT, MAX_DURATION_SECS, REFERENCE_PITCH_HZ, TEMPO_MAX_BPM, TEMPO_MIN_BPM,
};
use crate::error::ParamError;

/// Diatonic interval tables (semitones above the root).
pub const MAJOR_INTERVALS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
pub const MINOR_INTERVALS: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

pub const PATTERN_COUNT: usize = 12;

/// Four-step melodic figures, expressed as scale degrees 0..=6.
pub const PATTERNS: [[usize; 4]; PATTERN_COUNT] = [
    [0, 2, 4, 5],
    [5, 3, 2, 0],
    [0, 4, 6, 3],
    [6, 5, 3, 2],
    [1, 3, 5, 6],
    [6, 4, 1, 0],
    [2, 5, 1, 4],
    [0, 3, 6, 4],
    [4, 1, 2, 6],
    [3, 0, 5, 2],
    [1, 6, 4, 2],
    [4, 2, 0, 3],
];

/// Pattern row for any id; negative ids wrap as well.
#[inline]
pub fn pattern(pattern_id: i32) -> &'static [usize; 4] {
    &PATTERNS[pattern_id.rem_euclid(PATTERN_COUNT as i32) as usize]
}

#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0)
}

/// Seven scale frequencies in Hz, ascending from the root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub freqs: [f32; 7],
}

impl Scale {
    /// Keys beyond `KEY_INDEX_LIMIT` semitones are clamped so every
    /// frequency stays finite.
    pub fn from_key(key_index: i32, is_minor: bool) -> Self {
        let intervals = if is_minor {
            &MINOR_INTERVALS
        } else {
            &MAJOR_INTERVALS
        };
        let key = key_index.clamp(-KEY_INDEX_LIMIT, KEY_INDEX_LIMIT);
        let root = REFERENCE_PITCH_HZ * semitones_to_ratio(key as f32);
        let mut freqs = [0.0; 7];
        for (f, &st) in freqs.iter_mut().zip(intervals.iter()) {
            *f = root * semitones_to_ratio(st as f32);
        }
        Self { freqs }
    }

    pub fn root(&self) -> f32 {
        self.freqs[0]
    }

    /// Frequency of a scale degree, wrapping past the seventh.
    #[inline]
    pub fn degree(&self, degree: usize) -> f32 {
        self.freqs[degree % 7]
    }
}

/// Musical parameters shared by the offline composer and the live engine.
///
/// - `tempo_bpm`: beats per minute
/// - `key_index`: semitone offset of the root from C4
/// - `is_minor`: picks the minor interval table instead of major
/// - `mood`: 0..1, brightness, sustain level and timbre blend
/// - `rhythm`: 0..1, melody note density
/// - `pattern_id`: melodic figure, taken modulo 12
/// - `perc_level`: 0..1, percussion hit probability / intensity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MusicParams {
    pub tempo_bpm: f32,
    pub key_index: i32,
    pub is_minor: bool,
    pub mood: f32,
    pub rhythm: f32,
    pub pattern_id: i32,
    pub perc_level: f32,
}

impl Default for MusicParams {
    fn default() -> Self {
        Self {
            tempo_bpm: 90.0,
            key_index: 0,
            is_minor: false,
            mood: 0.5,
            rhythm: 0.5,
            pattern_id: 0,
            perc_level: 0.5,
        }
    }
}

impl MusicParams {
    /// Strict boundary check: rejects non-finite values and non-positive
    /// tempo, clamps everything else into range.
    pub fn validate(&self) -> Result<Self, ParamError> {
        for (field, v) in [
            ("tempo", self.tempo_bpm),
            ("mood", self.mood),
            ("rhythm", self.rhythm),
            ("percussion level", self.perc_level),
        ] {
            if !v.is_finite() {
                return Err(ParamError::NonFinite { field });
            }
        }
        if self.tempo_bpm <= 0.0 {
            return Err(ParamError::NonPositiveTempo(self.tempo_bpm));
        }
        Ok(self.clamped())
    }

    /// Lenient variant for the live control path: bad tempo falls back to
    /// `fallback_tempo`, bad unit values fall back to their defaults.
    pub fn sanitized(&self, fallback_tempo: f32) -> Self {
        let defaults = Self::default();
        let unit = |v: f32, d: f32| if v.is_finite() { v } else { d };
        let tempo_bpm = if self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0 {
            self.tempo_bpm
        } else {
            fallback_tempo
        };
        Self {
            tempo_bpm,
            mood: unit(self.mood, defaults.mood),
            rhythm: unit(self.rhythm, defaults.rhythm),
            perc_level: unit(self.perc_level, defaults.perc_level),
            ..*self
        }
        .clamped()
    }

    fn clamped(&self) -> Self {
        let tempo_bpm = self.tempo_bpm.clamp(TEMPO_MIN_BPM, TEMPO_MAX_BPM);
        if tempo_bpm != self.tempo_bpm {
            log::debug!("tempo {} bpm clamped to {tempo_bpm} bpm", self.tempo_bpm);
        }
        let key_index = self.key_index.clamp(-KEY_INDEX_LIMIT, KEY_INDEX_LIMIT);
        if key_index != self.key_index {
            log::debug!("key index {} clamped to {key_index}", self.key_index);
        }
        Self {
            tempo_bpm,
            key_index,
            is_minor: self.is_minor,
            mood: self.mood.clamp(0.0, 1.0),
            rhythm: self.rhythm.clamp(0.0, 1.0),
            pattern_id: self.pattern_id.rem_euclid(PATTERN_COUNT as i32),
            perc_level: self.perc_level.clamp(0.0, 1.0),
        }
    }

    pub fn scale(&self) -> Scale {
        Scale::from_key(self.key_index, self.is_minor)
    }

    pub fn pattern(&self) -> &'static [usize; 4] {
        pattern(self.pattern_id)
    }
}

/// A full offline render request: musical parameters plus a duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    pub duration_secs: f32,
    pub music: MusicParams,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            music: MusicParams::default(),
        }
    }
}

impl RenderParams {
    pub fn validate(&self) -> Result<Self, ParamError> {
        if !self.duration_secs.is_finite() {
            return Err(ParamError::NonFinite { field: "duration" });
        }
        if self.duration_secs <= 0.0 {
            return Err(ParamError::NonPositiveDuration(self.duration_secs));
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return Err(ParamError::DurationTooLong(self.duration_secs));
        }
        Ok(Self {
            duration_secs: self.duration_secs,
            music: self.music.validate()?,
        })
    }

    /// Frames rendered for this duration at the fixed sample rate.
    pub fn num_frames(&self) -> usize {
        (self.duration_secs as f64 * crate::constants::SAMPLE_RATE as f64).round() as usize
    }
}
