//! Offline rendering of a complete stereo piece.
//!
//! The composer is stateless apart from the random source handed to it:
//! melody, bass and percussion layers are built on the mono axis, mixed and
//! normalized, textured with shimmer and arpeggio, widened to stereo and
//! finally quantized to interleaved 16-bit PCM.

use crate::constants::*;
use crate::envelope::adsr;
use crate::error::ParamError;
use crate::filter::{echo, lowpass, peak};
use crate::music::{MusicParams, RenderParams, Scale};
use crate::oscillator::{sawtooth, sine, triangle};
use crate::percussion::DrumVoice;
use crate::texture::{arpeggio, shimmer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples per beat at `tempo_bpm`, never zero.
#[inline]
pub fn beat_len(tempo_bpm: f32) -> usize {
    ((SAMPLE_RATE_F32 / (tempo_bpm / 60.0)) as usize).max(1)
}

/// Render with a fresh entropy-seeded generator; every call sounds different.
pub fn generate_music(params: &RenderParams) -> Result<Vec<i16>, ParamError> {
    generate_music_with_rng(params, &mut StdRng::from_entropy())
}

/// Bit-reproducible render for a given seed.
pub fn generate_music_seeded(params: &RenderParams, seed: u64) -> Result<Vec<i16>, ParamError> {
    generate_music_with_rng(params, &mut StdRng::seed_from_u64(seed))
}

/// Same as [`generate_music`], serialized as little-endian bytes.
pub fn generate_music_bytes(params: &RenderParams) -> Result<Vec<u8>, ParamError> {
    generate_music(params).map(|pcm| to_pcm_bytes(&pcm))
}

pub fn generate_music_with_rng<R: Rng + ?Sized>(
    params: &RenderParams,
    rng: &mut R,
) -> Result<Vec<i16>, ParamError> {
    let params = params.validate()?;
    let music = &params.music;
    let num_samples = params.num_frames();
    let scale = music.scale();
    log::debug!(
        "rendering {num_samples} frames at {:.1} bpm, key {}, {}",
        music.tempo_bpm,
        music.key_index,
        if music.is_minor { "minor" } else { "major" }
    );

    let mel = melody_layer(music, &scale, num_samples, rng);
    let bass = bass_layer(music, &scale, num_samples);
    let perc = percussion_layer(music, num_samples, rng);

    let mut mix: Vec<f32> = mel
        .iter()
        .zip(&bass)
        .zip(&perc)
        .map(|((m, b), p)| m + b + p)
        .collect();
    let mix_peak = peak(&mix, PEAK_FLOOR);
    for s in &mut mix {
        *s /= mix_peak;
    }

    // Textures go on after normalization and may push past unity.
    let shim = shimmer(num_samples, music.mood, rng);
    let arp = arpeggio(&scale, num_samples, music.tempo_bpm, music.mood);
    for ((s, sh), a) in mix.iter_mut().zip(&shim).zip(&arp) {
        *s += sh * SHIMMER_GAIN + a * ARPEGGIO_GAIN;
    }

    let (left, right) = stereo_image(&mix, music.mood);
    Ok(quantize_stereo(&left, &right))
}

/// Pattern-driven lead: sine, saw and octave-up triangle blended by mood.
pub fn melody_layer<R: Rng + ?Sized>(
    music: &MusicParams,
    scale: &Scale,
    num_samples: usize,
    rng: &mut R,
) -> Vec<f32> {
    let mut mel = vec![0.0f32; num_samples];
    let mood = music.mood;
    let notes_per_beat = 1 + (music.rhythm * 3.0).round() as usize;
    let note_len = (beat_len(music.tempo_bpm) / notes_per_beat).max(MIN_NOTE_SAMPLES);
    let pat = music.pattern();

    let saw_weight = 0.3 * (0.3 + 0.7 * mood);
    let tri_weight = 0.2 * (1.0 - mood);
    let level = 0.4 + 0.4 * mood;

    let mut idx = 0usize;
    let mut step = 0usize;
    while idx < num_samples {
        let octave: i32 = rng.gen_range(-1..=1);
        let freq = scale.degree(pat[step % 4]) * 2.0_f32.powi(octave);
        let nl = note_len.min(num_samples - idx);

        let s1 = sine(freq, nl);
        let s2 = sawtooth(freq, nl);
        let s3 = triangle(freq * 2.0, nl);
        let env = adsr(nl, mood);
        for i in 0..nl {
            let tone = s1[i] * 0.7 + s2[i] * saw_weight + s3[i] * tri_weight;
            mel[idx + i] += tone * env[i] * level;
        }
        idx += nl;
        step += 1;
    }

    let mel = lowpass(&mel, MELODY_LOWPASS_ALPHA);
    echo(&mel, MELODY_ECHO_DECAY, echo_delay_samples())
}

/// Root an octave down, retriggered every two beats.
pub fn bass_layer(music: &MusicParams, scale: &Scale, num_samples: usize) -> Vec<f32> {
    let mut bass = vec![0.0f32; num_samples];
    let note_len = beat_len(music.tempo_bpm) * BASS_BEATS_PER_NOTE;
    let freq = scale.root() / 2.0;

    let mut idx = 0usize;
    while idx < num_samples {
        let nl = note_len.min(num_samples - idx);
        let wave = sine(freq, nl);
        let env = adsr(nl, music.mood);
        for (o, (w, e)) in bass[idx..idx + nl].iter_mut().zip(wave.iter().zip(&env)) {
            *o += w * e * BASS_GAIN;
        }
        idx += note_len;
    }
    lowpass(&bass, BASS_LOWPASS_ALPHA)
}

/// One chance per beat to strike a random drum, with probability `perc_level`.
pub fn percussion_layer<R: Rng + ?Sized>(
    music: &MusicParams,
    num_samples: usize,
    rng: &mut R,
) -> Vec<f32> {
    let mut perc = vec![0.0f32; num_samples];
    let beat = beat_len(music.tempo_bpm);
    let hit_len = (beat / 3).max(MIN_HIT_SAMPLES);

    let mut hits = 0usize;
    for start in (0..num_samples).step_by(beat) {
        if rng.gen::<f32>() >= music.perc_level {
            continue;
        }
        let nl = hit_len.min(num_samples - start);
        let drum = DrumVoice::random(rng).render(nl, rng);
        for (o, d) in perc[start..start + nl].iter_mut().zip(&drum) {
            *o += d * PERC_GAIN;
        }
        hits += 1;
    }
    log::debug!("percussion layer: {hits} hits");
    echo(&perc, PERC_ECHO_DECAY, echo_delay_samples())
}

/// Haas widening plus a slow sinusoidal auto-pan.
///
/// Left blends in the signal `HAAS_SHIFT_SAMPLES` ahead, right the signal
/// behind; out-of-range neighbours read as silence.
pub fn stereo_image(mix: &[f32], mood: f32) -> (Vec<f32>, Vec<f32>) {
    let n = mix.len();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let pan_speed = OFFLINE_PAN_SPEED_BASE + OFFLINE_PAN_SPEED_MOOD * mood;
    let mut pan_phase = 0.0f32;

    for (i, &base) in mix.iter().enumerate() {
        let ahead = mix.get(i + HAAS_SHIFT_SAMPLES).copied().unwrap_or(0.0);
        let behind = i
            .checked_sub(HAAS_SHIFT_SAMPLES)
            .map_or(0.0, |j| mix[j]);
        let l = base * (1.0 - HAAS_BLEND) + ahead * HAAS_BLEND;
        let r = base * (1.0 - HAAS_BLEND) + behind * HAAS_BLEND;

        let pan = pan_phase.sin();
        pan_phase += pan_speed;
        left.push(l * (1.0 - OFFLINE_PAN_DEPTH * pan));
        right.push(r * (1.0 + OFFLINE_PAN_DEPTH * pan));
    }
    (left, right)
}

/// Normalize both channels by their joint peak and interleave as 16-bit L,R.
pub fn quantize_stereo(left: &[f32], right: &[f32]) -> Vec<i16> {
    let joint_peak = peak(right, peak(left, PEAK_FLOOR));
    let scale = i16::MAX as f32 / joint_peak;
    left.iter()
        .zip(right)
        .flat_map(|(l, r)| [(l * scale) as i16, (r * scale) as i16])
        .collect()
}

pub fn to_pcm_bytes(pcm: &[i16]) -> Vec<u8> {
    pcm.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Level summary of an interleaved stereo PCM buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub frames: usize,
    pub peak_left: f32,
    pub peak_right: f32,
    pub rms_left: f32,
    pub rms_right: f32,
}

impl RenderStats {
    pub fn from_pcm(pcm: &[i16]) -> Self {
        let frames = pcm.len() / 2;
        if frames == 0 {
            return Self::default();
        }
        let full_scale = i16::MAX as f32;
        let mut stats = Self {
            frames,
            ..Self::default()
        };
        let (mut sq_l, mut sq_r) = (0.0f64, 0.0f64);
        for frame in pcm.chunks_exact(2) {
            let l = frame[0] as f32 / full_scale;
            let r = frame[1] as f32 / full_scale;
            stats.peak_left = stats.peak_left.max(l.abs());
            stats.peak_right = stats.peak_right.max(r.abs());
            sq_l += (l * l) as f64;
            sq_r += (r * r) as f64;
        }
        stats.rms_left = (sq_l / frames as f64).sqrt() as f32;
        stats.rms_right = (sq_r / frames as f64).sqrt() as f32;
        stats
    }
}
