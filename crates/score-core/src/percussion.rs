//! Drum voices built from noise, swept sines and the one-pole filter.

use crate::constants::SAMPLE_RATE_F32;
use crate::filter::lowpass;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrumVoice {
    Kick,
    Snare,
    HiHat,
}

impl DrumVoice {
    pub const ALL: [DrumVoice; 3] = [DrumVoice::Kick, DrumVoice::Snare, DrumVoice::HiHat];

    /// Uniform choice among the three voices.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn render<R: Rng + ?Sized>(self, length: usize, rng: &mut R) -> Vec<f32> {
        match self {
            DrumVoice::Kick => kick(length),
            DrumVoice::Snare => snare(length, rng),
            DrumVoice::HiHat => hihat(length, rng),
        }
    }
}

#[inline]
fn noise<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

/// Pitch drops from 100 Hz as `100 * e^(-15t)` under an `e^(-30t)` envelope.
pub fn kick(length: usize) -> Vec<f32> {
    let mut phase = 0.0f32;
    (0..length)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE_F32;
            let f = 100.0 * (-15.0 * t).exp();
            phase += TAU * f / SAMPLE_RATE_F32;
            phase.sin() * (-30.0 * t).exp()
        })
        .collect()
}

/// 180 Hz body under 70% noise, `e^(-40t)` decay, low-passed at alpha 0.2.
pub fn snare<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<f32> {
    let raw: Vec<f32> = (0..length)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE_F32;
            let tone = (TAU * 180.0 * t).sin();
            (tone * 0.3 + noise(rng) * 0.7) * (-40.0 * t).exp()
        })
        .collect();
    lowpass(&raw, 0.2)
}

/// Short noise burst, `0.6 * e^(-100t)`, low-passed at alpha 0.15.
pub fn hihat<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<f32> {
    let raw: Vec<f32> = (0..length)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE_F32;
            noise(rng) * (-100.0 * t).exp() * 0.6
        })
        .collect();
    lowpass(&raw, 0.15)
}
