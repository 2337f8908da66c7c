//! Fixed-length waveform generators.
//!
//! Every generator returns exactly `length` samples in the -1.0..1.0 range,
//! starting at phase zero. They hold no state between calls.

use crate::constants::SAMPLE_RATE;
use rand::Rng;
use std::f64::consts::TAU;

/// Oscillator shape selectable by callers that pick a timbre at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    PluckedString,
}

impl Waveform {
    pub fn render<R: Rng + ?Sized>(self, freq: f32, length: usize, rng: &mut R) -> Vec<f32> {
        match self {
            Waveform::Sine => sine(freq, length),
            Waveform::Triangle => triangle(freq, length),
            Waveform::Sawtooth => sawtooth(freq, length),
            Waveform::PluckedString => plucked_string(freq, length, rng),
        }
    }
}

// Cycles elapsed at sample `i`; f64 keeps long buffers in tune.
#[inline]
fn cycles(freq: f32, i: usize) -> f64 {
    freq as f64 * i as f64 / SAMPLE_RATE as f64
}

#[inline]
fn frac(x: f64) -> f64 {
    x - x.floor()
}

pub fn sine(freq: f32, length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| (TAU * cycles(freq, i)).sin() as f32)
        .collect()
}

pub fn triangle(freq: f32, length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| ((frac(cycles(freq, i)) * 2.0 - 1.0).abs() * 2.0 - 1.0) as f32)
        .collect()
}

pub fn sawtooth(freq: f32, length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| (2.0 * frac(cycles(freq, i)) - 1.0) as f32)
        .collect()
}

/// Karplus-Strong string: a noise-filled delay line averaged back into itself.
///
/// The line is `round(SR / freq)` samples long (at least 2), so the output
/// is pitched near `freq` and decays as the averaging removes energy.
pub fn plucked_string<R: Rng + ?Sized>(freq: f32, length: usize, rng: &mut R) -> Vec<f32> {
    let period = (SAMPLE_RATE as f32 / freq).round();
    let n = if period.is_finite() && period >= 2.0 {
        period as usize
    } else {
        2
    };
    let mut line: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..=1.0)).collect();
    let mut out = Vec::with_capacity(length);
    let mut pos = 0usize;
    for _ in 0..length {
        let next = 0.5 * (line[pos] + line[(pos + 1) % n]);
        line[pos] = next;
        out.push(next);
        pos = (pos + 1) % n;
    }
    out
}
