//! Background layers laid over the normalized mix.

use crate::constants::SAMPLE_RATE_F32;
use crate::envelope::adsr;
use crate::filter::lowpass;
use crate::music::Scale;
use crate::oscillator::triangle;
use rand::Rng;

/// Noise breathing under a slow sine LFO; brighter and faster with mood.
pub fn shimmer<R: Rng + ?Sized>(length: usize, mood: f32, rng: &mut R) -> Vec<f32> {
    let brightness = 0.2 + 0.6 * mood;
    let speed = 0.00005 + 0.00005 * mood;
    let mut phase = 0.0f32;
    let raw: Vec<f32> = (0..length)
        .map(|_| {
            let n = (rng.gen::<f32>() - 0.5) * 2.0;
            let lfo = 0.5 + 0.5 * phase.sin();
            phase += speed;
            n * brightness * lfo * 0.1
        })
        .collect();
    lowpass(&raw, 0.15)
}

/// Samples per sixteenth note at `tempo_bpm`, never zero.
#[inline]
pub fn sixteenth_len(tempo_bpm: f32) -> usize {
    let bps = tempo_bpm / 60.0;
    ((SAMPLE_RATE_F32 / (bps * 4.0)) as usize).max(1)
}

/// Sixteenth-note run up the scale, one octave above it, in triangle waves.
pub fn arpeggio(scale: &Scale, num_samples: usize, tempo_bpm: f32, mood: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; num_samples];
    let note_len = sixteenth_len(tempo_bpm);
    let mut idx = 0usize;
    let mut step = 0usize;
    while idx < num_samples {
        let freq = scale.degree(step % 7) * 2.0;
        let nl = note_len.min(num_samples - idx);
        let wave = triangle(freq, nl);
        let env = adsr(nl, mood);
        for (o, (w, e)) in out[idx..idx + nl].iter_mut().zip(wave.iter().zip(&env)) {
            *o += w * e * 0.2;
        }
        idx += nl;
        step += 1;
    }
    lowpass(&out, 0.25)
}
