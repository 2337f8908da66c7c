/// One-pole low-pass: `y[i] = alpha * x[i] + (1 - alpha) * y[i - 1]`.
///
/// Larger `alpha` smooths less; `alpha = 1` passes the input through.
pub fn lowpass(x: &[f32], alpha: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(x.len());
    let mut prev = match x.first() {
        Some(&first) => first,
        None => return out,
    };
    out.push(prev);
    for &s in &x[1..] {
        prev = alpha * s + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Single-tap echo used as the "reverb" send: `y[i] = x[i] + decay * x[i - delay]`.
pub fn echo(x: &[f32], decay: f32, delay_samples: usize) -> Vec<f32> {
    let mut out = x.to_vec();
    for i in delay_samples..x.len() {
        out[i] += decay * x[i - delay_samples];
    }
    out
}

/// Largest absolute sample, never below `floor`.
#[inline]
pub fn peak(x: &[f32], floor: f32) -> f32 {
    x.iter().fold(floor, |m, s| m.max(s.abs()))
}
