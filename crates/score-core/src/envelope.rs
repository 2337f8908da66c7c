/// Sustain level reached after the decay segment.
#[inline]
pub fn sustain_level(mood: f32) -> f32 {
    0.7 + 0.2 * mood
}

/// Per-note attack/decay/sustain/release amplitude curve.
///
/// Segment lengths are fixed fractions of `length`: attack 10%, decay 10%,
/// release 20%, sustain takes the remainder (never negative). Attack is at
/// least one sample for any non-empty note so the curve always starts at 0.
/// Release ramps linearly from the last value written before it down to 0.
pub fn adsr(length: usize, mood: f32) -> Vec<f32> {
    let mut env = vec![0.0f32; length];
    if length == 0 {
        return env;
    }

    let attack = ((length as f32 * 0.1) as usize).max(1);
    let decay = (length as f32 * 0.1) as usize;
    let release = (length as f32 * 0.2) as usize;
    let sustain_len = length.saturating_sub(attack + decay + release);
    let s = sustain_level(mood);

    let mut idx = 0usize;
    for i in 0..attack {
        if idx >= length {
            return env;
        }
        env[idx] = i as f32 / attack as f32;
        idx += 1;
    }
    for i in 0..decay {
        if idx >= length {
            return env;
        }
        env[idx] = 1.0 - (1.0 - s) * i as f32 / decay as f32;
        idx += 1;
    }
    for _ in 0..sustain_len {
        env[idx] = s;
        idx += 1;
    }

    let start = if idx > 0 { env[idx - 1] } else { s };
    for i in 0..release {
        if idx >= length {
            break;
        }
        env[idx] = start * (1.0 - i as f32 / release as f32);
        idx += 1;
    }
    env
}
