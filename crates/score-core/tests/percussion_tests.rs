// Drum voices and texture layers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use score_core::percussion::{hihat, kick, snare, DrumVoice};
use score_core::texture::{arpeggio, shimmer, sixteenth_len};
use score_core::Scale;

fn max_abs(xs: &[f32]) -> f32 {
    xs.iter().fold(0.0, |m, v| m.max(v.abs()))
}

#[test]
fn drums_return_requested_length() {
    let mut rng = StdRng::seed_from_u64(11);
    for len in [0usize, 1, 400, 7350] {
        for voice in DrumVoice::ALL {
            assert_eq!(voice.render(len, &mut rng).len(), len, "{voice:?}");
        }
    }
}

#[test]
fn kick_starts_quiet_and_decays() {
    let k = kick(4000);
    assert!(k[0].abs() < 0.05, "phase starts near zero, got {}", k[0]);
    let head = max_abs(&k[..1000]);
    let tail = max_abs(&k[3900..]);
    assert!(head > 0.5, "kick body should be loud, got {head}");
    assert!(tail < head * 0.2, "kick should decay: head {head}, tail {tail}");
}

#[test]
fn kick_is_deterministic() {
    assert_eq!(kick(512), kick(512));
}

#[test]
fn snare_is_bounded_and_decays() {
    let mut rng = StdRng::seed_from_u64(5);
    let s = snare(6000, &mut rng);
    assert!(s.iter().all(|v| v.abs() <= 1.0));
    let head = max_abs(&s[..600]);
    let tail = max_abs(&s[5400..]);
    assert!(tail < head * 0.1, "snare should decay: head {head}, tail {tail}");
}

#[test]
fn hihat_is_short_and_quieter_than_unity() {
    let mut rng = StdRng::seed_from_u64(6);
    let h = hihat(3000, &mut rng);
    assert!(h.iter().all(|v| v.abs() <= 0.6));
    // e^(-100t) is below 1% after ~46 ms
    assert!(max_abs(&h[2100..]) < 0.01);
}

#[test]
fn random_voice_choice_covers_all_voices() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = [0usize; 3];
    for _ in 0..300 {
        match DrumVoice::random(&mut rng) {
            DrumVoice::Kick => seen[0] += 1,
            DrumVoice::Snare => seen[1] += 1,
            DrumVoice::HiHat => seen[2] += 1,
        }
    }
    for (i, &n) in seen.iter().enumerate() {
        assert!(n > 50, "voice {i} chosen only {n} times out of 300");
    }
}

#[test]
fn shimmer_is_quiet_and_exact_length() {
    let mut rng = StdRng::seed_from_u64(2);
    for mood in [0.0f32, 1.0] {
        let s = shimmer(10_000, mood, &mut rng);
        assert_eq!(s.len(), 10_000);
        let ceiling = (0.2 + 0.6 * mood) * 0.1;
        assert!(s.iter().all(|v| v.abs() <= ceiling + 1e-6));
        assert!(max_abs(&s) > 0.0);
    }
    assert!(shimmer(0, 0.5, &mut rng).is_empty());
}

#[test]
fn sixteenth_grid_follows_tempo() {
    assert_eq!(sixteenth_len(120.0), 5512);
    assert_eq!(sixteenth_len(60.0), 11025);
    assert!(sixteenth_len(400.0) >= 1);
}

#[test]
fn arpeggio_fills_buffer_with_audible_notes() {
    let scale = Scale::from_key(0, false);
    let arp = arpeggio(&scale, 30_000, 120.0, 0.5);
    assert_eq!(arp.len(), 30_000);
    let loudest = max_abs(&arp);
    assert!(loudest > 0.01, "arpeggio too quiet: {loudest}");
    assert!(loudest <= 0.2, "note gain is 0.2, got {loudest}");
    // the first note opens from a silent envelope
    assert!(arp[0].abs() < 1e-6);
}

#[test]
fn arpeggio_handles_empty_and_partial_notes() {
    let scale = Scale::from_key(4, true);
    assert!(arpeggio(&scale, 0, 90.0, 0.3).is_empty());
    let short = arpeggio(&scale, 100, 90.0, 0.3);
    assert_eq!(short.len(), 100);
}
