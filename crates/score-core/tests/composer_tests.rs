// Offline composer: buffer shape, levels, layers and reproducibility.

use rand::rngs::StdRng;
use rand::SeedableRng;
use score_core::composer::{
    bass_layer, beat_len, melody_layer, percussion_layer, quantize_stereo, stereo_image,
};
use score_core::*;

fn scenario(perc_level: f32) -> RenderParams {
    RenderParams {
        duration_secs: 1.0,
        music: MusicParams {
            tempo_bpm: 120.0,
            key_index: 0,
            is_minor: false,
            mood: 0.5,
            rhythm: 0.5,
            pattern_id: 0,
            perc_level,
        },
    }
}

fn max_abs_i16(pcm: &[i16]) -> i32 {
    pcm.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0)
}

#[test]
fn one_second_render_has_expected_byte_count_and_is_audible() {
    let bytes = generate_music_bytes(&scenario(0.0)).expect("valid params");
    assert_eq!(bytes.len(), 176_400);

    let pcm: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    let loudest = max_abs_i16(&pcm);
    assert!(loudest > 1000, "render should not be silent, peak {loudest}");
    assert!(loudest <= 32767);
}

#[test]
fn render_reaches_full_scale_after_final_normalization() {
    let pcm = generate_music_seeded(&scenario(0.7), 1).expect("valid params");
    assert_eq!(pcm.len(), 2 * 44_100);
    let loudest = max_abs_i16(&pcm);
    assert!(loudest >= 32_700, "joint peak should map near full scale, got {loudest}");
    assert!(pcm.iter().all(|&s| s != i16::MIN));
}

#[test]
fn buffer_length_tracks_rounded_duration() {
    for (secs, frames) in [(0.5f32, 22_050usize), (0.01, 441), (2.0, 88_200)] {
        let params = RenderParams {
            duration_secs: secs,
            ..scenario(0.5)
        };
        let pcm = generate_music_seeded(&params, 9).expect("valid params");
        assert_eq!(pcm.len(), frames * 2, "duration {secs}");
    }
}

#[test]
fn seeded_renders_are_reproducible() {
    let params = RenderParams {
        duration_secs: 0.5,
        ..scenario(0.8)
    };
    let a = generate_music_seeded(&params, 1234).expect("valid params");
    let b = generate_music_seeded(&params, 1234).expect("valid params");
    let c = generate_music_seeded(&params, 4321).expect("valid params");
    assert_eq!(a, b);
    assert_ne!(a, c, "different seeds should differ");
}

#[test]
fn degenerate_requests_are_rejected() {
    let zero = RenderParams {
        duration_secs: 0.0,
        ..scenario(0.5)
    };
    assert!(matches!(
        generate_music(&zero),
        Err(ParamError::NonPositiveDuration(_))
    ));

    let mut stalled = scenario(0.5);
    stalled.music.tempo_bpm = -60.0;
    assert!(matches!(
        generate_music(&stalled),
        Err(ParamError::NonPositiveTempo(_))
    ));
}

#[test]
fn pattern_ids_beyond_table_wrap_instead_of_failing() {
    let mut wrapped = scenario(0.0);
    wrapped.duration_secs = 0.25;
    wrapped.music.pattern_id = 23;
    let mut direct = wrapped;
    direct.music.pattern_id = 11;
    assert_eq!(
        generate_music_seeded(&wrapped, 5).expect("valid params"),
        generate_music_seeded(&direct, 5).expect("valid params")
    );
}

#[test]
fn silent_percussion_level_never_hits() {
    let music = scenario(0.0).music;
    let mut rng = StdRng::seed_from_u64(77);
    let perc = percussion_layer(&music, 5 * 44_100, &mut rng);
    assert!(perc.iter().all(|&v| v == 0.0));
}

#[test]
fn full_percussion_level_hits_every_beat() {
    let music = scenario(1.0).music;
    let mut rng = StdRng::seed_from_u64(78);
    let n = 4 * 44_100;
    let perc = percussion_layer(&music, n, &mut rng);
    let beat = beat_len(music.tempo_bpm);
    for start in (0..n).step_by(beat) {
        let window = &perc[start..(start + 400).min(n)];
        assert!(
            window.iter().any(|v| v.abs() > 1e-4),
            "expected a hit at sample {start}"
        );
    }
}

#[test]
fn beat_length_follows_tempo() {
    assert_eq!(beat_len(120.0), 22_050);
    assert_eq!(beat_len(60.0), 44_100);
    assert_eq!(beat_len(90.0), 29_400);
}

#[test]
fn melody_and_bass_layers_are_audible() {
    let music = scenario(0.0).music;
    let scale = music.scale();
    let mut rng = StdRng::seed_from_u64(3);
    let mel = melody_layer(&music, &scale, 44_100, &mut rng);
    let bass = bass_layer(&music, &scale, 44_100);
    assert_eq!(mel.len(), 44_100);
    assert_eq!(bass.len(), 44_100);
    assert!(mel.iter().any(|v| v.abs() > 0.05));
    assert!(bass.iter().any(|v| v.abs() > 0.05));
    assert!(bass.iter().all(|v| v.abs() <= 0.3));
}

#[test]
fn stereo_image_blends_shifted_neighbours() {
    let mix: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
    let (left, right) = stereo_image(&mix, 0.5);
    assert_eq!(left.len(), 1000);
    assert_eq!(right.len(), 1000);
    // pan is zero at the first sample: left reads ahead, right has nothing behind
    assert!((left[0] - 0.1 * mix[200]).abs() < 1e-6);
    assert_eq!(right[0], 0.0);
    // near the end nothing lies ahead
    let i = 999;
    let pan = ((i as f32) * (0.00015 + 0.0001 * 0.5)).sin();
    let expected_left = 0.9 * mix[i] * (1.0 - 0.4 * pan);
    assert!((left[i] - expected_left).abs() < 1e-4);
}

#[test]
fn quantize_maps_joint_peak_to_full_scale() {
    let pcm = quantize_stereo(&[0.5, -1.0], &[0.25, 0.5]);
    assert_eq!(pcm, vec![16383, 8191, -32767, 16383]);
}

#[test]
fn quantize_silence_stays_silent() {
    let pcm = quantize_stereo(&[0.0; 8], &[0.0; 8]);
    assert!(pcm.iter().all(|&s| s == 0));
}

#[test]
fn pcm_bytes_are_little_endian() {
    assert_eq!(to_pcm_bytes(&[1, -2, 0x1234]), vec![1, 0, 0xFE, 0xFF, 0x34, 0x12]);
}

#[test]
fn render_stats_summarize_levels() {
    let stats = RenderStats::from_pcm(&[32767, 0, -32767, 16384]);
    assert_eq!(stats.frames, 2);
    assert!((stats.peak_left - 1.0).abs() < 1e-6);
    assert!((stats.peak_right - 0.5).abs() < 1e-3);
    assert!((stats.rms_left - 1.0).abs() < 1e-6);
    assert_eq!(RenderStats::from_pcm(&[]), RenderStats::default());
}

#[test]
fn pcm_player_plays_once_then_goes_quiet() {
    let mut player = PcmPlayer::new(&[32767, -32767, 0, 16384, 7]);
    assert_eq!(player.remaining_frames(), 2, "trailing half frame is dropped");

    let mut out = [StereoFrame::new(5.0, 5.0); 3];
    player.produce_frames(&mut out);
    assert_eq!(out[0], StereoFrame::new(1.0, -1.0));
    assert!((out[1].right - 0.5).abs() < 1e-3);
    assert_eq!(out[2], StereoFrame::SILENCE);
    assert!(player.is_finished());

    player.produce_frames(&mut out);
    assert!(out.iter().all(|f| *f == StereoFrame::SILENCE));
}

#[test]
fn extreme_key_still_renders_audible_finite_output() {
    let mut params = scenario(0.5);
    params.duration_secs = 0.5;
    params.music.key_index = 2000;
    let pcm = generate_music_seeded(&params, 21).expect("key is clamped, not rejected");
    assert_eq!(pcm.len(), 44_100);
    assert!(max_abs_i16(&pcm) > 1000, "render should not collapse to silence");

    let mut clamped = params;
    clamped.music.key_index = 60;
    assert_eq!(pcm, generate_music_seeded(&clamped, 21).expect("valid params"));
}
