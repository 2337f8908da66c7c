use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context};
use clap::{Args, Parser, Subcommand};
use score_core::{
    generate_music, generate_music_seeded, to_pcm_bytes, LiveControl, MusicParams, PcmPlayer,
    RenderParams, RenderStats, SAMPLE_RATE,
};
use score_native::{CpalOutput, LiveSession, OutputDevice};

#[derive(Parser, Debug)]
#[command(name = "vision-score", version, about = "Procedural music generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a clip offline to interleaved 16-bit little-endian stereo PCM
    Render {
        /// Clip length in seconds
        #[arg(long, default_value_t = 10.0)]
        duration: f32,
        #[command(flatten)]
        music: MusicArgs,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Write raw PCM (44.1 kHz, s16le, stereo) to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Play the clip on the default output device
        #[arg(long)]
        play: bool,
    },
    /// Generate continuously on the default output device
    Live {
        /// How long to run before stopping
        #[arg(long, default_value_t = 20.0)]
        seconds: f32,
        #[command(flatten)]
        music: MusicArgs,
        /// Interval between automatic parameter changes, 0 to disable
        #[arg(long, default_value_t = 2000)]
        sweep_ms: u64,
    },
}

#[derive(Args, Clone, Copy, Debug)]
struct MusicArgs {
    #[arg(long, default_value_t = 90.0)]
    tempo: f32,
    /// Semitones above the reference C
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    key: i32,
    #[arg(long)]
    minor: bool,
    #[arg(long, default_value_t = 0.5)]
    mood: f32,
    #[arg(long, default_value_t = 0.5)]
    rhythm: f32,
    #[arg(long, default_value_t = 0)]
    pattern: i32,
    #[arg(long, default_value_t = 0.5)]
    perc: f32,
}

impl From<MusicArgs> for MusicParams {
    fn from(a: MusicArgs) -> Self {
        MusicParams {
            tempo_bpm: a.tempo,
            key_index: a.key,
            is_minor: a.minor,
            mood: a.mood,
            rhythm: a.rhythm,
            pattern_id: a.pattern,
            perc_level: a.perc,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match Cli::parse().command {
        Command::Render {
            duration,
            music,
            seed,
            out,
            play,
        } => render(duration, music.into(), seed, out, play),
        Command::Live {
            seconds,
            music,
            sweep_ms,
        } => live(seconds, music.into(), sweep_ms),
    }
}

fn render(
    duration_secs: f32,
    music: MusicParams,
    seed: Option<u64>,
    out: Option<PathBuf>,
    play: bool,
) -> anyhow::Result<()> {
    let params = RenderParams {
        duration_secs,
        music,
    };
    let started = Instant::now();
    let pcm = match seed {
        Some(seed) => generate_music_seeded(&params, seed),
        None => generate_music(&params),
    }
    .context("rendering clip")?;

    let stats = RenderStats::from_pcm(&pcm);
    log::info!(
        "rendered {} frames in {:?} (peak L {:.3} R {:.3}, rms L {:.3} R {:.3})",
        stats.frames,
        started.elapsed(),
        stats.peak_left,
        stats.peak_right,
        stats.rms_left,
        stats.rms_right
    );

    if let Some(path) = out {
        std::fs::write(&path, to_pcm_bytes(&pcm))
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if play {
        let player = Arc::new(Mutex::new(PcmPlayer::new(&pcm)));
        let _output = CpalOutput
            .open(Arc::clone(&player))
            .context("opening audio output")?;
        let clip = Duration::from_secs_f64(stats.frames as f64 / SAMPLE_RATE as f64);
        // let the device drain its last buffer before the stream is dropped
        thread::sleep(clip + Duration::from_millis(250));
    }
    Ok(())
}

fn live(seconds: f32, initial: MusicParams, sweep_ms: u64) -> anyhow::Result<()> {
    ensure!(
        seconds.is_finite() && seconds > 0.0,
        "--seconds must be positive, got {seconds}"
    );

    let mut session = LiveSession::new(initial);
    let status = session.start_live();
    if !status.is_playing() {
        log::warn!("no audio device; generating silently");
    }

    let done = Arc::new(AtomicBool::new(false));
    let sweeper = (sweep_ms > 0)
        .then(|| {
            let control = session.control();
            let done = Arc::clone(&done);
            thread::Builder::new()
                .name("live-control".into())
                .spawn(move || sweep(control, initial, Duration::from_millis(sweep_ms), &done))
        })
        .transpose()
        .context("spawning control thread")?;

    thread::sleep(Duration::from_secs_f32(seconds));
    done.store(true, Ordering::Release);
    if let Some(handle) = sweeper {
        if handle.join().is_err() {
            log::error!("control thread panicked");
        }
    }
    session.stop_live();
    Ok(())
}

// Walks mood and pattern around the starting point so a live run is audibly alive.
fn sweep(control: LiveControl, base: MusicParams, every: Duration, done: &AtomicBool) {
    let tick = Duration::from_millis(20).min(every);
    let mut step = 0u32;
    let mut next = Instant::now() + every;
    while !done.load(Ordering::Acquire) {
        if Instant::now() >= next {
            step += 1;
            let phase = step as f32 * 0.7;
            let params = MusicParams {
                mood: 0.5 + 0.45 * phase.sin(),
                perc_level: 0.5 + 0.4 * (phase * 0.5).cos(),
                pattern_id: base.pattern_id + (step / 4) as i32,
                ..base
            };
            log::info!(
                "retarget: mood {:.2}, perc {:.2}, pattern {}",
                params.mood,
                params.perc_level,
                params.pattern_id.rem_euclid(12)
            );
            control.set_parameters(params);
            next += every;
        }
        thread::sleep(tick);
    }
}
