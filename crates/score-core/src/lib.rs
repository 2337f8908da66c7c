pub mod composer;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod frame;
pub mod live;
pub mod music;
pub mod oscillator;
pub mod percussion;
pub mod playback;
pub mod texture;

pub use composer::{
    generate_music, generate_music_bytes, generate_music_seeded, generate_music_with_rng,
    to_pcm_bytes, RenderStats,
};
pub use constants::SAMPLE_RATE;
pub use error::ParamError;
pub use frame::StereoFrame;
pub use live::{FrameSource, LiveControl, LiveEngine, LiveRenderer, SmoothedParams};
pub use music::{pattern, MusicParams, RenderParams, Scale, PATTERNS};
pub use playback::PcmPlayer;
