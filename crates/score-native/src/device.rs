use std::sync::{Arc, Mutex, TryLockError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, FromSample, SampleFormat, SampleRate, SizedSample, StreamConfig};
use score_core::frame::frames_mut;
use score_core::{FrameSource, StereoFrame, SAMPLE_RATE};
use thiserror::Error;

const CHANNELS: u16 = 2;
const SCRATCH_FRAMES: usize = 1024; // per-chunk conversion buffer for integer formats
const MIN_BUFFER_FRAMES: u32 = 64;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device")]
    NoOutputDevice,
    #[error("output device offers no stereo config at {SAMPLE_RATE} Hz")]
    NoStereoConfig,
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(SampleFormat),
    #[error("could not query output configs: {0}")]
    QueryConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error("could not build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Something that can open an output stream pulling from a frame source.
///
/// The returned stream handle keeps the device busy; dropping it releases it.
pub trait OutputDevice {
    type Stream;

    fn open<S: FrameSource + 'static>(
        &mut self,
        source: Arc<Mutex<S>>,
    ) -> Result<Self::Stream, DeviceError>;
}

/// The host's default output device, opened through cpal.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalOutput;

/// A running cpal stream; audio stops when this is dropped.
pub struct AudioOutput {
    _stream: cpal::Stream,
    pub device_name: String,
    pub sample_format: SampleFormat,
    pub buffer_size: BufferSize,
}

impl OutputDevice for CpalOutput {
    type Stream = AudioOutput;

    fn open<S: FrameSource + 'static>(
        &mut self,
        source: Arc<Mutex<S>>,
    ) -> Result<AudioOutput, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown device".into());

        let range = pick_config(&device)?;
        let sample_format = range.sample_format();
        let mut config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: lowest_buffer_size(range.buffer_size()),
        };

        let stream = match build_stream(&device, &config, sample_format, Arc::clone(&source)) {
            Ok(stream) => stream,
            Err(err) if config.buffer_size != BufferSize::Default => {
                log::warn!("fixed buffer size rejected ({err}); retrying with the device default");
                config.buffer_size = BufferSize::Default;
                build_stream(&device, &config, sample_format, source)?
            }
            Err(err) => return Err(err),
        };
        stream.play()?;

        log::info!(
            "audio output on '{device_name}': {sample_format}, {} Hz, buffer {:?}",
            SAMPLE_RATE,
            config.buffer_size
        );
        Ok(AudioOutput {
            _stream: stream,
            device_name,
            sample_format,
            buffer_size: config.buffer_size,
        })
    }
}

// Stereo at the engine rate, preferring float so frames can be written in place.
fn pick_config(device: &cpal::Device) -> Result<cpal::SupportedStreamConfigRange, DeviceError> {
    let rate = SampleRate(SAMPLE_RATE);
    let mut candidates: Vec<_> = device
        .supported_output_configs()?
        .filter(|c| {
            c.channels() == CHANNELS && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate
        })
        .collect();
    candidates.sort_by_key(|c| format_rank(c.sample_format()));
    candidates
        .into_iter()
        .next()
        .ok_or(DeviceError::NoStereoConfig)
}

fn format_rank(format: SampleFormat) -> u8 {
    match format {
        SampleFormat::F32 => 0,
        SampleFormat::I16 => 1,
        SampleFormat::U16 => 2,
        _ => 3,
    }
}

fn lowest_buffer_size(supported: &cpal::SupportedBufferSize) -> BufferSize {
    match supported {
        cpal::SupportedBufferSize::Range { min, max } => {
            BufferSize::Fixed((*min).max(MIN_BUFFER_FRAMES).min(*max))
        }
        cpal::SupportedBufferSize::Unknown => BufferSize::Default,
    }
}

fn build_stream<S: FrameSource + 'static>(
    device: &cpal::Device,
    config: &StreamConfig,
    format: SampleFormat,
    source: Arc<Mutex<S>>,
) -> Result<cpal::Stream, DeviceError> {
    match format {
        SampleFormat::F32 => build_stream_f32(device, config, source),
        SampleFormat::I16 => build_stream_converted::<i16, S>(device, config, source),
        SampleFormat::U16 => build_stream_converted::<u16, S>(device, config, source),
        other => Err(DeviceError::UnsupportedFormat(other)),
    }
}

fn log_stream_error(err: cpal::StreamError) {
    log::error!("audio output stream error: {err}");
}

// The control side only holds the lock briefly, so a busy lock costs one
// silent buffer rather than blocking the callback. A poisoned lock still
// holds a usable source; keep rendering from it.
fn render_locked<S: FrameSource>(source: &Mutex<S>, frames: &mut [StereoFrame]) {
    match source.try_lock() {
        Ok(mut s) => s.produce_frames(frames),
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().produce_frames(frames),
        Err(TryLockError::WouldBlock) => frames.fill(StereoFrame::SILENCE),
    }
}

fn build_stream_f32<S: FrameSource + 'static>(
    device: &cpal::Device,
    config: &StreamConfig,
    source: Arc<Mutex<S>>,
) -> Result<cpal::Stream, DeviceError> {
    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match frames_mut(data) {
            Some(frames) => render_locked(&source, frames),
            None => data.fill(0.0),
        },
        log_stream_error,
        None,
    )?;
    Ok(stream)
}

fn build_stream_converted<T, S>(
    device: &cpal::Device,
    config: &StreamConfig,
    source: Arc<Mutex<S>>,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<f32>,
    S: FrameSource + 'static,
{
    // Allocated here, before the stream starts; the callback only reuses it.
    let mut scratch = vec![StereoFrame::SILENCE; SCRATCH_FRAMES];
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for chunk in data.chunks_mut(SCRATCH_FRAMES * CHANNELS as usize) {
                let frames = &mut scratch[..chunk.len() / CHANNELS as usize];
                render_locked(&source, frames);
                for (out, f) in chunk.chunks_exact_mut(2).zip(frames.iter()) {
                    out[0] = T::from_sample(f.left);
                    out[1] = T::from_sample(f.right);
                }
            }
        },
        log_stream_error,
        None,
    )?;
    Ok(stream)
}
