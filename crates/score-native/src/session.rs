//! Live session: ties the engine's control handle to an output device.
//!
//! The logical running state belongs to the engine. The device stream is
//! a separate resource: if it cannot be opened the session still counts as
//! running, and `stop_live` releases whatever stream exists.

use std::sync::{Arc, Mutex};

use score_core::{LiveControl, LiveEngine, LiveRenderer, MusicParams};

use crate::device::{CpalOutput, DeviceError, OutputDevice};

/// Outcome of opening the audio device on `start_live`.
#[derive(Debug)]
pub enum DeviceStatus {
    Playing,
    Unavailable(DeviceError),
}

impl DeviceStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, DeviceStatus::Playing)
    }
}

pub struct LiveSession<D: OutputDevice = CpalOutput> {
    control: LiveControl,
    renderer: Arc<Mutex<LiveRenderer>>,
    device: D,
    stream: Option<D::Stream>,
}

impl LiveSession<CpalOutput> {
    pub fn new(initial: MusicParams) -> Self {
        Self::with_device(LiveEngine::new(initial), CpalOutput)
    }
}

impl<D: OutputDevice> LiveSession<D> {
    pub fn with_device(engine: LiveEngine, device: D) -> Self {
        let (control, renderer) = engine.into_parts();
        Self {
            control,
            renderer: Arc::new(Mutex::new(renderer)),
            device,
            stream: None,
        }
    }

    /// Start (or restart) live generation and open the output device.
    pub fn start_live(&mut self) -> DeviceStatus {
        // a restart reopens the device from scratch
        self.stream = None;
        self.control.start();
        match self.device.open(Arc::clone(&self.renderer)) {
            Ok(stream) => {
                self.stream = Some(stream);
                log::info!("live generation started");
                DeviceStatus::Playing
            }
            Err(err) => {
                log::error!("live generation started without audio output: {err}");
                DeviceStatus::Unavailable(err)
            }
        }
    }

    pub fn update_live_parameters(&self, params: MusicParams) {
        self.control.set_parameters(params);
    }

    /// Stop generation and release the device. Safe to call repeatedly.
    pub fn stop_live(&mut self) {
        let was_running = self.control.is_running();
        self.control.stop();
        if self.stream.take().is_some() {
            log::info!("audio output released");
        }
        if was_running {
            log::info!("live generation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn has_output(&self) -> bool {
        self.stream.is_some()
    }

    /// A cloneable handle for retargeting from other threads.
    pub fn control(&self) -> LiveControl {
        self.control.clone()
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: OutputDevice> Drop for LiveSession<D> {
    fn drop(&mut self) {
        self.stop_live();
    }
}
