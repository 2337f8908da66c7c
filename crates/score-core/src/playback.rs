use crate::frame::StereoFrame;
use crate::live::FrameSource;

/// Plays an interleaved 16-bit stereo buffer once, then emits silence.
pub struct PcmPlayer {
    frames: Vec<StereoFrame>,
    cursor: usize,
}

impl PcmPlayer {
    pub fn new(pcm: &[i16]) -> Self {
        let full_scale = i16::MAX as f32;
        let frames = pcm
            .chunks_exact(2)
            .map(|lr| StereoFrame::new(lr[0] as f32 / full_scale, lr[1] as f32 / full_scale))
            .collect();
        Self { frames, cursor: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    pub fn remaining_frames(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl FrameSource for PcmPlayer {
    fn produce_frames(&mut self, out: &mut [StereoFrame]) {
        let n = out.len().min(self.remaining_frames());
        out[..n].copy_from_slice(&self.frames[self.cursor..self.cursor + n]);
        out[n..].fill(StereoFrame::SILENCE);
        self.cursor += n;
    }
}
