/// One stereo sample pair, laid out like an interleaved L,R float buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub const SILENCE: StereoFrame = StereoFrame {
        left: 0.0,
        right: 0.0,
    };

    #[inline]
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

/// View an interleaved `f32` buffer as frames; `None` if it holds a partial frame.
pub fn frames_mut(interleaved: &mut [f32]) -> Option<&mut [StereoFrame]> {
    bytemuck::try_cast_slice_mut(interleaved).ok()
}
