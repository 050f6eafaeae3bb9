//! Fake video player

use parking_lot::Mutex;

use vumark_core::{PlaybackOptions, VideoPlayer, VideoTextureHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoCall {
    Prepare(PlaybackOptions),
    Attach(i32),
    Latch,
    Release,
}

#[derive(Debug, Default)]
struct PlayerState {
    calls: Vec<VideoCall>,
    attached: Option<VideoTextureHandle>,
    released: bool,
}

/// Video player that only tracks its bindings.
#[derive(Debug, Default)]
pub struct FakeVideoPlayer {
    state: Mutex<PlayerState>,
}

impl FakeVideoPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<VideoCall> {
        self.state.lock().calls.clone()
    }

    pub fn attached(&self) -> Option<VideoTextureHandle> {
        self.state.lock().attached
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    pub fn latch_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| **c == VideoCall::Latch)
            .count()
    }
}

impl VideoPlayer for FakeVideoPlayer {
    fn prepare(&self, options: &PlaybackOptions) {
        self.state.lock().calls.push(VideoCall::Prepare(options.clone()));
    }

    fn attach_texture(&self, texture: VideoTextureHandle) {
        let mut state = self.state.lock();
        state.calls.push(VideoCall::Attach(texture.raw()));
        if !state.released {
            state.attached = Some(texture);
        }
    }

    fn latch_frame(&self) -> bool {
        let mut state = self.state.lock();
        state.calls.push(VideoCall::Latch);
        state.attached.is_some() && !state.released
    }

    fn release(&self) {
        let mut state = self.state.lock();
        if state.released {
            return;
        }
        state.calls.push(VideoCall::Release);
        state.released = true;
        state.attached = None;
    }
}
