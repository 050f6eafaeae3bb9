//! AR engine boundary
//!
//! The engine (tracking, pose estimation, video background and augmentation
//! rendering) is an external native library. Everything this workspace knows
//! about it is the call surface below. The session layer depends only on
//! [`ArEngine`]; the FFI crate binds it to the vendor library and the test
//! crate provides a recording fake.
//!
//! # Threading
//!
//! Calls arrive from three contexts: `init_ar` from the background worker,
//! lifecycle calls (`start_ar`, `stop_ar`, `deinit_ar`, focus) from the UI
//! thread, and the rendering calls from the rendering thread. Implementations
//! must therefore be `Send + Sync`.

use serde::{Deserialize, Serialize};

use crate::{ArResult, DisplayGeometry};

/// Which kind of target the engine should track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum TargetKind {
    #[default]
    Image = 0,
    Model = 1,
}

impl TargetKind {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Handle of a GPU texture that receives external video frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoTextureHandle(i32);

impl VideoTextureHandle {
    /// The engine reports allocation failure with a negative id.
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw >= 0).then_some(Self(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Capability interface of the external AR engine.
pub trait ArEngine: Send + Sync {
    /// One-time GPU setup for the current GL context.
    fn init_rendering(&self);

    /// GPU teardown when the GL surface goes away.
    fn deinit_rendering(&self);

    /// Upload a reference image as tightly packed RGBA8 pixels.
    fn set_textures(&self, width: u32, height: u32, pixels: &[u8]);

    /// (Re)configure projection and viewport. Returns `false` on failure.
    fn configure_rendering(&self, geometry: &DisplayGeometry) -> bool;

    /// Render one frame. Returns whether a frame was actually produced.
    fn render_frame(&self) -> bool;

    /// Session setup. May block on camera and hardware setup.
    fn init_ar(&self, target: TargetKind) -> ArResult<()>;

    fn deinit_ar(&self);

    /// Begin tracking. Returns `false` on failure.
    fn start_ar(&self) -> bool;

    fn stop_ar(&self);

    fn camera_perform_auto_focus(&self);

    fn camera_restore_auto_focus(&self);

    /// Allocate the video texture. Negative on failure.
    fn init_video_texture(&self) -> i32;

    /// Display dimensions, reported independently of `configure_rendering`.
    fn on_surface_changed(&self, width: u32, height: u32);

    /// Decoded video frame dimensions.
    fn set_video_size(&self, width: u32, height: u32);
}
