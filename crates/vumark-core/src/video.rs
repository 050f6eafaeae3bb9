//! Video playback collaborator
//!
//! A media player decodes a looping video asset into the engine-owned video
//! texture. Binding happens on the UI thread; frame latching happens on the
//! rendering thread right before each render.

use crate::VideoTextureHandle;

/// Playback settings applied when the player is prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub asset: String,
    pub looping: bool,
    pub play_when_ready: bool,
}

/// External video player.
pub trait VideoPlayer: Send + Sync {
    /// Load the asset and apply playback options.
    fn prepare(&self, options: &PlaybackOptions);

    /// Route decoded output into the given texture. Called again whenever the
    /// texture is re-created.
    fn attach_texture(&self, texture: VideoTextureHandle);

    /// Pull the most recent decoded frame into the bound texture.
    /// Returns `false` when no texture is bound yet.
    fn latch_frame(&self) -> bool;

    /// Free decoder resources. Further calls are no-ops.
    fn release(&self);
}
