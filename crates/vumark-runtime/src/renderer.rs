//! Rendering-surface protocol
//!
//! [`SurfaceRenderer`] is driven by the platform's GL surface on the
//! dedicated rendering thread. It owns everything tied to the GL context
//! (reference texture upload, video texture handle, configured geometry) and
//! issues the engine's rendering calls in the order the engine requires:
//!
//! 1. `on_surface_created` → `init_rendering`
//! 2. `on_surface_changed` → `set_textures`, `init_video_texture`,
//!    `on_surface_changed`; geometry becomes stale
//! 3. `on_draw_frame` → latch video, `configure_rendering` if stale, then
//!    `render_frame`; only while the session is tracking
//!
//! A draw holds the session's engine guard from its tracking check to its
//! last engine call, so teardown never deinitializes the engine under it.

use std::path::PathBuf;
use std::sync::Arc;

use vumark_core::{
    ArEngine, ArError, ArResult, DisplayGeometry, DisplayPose, ReferenceTexture, SurfaceSize,
    VideoPlayer, VideoTextureHandle,
};

use crate::message::post;
use crate::{SessionHandle, UiMessage, UiSender};

#[derive(Clone, Debug, Default)]
pub struct RendererStats {
    /// Draw callbacks that ran while tracking
    pub frames_drawn: u64,
    /// Draws for which the engine reported a rendered frame
    pub frames_rendered: u64,
    pub reconfigurations: u64,
    pub surface_changes: u64,
    pub texture_failures: u64,
}

/// Rendering-thread half of the session.
pub struct SurfaceRenderer {
    engine: Arc<dyn ArEngine>,
    video: Arc<dyn VideoPlayer>,
    session: SessionHandle,
    ui_tx: UiSender,
    texture_path: PathBuf,
    texture: Option<ReferenceTexture>,
    surface: Option<SurfaceSize>,
    geometry_stale: bool,
    configured_pose: Option<DisplayPose>,
    video_texture: Option<VideoTextureHandle>,
    first_frame_posted: bool,
    stats: RendererStats,
}

impl SurfaceRenderer {
    pub fn new(
        engine: Arc<dyn ArEngine>,
        video: Arc<dyn VideoPlayer>,
        session: SessionHandle,
        ui_tx: UiSender,
        texture_path: PathBuf,
    ) -> Self {
        SurfaceRenderer {
            engine,
            video,
            session,
            ui_tx,
            texture_path,
            texture: None,
            surface: None,
            geometry_stale: true,
            configured_pose: None,
            video_texture: None,
            first_frame_posted: false,
            stats: RendererStats::default(),
        }
    }

    /// Use an already decoded reference texture instead of loading
    /// `texture_path`.
    pub fn with_texture(mut self, texture: ReferenceTexture) -> Self {
        self.texture = Some(texture);
        self
    }

    /// GL context created (or re-created).
    pub fn on_surface_created(&mut self) {
        tracing::debug!("Surface created");
        self.engine.init_rendering();
    }

    /// Surface size or format changed. Prior GPU objects are assumed lost.
    ///
    /// A failed video texture allocation is returned after the remaining
    /// steps ran; the engine keeps rendering without video.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) -> ArResult<()> {
        tracing::debug!("Surface changed to {}x{}", width, height);
        self.surface = Some(SurfaceSize::new(width, height));
        self.stats.surface_changes += 1;

        self.upload_reference_texture();
        let video = self.create_video_texture();

        self.engine.on_surface_changed(width, height);
        self.geometry_stale = true;

        video
    }

    /// One display refresh. Returns whether the engine rendered a frame.
    pub fn on_draw_frame(&mut self) -> bool {
        let session = self.session.clone();
        let _guard = session.engine_guard();

        if !session.is_tracking() {
            return false;
        }
        // Nothing to configure against until the first surface change.
        let Some(size) = self.surface else {
            return false;
        };
        self.stats.frames_drawn += 1;

        if self.video_texture.is_some() {
            self.video.latch_frame();
        }

        let pose = session.pose();
        if self.geometry_stale || self.configured_pose != Some(pose) {
            self.configure(size, pose);
        }

        // Pause stops the engine without waiting for this draw.
        if !session.is_tracking() {
            tracing::debug!("Session left tracking during configure; skipping render");
            return false;
        }

        let did_render = self.engine.render_frame();
        if did_render {
            self.stats.frames_rendered += 1;
            if !self.first_frame_posted {
                self.first_frame_posted = true;
                post(&self.ui_tx, UiMessage::FirstFrameRendered);
            }
        }
        did_render
    }

    /// GL surface destroyed; its GPU objects are gone.
    pub fn on_surface_destroyed(&mut self) {
        tracing::debug!("Surface destroyed");
        self.engine.deinit_rendering();
        self.surface = None;
        self.video_texture = None;
        self.configured_pose = None;
        self.geometry_stale = true;
    }

    pub fn stats(&self) -> &RendererStats {
        &self.stats
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn video_texture(&self) -> Option<VideoTextureHandle> {
        self.video_texture
    }

    fn configure(&mut self, size: SurfaceSize, pose: DisplayPose) {
        let geometry = DisplayGeometry::new(size, pose);
        if !self.engine.configure_rendering(&geometry) {
            tracing::warn!("Engine rejected rendering configuration {:?}", geometry);
        }
        self.geometry_stale = false;
        self.configured_pose = Some(pose);
        self.stats.reconfigurations += 1;
    }

    fn upload_reference_texture(&mut self) {
        if self.texture.is_none() {
            match ReferenceTexture::load(&self.texture_path) {
                Ok(texture) => self.texture = Some(texture),
                Err(e) => {
                    tracing::warn!("Reference texture unavailable: {}", e);
                    self.stats.texture_failures += 1;
                    return;
                }
            }
        }

        if let Some(texture) = &self.texture {
            self.engine
                .set_textures(texture.width(), texture.height(), texture.pixels());
        }
    }

    fn create_video_texture(&mut self) -> ArResult<()> {
        let raw = self.engine.init_video_texture();
        match VideoTextureHandle::from_raw(raw) {
            Some(handle) => {
                self.video_texture = Some(handle);
                post(&self.ui_tx, UiMessage::AttachVideoTexture(handle));
                Ok(())
            }
            None => {
                tracing::error!("Failed to create native video texture ({})", raw);
                self.video_texture = None;
                Err(ArError::VideoTexture(raw))
            }
        }
    }
}
