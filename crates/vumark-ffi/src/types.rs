//! FFI Types - C-compatible type definitions and callback tables
//!
//! Hosts implement the engine, video player and host screen as tables of
//! C function pointers. Every table carries a `user_data` pointer that is
//! passed back unchanged on each call.

use std::ffi::{c_char, c_int, c_void, CStr, CString};

use vumark_core::{
    ArEngine, ArError, ArResult, DisplayGeometry, HostUi, PlaybackOptions, SessionState,
    TargetKind, VideoPlayer, VideoTextureHandle,
};

/// Session state as seen by the host
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VumarkSessionState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    Tracking = 3,
    Stopping = 4,
}

impl From<SessionState> for VumarkSessionState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Uninitialized => Self::Uninitialized,
            SessionState::Initializing => Self::Initializing,
            SessionState::Ready => Self::Ready,
            SessionState::Tracking => Self::Tracking,
            SessionState::Stopping => Self::Stopping,
        }
    }
}

/// Engine entry points.
///
/// `init_ar` returns NULL on success, or an error message that stays valid
/// until the next call into the table.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VumarkEngineCallbacks {
    pub user_data: *mut c_void,
    pub init_rendering: extern "C" fn(user_data: *mut c_void),
    pub deinit_rendering: extern "C" fn(user_data: *mut c_void),
    pub set_textures: extern "C" fn(
        user_data: *mut c_void,
        width: u32,
        height: u32,
        pixels: *const u8,
        len: usize,
    ),
    pub configure_rendering: extern "C" fn(
        user_data: *mut c_void,
        width: u32,
        height: u32,
        orientation: c_int,
        rotation: c_int,
    ) -> bool,
    pub render_frame: extern "C" fn(user_data: *mut c_void) -> bool,
    pub init_ar: extern "C" fn(user_data: *mut c_void, target: c_int) -> *const c_char,
    pub deinit_ar: extern "C" fn(user_data: *mut c_void),
    pub start_ar: extern "C" fn(user_data: *mut c_void) -> bool,
    pub stop_ar: extern "C" fn(user_data: *mut c_void),
    pub camera_perform_auto_focus: extern "C" fn(user_data: *mut c_void),
    pub camera_restore_auto_focus: extern "C" fn(user_data: *mut c_void),
    pub init_video_texture: extern "C" fn(user_data: *mut c_void) -> c_int,
    pub on_surface_changed: extern "C" fn(user_data: *mut c_void, width: u32, height: u32),
    pub set_video_size: extern "C" fn(user_data: *mut c_void, width: u32, height: u32),
}

/// Video player entry points
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VumarkVideoCallbacks {
    pub user_data: *mut c_void,
    pub prepare: extern "C" fn(
        user_data: *mut c_void,
        asset: *const c_char,
        looping: bool,
        play_when_ready: bool,
    ),
    pub attach_texture: extern "C" fn(user_data: *mut c_void, texture: c_int),
    pub latch_frame: extern "C" fn(user_data: *mut c_void) -> bool,
    pub release: extern "C" fn(user_data: *mut c_void),
}

/// Host screen entry points. Only ever called on the thread that drives
/// the session handle.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VumarkHostCallbacks {
    pub user_data: *mut c_void,
    pub keep_screen_on: extern "C" fn(user_data: *mut c_void),
    pub show_surface: extern "C" fn(user_data: *mut c_void),
    pub hide_surface: extern "C" fn(user_data: *mut c_void),
    pub hide_loading_indicator: extern "C" fn(user_data: *mut c_void),
    pub show_error: extern "C" fn(user_data: *mut c_void, message: *const c_char),
    pub show_notice: extern "C" fn(user_data: *mut c_void, message: *const c_char),
    pub request_camera_permission: extern "C" fn(user_data: *mut c_void),
    pub finish: extern "C" fn(user_data: *mut c_void),
}

/// [`ArEngine`] backed by a host callback table.
pub struct CallbackEngine(VumarkEngineCallbacks);

// The host guarantees the engine table may be called from any thread.
unsafe impl Send for CallbackEngine {}
unsafe impl Sync for CallbackEngine {}

impl CallbackEngine {
    pub fn new(callbacks: VumarkEngineCallbacks) -> Self {
        Self(callbacks)
    }
}

impl ArEngine for CallbackEngine {
    fn init_rendering(&self) {
        (self.0.init_rendering)(self.0.user_data)
    }

    fn deinit_rendering(&self) {
        (self.0.deinit_rendering)(self.0.user_data)
    }

    fn set_textures(&self, width: u32, height: u32, pixels: &[u8]) {
        (self.0.set_textures)(self.0.user_data, width, height, pixels.as_ptr(), pixels.len())
    }

    fn configure_rendering(&self, geometry: &DisplayGeometry) -> bool {
        (self.0.configure_rendering)(
            self.0.user_data,
            geometry.width,
            geometry.height,
            geometry.orientation.as_raw(),
            geometry.rotation.as_raw(),
        )
    }

    fn render_frame(&self) -> bool {
        (self.0.render_frame)(self.0.user_data)
    }

    fn init_ar(&self, target: TargetKind) -> ArResult<()> {
        let message = (self.0.init_ar)(self.0.user_data, target.id());
        if message.is_null() {
            return Ok(());
        }
        let message = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        Err(ArError::InitFailed(message))
    }

    fn deinit_ar(&self) {
        (self.0.deinit_ar)(self.0.user_data)
    }

    fn start_ar(&self) -> bool {
        (self.0.start_ar)(self.0.user_data)
    }

    fn stop_ar(&self) {
        (self.0.stop_ar)(self.0.user_data)
    }

    fn camera_perform_auto_focus(&self) {
        (self.0.camera_perform_auto_focus)(self.0.user_data)
    }

    fn camera_restore_auto_focus(&self) {
        (self.0.camera_restore_auto_focus)(self.0.user_data)
    }

    fn init_video_texture(&self) -> i32 {
        (self.0.init_video_texture)(self.0.user_data)
    }

    fn on_surface_changed(&self, width: u32, height: u32) {
        (self.0.on_surface_changed)(self.0.user_data, width, height)
    }

    fn set_video_size(&self, width: u32, height: u32) {
        (self.0.set_video_size)(self.0.user_data, width, height)
    }
}

/// [`VideoPlayer`] backed by a host callback table.
pub struct CallbackVideoPlayer(VumarkVideoCallbacks);

unsafe impl Send for CallbackVideoPlayer {}
unsafe impl Sync for CallbackVideoPlayer {}

impl CallbackVideoPlayer {
    pub fn new(callbacks: VumarkVideoCallbacks) -> Self {
        Self(callbacks)
    }
}

impl VideoPlayer for CallbackVideoPlayer {
    fn prepare(&self, options: &PlaybackOptions) {
        let asset = match CString::new(options.asset.as_str()) {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!("Video asset name not representable: {}", e);
                return;
            }
        };
        (self.0.prepare)(
            self.0.user_data,
            asset.as_ptr(),
            options.looping,
            options.play_when_ready,
        )
    }

    fn attach_texture(&self, texture: VideoTextureHandle) {
        (self.0.attach_texture)(self.0.user_data, texture.raw())
    }

    fn latch_frame(&self) -> bool {
        (self.0.latch_frame)(self.0.user_data)
    }

    fn release(&self) {
        (self.0.release)(self.0.user_data)
    }
}

/// [`HostUi`] backed by a host callback table.
pub struct CallbackHost(VumarkHostCallbacks);

impl CallbackHost {
    pub fn new(callbacks: VumarkHostCallbacks) -> Self {
        Self(callbacks)
    }

    fn send_text(&self, f: extern "C" fn(*mut c_void, *const c_char), text: &str) {
        // Interior NULs would truncate the message on the C side anyway.
        let text = CString::new(text.replace('\0', " ")).unwrap_or_default();
        f(self.0.user_data, text.as_ptr())
    }
}

impl HostUi for CallbackHost {
    fn keep_screen_on(&mut self) {
        (self.0.keep_screen_on)(self.0.user_data)
    }

    fn show_surface(&mut self) {
        (self.0.show_surface)(self.0.user_data)
    }

    fn hide_surface(&mut self) {
        (self.0.hide_surface)(self.0.user_data)
    }

    fn hide_loading_indicator(&mut self) {
        (self.0.hide_loading_indicator)(self.0.user_data)
    }

    fn show_error(&mut self, message: &str) {
        self.send_text(self.0.show_error, message)
    }

    fn show_notice(&mut self, message: &str) {
        self.send_text(self.0.show_notice, message)
    }

    fn request_camera_permission(&mut self) {
        (self.0.request_camera_permission)(self.0.user_data)
    }

    fn finish(&mut self) {
        (self.0.finish)(self.0.user_data)
    }
}
