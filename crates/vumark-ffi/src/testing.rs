//! Callback tables that record into a shared log, for the FFI tests.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};

use parking_lot::Mutex;

use crate::types::*;

struct Inner {
    calls: Mutex<Vec<String>>,
    video_texture: AtomicI32,
}

/// Owns the log; must outlive every session built from its tables.
pub(crate) struct Recorder {
    inner: Box<Inner>,
}

fn log(user_data: *mut c_void, entry: String) {
    let inner = unsafe { &*(user_data as *const Inner) };
    inner.calls.lock().push(entry);
}

fn text(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

extern "C" fn init_rendering(u: *mut c_void) {
    log(u, "init_rendering".into())
}
extern "C" fn deinit_rendering(u: *mut c_void) {
    log(u, "deinit_rendering".into())
}
extern "C" fn set_textures(u: *mut c_void, w: u32, h: u32, _pixels: *const u8, len: usize) {
    log(u, format!("set_textures:{}x{}:{}", w, h, len))
}
extern "C" fn configure_rendering(u: *mut c_void, w: u32, h: u32, o: c_int, r: c_int) -> bool {
    log(u, format!("configure_rendering:{}x{}:{}:{}", w, h, o, r));
    true
}
extern "C" fn render_frame(u: *mut c_void) -> bool {
    log(u, "render_frame".into());
    true
}
extern "C" fn init_ar(u: *mut c_void, target: c_int) -> *const c_char {
    log(u, format!("init_ar:{}", target));
    ptr::null()
}
extern "C" fn deinit_ar(u: *mut c_void) {
    log(u, "deinit_ar".into())
}
extern "C" fn start_ar(u: *mut c_void) -> bool {
    log(u, "start_ar".into());
    true
}
extern "C" fn stop_ar(u: *mut c_void) {
    log(u, "stop_ar".into())
}
extern "C" fn perform_auto_focus(u: *mut c_void) {
    log(u, "perform_auto_focus".into())
}
extern "C" fn restore_auto_focus(u: *mut c_void) {
    log(u, "restore_auto_focus".into())
}
extern "C" fn init_video_texture(u: *mut c_void) -> c_int {
    log(u, "init_video_texture".into());
    let inner = unsafe { &*(u as *const Inner) };
    inner.video_texture.load(Ordering::SeqCst)
}
extern "C" fn on_surface_changed(u: *mut c_void, w: u32, h: u32) {
    log(u, format!("on_surface_changed:{}x{}", w, h))
}
extern "C" fn set_video_size(u: *mut c_void, w: u32, h: u32) {
    log(u, format!("set_video_size:{}x{}", w, h))
}

extern "C" fn prepare(u: *mut c_void, asset: *const c_char, _looping: bool, _autoplay: bool) {
    log(u, format!("prepare:{}", text(asset)))
}
extern "C" fn attach_texture(u: *mut c_void, texture: c_int) {
    log(u, format!("attach_texture:{}", texture))
}
extern "C" fn latch_frame(_u: *mut c_void) -> bool {
    false
}
extern "C" fn release(u: *mut c_void) {
    log(u, "release".into())
}

extern "C" fn keep_screen_on(u: *mut c_void) {
    log(u, "keep_screen_on".into())
}
extern "C" fn show_surface(u: *mut c_void) {
    log(u, "show_surface".into())
}
extern "C" fn hide_surface(u: *mut c_void) {
    log(u, "hide_surface".into())
}
extern "C" fn hide_loading_indicator(u: *mut c_void) {
    log(u, "hide_loading_indicator".into())
}
extern "C" fn show_error(u: *mut c_void, message: *const c_char) {
    log(u, format!("show_error:{}", text(message)))
}
extern "C" fn show_notice(u: *mut c_void, message: *const c_char) {
    log(u, format!("show_notice:{}", text(message)))
}
extern "C" fn request_camera_permission(u: *mut c_void) {
    log(u, "request_camera_permission".into())
}
extern "C" fn finish(u: *mut c_void) {
    log(u, "finish".into())
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Recorder {
            inner: Box::new(Inner {
                calls: Mutex::new(Vec::new()),
                video_texture: AtomicI32::new(3),
            }),
        }
    }

    pub(crate) fn set_video_texture(&self, raw: i32) {
        self.inner.video_texture.store(raw, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().clone()
    }

    fn user_data(&self) -> *mut c_void {
        &*self.inner as *const Inner as *mut c_void
    }

    pub(crate) fn engine(&self) -> VumarkEngineCallbacks {
        VumarkEngineCallbacks {
            user_data: self.user_data(),
            init_rendering,
            deinit_rendering,
            set_textures,
            configure_rendering,
            render_frame,
            init_ar,
            deinit_ar,
            start_ar,
            stop_ar,
            camera_perform_auto_focus: perform_auto_focus,
            camera_restore_auto_focus: restore_auto_focus,
            init_video_texture,
            on_surface_changed,
            set_video_size,
        }
    }

    pub(crate) fn video(&self) -> VumarkVideoCallbacks {
        VumarkVideoCallbacks {
            user_data: self.user_data(),
            prepare,
            attach_texture,
            latch_frame,
            release,
        }
    }

    pub(crate) fn host(&self) -> VumarkHostCallbacks {
        VumarkHostCallbacks {
            user_data: self.user_data(),
            keep_screen_on,
            show_surface,
            hide_surface,
            hide_loading_indicator,
            show_error,
            show_notice,
            request_camera_permission,
            finish,
        }
    }
}
