#![allow(clippy::missing_safety_doc)]
//! FFI Renderer functions
//!
//! A renderer handle is created from a session and then moved to the
//! thread that owns the GL context.

use std::ffi::c_int;
use std::ptr;

use vumark_runtime::SurfaceRenderer;

use crate::error::*;
use crate::session::VumarkSessionHandle;

/// Opaque handle to the rendering-thread half of a session
pub struct VumarkRendererHandle {
    pub(crate) renderer: SurfaceRenderer,
}

/// Create the renderer for a session
/// Returns a handle that must be freed with vumark_renderer_free
#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_create(
    session: *const VumarkSessionHandle,
) -> *mut VumarkRendererHandle {
    match session.as_ref() {
        Some(session) => Box::into_raw(Box::new(VumarkRendererHandle {
            renderer: session.controller.surface_renderer(),
        })),
        None => {
            set_last_error("Null session");
            ptr::null_mut()
        }
    }
}

/// Free a renderer handle
#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_free(handle: *mut VumarkRendererHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_on_surface_created(
    handle: *mut VumarkRendererHandle,
) -> c_int {
    match handle.as_mut() {
        Some(handle) => {
            handle.renderer.on_surface_created();
            VumarkErrorCode::Ok.into()
        }
        None => {
            set_last_error("Null handle");
            VumarkErrorCode::InvalidArgument.into()
        }
    }
}

/// Returns `VideoTexture` when the video texture could not be created; the
/// surface change itself still took effect.
#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_on_surface_changed(
    handle: *mut VumarkRendererHandle,
    width: u32,
    height: u32,
) -> c_int {
    let Some(handle) = handle.as_mut() else {
        set_last_error("Null handle");
        return VumarkErrorCode::InvalidArgument.into();
    };

    match handle.renderer.on_surface_changed(width, height) {
        Ok(()) => VumarkErrorCode::Ok.into(),
        Err(e) => report(&e),
    }
}

/// Returns whether a frame was rendered.
#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_on_draw_frame(handle: *mut VumarkRendererHandle) -> bool {
    match handle.as_mut() {
        Some(handle) => handle.renderer.on_draw_frame(),
        None => false,
    }
}

#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_on_surface_destroyed(
    handle: *mut VumarkRendererHandle,
) -> c_int {
    match handle.as_mut() {
        Some(handle) => {
            handle.renderer.on_surface_destroyed();
            VumarkErrorCode::Ok.into()
        }
        None => {
            set_last_error("Null handle");
            VumarkErrorCode::InvalidArgument.into()
        }
    }
}

/// Number of frames the engine reported as rendered
#[no_mangle]
pub unsafe extern "C" fn vumark_renderer_frames_rendered(
    handle: *const VumarkRendererHandle,
) -> u64 {
    match handle.as_ref() {
        Some(handle) => handle.renderer.stats().frames_rendered,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::*;
    use crate::testing::Recorder;

    #[test]
    fn test_renderer_requires_session() {
        let renderer = unsafe { vumark_renderer_create(ptr::null()) };
        assert!(renderer.is_null());
        assert!(!unsafe { vumark_renderer_on_draw_frame(ptr::null_mut()) });
    }

    #[test]
    fn test_video_texture_failure_reported() {
        let recorder = Recorder::new();
        recorder.set_video_texture(-1);
        let session = unsafe {
            vumark_session_create(
                recorder.engine(),
                recorder.video(),
                recorder.host(),
                ptr::null(),
            )
        };
        let renderer = unsafe { vumark_renderer_create(session) };

        unsafe { vumark_renderer_on_surface_created(renderer) };
        let code = unsafe { vumark_renderer_on_surface_changed(renderer, 800, 600) };
        assert_eq!(code, VumarkErrorCode::VideoTexture as c_int);
        assert!(recorder
            .calls()
            .contains(&"on_surface_changed:800x600".to_string()));

        // Not tracking yet
        assert!(!unsafe { vumark_renderer_on_draw_frame(renderer) });
        assert_eq!(unsafe { vumark_renderer_frames_rendered(renderer) }, 0);

        unsafe {
            vumark_renderer_free(renderer);
            vumark_session_free(session);
        }
    }
}
