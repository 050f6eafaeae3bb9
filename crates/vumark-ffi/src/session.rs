#![allow(clippy::missing_safety_doc)]
//! FFI Session functions
//!
//! A session handle wraps a [`SessionController`] and must be driven from
//! the host's UI thread.

use std::ffi::{c_char, c_int, CStr};
use std::ptr;
use std::sync::Arc;

use vumark_core::{ArEngine, ArResult, HostUi, Orientation, Rotation, SessionConfig, VideoPlayer};
use vumark_runtime::{BackgroundWorker, Gesture, SessionController};

use crate::error::*;
use crate::types::*;

/// Opaque handle to an AR session
pub struct VumarkSessionHandle {
    pub(crate) controller: SessionController,
}

// Session handles are Send but not Sync (must be accessed from one thread at a time)
unsafe impl Send for VumarkSessionHandle {}

/// Gesture codes accepted by `vumark_session_on_gesture`
pub const VUMARK_GESTURE_SINGLE_TAP: c_int = 0;
pub const VUMARK_GESTURE_DOUBLE_TAP: c_int = 1;

unsafe fn parse_config(config_json: *const c_char) -> ArResult<SessionConfig> {
    if config_json.is_null() {
        return Ok(SessionConfig::load_or_default());
    }
    parse_config_str(&CStr::from_ptr(config_json).to_string_lossy())
}

pub(crate) fn parse_config_str(text: &str) -> ArResult<SessionConfig> {
    let config: SessionConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Box a controller over the given collaborators. Returns NULL and sets the
/// last error if the background worker cannot start.
pub(crate) fn new_session(
    engine: Arc<dyn ArEngine>,
    video: Arc<dyn VideoPlayer>,
    host: Box<dyn HostUi>,
    config: SessionConfig,
) -> *mut VumarkSessionHandle {
    let worker = match BackgroundWorker::new() {
        Ok(worker) => worker,
        Err(e) => {
            report(&e);
            return ptr::null_mut();
        }
    };

    let controller = SessionController::new(engine, video, host, config, worker);
    Box::into_raw(Box::new(VumarkSessionHandle { controller }))
}

/// Create a new session
///
/// `config_json` may be NULL to use the config file from the platform config
/// directory, or defaults. Returns a handle that must be freed with
/// `vumark_session_free`, or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn vumark_session_create(
    engine: VumarkEngineCallbacks,
    video: VumarkVideoCallbacks,
    host: VumarkHostCallbacks,
    config_json: *const c_char,
) -> *mut VumarkSessionHandle {
    let config = match parse_config(config_json) {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ptr::null_mut();
        }
    };

    new_session(
        Arc::new(CallbackEngine::new(engine)),
        Arc::new(CallbackVideoPlayer::new(video)),
        Box::new(CallbackHost::new(host)),
        config,
    )
}

/// Free a session handle
#[no_mangle]
pub unsafe extern "C" fn vumark_session_free(handle: *mut VumarkSessionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

unsafe fn with_session(
    handle: *mut VumarkSessionHandle,
    f: impl FnOnce(&mut SessionController),
) -> c_int {
    match handle.as_mut() {
        Some(handle) => {
            f(&mut handle.controller);
            VumarkErrorCode::Ok.into()
        }
        None => {
            set_last_error("Null handle");
            VumarkErrorCode::InvalidArgument.into()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_create(
    handle: *mut VumarkSessionHandle,
    permission_granted: bool,
) -> c_int {
    with_session(handle, |c| c.on_create(permission_granted))
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_resume(
    handle: *mut VumarkSessionHandle,
    permission_granted: bool,
) -> c_int {
    with_session(handle, |c| c.on_resume(permission_granted))
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_pause(handle: *mut VumarkSessionHandle) -> c_int {
    with_session(handle, |c| c.on_pause())
}

/// Deliver a permission result. `results` holds one flag per requested
/// permission and may be NULL when `len` is 0 (request cancelled).
#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_permission_result(
    handle: *mut VumarkSessionHandle,
    results: *const bool,
    len: usize,
) -> c_int {
    if results.is_null() && len != 0 {
        set_last_error("Null results");
        return VumarkErrorCode::InvalidArgument.into();
    }
    let results: &[bool] = if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(results, len)
    };
    with_session(handle, |c| c.on_permission_result(results))
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_permission_revoked(
    handle: *mut VumarkSessionHandle,
) -> c_int {
    with_session(handle, |c| c.on_permission_revoked())
}

/// Apply queued messages from the rendering thread and the worker.
/// Returns the number handled, or a negative error code.
#[no_mangle]
pub unsafe extern "C" fn vumark_session_pump(handle: *mut VumarkSessionHandle) -> c_int {
    match handle.as_mut() {
        Some(handle) => c_int::try_from(handle.controller.pump()).unwrap_or(c_int::MAX),
        None => {
            set_last_error("Null handle");
            VumarkErrorCode::InvalidArgument.into()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_acknowledge_error(
    handle: *mut VumarkSessionHandle,
) -> c_int {
    with_session(handle, |c| c.acknowledge_error())
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_back_pressed(
    handle: *mut VumarkSessionHandle,
) -> c_int {
    with_session(handle, |c| c.on_back_pressed())
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_destroy(handle: *mut VumarkSessionHandle) -> c_int {
    with_session(handle, |c| c.on_destroy())
}

/// Returns whether the gesture was consumed.
#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_gesture(
    handle: *mut VumarkSessionHandle,
    gesture: c_int,
) -> bool {
    let gesture = match gesture {
        VUMARK_GESTURE_SINGLE_TAP => Gesture::SingleTap,
        VUMARK_GESTURE_DOUBLE_TAP => Gesture::DoubleTap,
        _ => {
            set_last_error("Unknown gesture");
            return false;
        }
    };
    match handle.as_mut() {
        Some(handle) => handle.controller.on_gesture(gesture),
        None => false,
    }
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_display_changed(
    handle: *mut VumarkSessionHandle,
    orientation: c_int,
    rotation: c_int,
) -> c_int {
    with_session(handle, |c| {
        c.on_display_changed(Orientation::from_raw(orientation), Rotation::from_raw(rotation))
    })
}

#[no_mangle]
pub unsafe extern "C" fn vumark_session_on_video_size_changed(
    handle: *mut VumarkSessionHandle,
    width: u32,
    height: u32,
) -> c_int {
    with_session(handle, |c| c.on_video_size_changed(width, height))
}

/// Get the session state
#[no_mangle]
pub unsafe extern "C" fn vumark_session_state(
    handle: *const VumarkSessionHandle,
) -> VumarkSessionState {
    match handle.as_ref() {
        Some(handle) => handle.controller.state().into(),
        None => VumarkSessionState::Uninitialized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use std::ffi::CString;

    #[test]
    fn test_session_create_free() {
        let recorder = Recorder::new();
        let session = unsafe {
            vumark_session_create(
                recorder.engine(),
                recorder.video(),
                recorder.host(),
                ptr::null(),
            )
        };
        assert!(!session.is_null());

        let state = unsafe { vumark_session_state(session) };
        assert_eq!(state, VumarkSessionState::Uninitialized);

        unsafe { vumark_session_free(session) };
    }

    #[test]
    fn test_invalid_config_rejected() {
        let recorder = Recorder::new();
        let json = CString::new(r#"{"autofocus_restore_ms": 0}"#).unwrap();
        let session = unsafe {
            vumark_session_create(
                recorder.engine(),
                recorder.video(),
                recorder.host(),
                json.as_ptr(),
            )
        };

        assert!(session.is_null());
        assert!(!vumark_get_last_error().is_null());
        vumark_clear_error();
    }

    #[test]
    fn test_parse_config_str() {
        let config = parse_config_str(r#"{"target": "model", "video_looping": false}"#).unwrap();
        assert_eq!(config.target, vumark_core::TargetKind::Model);
        assert!(!config.video_looping);

        assert!(parse_config_str("not json").is_err());
        assert!(parse_config_str(r#"{"reference_texture": ""}"#).is_err());
    }

    #[test]
    fn test_null_handle_is_invalid_argument() {
        let code = unsafe { vumark_session_on_pause(ptr::null_mut()) };
        assert_eq!(code, VumarkErrorCode::InvalidArgument as c_int);
        assert_eq!(
            unsafe { vumark_session_state(ptr::null()) },
            VumarkSessionState::Uninitialized
        );
    }

    #[test]
    fn test_lifecycle_through_callbacks() {
        let recorder = Recorder::new();
        let json = CString::new(r#"{"target": "model", "keep_screen_on": false}"#).unwrap();
        let session = unsafe {
            vumark_session_create(
                recorder.engine(),
                recorder.video(),
                recorder.host(),
                json.as_ptr(),
            )
        };
        assert!(!session.is_null());

        unsafe {
            vumark_session_on_create(session, true);
            vumark_session_on_resume(session, true);
        }

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while unsafe { vumark_session_state(session) } != VumarkSessionState::Tracking
            && std::time::Instant::now() < deadline
        {
            unsafe { vumark_session_pump(session) };
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(
            unsafe { vumark_session_state(session) },
            VumarkSessionState::Tracking
        );

        unsafe {
            vumark_session_on_back_pressed(session);
            vumark_session_free(session);
        }

        let calls = recorder.calls();
        assert!(calls.contains(&"init_ar:1".to_string()));
        assert!(calls.contains(&"prepare:raw/vuforiasizzlereel.mp4".to_string()));
        assert!(!calls.contains(&"keep_screen_on".to_string()));
        assert!(calls.contains(&"show_surface".to_string()));
        assert!(calls.contains(&"finish".to_string()));
    }

    #[test]
    fn test_cancelled_permission_with_null_results() {
        let recorder = Recorder::new();
        let session = unsafe {
            vumark_session_create(
                recorder.engine(),
                recorder.video(),
                recorder.host(),
                ptr::null(),
            )
        };

        let code = unsafe { vumark_session_on_permission_result(session, ptr::null(), 0) };
        assert_eq!(code, 0);
        assert!(recorder.calls().contains(&"finish".to_string()));

        let code = unsafe { vumark_session_on_permission_result(session, ptr::null(), 1) };
        assert_eq!(code, VumarkErrorCode::InvalidArgument as c_int);

        unsafe { vumark_session_free(session) };
    }
}
