//! JNI entry points
//!
//! `MainActivity` owns the session and drives it from the main thread.
//! `VuMarkRenderer` (the `GLSurfaceView.Renderer`) owns the renderer handle.
//! Handles cross into Kotlin as `Long` and are freed by the matching
//! `nativeFree*` call.

use std::ffi::c_int;
use std::sync::Arc;

use jni::objects::{JBooleanArray, JObject, JString};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use vumark_core::{ArResult, SessionConfig};

use super::activity::{Activity, ActivityHost, ActivityVideoPlayer};
use super::engine::{jni_error, NativeEngine};
use crate::error::report;
use crate::renderer::*;
use crate::session::*;

fn session(handle: jlong) -> *mut VumarkSessionHandle {
    handle as *mut VumarkSessionHandle
}

fn renderer(handle: jlong) -> *mut VumarkRendererHandle {
    handle as *mut VumarkRendererHandle
}

fn checked(call: &str, code: c_int) {
    if code != 0 {
        tracing::warn!("{} returned {}", call, code);
    }
}

fn read_config(env: &mut JNIEnv, config_json: &JString) -> ArResult<SessionConfig> {
    if config_json.is_null() {
        return Ok(SessionConfig::load_or_default());
    }
    let text: String = env.get_string(config_json).map_err(jni_error)?.into();
    parse_config_str(&text)
}

fn create_session(
    env: &mut JNIEnv,
    activity: &JObject,
    asset_manager: &JObject,
    config_json: &JString,
) -> ArResult<jlong> {
    let config = read_config(env, config_json)?;
    let engine = NativeEngine::new(env, activity, asset_manager)?;
    let activity = Activity::new(env, activity)?;

    let handle = new_session(
        Arc::new(engine),
        Arc::new(ActivityVideoPlayer::new(Arc::clone(&activity))),
        Box::new(ActivityHost::new(activity)),
        config,
    );
    Ok(handle as jlong)
}

/// Returns 0 on failure; `vumark_get_last_error` has the reason.
#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeCreateSession(
    mut env: JNIEnv,
    activity: JObject,
    asset_manager: JObject,
    config_json: JString,
) -> jlong {
    match create_session(&mut env, &activity, &asset_manager, &config_json) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            report(&e);
            0
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeFreeSession(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    unsafe { vumark_session_free(session(handle)) }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnCreate(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    permission_granted: jboolean,
) {
    let code = unsafe { vumark_session_on_create(session(handle), permission_granted != JNI_FALSE) };
    checked("on_create", code);
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnResume(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    permission_granted: jboolean,
) {
    let code = unsafe { vumark_session_on_resume(session(handle), permission_granted != JNI_FALSE) };
    checked("on_resume", code);
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnPause(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("on_pause", unsafe { vumark_session_on_pause(session(handle)) });
}

/// `results` is null or empty when the request was cancelled.
#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnPermissionResult(
    env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    results: JBooleanArray,
) {
    let mut flags: Vec<jboolean> = Vec::new();
    if !results.is_null() {
        let len = env.get_array_length(&results).unwrap_or(0);
        flags.resize(usize::try_from(len).unwrap_or(0), JNI_FALSE);
        if let Err(e) = env.get_boolean_array_region(&results, 0, &mut flags) {
            tracing::warn!("Unreadable permission results: {}", e);
            flags.clear();
        }
    }

    let granted: Vec<bool> = flags.iter().map(|f| *f != JNI_FALSE).collect();
    let code = unsafe {
        vumark_session_on_permission_result(session(handle), granted.as_ptr(), granted.len())
    };
    checked("on_permission_result", code);
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnPermissionRevoked(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("on_permission_revoked", unsafe {
        vumark_session_on_permission_revoked(session(handle))
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativePump(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("pump", unsafe { vumark_session_pump(session(handle)) });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeAcknowledgeError(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("acknowledge_error", unsafe {
        vumark_session_acknowledge_error(session(handle))
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnBackPressed(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("on_back_pressed", unsafe {
        vumark_session_on_back_pressed(session(handle))
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnDestroy(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    checked("on_destroy", unsafe { vumark_session_on_destroy(session(handle)) });
}

/// Returns whether the gesture was consumed.
#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnGesture(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    gesture: jint,
) -> jboolean {
    if unsafe { vumark_session_on_gesture(session(handle), gesture) } {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnDisplayChanged(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    orientation: jint,
    rotation: jint,
) {
    checked("on_display_changed", unsafe {
        vumark_session_on_display_changed(session(handle), orientation, rotation)
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeOnVideoSizeChanged(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    width: jint,
    height: jint,
) {
    let width = u32::try_from(width).unwrap_or(0);
    let height = u32::try_from(height).unwrap_or(0);
    checked("on_video_size_changed", unsafe {
        vumark_session_on_video_size_changed(session(handle), width, height)
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativeState(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) -> jint {
    unsafe { vumark_session_state(session(handle)) as jint }
}

/// Returns 0 if the session handle is 0.
#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeCreateRenderer(
    _env: JNIEnv,
    _renderer: JObject,
    session_handle: jlong,
) -> jlong {
    unsafe { vumark_renderer_create(session(session_handle)) as jlong }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeFreeRenderer(
    _env: JNIEnv,
    _renderer: JObject,
    handle: jlong,
) {
    unsafe { vumark_renderer_free(renderer(handle)) }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeOnSurfaceCreated(
    _env: JNIEnv,
    _renderer: JObject,
    handle: jlong,
) {
    checked("on_surface_created", unsafe {
        vumark_renderer_on_surface_created(renderer(handle))
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeOnSurfaceChanged(
    _env: JNIEnv,
    _renderer: JObject,
    handle: jlong,
    width: jint,
    height: jint,
) {
    let width = u32::try_from(width).unwrap_or(0);
    let height = u32::try_from(height).unwrap_or(0);
    checked("on_surface_changed", unsafe {
        vumark_renderer_on_surface_changed(renderer(handle), width, height)
    });
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeOnDrawFrame(
    _env: JNIEnv,
    _renderer: JObject,
    handle: jlong,
) -> jboolean {
    if unsafe { vumark_renderer_on_draw_frame(renderer(handle)) } {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_VuMarkRenderer_nativeOnSurfaceDestroyed(
    _env: JNIEnv,
    _renderer: JObject,
    handle: jlong,
) {
    checked("on_surface_destroyed", unsafe {
        vumark_renderer_on_surface_destroyed(renderer(handle))
    });
}
