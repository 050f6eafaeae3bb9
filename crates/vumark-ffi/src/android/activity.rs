//! Host screen and video player backed by the activity
//!
//! The activity exposes plain instance methods that the session calls back
//! into. UI methods are expected to hop to the main looper themselves;
//! `latchVideoFrame` is called on the GL thread.

use std::sync::Arc;

use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};

use vumark_core::{ArResult, HostUi, PlaybackOptions, VideoPlayer, VideoTextureHandle};

use super::engine::jni_error;

/// Local refs made by one activity call, released when it returns.
const LOCAL_FRAME_CAPACITY: i32 = 4;

/// Global reference to the activity plus the VM to reach it from any
/// thread.
pub struct Activity {
    vm: JavaVM,
    activity: GlobalRef,
}

impl Activity {
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> ArResult<Arc<Self>> {
        let vm = env.get_java_vm().map_err(jni_error)?;
        let activity = env.new_global_ref(activity).map_err(jni_error)?;
        Ok(Arc::new(Activity { vm, activity }))
    }

    fn call<R>(
        &self,
        method: &str,
        fallback: R,
        f: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<R>,
    ) -> R {
        let mut env = match self.vm.attach_current_thread_permanently() {
            Ok(env) => env,
            Err(e) => {
                tracing::error!("Failed to attach thread to the JVM: {}", e);
                return fallback;
            }
        };

        let activity = self.activity.as_obj();
        match env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env, activity)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Activity.{} failed: {}", method, e);
                fallback
            }
        }
    }

    fn call_void(&self, method: &str) {
        self.call(method, (), |env, activity| {
            env.call_method(activity, method, "()V", &[])?.v()
        })
    }

    fn call_with_message(&self, method: &str, message: &str) {
        self.call(method, (), |env, activity| {
            let message = env.new_string(message)?;
            env.call_method(
                activity,
                method,
                "(Ljava/lang/String;)V",
                &[JValue::Object(&message)],
            )?
            .v()
        })
    }
}

/// [`HostUi`] forwarding to the activity.
pub struct ActivityHost {
    activity: Arc<Activity>,
}

impl ActivityHost {
    pub fn new(activity: Arc<Activity>) -> Self {
        ActivityHost { activity }
    }
}

impl HostUi for ActivityHost {
    fn keep_screen_on(&mut self) {
        self.activity.call_void("keepScreenOn");
    }

    fn show_surface(&mut self) {
        self.activity.call_void("showSurface");
    }

    fn hide_surface(&mut self) {
        self.activity.call_void("hideSurface");
    }

    fn hide_loading_indicator(&mut self) {
        self.activity.call_void("hideLoadingIndicator");
    }

    fn show_error(&mut self, message: &str) {
        self.activity.call_with_message("showError", message);
    }

    fn show_notice(&mut self, message: &str) {
        self.activity.call_with_message("showNotice", message);
    }

    fn request_camera_permission(&mut self) {
        self.activity.call_void("requestCameraPermission");
    }

    fn finish(&mut self) {
        self.activity.call_void("finish");
    }
}

/// [`VideoPlayer`] forwarding to the activity's media player.
pub struct ActivityVideoPlayer {
    activity: Arc<Activity>,
}

impl ActivityVideoPlayer {
    pub fn new(activity: Arc<Activity>) -> Self {
        ActivityVideoPlayer { activity }
    }
}

impl VideoPlayer for ActivityVideoPlayer {
    fn prepare(&self, options: &PlaybackOptions) {
        self.activity.call("prepareVideo", (), |env, activity| {
            let asset = env.new_string(&options.asset)?;
            env.call_method(
                activity,
                "prepareVideo",
                "(Ljava/lang/String;ZZ)V",
                &[
                    JValue::Object(&asset),
                    JValue::Bool(options.looping.into()),
                    JValue::Bool(options.play_when_ready.into()),
                ],
            )?
            .v()
        })
    }

    fn attach_texture(&self, texture: VideoTextureHandle) {
        self.activity.call("attachVideoTexture", (), |env, activity| {
            env.call_method(
                activity,
                "attachVideoTexture",
                "(I)V",
                &[JValue::Int(texture.raw())],
            )?
            .v()
        })
    }

    fn latch_frame(&self) -> bool {
        self.activity.call("latchVideoFrame", false, |env, activity| {
            env.call_method(activity, "latchVideoFrame", "()Z", &[])?.z()
        })
    }

    fn release(&self) {
        self.activity.call_void("releaseVideo");
    }
}
