//! Engine adapter for the vendor library
//!
//! The engine ships as `libvuforiavumarksample.so` exporting JNI entry
//! points on `com.aaa.vuforiavumarksample.JniKt`. [`NativeEngine`] calls
//! those exports directly with an attached `JNIEnv`.
//!
//! The library reports init failure by calling `presentError(String)` on
//! the activity passed to `initAR`. The activity forwards it to
//! `nativePresentError`, which records it for the pending `init_ar` call.

use jni::objects::{GlobalRef, JObject, JString};
use jni::sys::{jboolean, jclass, jint, jobject, JNIEnv as RawEnv, JNI_FALSE};
use jni::{JNIEnv, JavaVM};
use parking_lot::Mutex;

use vumark_core::{ArEngine, ArError, ArResult, DisplayGeometry, TargetKind};

const BRIDGE_CLASS: &str = "com/aaa/vuforiavumarksample/JniKt";

static INIT_ERROR: Mutex<Option<String>> = Mutex::new(None);

#[allow(non_snake_case)]
#[link(name = "vuforiavumarksample")]
extern "C" {
    fn Java_com_aaa_vuforiavumarksample_JniKt_initRendering(env: *mut RawEnv, class: jclass);
    fn Java_com_aaa_vuforiavumarksample_JniKt_deinitRendering(env: *mut RawEnv, class: jclass);
    fn Java_com_aaa_vuforiavumarksample_JniKt_setTextures(
        env: *mut RawEnv,
        class: jclass,
        width: jint,
        height: jint,
        bytes: jobject,
    );
    fn Java_com_aaa_vuforiavumarksample_JniKt_configureRendering(
        env: *mut RawEnv,
        class: jclass,
        width: jint,
        height: jint,
        orientation: jint,
        rotation: jint,
    ) -> jboolean;
    fn Java_com_aaa_vuforiavumarksample_JniKt_renderFrame(env: *mut RawEnv, class: jclass)
        -> jboolean;
    fn Java_com_aaa_vuforiavumarksample_JniKt_initAR(
        env: *mut RawEnv,
        class: jclass,
        activity: jobject,
        asset_manager: jobject,
        target: jint,
    );
    fn Java_com_aaa_vuforiavumarksample_JniKt_deinitAR(env: *mut RawEnv, class: jclass);
    fn Java_com_aaa_vuforiavumarksample_JniKt_startAR(env: *mut RawEnv, class: jclass) -> jboolean;
    fn Java_com_aaa_vuforiavumarksample_JniKt_stopAR(env: *mut RawEnv, class: jclass);
    fn Java_com_aaa_vuforiavumarksample_JniKt_cameraPerformAutoFocus(
        env: *mut RawEnv,
        class: jclass,
    );
    fn Java_com_aaa_vuforiavumarksample_JniKt_cameraRestoreAutoFocus(
        env: *mut RawEnv,
        class: jclass,
    );
    fn Java_com_aaa_vuforiavumarksample_JniKt_initVideoTexture(
        env: *mut RawEnv,
        class: jclass,
    ) -> jint;
    fn Java_com_aaa_vuforiavumarksample_JniKt_nativeOnSurfaceChanged(
        env: *mut RawEnv,
        class: jclass,
        width: jint,
        height: jint,
    );
    fn Java_com_aaa_vuforiavumarksample_JniKt_nativeSetVideoSize(
        env: *mut RawEnv,
        class: jclass,
        width: jint,
        height: jint,
    );
}

/// [`ArEngine`] bound to the vendor library.
pub struct NativeEngine {
    vm: JavaVM,
    class: GlobalRef,
    activity: GlobalRef,
    asset_manager: GlobalRef,
}

pub(crate) fn jni_error(e: jni::errors::Error) -> ArError {
    ArError::InitFailed(format!("JNI: {}", e))
}

fn to_jint(value: u32) -> jint {
    jint::try_from(value).unwrap_or(jint::MAX)
}

impl NativeEngine {
    pub fn new(env: &mut JNIEnv, activity: &JObject, asset_manager: &JObject) -> ArResult<Self> {
        let vm = env.get_java_vm().map_err(jni_error)?;
        let class = env.find_class(BRIDGE_CLASS).map_err(jni_error)?;
        let class = env.new_global_ref(class).map_err(jni_error)?;
        let activity = env.new_global_ref(activity).map_err(jni_error)?;
        let asset_manager = env.new_global_ref(asset_manager).map_err(jni_error)?;

        Ok(NativeEngine {
            vm,
            class,
            activity,
            asset_manager,
        })
    }

    /// Run `f` with this thread's raw env, attaching it if needed.
    fn call<R>(&self, fallback: R, f: impl FnOnce(*mut RawEnv, jclass) -> R) -> R {
        match self.vm.attach_current_thread_permanently() {
            Ok(env) => f(env.get_raw(), self.class.as_obj().as_raw()),
            Err(e) => {
                tracing::error!("Failed to attach thread to the JVM: {}", e);
                fallback
            }
        }
    }
}

impl ArEngine for NativeEngine {
    fn init_rendering(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_initRendering(env, class)
        })
    }

    fn deinit_rendering(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_deinitRendering(env, class)
        })
    }

    fn set_textures(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut env = match self.vm.attach_current_thread_permanently() {
            Ok(env) => env,
            Err(e) => {
                tracing::error!("Failed to attach thread to the JVM: {}", e);
                return;
            }
        };
        // The engine only reads from the buffer.
        let buffer =
            match unsafe { env.new_direct_byte_buffer(pixels.as_ptr() as *mut u8, pixels.len()) } {
                Ok(buffer) => buffer,
                Err(e) => {
                    tracing::warn!("Failed to wrap texture pixels: {}", e);
                    return;
                }
            };

        unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_setTextures(
                env.get_raw(),
                self.class.as_obj().as_raw(),
                to_jint(width),
                to_jint(height),
                buffer.as_raw(),
            )
        }

        // The GL thread stays attached, so its local refs are never freed
        // for us.
        if let Err(e) = env.delete_local_ref(buffer) {
            tracing::warn!("Failed to release texture buffer ref: {}", e);
        }
    }

    fn configure_rendering(&self, geometry: &DisplayGeometry) -> bool {
        self.call(false, |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_configureRendering(
                env,
                class,
                to_jint(geometry.width),
                to_jint(geometry.height),
                geometry.orientation.as_raw(),
                geometry.rotation.as_raw(),
            ) != JNI_FALSE
        })
    }

    fn render_frame(&self) -> bool {
        self.call(false, |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_renderFrame(env, class) != JNI_FALSE
        })
    }

    fn init_ar(&self, target: TargetKind) -> ArResult<()> {
        INIT_ERROR.lock().take();

        let env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(jni_error)?;
        unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_initAR(
                env.get_raw(),
                self.class.as_obj().as_raw(),
                self.activity.as_obj().as_raw(),
                self.asset_manager.as_obj().as_raw(),
                target.id(),
            )
        }

        match INIT_ERROR.lock().take() {
            Some(message) => Err(ArError::InitFailed(message)),
            None => Ok(()),
        }
    }

    fn deinit_ar(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_deinitAR(env, class)
        })
    }

    fn start_ar(&self) -> bool {
        self.call(false, |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_startAR(env, class) != JNI_FALSE
        })
    }

    fn stop_ar(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_stopAR(env, class)
        })
    }

    fn camera_perform_auto_focus(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_cameraPerformAutoFocus(env, class)
        })
    }

    fn camera_restore_auto_focus(&self) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_cameraRestoreAutoFocus(env, class)
        })
    }

    fn init_video_texture(&self) -> i32 {
        self.call(-1, |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_initVideoTexture(env, class)
        })
    }

    fn on_surface_changed(&self, width: u32, height: u32) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_nativeOnSurfaceChanged(
                env,
                class,
                to_jint(width),
                to_jint(height),
            )
        })
    }

    fn set_video_size(&self, width: u32, height: u32) {
        self.call((), |env, class| unsafe {
            Java_com_aaa_vuforiavumarksample_JniKt_nativeSetVideoSize(
                env,
                class,
                to_jint(width),
                to_jint(height),
            )
        })
    }
}

/// Called by the activity's `presentError` during `initAR`.
#[no_mangle]
pub extern "system" fn Java_com_aaa_vuforiavumarksample_MainActivity_nativePresentError(
    mut env: JNIEnv,
    _activity: JObject,
    message: JString,
) {
    let message: String = match env.get_string(&message) {
        Ok(message) => message.into(),
        Err(e) => {
            tracing::warn!("Unreadable engine error message: {}", e);
            "Unknown engine error".to_string()
        }
    };
    tracing::error!("Engine reported: {}", message);
    *INIT_ERROR.lock() = Some(message);
}
