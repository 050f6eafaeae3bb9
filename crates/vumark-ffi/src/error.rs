//! FFI Error handling

use std::ffi::{c_char, c_int, CString};

use vumark_core::ArError;

/// Error codes for FFI functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VumarkErrorCode {
    Ok = 0,
    InvalidArgument = -1,
    /// Operation not legal in the current session state
    InvalidState = -2,
    PermissionDenied = -3,
    InitFailed = -4,
    StartFailed = -5,
    VideoTexture = -6,
    TextureLoad = -7,
    Config = -8,
    InternalError = -99,
}

impl From<VumarkErrorCode> for c_int {
    fn from(code: VumarkErrorCode) -> Self {
        code as c_int
    }
}

impl From<&ArError> for VumarkErrorCode {
    fn from(err: &ArError) -> Self {
        match err {
            ArError::InvalidTransition { .. } => Self::InvalidState,
            ArError::PermissionDenied | ArError::PermissionCancelled => Self::PermissionDenied,
            ArError::InitFailed(_) => Self::InitFailed,
            ArError::StartFailed => Self::StartFailed,
            ArError::VideoTexture(_) => Self::VideoTexture,
            ArError::TextureLoad { .. } | ArError::TextureSize { .. } => Self::TextureLoad,
            ArError::ConfigIo { .. } | ArError::ConfigParse(_) | ArError::InvalidConfig(_) => {
                Self::Config
            }
            ArError::Worker(_) => Self::InternalError,
        }
    }
}

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> =
        const { std::cell::RefCell::new(None) };
}

/// Set the last error message
pub fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Record `err` as the last error and return its code.
pub fn report(err: &ArError) -> c_int {
    set_last_error(&err.to_string());
    VumarkErrorCode::from(err).into()
}

/// Get the last error message
/// Returns NULL if no error
#[no_mangle]
pub extern "C" fn vumark_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(s) => s.as_ptr(),
        None => std::ptr::null(),
    })
}

/// Clear the last error
#[no_mangle]
pub extern "C" fn vumark_clear_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}
