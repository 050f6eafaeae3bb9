#![allow(clippy::missing_safety_doc)]
//! VuMark FFI - Foreign Function Interface
//!
//! C-compatible bindings for host shells (Android/iOS).
//! The host supplies the engine, video player and screen as callback tables,
//! drives the session handle from its UI thread and the renderer handle from
//! its GL thread.

#[cfg(target_os = "android")]
pub mod android;
pub mod error;
pub mod renderer;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

use std::ffi::{c_char, c_int};

use tracing_subscriber::EnvFilter;

#[cfg(target_os = "android")]
pub use android::*;
pub use error::*;
pub use renderer::*;
pub use session::*;
pub use types::*;

/// Library version
#[no_mangle]
pub extern "C" fn vumark_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
/// Safe to call more than once.
/// Returns 0 on success, negative on error
#[no_mangle]
pub extern "C" fn vumark_init() -> c_int {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Subscriber already installed");
    }
    VumarkErrorCode::Ok.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(vumark_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_init_is_repeatable() {
        assert_eq!(vumark_init(), 0);
        assert_eq!(vumark_init(), 0);
    }
}
