//! Android binding
//!
//! [`NativeEngine`] drives the vendor engine library, [`ActivityHost`] and
//! [`ActivityVideoPlayer`] call back into the activity, and the `bridge`
//! exports are what the Kotlin side declares as `external fun`.

mod activity;
mod bridge;
mod engine;

pub use activity::*;
pub use bridge::*;
pub use engine::*;
