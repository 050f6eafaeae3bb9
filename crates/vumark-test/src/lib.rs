//! VuMark Test Harness - Recording fakes for the session collaborators
//!
//! This crate provides:
//! - `FakeEngine`: scripted AR engine that records every boundary call
//! - `FakeVideoPlayer`: video player that tracks binding and latching
//! - `RecordingHost`: host UI that records every command it receives
//!
//! Each fake is cheap to clone-share through `Arc` so a test can keep a
//! handle while the session owns another.

pub mod engine;
pub mod host;
pub mod video;

pub use engine::*;
pub use host::*;
pub use video::*;
