//! VuMark Core - Session types and the engine boundary
//!
//! This crate defines the types shared by every layer of the sample:
//! - Session lifecycle states and their legal transitions
//! - Display geometry (surface size, orientation, rotation)
//! - The collaborator traits: AR engine, video player, host UI
//! - Session configuration and reference texture loading

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod session;
pub mod texture;
pub mod video;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use geometry::*;
pub use host::*;
pub use session::*;
pub use texture::*;
pub use video::*;
