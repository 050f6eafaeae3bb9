//! VuMark Runtime - Session orchestration
//!
//! The session is split across the three execution contexts of the host:
//!
//! ```text
//!   UI thread                 rendering thread            background worker
//!   ─────────                 ────────────────            ─────────────────
//!   SessionController         SurfaceRenderer             init_ar (blocking)
//!     │  lifecycle,             │  created/changed/draw     │
//!     │  permissions,           │                           │
//!     │  gestures               │                           │
//!     ▼                         ▼                           ▼
//!   SessionHandle ◄──────── shared state ─────────►   UiMessage channel
//!     ▲                                                     │
//!     └──────────────── SessionController::pump() ◄─────────┘
//! ```
//!
//! The controller is the only writer of the session state. The renderer only
//! reads it and posts messages; it never touches host UI directly.

pub mod controller;
pub mod focus;
pub mod handle;
pub mod message;
pub mod renderer;
pub mod worker;

pub use controller::*;
pub use focus::*;
pub use handle::*;
pub use message::*;
pub use renderer::*;
pub use worker::*;
