//! Session lifecycle states
//!
//! The session is a small state machine driven by host lifecycle events:
//!
//! ```text
//!   Uninitialized ──► Initializing ──► Ready ◄──► Tracking
//!         ▲                │             │           │
//!         └────────────────┘             ▼           ▼
//!         └───────────────────────── Stopping ◄──────┘
//! ```
//!
//! `Stopping` is transient: it is held only while the engine stop (and, on
//! teardown, deinit) calls are in flight.

use std::fmt;

/// Lifecycle state of the AR session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SessionState {
    /// Engine not initialized (initial state, and the state after teardown)
    #[default]
    Uninitialized = 0,
    /// Engine initialization running on the background worker
    Initializing = 1,
    /// Engine initialized, not tracking
    Ready = 2,
    /// Engine started; frames may be rendered
    Tracking = 3,
    /// Engine stop in flight
    Stopping = 4,
}

impl SessionState {
    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(self, to: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, to),
            (Uninitialized, Initializing)
                | (Initializing, Ready)
                | (Initializing, Uninitialized)
                | (Ready, Tracking)
                | (Uninitialized, Stopping)
                | (Initializing, Stopping)
                | (Ready, Stopping)
                | (Tracking, Stopping)
                | (Stopping, Ready)
                | (Stopping, Uninitialized)
        )
    }

    /// Engine initialization has completed and not been torn down.
    pub fn is_initialized(self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Tracking)
    }

    /// Frames may be rendered.
    pub fn is_tracking(self) -> bool {
        self == SessionState::Tracking
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(SessionState::Uninitialized),
            1 => Some(SessionState::Initializing),
            2 => Some(SessionState::Ready),
            3 => Some(SessionState::Tracking),
            4 => Some(SessionState::Stopping),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Tracking => "tracking",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Camera permission as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not yet known
    #[default]
    Unknown,
    /// A request is in flight; no result yet
    Requested,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }
}
