//! Messages posted to the UI thread
//!
//! The rendering thread and the background worker never mutate UI state
//! themselves; they post a [`UiMessage`] and the controller applies it when
//! the host pumps the queue on the UI thread. Sending never blocks.

use tokio::sync::mpsc;

use vumark_core::{ArResult, VideoTextureHandle};

#[derive(Debug)]
pub enum UiMessage {
    /// Engine initialization finished on the background worker
    InitFinished(ArResult<()>),
    /// A new video texture was created on the rendering thread and must be
    /// bound to the video player
    AttachVideoTexture(VideoTextureHandle),
    /// The engine produced its first frame; dismiss the loading indicator
    FirstFrameRendered,
}

/// Sending half, cloned into every producer.
pub type UiSender = mpsc::UnboundedSender<UiMessage>;

/// Receiving half, owned by the controller.
pub type UiReceiver = mpsc::UnboundedReceiver<UiMessage>;

pub fn ui_channel() -> (UiSender, UiReceiver) {
    mpsc::unbounded_channel()
}

/// Post a message, logging instead of failing when the UI side is gone.
pub(crate) fn post(tx: &UiSender, message: UiMessage) {
    if let Err(e) = tx.send(message) {
        tracing::debug!("UI queue closed, dropping {:?}", e.0);
    }
}
