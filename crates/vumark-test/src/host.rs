//! Recording host UI

use std::sync::Arc;

use parking_lot::Mutex;

use vumark_core::HostUi;

/// One command sent to the host screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    KeepScreenOn,
    ShowSurface,
    HideSurface,
    HideLoadingIndicator,
    ShowError(String),
    ShowNotice(String),
    RequestCameraPermission,
    Finish,
}

/// Host that records commands. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn contains(&self, call: &HostCall) -> bool {
        self.count(call) > 0
    }

    pub fn finished(&self) -> bool {
        self.contains(&HostCall::Finish)
    }

    /// Messages of all `ShowError` commands.
    pub fn errors(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                HostCall::ShowError(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                HostCall::ShowNotice(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl HostUi for RecordingHost {
    fn keep_screen_on(&mut self) {
        self.record(HostCall::KeepScreenOn);
    }

    fn show_surface(&mut self) {
        self.record(HostCall::ShowSurface);
    }

    fn hide_surface(&mut self) {
        self.record(HostCall::HideSurface);
    }

    fn hide_loading_indicator(&mut self) {
        self.record(HostCall::HideLoadingIndicator);
    }

    fn show_error(&mut self, message: &str) {
        self.record(HostCall::ShowError(message.to_string()));
    }

    fn show_notice(&mut self, message: &str) {
        self.record(HostCall::ShowNotice(message.to_string()));
    }

    fn request_camera_permission(&mut self) {
        self.record(HostCall::RequestCameraPermission);
    }

    fn finish(&mut self) {
        self.record(HostCall::Finish);
    }
}
