//! Host UI commands
//!
//! The session decides what the user sees; the host platform decides how.
//! All methods are invoked on the UI-owning thread only.

/// User-visible side of the host screen.
pub trait HostUi {
    /// Keep the display awake while the screen is shown.
    fn keep_screen_on(&mut self);

    fn show_surface(&mut self);

    fn hide_surface(&mut self);

    fn hide_loading_indicator(&mut self);

    /// Dismissible error. The host reports acknowledgement back to the
    /// session controller.
    fn show_error(&mut self, message: &str);

    /// Short transient notice.
    fn show_notice(&mut self, message: &str);

    fn request_camera_permission(&mut self);

    /// Close the AR screen.
    fn finish(&mut self);
}
