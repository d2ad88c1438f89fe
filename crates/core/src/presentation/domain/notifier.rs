/// Alerts the user that the session has entered privacy.
///
/// Best-effort: implementations swallow their own failures.
pub trait Notifier: Send {
    fn privacy_engaged(&mut self, face_count: usize);
}

/// Notifier that does nothing.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn privacy_engaged(&mut self, _face_count: usize) {}
}
