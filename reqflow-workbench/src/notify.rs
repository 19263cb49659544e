/// Record-change broadcast seam.
///
/// Fired after every successful approval so other viewers of the same
/// record can refresh. The transport is the caller's concern.
pub trait ChangeNotifier: Send + Sync {
    fn record_changed(&self, record_id: &str);
}

/// Notifier that drops every event. Used by headless tooling.
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn record_changed(&self, _record_id: &str) {}
}
