use soulbrowser_core_types::FrameId;

/// How an in-flight navigation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    Committed,
    Failed,
}

pub type NavigationCallback = Box<dyn FnOnce(NavigationOutcome) + Send + 'static>;
pub type SignalCallback = Box<dyn FnOnce() + Send + 'static>;

/// Outstanding network-idle registration; dropping it releases the slot.
pub struct NetworkIdleRegistration {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl NetworkIdleRegistration {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for NetworkIdleRegistration {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Signals the stability monitor consumes from its frame.
///
/// Callbacks may be invoked from any thread. A host that drops a callback
/// without invoking it is treated as having lost the frame when the host
/// itself is gone, and ignored otherwise.
pub trait StabilityHost: Send + Sync {
    fn frame_id(&self) -> FrameId;

    /// Network requests currently in flight for the document.
    fn active_request_count(&self) -> usize;

    fn is_navigation_in_flight(&self) -> bool;

    /// Invoked once the in-flight navigation commits or fails within this
    /// frame. A navigation that swaps the frame out never calls back.
    fn on_navigation_settled(&self, callback: NavigationCallback);

    /// Single-slot registration fired when the network goes idle. Returns
    /// `None` when the network is already idle.
    fn register_network_idle(&self, callback: SignalCallback) -> Option<NetworkIdleRegistration>;

    /// Runs `callback` once the frame's main thread is idle.
    fn post_idle_task(&self, callback: SignalCallback);

    /// Runs `callback` once a new frame has been presented. Returns `false`
    /// when the frame has no compositor; the callback is then dropped.
    fn request_presentation(&self, callback: SignalCallback) -> bool;
}
