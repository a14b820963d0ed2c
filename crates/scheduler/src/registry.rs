use std::sync::Arc;

use action_primitives::FramePort;
use dashmap::DashMap;
use page_stability::StabilityHost;
use soulbrowser_core_types::FrameId;

/// Both faces of one live frame.
#[derive(Clone)]
pub struct FrameBinding {
    pub frame: Arc<dyn FramePort>,
    pub signals: Arc<dyn StabilityHost>,
}

impl FrameBinding {
    pub fn new(frame: Arc<dyn FramePort>, signals: Arc<dyn StabilityHost>) -> Self {
        Self { frame, signals }
    }

    /// Frame able to take synthetic input.
    pub fn is_usable(&self) -> bool {
        self.frame.is_attached() && self.frame.is_local_root() && self.frame.has_render_surface()
    }
}

/// Resolves frame ids to live frames; `None` once a frame is gone.
pub trait FrameRegistry: Send + Sync {
    fn resolve(&self, frame: &FrameId) -> Option<FrameBinding>;
}

impl<R> FrameRegistry for Arc<R>
where
    R: FrameRegistry + ?Sized,
{
    fn resolve(&self, frame: &FrameId) -> Option<FrameBinding> {
        (**self).resolve(frame)
    }
}

/// Registry owning its frames; removing an entry destroys the frame unless
/// someone else still holds it.
#[derive(Default)]
pub struct InMemoryFrameRegistry {
    frames: DashMap<FrameId, FrameBinding>,
}

impl InMemoryFrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, binding: FrameBinding) -> FrameId {
        let id = binding.frame.frame_id();
        self.frames.insert(id.clone(), binding);
        id
    }

    pub fn remove(&self, frame: &FrameId) -> bool {
        self.frames.remove(frame).is_some()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameRegistry for InMemoryFrameRegistry {
    fn resolve(&self, frame: &FrameId) -> Option<FrameBinding> {
        self.frames.get(frame).map(|entry| entry.value().clone())
    }
}
