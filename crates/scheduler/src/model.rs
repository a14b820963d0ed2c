use std::fmt;
use std::sync::Arc;

use action_primitives::{Action, ToolTimings};
use page_stability::StabilityConfig;
use serde::{Deserialize, Serialize};
use soulbrowser_core_types::{ActionId, FrameId, Journal};

/// One inbound action addressed to a frame.
#[derive(Clone)]
pub struct ActionRequest {
    pub action_id: ActionId,
    pub frame: FrameId,
    pub action: Action,
    pub journal: Arc<dyn Journal>,
}

impl ActionRequest {
    pub fn new(frame: FrameId, action: Action, journal: Arc<dyn Journal>) -> Self {
        Self {
            action_id: ActionId::new(),
            frame,
            action,
            journal,
        }
    }
}

impl fmt::Debug for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRequest")
            .field("action_id", &self.action_id)
            .field("frame", &self.frame)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub stability: StabilityConfig,
    pub tools: ToolTimings,
}
