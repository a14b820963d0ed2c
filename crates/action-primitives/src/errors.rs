//! Result taxonomy for actor tools

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of outcomes a tool invocation can report.
///
/// Every validation failure happens before any side effect. Execution-time
/// codes (`TypeKeyDownSuppressed`, `SelectUnexpectedValue`,
/// `ScrollOffsetDidNotChange`, `MouseMoveEventSuppressed`) may follow a
/// partial effect on the document.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResultCode {
    #[error("ok")]
    Ok,
    /// Opaque failure without a more specific code
    #[error("error")]
    Error,
    #[error("not implemented")]
    NotImplemented,
    #[error("arguments invalid")]
    ArgumentsInvalid,
    #[error("frame went away")]
    FrameWentAway,

    // Target resolution
    #[error("invalid dom node id")]
    InvalidDomNodeId,
    #[error("target is not an element")]
    TargetNotElement,
    #[error("element disabled")]
    ElementDisabled,
    #[error("element offscreen")]
    ElementOffscreen,
    #[error("coordinates out of bounds")]
    CoordinatesOutOfBounds,

    // Mouse move
    #[error("mouse move event suppressed")]
    MouseMoveEventSuppressed,

    // Type
    #[error("type: unsupported characters")]
    TypeUnsupportedCharacters,
    #[error("type: failed mapping char to key")]
    TypeFailedMappingCharToKey,
    #[error("type: target not focusable")]
    TypeTargetNotFocusable,
    #[error("type: key down suppressed")]
    TypeKeyDownSuppressed,

    // Scroll
    #[error("scroll: target is not an element")]
    ScrollTargetNotElement,
    #[error("scroll: no scrolling element")]
    ScrollNoScrollingElement,
    #[error("scroll: target not user scrollable")]
    ScrollTargetNotUserScrollable,
    #[error("scroll: offset did not change")]
    ScrollOffsetDidNotChange,

    // Select
    #[error("select: invalid element")]
    SelectInvalidElement,
    #[error("select: no such option")]
    SelectNoSuchOption,
    #[error("select: option disabled")]
    SelectOptionDisabled,
    #[error("select: unexpected value")]
    SelectUnexpectedValue,
}

impl ActionResultCode {
    pub fn is_ok(self) -> bool {
        self == ActionResultCode::Ok
    }
}

/// Terminal outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub code: ActionResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            code: ActionResultCode::Ok,
            message: None,
        }
    }

    pub fn new(code: ActionResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

impl From<ActionResultCode> for ActionResult {
    fn from(code: ActionResultCode) -> Self {
        Self {
            code,
            message: None,
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.code, message),
            None => write!(f, "{}", self.code),
        }
    }
}
