//! Core data types for actor actions

use serde::{Deserialize, Serialize};
use soulbrowser_core_types::{DomNodeId, Point};
use std::fmt;

/// Caller-supplied location for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Viewport coordinate in physical pixels
    Coordinate(Point),

    /// Handle to a document node
    NodeHandle(DomNodeId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Coordinate(point) => write!(f, "coordinate{}", point),
            Target::NodeHandle(node) => write!(f, "node[{}]", node),
        }
    }
}

/// Mouse button selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseBtn {
    #[default]
    Left,
    Middle,
    Right,
}

/// How typed text is combined with the target's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMode {
    /// Select everything first so the typed text replaces it
    DeleteExisting,

    /// Move the caret to the start before typing
    Prepend,

    /// Move the caret to the end before typing
    #[default]
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Left,
    Right,
    Up,
    Down,
}

impl ScrollDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, ScrollDirection::Left | ScrollDirection::Right)
    }
}

fn default_click_count() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickAction {
    pub target: Target,
    #[serde(default)]
    pub button: MouseBtn,
    #[serde(default = "default_click_count")]
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseMoveAction {
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAction {
    pub target: Target,
    pub text: String,
    #[serde(default)]
    pub mode: TypeMode,
    #[serde(default)]
    pub follow_by_enter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollAction {
    pub target: Target,
    pub direction: ScrollDirection,
    /// Physical pixels; must be positive
    pub distance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectAction {
    pub target: Target,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragAndReleaseAction {
    pub source: Target,
    pub destination: Target,
}

/// One discrete synthetic action requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Click(ClickAction),
    MouseMove(MouseMoveAction),
    Type(TypeAction),
    Scroll(ScrollAction),
    Select(SelectAction),
    DragAndRelease(DragAndReleaseAction),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Click(_) => "Click",
            Action::MouseMove(_) => "MouseMove",
            Action::Type(_) => "Type",
            Action::Scroll(_) => "Scroll",
            Action::Select(_) => "Select",
            Action::DragAndRelease(_) => "DragAndRelease",
        }
    }
}
