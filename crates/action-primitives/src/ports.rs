use bitflags::bitflags;
use soulbrowser_core_types::{DomNodeId, FrameId, Point, Rect, Vector2d};

use crate::types::MouseBtn;

/// Snapshot of a node taken at lookup time.
///
/// The document may mutate as soon as the snapshot is returned; tools look a
/// node up again after any step that can run page script.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInfo {
    pub id: DomNodeId,
    pub is_element: bool,
    /// Lower-case tag name; empty for non-elements
    pub tag: String,
    /// Present only for form controls
    pub form_control: Option<FormControlState>,
    pub focusable: bool,
    pub editable: bool,
    /// Border box in viewport coordinates
    pub bounds: Rect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormControlState {
    pub disabled: bool,
    pub read_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollInfo {
    pub user_scrollable_x: bool,
    pub user_scrollable_y: bool,
    /// Current scroll offset in the element's local space
    pub offset: Vector2d,
    /// Effective zoom applied to the element (physical px per local unit)
    pub zoom: f64,
    /// Whether the element animates programmatic scrolls
    pub smooth: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub disabled: bool,
}

/// What the document did with a synthesized event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventDisposition {
    Handled,
    NotHandled,
    /// A listener cancelled the default action
    Suppressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Move,
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: Option<MouseBtn>,
    pub position: Point,
    pub click_count: u8,
}

impl MouseEvent {
    pub fn moved(position: Point) -> Self {
        Self {
            kind: MouseEventKind::Move,
            button: None,
            position,
            click_count: 0,
        }
    }

    pub fn pressed(position: Point, button: MouseBtn, click_count: u8) -> Self {
        Self {
            kind: MouseEventKind::Down,
            button: Some(button),
            position,
            click_count,
        }
    }

    pub fn released(position: Point, button: MouseBtn, click_count: u8) -> Self {
        Self {
            kind: MouseEventKind::Up,
            button: Some(button),
            position,
            click_count,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct KeyMod: u8 {
        const CTRL = 0b0001;
        const SHIFT = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    RawKeyDown,
    Char,
    KeyUp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// DOM `key` value, e.g. `"A"` or `"Enter"`
    pub key: String,
    /// DOM `code` value, e.g. `"KeyA"`
    pub code: &'static str,
    /// Windows virtual key code
    pub key_code: u16,
    pub text: Option<char>,
    pub unmodified_text: Option<char>,
    pub modifiers: KeyMod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditCommand {
    SelectAll,
    MoveToStart,
    MoveToEnd,
}

/// Document/frame collaborator consumed by the tools and the dispatcher.
///
/// Every call observes the live document; none of the returned data stays
/// valid once script has had a chance to run.
pub trait FramePort: Send + Sync {
    fn frame_id(&self) -> FrameId;

    /// The frame still hosts a live document.
    fn is_attached(&self) -> bool;

    /// The frame is the top of its local frame subtree.
    fn is_local_root(&self) -> bool;

    fn has_render_surface(&self) -> bool;

    /// Current viewport bounds in physical pixels.
    fn viewport(&self) -> Rect;

    fn node(&self, id: DomNodeId) -> Option<NodeInfo>;

    fn scrolling_element(&self) -> Option<DomNodeId>;

    /// `None` when the node is not a scroll container.
    fn scroll_info(&self, id: DomNodeId) -> Option<ScrollInfo>;

    /// Applies a delta expressed in the element's local space.
    fn scroll_by(&self, id: DomNodeId, delta: Vector2d);

    /// `None` when the node is not select-like.
    fn select_options(&self, id: DomNodeId) -> Option<Vec<SelectOption>>;

    fn select_value(&self, id: DomNodeId) -> Option<String>;

    /// Writes the value and fires `input`/`change`.
    fn set_select_value(&self, id: DomNodeId, value: &str);

    fn focus(&self, id: DomNodeId) -> bool;

    fn focused_node(&self) -> Option<DomNodeId>;

    fn run_edit_command(&self, command: EditCommand) -> bool;

    fn dispatch_mouse(&self, event: &MouseEvent) -> EventDisposition;

    fn dispatch_key(&self, event: &KeyEvent) -> EventDisposition;
}
