//! In-memory frame used by the unit tests of this crate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use soulbrowser_core_types::{DomNodeId, FrameId, NullJournal, Rect, Vector2d};

use crate::policy::ToolTimings;
use crate::ports::{
    EditCommand, EventDisposition, FormControlState, FramePort, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind, NodeInfo, ScrollInfo, SelectOption,
};
use crate::primitives::ToolContext;

pub struct MockNode {
    info: NodeInfo,
    scroll: Option<ScrollInfo>,
    pinned: bool,
    options: Option<Vec<SelectOption>>,
    value: Option<String>,
}

impl MockNode {
    fn element(id: i32, tag: &str, bounds: Rect) -> Self {
        Self {
            info: NodeInfo {
                id: DomNodeId(id),
                is_element: true,
                tag: tag.to_string(),
                form_control: None,
                focusable: false,
                editable: false,
                bounds,
            },
            scroll: None,
            pinned: false,
            options: None,
            value: None,
        }
    }

    pub fn text(id: i32, bounds: Rect) -> Self {
        let mut node = Self::element(id, "", bounds);
        node.info.is_element = false;
        node
    }

    pub fn button(id: i32, bounds: Rect) -> Self {
        let mut node = Self::element(id, "button", bounds);
        node.info.form_control = Some(FormControlState::default());
        node.info.focusable = true;
        node
    }

    pub fn input(id: i32, bounds: Rect) -> Self {
        let mut node = Self::button(id, bounds);
        node.info.tag = "input".to_string();
        node.info.editable = true;
        node
    }

    pub fn select(id: i32, bounds: Rect, options: &[(&str, bool)]) -> Self {
        let mut node = Self::button(id, bounds);
        node.info.tag = "select".to_string();
        node.value = options.first().map(|(value, _)| value.to_string());
        node.options = Some(
            options
                .iter()
                .map(|(value, disabled)| SelectOption {
                    value: value.to_string(),
                    disabled: *disabled,
                })
                .collect(),
        );
        node
    }

    pub fn scroller(id: i32, bounds: Rect) -> Self {
        let mut node = Self::element(id, "div", bounds);
        node.scroll = Some(ScrollInfo {
            user_scrollable_x: true,
            user_scrollable_y: true,
            offset: Vector2d::default(),
            zoom: 1.0,
            smooth: false,
        });
        node
    }

    pub fn disabled(mut self) -> Self {
        if let Some(control) = self.info.form_control.as_mut() {
            control.disabled = true;
        }
        self
    }

    pub fn read_only(mut self) -> Self {
        if let Some(control) = self.info.form_control.as_mut() {
            control.read_only = true;
        }
        self
    }

    pub fn not_focusable(mut self) -> Self {
        self.info.focusable = false;
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.zoom = zoom;
        }
        self
    }

    pub fn smooth(mut self) -> Self {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.smooth = true;
        }
        self
    }

    pub fn vertical_only(mut self) -> Self {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.user_scrollable_x = false;
        }
        self
    }

    /// Scroll requests leave the offset untouched.
    pub fn at_limit(mut self) -> Self {
        self.pinned = true;
        self
    }
}

#[derive(Default)]
struct MockState {
    detached: bool,
    nodes: BTreeMap<DomNodeId, MockNode>,
    focused: Option<DomNodeId>,
    scrolling_element: Option<DomNodeId>,
    mouse_events: Vec<MouseEvent>,
    key_events: Vec<KeyEvent>,
    edit_commands: Vec<EditCommand>,
    key_events_seen: HashMap<KeyEventKind, usize>,
    suppressed_key_events: HashSet<(KeyEventKind, usize)>,
    mouse_disposition: Option<EventDisposition>,
    detach_on_mouse_down: bool,
    detach_on_focus: bool,
    focus_on_click: Option<DomNodeId>,
    forced_select_values: BTreeMap<DomNodeId, String>,
}

pub struct MockFrame {
    id: FrameId,
    state: Mutex<MockState>,
}

impl MockFrame {
    pub fn new() -> Self {
        Self {
            id: FrameId("mock-frame".to_string()),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Frame plus a tool context bound to it. The context holds the frame
    /// weakly, so dropping the returned `Arc` destroys the frame.
    pub fn context() -> (Arc<Self>, ToolContext) {
        let frame = Self::shared();
        let port: Arc<dyn FramePort> = frame.clone();
        let ctx = ToolContext::new(&port, Arc::new(NullJournal), ToolTimings::default());
        (frame, ctx)
    }

    pub fn insert(&self, node: MockNode) {
        self.state.lock().nodes.insert(node.info.id, node);
    }

    pub fn detach(&self) {
        self.state.lock().detached = true;
    }

    pub fn detach_on_mouse_down(&self) {
        self.state.lock().detach_on_mouse_down = true;
    }

    pub fn detach_on_focus(&self) {
        self.state.lock().detach_on_focus = true;
    }

    pub fn set_mouse_disposition(&self, disposition: EventDisposition) {
        self.state.lock().mouse_disposition = Some(disposition);
    }

    /// Suppresses the `index`-th key-down (zero based).
    pub fn suppress_key_down(&self, index: usize) {
        self.suppress_key_event(KeyEventKind::RawKeyDown, index);
    }

    /// Suppresses the `index`-th event of `kind` (zero based, counted per kind).
    pub fn suppress_key_event(&self, kind: KeyEventKind, index: usize) {
        self.state.lock().suppressed_key_events.insert((kind, index));
    }

    /// A mouse press moves focus to `node`.
    pub fn focus_on_click(&self, node: DomNodeId) {
        self.state.lock().focus_on_click = Some(node);
    }

    pub fn set_scrolling_element(&self, node: Option<DomNodeId>) {
        self.state.lock().scrolling_element = node;
    }

    /// Change handlers rewrite the select's value to `value`.
    pub fn force_select_value(&self, node: DomNodeId, value: &str) {
        self.state
            .lock()
            .forced_select_values
            .insert(node, value.to_string());
    }

    pub fn mouse_events(&self) -> Vec<MouseEvent> {
        self.state.lock().mouse_events.clone()
    }

    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.state.lock().key_events.clone()
    }

    pub fn edit_commands(&self) -> Vec<EditCommand> {
        self.state.lock().edit_commands.clone()
    }

    pub fn typed_text(&self) -> String {
        self.state
            .lock()
            .key_events
            .iter()
            .filter(|event| event.kind == KeyEventKind::Char)
            .filter_map(|event| event.text)
            .collect()
    }
}

impl FramePort for MockFrame {
    fn frame_id(&self) -> FrameId {
        self.id.clone()
    }

    fn is_attached(&self) -> bool {
        !self.state.lock().detached
    }

    fn is_local_root(&self) -> bool {
        true
    }

    fn has_render_surface(&self) -> bool {
        true
    }

    fn viewport(&self) -> Rect {
        Rect::new(0, 0, 800, 600)
    }

    fn node(&self, id: DomNodeId) -> Option<NodeInfo> {
        self.state.lock().nodes.get(&id).map(|node| node.info.clone())
    }

    fn scrolling_element(&self) -> Option<DomNodeId> {
        self.state.lock().scrolling_element
    }

    fn scroll_info(&self, id: DomNodeId) -> Option<ScrollInfo> {
        self.state.lock().nodes.get(&id).and_then(|node| node.scroll)
    }

    fn scroll_by(&self, id: DomNodeId, delta: Vector2d) {
        let mut state = self.state.lock();
        if let Some(node) = state.nodes.get_mut(&id) {
            if node.pinned {
                return;
            }
            if let Some(scroll) = node.scroll.as_mut() {
                scroll.offset.x += delta.x;
                scroll.offset.y += delta.y;
            }
        }
    }

    fn select_options(&self, id: DomNodeId) -> Option<Vec<SelectOption>> {
        self.state
            .lock()
            .nodes
            .get(&id)
            .and_then(|node| node.options.clone())
    }

    fn select_value(&self, id: DomNodeId) -> Option<String> {
        self.state
            .lock()
            .nodes
            .get(&id)
            .and_then(|node| node.value.clone())
    }

    fn set_select_value(&self, id: DomNodeId, value: &str) {
        let mut state = self.state.lock();
        let value = state
            .forced_select_values
            .get(&id)
            .cloned()
            .unwrap_or_else(|| value.to_string());
        if let Some(node) = state.nodes.get_mut(&id) {
            node.value = Some(value);
        }
    }

    fn focus(&self, id: DomNodeId) -> bool {
        let mut state = self.state.lock();
        let focusable = state
            .nodes
            .get(&id)
            .is_some_and(|node| node.info.focusable);
        if focusable {
            state.focused = Some(id);
            if state.detach_on_focus {
                state.detached = true;
            }
        }
        focusable
    }

    fn focused_node(&self) -> Option<DomNodeId> {
        self.state.lock().focused
    }

    fn run_edit_command(&self, command: EditCommand) -> bool {
        self.state.lock().edit_commands.push(command);
        true
    }

    fn dispatch_mouse(&self, event: &MouseEvent) -> EventDisposition {
        let mut state = self.state.lock();
        state.mouse_events.push(*event);
        if event.kind == MouseEventKind::Down {
            if state.detach_on_mouse_down {
                state.detached = true;
            }
            if let Some(node) = state.focus_on_click {
                state.focused = Some(node);
            }
        }
        state.mouse_disposition.unwrap_or(EventDisposition::Handled)
    }

    fn dispatch_key(&self, event: &KeyEvent) -> EventDisposition {
        let mut state = self.state.lock();
        state.key_events.push(event.clone());
        let seen = state.key_events_seen.entry(event.kind).or_default();
        let index = *seen;
        *seen += 1;
        if state.suppressed_key_events.contains(&(event.kind, index)) {
            EventDisposition::Suppressed
        } else {
            EventDisposition::Handled
        }
    }
}
