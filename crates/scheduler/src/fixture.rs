//! In-memory fixture frame
//!
//! A YAML-describable document that backs both the tool-facing [`FramePort`]
//! and the monitor-facing [`StabilityHost`]. Stability signals either fire as
//! soon as they are requested (`auto`) or wait for the test to fire them
//! (`manual`).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};

use action_primitives::{
    EditCommand, EventDisposition, FormControlState, FramePort, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind, NodeInfo, ScrollInfo, SelectOption,
};
use page_stability::{
    NavigationCallback, NavigationOutcome, NetworkIdleRegistration, SignalCallback,
    StabilityHost,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use soulbrowser_core_types::{DomNodeId, FrameId, Point, Rect, Vector2d};
use thiserror::Error;
use tracing::debug;

use crate::registry::FrameBinding;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture document: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("node id {0} is reserved for the document root")]
    ReservedNodeId(i32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureScroll {
    pub horizontal: bool,
    pub vertical: bool,
    pub offset: Vector2d,
    /// Largest reachable offset; scrolling clamps to `[0, max]`
    pub max: Vector2d,
    pub zoom: Option<f64>,
    pub smooth: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureOption {
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureNode {
    pub id: i32,
    /// Empty tag marks a text node
    pub tag: String,
    pub bounds: Rect,
    /// `None` for anything that is not a form control
    pub disabled: Option<bool>,
    pub read_only: bool,
    pub focusable: Option<bool>,
    pub editable: bool,
    pub value: Option<String>,
    pub options: Option<Vec<FixtureOption>>,
    pub scroll: Option<FixtureScroll>,
    /// Pressing the node starts a same-frame navigation
    pub navigates: bool,
    /// Pressing the node starts this many network requests
    pub starts_requests: usize,
    /// Pressing the node tears the document down
    pub detaches: bool,
}

impl FixtureNode {
    fn is_form_control(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "button" | "input" | "select" | "textarea"
        ) || self.disabled.is_some()
    }

    fn info(&self) -> NodeInfo {
        let form_control = self.is_form_control().then(|| FormControlState {
            disabled: self.disabled.unwrap_or(false),
            read_only: self.read_only,
        });
        NodeInfo {
            id: DomNodeId(self.id),
            is_element: !self.tag.is_empty(),
            tag: self.tag.clone(),
            form_control,
            focusable: self
                .focusable
                .unwrap_or(self.editable || form_control.is_some()),
            editable: self.editable,
            bounds: self.bounds,
        }
    }
}

fn default_viewport() -> Rect {
    Rect::new(0, 0, 1280, 720)
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureDocument {
    pub frame: String,
    #[serde(default = "default_viewport")]
    pub viewport: Rect,
    #[serde(default = "default_true")]
    pub local_root: bool,
    #[serde(default = "default_true")]
    pub render_surface: bool,
    #[serde(default = "default_true")]
    pub compositor: bool,
    #[serde(default)]
    pub signals: SignalMode,
    #[serde(default)]
    pub scrolling_element: Option<i32>,
    #[serde(default)]
    pub active_requests: usize,
    #[serde(default)]
    pub navigation_in_flight: bool,
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
}

impl FixtureDocument {
    pub fn from_yaml_str(source: &str) -> Result<Self, FixtureError> {
        let document: Self = serde_yaml::from_str(source)?;
        if let Some(node) = document.nodes.iter().find(|node| node.id == DomNodeId::ROOT.0) {
            return Err(FixtureError::ReservedNodeId(node.id));
        }
        Ok(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }
}

#[derive(Default)]
struct EditState {
    caret: usize,
    replace_all: bool,
}

struct FixtureState {
    attached: bool,
    nodes: BTreeMap<DomNodeId, FixtureNode>,
    focused: Option<DomNodeId>,
    edit: EditState,
    active_requests: usize,
    navigating: bool,
    mouse_log: Vec<MouseEvent>,
    key_log: Vec<KeyEvent>,
}

#[derive(Default)]
struct PendingSignals {
    navigation: Option<NavigationCallback>,
    network_idle: Option<SignalCallback>,
    network_slot_taken: bool,
    idle: Vec<SignalCallback>,
    presentation: Vec<SignalCallback>,
}

pub struct FixtureFrame {
    id: FrameId,
    viewport: Rect,
    local_root: bool,
    render_surface: bool,
    compositor: bool,
    mode: SignalMode,
    scrolling_element: Option<DomNodeId>,
    state: Mutex<FixtureState>,
    pending: Mutex<PendingSignals>,
    me: Weak<FixtureFrame>,
}

impl FixtureFrame {
    pub fn from_document(document: FixtureDocument) -> Arc<Self> {
        let nodes = document
            .nodes
            .into_iter()
            .map(|node| (DomNodeId(node.id), node))
            .collect();
        Arc::new_cyclic(|me| Self {
            id: FrameId(document.frame),
            viewport: document.viewport,
            local_root: document.local_root,
            render_surface: document.render_surface,
            compositor: document.compositor,
            mode: document.signals,
            scrolling_element: document.scrolling_element.map(DomNodeId),
            state: Mutex::new(FixtureState {
                attached: true,
                nodes,
                focused: None,
                edit: EditState::default(),
                active_requests: document.active_requests,
                navigating: document.navigation_in_flight,
                mouse_log: Vec::new(),
                key_log: Vec::new(),
            }),
            pending: Mutex::new(PendingSignals::default()),
            me: me.clone(),
        })
    }

    pub fn binding(self: &Arc<Self>) -> FrameBinding {
        FrameBinding::new(self.clone(), self.clone())
    }

    pub fn detach(&self) {
        self.state.lock().attached = false;
    }

    pub fn node_value(&self, id: DomNodeId) -> Option<String> {
        self.state
            .lock()
            .nodes
            .get(&id)
            .and_then(|node| node.value.clone())
    }

    pub fn mouse_log(&self) -> Vec<MouseEvent> {
        self.state.lock().mouse_log.clone()
    }

    pub fn key_log(&self) -> Vec<KeyEvent> {
        self.state.lock().key_log.clone()
    }

    pub fn set_active_requests(&self, count: usize) {
        self.state.lock().active_requests = count;
    }

    pub fn set_navigation_in_flight(&self, navigating: bool) {
        self.state.lock().navigating = navigating;
    }

    /// Runs every posted idle task; returns how many ran.
    pub fn run_idle_tasks(&self) -> usize {
        let tasks = std::mem::take(&mut self.pending.lock().idle);
        let count = tasks.len();
        tasks.into_iter().for_each(|task| task());
        count
    }

    /// Presents a frame; returns how many presentation callbacks ran.
    pub fn present_frame(&self) -> usize {
        let callbacks = std::mem::take(&mut self.pending.lock().presentation);
        let count = callbacks.len();
        callbacks.into_iter().for_each(|callback| callback());
        count
    }

    pub fn finish_navigation(&self, outcome: NavigationOutcome) -> bool {
        self.state.lock().navigating = false;
        let callback = self.pending.lock().navigation.take();
        match callback {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => false,
        }
    }

    pub fn finish_network(&self) -> bool {
        self.state.lock().active_requests = 0;
        let callback = self.pending.lock().network_idle.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn has_pending_idle_task(&self) -> bool {
        !self.pending.lock().idle.is_empty()
    }

    pub fn has_network_registration(&self) -> bool {
        self.pending.lock().network_slot_taken
    }

    fn hit_test(state: &FixtureState, point: Point) -> Option<DomNodeId> {
        state
            .nodes
            .values()
            .rev()
            .find(|node| !node.tag.is_empty() && node.bounds.contains(point))
            .map(|node| DomNodeId(node.id))
    }

    fn press(state: &mut FixtureState, point: Point) {
        let Some(id) = Self::hit_test(state, point) else {
            return;
        };
        let Some(node) = state.nodes.get(&id) else {
            return;
        };
        let info = node.info();
        let (navigates, requests, detaches) = (node.navigates, node.starts_requests, node.detaches);

        if info.focusable {
            Self::set_focus(state, id);
        }
        state.navigating |= navigates;
        state.active_requests += requests;
        if detaches {
            state.attached = false;
        }
        debug!(node = %id, navigates, requests, detaches, "fixture node pressed");
    }

    fn set_focus(state: &mut FixtureState, id: DomNodeId) {
        let caret = state
            .nodes
            .get(&id)
            .and_then(|node| node.value.as_ref())
            .map_or(0, String::len);
        state.focused = Some(id);
        state.edit = EditState {
            caret,
            replace_all: false,
        };
    }

    fn insert_text(state: &mut FixtureState, ch: char) {
        let Some(id) = state.focused else {
            return;
        };
        let replace_all = std::mem::take(&mut state.edit.replace_all);
        let Some(node) = state.nodes.get_mut(&id).filter(|node| node.editable) else {
            return;
        };
        let value = node.value.get_or_insert_with(String::new);
        if replace_all {
            value.clear();
            state.edit.caret = 0;
        }
        let caret = state.edit.caret.min(value.len());
        value.insert(caret, ch);
        state.edit.caret = caret + ch.len_utf8();
    }
}

impl FramePort for FixtureFrame {
    fn frame_id(&self) -> FrameId {
        self.id.clone()
    }

    fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    fn is_local_root(&self) -> bool {
        self.local_root
    }

    fn has_render_surface(&self) -> bool {
        self.render_surface
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn node(&self, id: DomNodeId) -> Option<NodeInfo> {
        let state = self.state.lock();
        if !state.attached {
            return None;
        }
        state.nodes.get(&id).map(FixtureNode::info)
    }

    fn scrolling_element(&self) -> Option<DomNodeId> {
        self.scrolling_element
    }

    fn scroll_info(&self, id: DomNodeId) -> Option<ScrollInfo> {
        let state = self.state.lock();
        let scroll = state.nodes.get(&id)?.scroll.as_ref()?;
        Some(ScrollInfo {
            user_scrollable_x: scroll.horizontal,
            user_scrollable_y: scroll.vertical,
            offset: scroll.offset,
            zoom: scroll.zoom.unwrap_or(1.0),
            smooth: scroll.smooth,
        })
    }

    fn scroll_by(&self, id: DomNodeId, delta: Vector2d) {
        let mut state = self.state.lock();
        let Some(scroll) = state.nodes.get_mut(&id).and_then(|node| node.scroll.as_mut()) else {
            return;
        };
        scroll.offset.x = (scroll.offset.x + delta.x).clamp(0.0, scroll.max.x.max(0.0));
        scroll.offset.y = (scroll.offset.y + delta.y).clamp(0.0, scroll.max.y.max(0.0));
    }

    fn select_options(&self, id: DomNodeId) -> Option<Vec<SelectOption>> {
        let state = self.state.lock();
        let options = state.nodes.get(&id)?.options.as_ref()?;
        Some(
            options
                .iter()
                .map(|option| SelectOption {
                    value: option.value.clone(),
                    disabled: option.disabled,
                })
                .collect(),
        )
    }

    fn select_value(&self, id: DomNodeId) -> Option<String> {
        self.node_value(id)
    }

    fn set_select_value(&self, id: DomNodeId, value: &str) {
        if let Some(node) = self.state.lock().nodes.get_mut(&id) {
            node.value = Some(value.to_string());
        }
    }

    fn focus(&self, id: DomNodeId) -> bool {
        let mut state = self.state.lock();
        let focusable = state
            .nodes
            .get(&id)
            .is_some_and(|node| node.info().focusable);
        if focusable {
            Self::set_focus(&mut state, id);
        }
        focusable
    }

    fn focused_node(&self) -> Option<DomNodeId> {
        self.state.lock().focused
    }

    fn run_edit_command(&self, command: EditCommand) -> bool {
        let mut state = self.state.lock();
        let Some(len) = state
            .focused
            .and_then(|id| state.nodes.get(&id))
            .filter(|node| node.editable)
            .map(|node| node.value.as_ref().map_or(0, String::len))
        else {
            return false;
        };
        match command {
            EditCommand::SelectAll => state.edit.replace_all = true,
            EditCommand::MoveToStart => state.edit.caret = 0,
            EditCommand::MoveToEnd => state.edit.caret = len,
        }
        true
    }

    fn dispatch_mouse(&self, event: &MouseEvent) -> EventDisposition {
        let mut state = self.state.lock();
        if !state.attached {
            return EventDisposition::NotHandled;
        }
        state.mouse_log.push(*event);
        if event.kind == MouseEventKind::Down {
            Self::press(&mut state, event.position);
        }
        EventDisposition::Handled
    }

    fn dispatch_key(&self, event: &KeyEvent) -> EventDisposition {
        let mut state = self.state.lock();
        if !state.attached {
            return EventDisposition::NotHandled;
        }
        state.key_log.push(event.clone());
        if event.kind == KeyEventKind::Char {
            if let Some(ch) = event.text.filter(|ch| *ch != '\r') {
                Self::insert_text(&mut state, ch);
            }
        }
        EventDisposition::Handled
    }
}

impl StabilityHost for FixtureFrame {
    fn frame_id(&self) -> FrameId {
        self.id.clone()
    }

    fn active_request_count(&self) -> usize {
        self.state.lock().active_requests
    }

    fn is_navigation_in_flight(&self) -> bool {
        self.state.lock().navigating
    }

    fn on_navigation_settled(&self, callback: NavigationCallback) {
        match self.mode {
            SignalMode::Auto => {
                self.state.lock().navigating = false;
                callback(NavigationOutcome::Committed);
            }
            SignalMode::Manual => self.pending.lock().navigation = Some(callback),
        }
    }

    fn register_network_idle(&self, callback: SignalCallback) -> Option<NetworkIdleRegistration> {
        if self.state.lock().active_requests == 0 {
            return None;
        }
        {
            let mut pending = self.pending.lock();
            pending.network_slot_taken = true;
            pending.network_idle = Some(callback);
        }
        let registration = {
            let me = self.me.clone();
            NetworkIdleRegistration::new(move || {
                if let Some(frame) = me.upgrade() {
                    let mut pending = frame.pending.lock();
                    pending.network_slot_taken = false;
                    pending.network_idle = None;
                }
            })
        };
        if self.mode == SignalMode::Auto {
            self.finish_network();
        }
        Some(registration)
    }

    fn post_idle_task(&self, callback: SignalCallback) {
        match self.mode {
            SignalMode::Auto => callback(),
            SignalMode::Manual => self.pending.lock().idle.push(callback),
        }
    }

    fn request_presentation(&self, callback: SignalCallback) -> bool {
        if !self.compositor {
            return false;
        }
        match self.mode {
            SignalMode::Auto => callback(),
            SignalMode::Manual => self.pending.lock().presentation.push(callback),
        }
        true
    }
}
