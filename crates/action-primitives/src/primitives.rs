//! Actor tool family
//!
//! Six tools share one contract:
//! 1. click - press and release a mouse button over a target
//! 2. mouse_move - move the pointer without buttons
//! 3. type_text - focus a target and type ASCII text
//! 4. scroll - scroll an element or the document's scroller
//! 5. select - choose an option of a select-like element
//! 6. drag - press over one target and release over another

mod click;
mod drag;
mod mouse_move;
mod scroll;
mod select;
mod type_text;

pub use click::*;
pub use drag::*;
pub use mouse_move::*;
pub use scroll::*;
pub use select::*;
pub use type_text::*;

use std::sync::{Arc, Weak};
use std::time::Duration;

use soulbrowser_core_types::{FrameId, Journal, Point};
use tracing::{debug, info, instrument, warn};

use crate::errors::{ActionResult, ActionResultCode};
use crate::policy::ToolTimings;
use crate::ports::{EventDisposition, FramePort, MouseEvent};
use crate::types::{Action, MouseBtn};

/// Contract shared by every tool.
///
/// `validate` is free of side effects. `execute` runs `validate` first and
/// returns its failure unchanged; only after a successful validation does it
/// synthesize input.
pub trait Tool {
    type Validated;

    fn validate(&self) -> Result<Self::Validated, ActionResult>;

    fn execute(&self) -> ActionResult;

    fn debug_string(&self) -> String;

    /// Advisory delay before the frame is observed after `execute`.
    fn execution_observation_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Collaborators handed to every tool.
///
/// The frame is held weakly; each use re-checks that it still exists.
#[derive(Clone)]
pub struct ToolContext {
    frame: Weak<dyn FramePort>,
    frame_id: FrameId,
    journal: Arc<dyn Journal>,
    timings: ToolTimings,
}

impl ToolContext {
    pub fn new(
        frame: &Arc<dyn FramePort>,
        journal: Arc<dyn Journal>,
        timings: ToolTimings,
    ) -> Self {
        Self {
            frame: Arc::downgrade(frame),
            frame_id: frame.frame_id(),
            journal,
            timings,
        }
    }

    pub fn frame(&self) -> Result<Arc<dyn FramePort>, ActionResult> {
        self.frame.upgrade().ok_or_else(|| {
            ActionResult::new(ActionResultCode::FrameWentAway, "frame destroyed")
        })
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    pub fn journal(&self, event: &str, details: &str) {
        self.journal.record(&self.frame_id, event, details);
    }

    pub fn timings(&self) -> &ToolTimings {
        &self.timings
    }
}

/// Tool built for one inbound action.
pub enum ToolInstance {
    Click(ClickTool),
    MouseMove(MouseMoveTool),
    Type(TypeTool),
    Scroll(ScrollTool),
    Select(SelectTool),
    DragAndRelease(DragAndReleaseTool),
}

impl ToolInstance {
    pub fn build(action: Action, ctx: ToolContext) -> Self {
        match action {
            Action::Click(action) => ToolInstance::Click(ClickTool::new(ctx, action)),
            Action::MouseMove(action) => ToolInstance::MouseMove(MouseMoveTool::new(ctx, action)),
            Action::Type(action) => ToolInstance::Type(TypeTool::new(ctx, action)),
            Action::Scroll(action) => ToolInstance::Scroll(ScrollTool::new(ctx, action)),
            Action::Select(action) => ToolInstance::Select(SelectTool::new(ctx, action)),
            Action::DragAndRelease(action) => {
                ToolInstance::DragAndRelease(DragAndReleaseTool::new(ctx, action))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolInstance::Click(_) => "Click",
            ToolInstance::MouseMove(_) => "MouseMove",
            ToolInstance::Type(_) => "Type",
            ToolInstance::Scroll(_) => "Scroll",
            ToolInstance::Select(_) => "Select",
            ToolInstance::DragAndRelease(_) => "DragAndRelease",
        }
    }

    fn context(&self) -> &ToolContext {
        match self {
            ToolInstance::Click(tool) => &tool.ctx,
            ToolInstance::MouseMove(tool) => &tool.ctx,
            ToolInstance::Type(tool) => &tool.ctx,
            ToolInstance::Scroll(tool) => &tool.ctx,
            ToolInstance::Select(tool) => &tool.ctx,
            ToolInstance::DragAndRelease(tool) => &tool.ctx,
        }
    }

    #[instrument(skip_all, fields(tool = self.name(), frame = %self.context().frame_id()))]
    pub fn execute(&self) -> ActionResult {
        let description = self.debug_string();
        self.context().journal(self.name(), &description);
        info!(tool = %description, "Executing actor tool");

        let result = match self {
            ToolInstance::Click(tool) => tool.execute(),
            ToolInstance::MouseMove(tool) => tool.execute(),
            ToolInstance::Type(tool) => tool.execute(),
            ToolInstance::Scroll(tool) => tool.execute(),
            ToolInstance::Select(tool) => tool.execute(),
            ToolInstance::DragAndRelease(tool) => tool.execute(),
        };

        self.context().journal("ToolResult", &result.to_string());
        if result.is_ok() {
            info!("Actor tool completed successfully");
        } else {
            warn!(code = ?result.code, message = ?result.message, "Actor tool failed");
        }
        result
    }

    pub fn debug_string(&self) -> String {
        match self {
            ToolInstance::Click(tool) => tool.debug_string(),
            ToolInstance::MouseMove(tool) => tool.debug_string(),
            ToolInstance::Type(tool) => tool.debug_string(),
            ToolInstance::Scroll(tool) => tool.debug_string(),
            ToolInstance::Select(tool) => tool.debug_string(),
            ToolInstance::DragAndRelease(tool) => tool.debug_string(),
        }
    }

    pub fn execution_observation_delay(&self) -> Duration {
        match self {
            ToolInstance::Click(tool) => tool.execution_observation_delay(),
            ToolInstance::MouseMove(tool) => tool.execution_observation_delay(),
            ToolInstance::Type(tool) => tool.execution_observation_delay(),
            ToolInstance::Scroll(tool) => tool.execution_observation_delay(),
            ToolInstance::Select(tool) => tool.execution_observation_delay(),
            ToolInstance::DragAndRelease(tool) => tool.execution_observation_delay(),
        }
    }
}

/// Dispatches one mouse event and fails if the dispatch tore the document down.
fn dispatch_mouse_checked(
    frame: &dyn FramePort,
    event: MouseEvent,
) -> Result<EventDisposition, ActionResult> {
    let disposition = frame.dispatch_mouse(&event);
    debug!(kind = ?event.kind, position = %event.position, ?disposition, "mouse event dispatched");
    if !frame.is_attached() {
        return Err(ActionResult::new(
            ActionResultCode::FrameWentAway,
            format!("document detached during mouse {:?}", event.kind),
        ));
    }
    Ok(disposition)
}

/// Press-and-release sequence; a double click sends two pairs with counts 1 and 2.
fn dispatch_click(
    frame: &dyn FramePort,
    point: Point,
    button: MouseBtn,
    count: u8,
) -> ActionResult {
    for click_count in 1..=count {
        let steps = [
            MouseEvent::pressed(point, button, click_count),
            MouseEvent::released(point, button, click_count),
        ];
        for event in steps {
            if let Err(result) = dispatch_mouse_checked(frame, event) {
                return result;
            }
        }
    }
    ActionResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFrame, MockNode};
    use crate::types::{
        ClickAction, DragAndReleaseAction, MouseMoveAction, ScrollAction, ScrollDirection,
        SelectAction, Target, TypeAction, TypeMode,
    };
    use soulbrowser_core_types::{DomNodeId, MemoryJournal, Rect};

    fn validate(tool: &ToolInstance) -> Result<(), ActionResult> {
        match tool {
            ToolInstance::Click(tool) => tool.validate().map(drop),
            ToolInstance::MouseMove(tool) => tool.validate().map(drop),
            ToolInstance::Type(tool) => tool.validate().map(drop),
            ToolInstance::Scroll(tool) => tool.validate().map(drop),
            ToolInstance::Select(tool) => tool.validate().map(drop),
            ToolInstance::DragAndRelease(tool) => tool.validate().map(drop),
        }
    }

    #[test]
    fn build_matches_action_tag() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::button(42, Rect::new(10, 10, 100, 30)));

        let tool = ToolInstance::build(
            Action::MouseMove(MouseMoveAction {
                target: Target::NodeHandle(DomNodeId(42)),
            }),
            ctx,
        );
        assert_eq!(tool.name(), "MouseMove");
        assert_eq!(tool.execution_observation_delay(), Duration::ZERO);
    }

    #[test]
    fn execute_journals_start_and_result() {
        let frame = MockFrame::shared();
        frame.insert(MockNode::button(42, Rect::new(10, 10, 100, 30)));
        let journal = MemoryJournal::new();
        let port: Arc<dyn FramePort> = frame.clone();
        let ctx = ToolContext::new(&port, journal.clone(), ToolTimings::default());

        let tool = ToolInstance::build(
            Action::Click(ClickAction {
                target: Target::NodeHandle(DomNodeId(42)),
                button: MouseBtn::Left,
                count: 1,
            }),
            ctx,
        );
        assert!(tool.execute().is_ok());
        assert_eq!(journal.events(), vec!["Click", "ToolResult"]);
        assert_eq!(journal.entries()[1].details, "ok");
    }

    #[test]
    fn dropped_frame_reports_frame_went_away() {
        let (frame, ctx) = MockFrame::context();
        drop(frame);
        let tool = ToolInstance::build(
            Action::Click(ClickAction {
                target: Target::Coordinate(Point::new(1, 1)),
                button: MouseBtn::Left,
                count: 1,
            }),
            ctx,
        );
        assert_eq!(
            validate(&tool).unwrap_err().code,
            ActionResultCode::FrameWentAway
        );
        assert_eq!(tool.execute().code, ActionResultCode::FrameWentAway);
    }

    fn every_tool_at(target: Target) -> Vec<Action> {
        let inside = Target::NodeHandle(DomNodeId(42));
        vec![
            Action::Click(ClickAction {
                target,
                button: MouseBtn::Left,
                count: 1,
            }),
            Action::MouseMove(MouseMoveAction { target }),
            Action::Type(TypeAction {
                target,
                text: "abc".to_string(),
                mode: TypeMode::DeleteExisting,
                follow_by_enter: true,
            }),
            Action::Scroll(ScrollAction {
                target,
                direction: ScrollDirection::Down,
                distance: 100,
            }),
            Action::Select(SelectAction {
                target,
                value: "a".to_string(),
            }),
            Action::DragAndRelease(DragAndReleaseAction {
                source: target,
                destination: inside,
            }),
            Action::DragAndRelease(DragAndReleaseAction {
                source: inside,
                destination: target,
            }),
        ]
    }

    #[test]
    fn bad_targets_fail_validation_before_any_event() {
        let cases = [
            (
                Target::Coordinate(Point::new(5000, 10)),
                ActionResultCode::CoordinatesOutOfBounds,
            ),
            (
                Target::Coordinate(Point::new(10, -1)),
                ActionResultCode::CoordinatesOutOfBounds,
            ),
            (
                Target::NodeHandle(DomNodeId(999)),
                ActionResultCode::InvalidDomNodeId,
            ),
        ];

        for (target, expected) in cases {
            for action in every_tool_at(target) {
                let (frame, ctx) = MockFrame::context();
                frame.insert(MockNode::button(42, Rect::new(10, 10, 100, 30)));
                let tool = ToolInstance::build(action, ctx);

                assert_eq!(
                    validate(&tool).unwrap_err().code,
                    expected,
                    "{} at {}",
                    tool.name(),
                    target
                );
                assert_eq!(tool.execute().code, expected, "{} at {}", tool.name(), target);
                assert!(frame.mouse_events().is_empty(), "{} moved the mouse", tool.name());
                assert!(frame.key_events().is_empty(), "{} sent keys", tool.name());
                assert!(frame.edit_commands().is_empty(), "{} edited", tool.name());
                assert_eq!(frame.focused_node(), None, "{} focused", tool.name());
            }
        }
    }
}
