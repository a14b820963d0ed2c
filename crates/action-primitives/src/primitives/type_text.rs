//! Type tool - focus a target, position the caret, then type key strokes

use std::time::Duration;

use tracing::warn;

use crate::{
    errors::{ActionResult, ActionResultCode},
    keyboard::{strokes_for_text, KeyStroke},
    locator::{resolve_target, ResolvePolicy, ResolvedTarget},
    ports::{EditCommand, EventDisposition, FramePort, KeyEventKind},
    primitives::{dispatch_click, Tool, ToolContext},
    types::{MouseBtn, Target, TypeAction, TypeMode},
};

pub struct TypeTool {
    pub(crate) ctx: ToolContext,
    action: TypeAction,
}

/// Resolved target plus the key strokes to send.
#[derive(Clone, Debug)]
pub struct TypePlan {
    pub target: ResolvedTarget,
    pub strokes: Vec<KeyStroke>,
}

impl TypeTool {
    pub fn new(ctx: ToolContext, action: TypeAction) -> Self {
        Self { ctx, action }
    }

    fn mode_command(mode: TypeMode) -> EditCommand {
        match mode {
            TypeMode::DeleteExisting => EditCommand::SelectAll,
            TypeMode::Prepend => EditCommand::MoveToStart,
            TypeMode::Append => EditCommand::MoveToEnd,
        }
    }

    /// Puts focus on the target: coordinates are clicked, nodes are focused.
    fn focus_target(&self, frame: &dyn FramePort, target: &ResolvedTarget) -> ActionResult {
        match target {
            ResolvedTarget::Point(point) => dispatch_click(frame, *point, MouseBtn::Left, 1),
            ResolvedTarget::Element { node, .. } => {
                if frame.focus(node.id) {
                    ActionResult::ok()
                } else {
                    ActionResult::new(
                        ActionResultCode::TypeTargetNotFocusable,
                        format!("focus on <{}> was refused", node.tag),
                    )
                }
            }
        }
    }

    fn apply_mode(&self, frame: &dyn FramePort) {
        let editable = frame
            .focused_node()
            .and_then(|id| frame.node(id))
            .is_some_and(|node| node.editable);
        if !editable {
            self.ctx
                .journal("TypeModeIgnored", &format!("{:?}", self.action.mode));
            return;
        }
        let command = Self::mode_command(self.action.mode);
        if !frame.run_edit_command(command) {
            warn!(?command, "edit command was not applied");
        }
    }

    fn send_strokes(&self, frame: &dyn FramePort, strokes: &[KeyStroke]) -> ActionResult {
        for (index, stroke) in strokes.iter().enumerate() {
            for event in stroke.events() {
                let disposition = frame.dispatch_key(&event);
                if !frame.is_attached() {
                    return ActionResult::new(
                        ActionResultCode::FrameWentAway,
                        format!("document detached while typing {:?}", stroke.key),
                    );
                }
                if disposition != EventDisposition::Suppressed {
                    continue;
                }
                if index == 0 && event.kind == KeyEventKind::RawKeyDown {
                    return ActionResult::new(
                        ActionResultCode::TypeKeyDownSuppressed,
                        format!("key-down for {:?} was suppressed", stroke.key),
                    );
                }
                self.ctx.journal(
                    "KeyEventSuppressed",
                    &format!("{:?} {}", event.kind, stroke.key),
                );
                warn!(key = %stroke.key, kind = ?event.kind, index, "key event suppressed");
            }
        }
        ActionResult::ok()
    }
}

impl Tool for TypeTool {
    type Validated = TypePlan;

    fn validate(&self) -> Result<TypePlan, ActionResult> {
        let frame = self.ctx.frame()?;
        let target = match self.action.target {
            Target::Coordinate(_) => {
                resolve_target(&self.action.target, frame.as_ref(), ResolvePolicy::pointer())?
            }
            Target::NodeHandle(_) => {
                let policy = ResolvePolicy::element(ActionResultCode::TypeTargetNotFocusable)
                    .enabled()
                    .writable();
                let resolved = resolve_target(&self.action.target, frame.as_ref(), policy)?;
                if let Some(node) = resolved.node() {
                    if !node.focusable {
                        return Err(ActionResult::new(
                            ActionResultCode::TypeTargetNotFocusable,
                            format!("<{}> cannot take focus", node.tag),
                        ));
                    }
                }
                resolved
            }
        };

        let strokes = strokes_for_text(&self.action.text, self.action.follow_by_enter)?;
        Ok(TypePlan { target, strokes })
    }

    fn execute(&self) -> ActionResult {
        let plan = match self.validate() {
            Ok(plan) => plan,
            Err(result) => return result,
        };
        let frame = match self.ctx.frame() {
            Ok(frame) => frame,
            Err(result) => return result,
        };

        let focused = self.focus_target(frame.as_ref(), &plan.target);
        if !focused.is_ok() {
            return focused;
        }
        if !frame.is_attached() {
            return ActionResult::new(
                ActionResultCode::FrameWentAway,
                "document detached while focusing",
            );
        }

        self.apply_mode(frame.as_ref());
        self.send_strokes(frame.as_ref(), &plan.strokes)
    }

    fn debug_string(&self) -> String {
        format!(
            "TypeTool[{}; text={:?}; mode={:?}; enter={}]",
            self.action.target, self.action.text, self.action.mode, self.action.follow_by_enter
        )
    }

    fn execution_observation_delay(&self) -> Duration {
        self.ctx.timings().type_observation_delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFrame, MockNode};
    use soulbrowser_core_types::{DomNodeId, MemoryJournal, Point, Rect};
    use std::sync::Arc;

    fn type_into(target: Target, text: &str, mode: TypeMode) -> TypeAction {
        TypeAction {
            target,
            text: text.to_string(),
            mode,
            follow_by_enter: false,
        }
    }

    #[test]
    fn types_into_focused_input() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "Hi", TypeMode::DeleteExisting),
        );

        assert!(tool.execute().is_ok());
        assert_eq!(frame.focused_node(), Some(DomNodeId(4)));
        assert_eq!(frame.edit_commands(), vec![EditCommand::SelectAll]);
        assert_eq!(frame.typed_text(), "Hi");
        assert_eq!(frame.key_events().len(), 6);
        assert_eq!(tool.execution_observation_delay(), Duration::from_millis(250));
    }

    #[test]
    fn follow_by_enter_appends_return() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        let mut action = type_into(Target::NodeHandle(DomNodeId(4)), "a", TypeMode::Append);
        action.follow_by_enter = true;

        assert!(TypeTool::new(ctx, action).execute().is_ok());
        let events = frame.key_events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[3].key, "Enter");
        assert_eq!(events[4].text, Some('\r'));
    }

    #[test]
    fn coordinate_target_is_clicked_first() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(0, 0, 100, 100)));
        frame.focus_on_click(DomNodeId(4));
        let tool = TypeTool::new(
            ctx,
            type_into(Target::Coordinate(Point::new(50, 50)), "x", TypeMode::Prepend),
        );

        assert!(tool.execute().is_ok());
        assert_eq!(frame.mouse_events().len(), 2);
        assert_eq!(frame.edit_commands(), vec![EditCommand::MoveToStart]);
        assert_eq!(frame.typed_text(), "x");
    }

    #[test]
    fn unsupported_text_fails_without_events() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "\u{4f60}", TypeMode::Append),
        );

        assert_eq!(
            tool.execute().code,
            ActionResultCode::TypeUnsupportedCharacters
        );
        assert!(frame.key_events().is_empty());
        assert_eq!(frame.focused_node(), None);
    }

    #[test]
    fn target_is_checked_before_text() {
        let (_frame, ctx) = MockFrame::context();
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(77)), "\u{e9}", TypeMode::Append),
        );
        assert_eq!(tool.validate().unwrap_err().code, ActionResultCode::InvalidDomNodeId);
    }

    #[test]
    fn non_focusable_and_read_only_targets_fail() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::text(1, Rect::new(0, 0, 10, 10)));
        frame.insert(MockNode::button(2, Rect::new(0, 20, 10, 10)).not_focusable());
        frame.insert(MockNode::input(3, Rect::new(0, 40, 10, 10)).read_only());

        let code = |id| {
            TypeTool::new(
                ctx.clone(),
                type_into(Target::NodeHandle(DomNodeId(id)), "a", TypeMode::Append),
            )
            .execute()
            .code
        };
        assert_eq!(code(1), ActionResultCode::TypeTargetNotFocusable);
        assert_eq!(code(2), ActionResultCode::TypeTargetNotFocusable);
        assert_eq!(code(3), ActionResultCode::ElementDisabled);
    }

    #[test]
    fn first_key_down_suppressed_aborts() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        frame.suppress_key_down(0);
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "ab", TypeMode::Append),
        );

        assert_eq!(tool.execute().code, ActionResultCode::TypeKeyDownSuppressed);
        assert_eq!(frame.key_events().len(), 1);
    }

    #[test]
    fn later_suppression_is_journaled_and_typing_continues() {
        let frame = MockFrame::shared();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        frame.suppress_key_down(1);
        let journal = MemoryJournal::new();
        let port: Arc<dyn FramePort> = frame.clone();
        let ctx = ToolContext::new(&port, journal.clone(), Default::default());
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "abc", TypeMode::Append),
        );

        assert!(tool.execute().is_ok());
        assert_eq!(frame.key_events().len(), 9);
        assert!(journal.contains("KeyEventSuppressed"));
    }

    #[test]
    fn suppressed_first_char_only_warns() {
        let frame = MockFrame::shared();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        frame.suppress_key_event(KeyEventKind::Char, 0);
        frame.suppress_key_event(KeyEventKind::KeyUp, 1);
        let journal = MemoryJournal::new();
        let port: Arc<dyn FramePort> = frame.clone();
        let ctx = ToolContext::new(&port, journal.clone(), Default::default());
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "ab", TypeMode::Append),
        );

        assert!(tool.execute().is_ok());
        let events = frame.key_events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[4].text, Some('b'));
        let suppressed = journal
            .events()
            .into_iter()
            .filter(|event| event == "KeyEventSuppressed")
            .count();
        assert_eq!(suppressed, 2);
    }

    #[test]
    fn mode_skipped_for_non_editable_focus() {
        let frame = MockFrame::shared();
        frame.insert(MockNode::button(9, Rect::new(10, 10, 50, 20)));
        let journal = MemoryJournal::new();
        let port: Arc<dyn FramePort> = frame.clone();
        let ctx = ToolContext::new(&port, journal.clone(), Default::default());
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(9)), "a", TypeMode::DeleteExisting),
        );

        assert!(tool.execute().is_ok());
        assert!(frame.edit_commands().is_empty());
        assert!(journal.contains("TypeModeIgnored"));
    }

    #[test]
    fn detach_on_focus_stops_typing() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::input(4, Rect::new(10, 10, 200, 20)));
        frame.detach_on_focus();
        let tool = TypeTool::new(
            ctx,
            type_into(Target::NodeHandle(DomNodeId(4)), "a", TypeMode::Append),
        );
        assert_eq!(tool.execute().code, ActionResultCode::FrameWentAway);
        assert!(frame.key_events().is_empty());
    }
}
