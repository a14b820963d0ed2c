//! Scroll tool - scroll an element, or the document's scroller via the root handle

use std::cell::Cell;
use std::time::Duration;

use soulbrowser_core_types::{DomNodeId, Vector2d};
use tracing::debug;

use crate::{
    errors::{ActionResult, ActionResultCode},
    locator::{resolve_target, ResolvePolicy},
    ports::ScrollInfo,
    primitives::{Tool, ToolContext},
    types::{ScrollAction, ScrollDirection, Target},
};

pub struct ScrollTool {
    pub(crate) ctx: ToolContext,
    action: ScrollAction,
    smooth: Cell<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPlan {
    pub node: DomNodeId,
    pub info: ScrollInfo,
    /// Delta in the element's local space
    pub delta: Vector2d,
}

impl ScrollTool {
    pub fn new(ctx: ToolContext, action: ScrollAction) -> Self {
        Self {
            ctx,
            action,
            smooth: Cell::new(false),
        }
    }

    fn physical_delta(&self) -> Vector2d {
        let distance = f64::from(self.action.distance);
        match self.action.direction {
            ScrollDirection::Left => Vector2d::new(-distance, 0.0),
            ScrollDirection::Right => Vector2d::new(distance, 0.0),
            ScrollDirection::Up => Vector2d::new(0.0, -distance),
            ScrollDirection::Down => Vector2d::new(0.0, distance),
        }
    }
}

impl Tool for ScrollTool {
    type Validated = ScrollPlan;

    fn validate(&self) -> Result<ScrollPlan, ActionResult> {
        if self.action.distance <= 0 {
            return Err(ActionResult::new(
                ActionResultCode::ArgumentsInvalid,
                format!("scroll distance must be positive, got {}", self.action.distance),
            ));
        }

        let frame = self.ctx.frame()?;
        let policy = ResolvePolicy::element(ActionResultCode::ScrollTargetNotElement);
        let id = match self.action.target {
            Target::Coordinate(_) => {
                resolve_target(&self.action.target, frame.as_ref(), policy)?;
                return Err(ActionResult::new(
                    ActionResultCode::NotImplemented,
                    "scrolling at a coordinate is not supported",
                ));
            }
            Target::NodeHandle(id) if id.is_root() => {
                if !frame.is_attached() {
                    return Err(ActionResultCode::FrameWentAway.into());
                }
                frame.scrolling_element().ok_or_else(|| {
                    ActionResult::from(ActionResultCode::ScrollNoScrollingElement)
                })?
            }
            Target::NodeHandle(id) => id,
        };

        let resolved = resolve_target(&Target::NodeHandle(id), frame.as_ref(), policy)?;
        let tag = resolved.node().map(|node| node.tag.as_str()).unwrap_or_default();
        let Some(info) = frame.scroll_info(id) else {
            return Err(ActionResult::new(
                ActionResultCode::ScrollTargetNotUserScrollable,
                format!("<{}> is not a scroll container", tag),
            ));
        };

        let axis_open = if self.action.direction.is_horizontal() {
            info.user_scrollable_x
        } else {
            info.user_scrollable_y
        };
        if !axis_open {
            return Err(ActionResult::new(
                ActionResultCode::ScrollTargetNotUserScrollable,
                format!("<{}> cannot scroll {:?}", tag, self.action.direction),
            ));
        }

        let zoom = if info.zoom > 0.0 { info.zoom } else { 1.0 };
        Ok(ScrollPlan {
            node: id,
            info,
            delta: self.physical_delta().scale(1.0 / zoom),
        })
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

        frame.scroll_by(plan.node, plan.delta);
        if !frame.is_attached() {
            return ActionResult::new(
                ActionResultCode::FrameWentAway,
                "document detached while scrolling",
            );
        }

        let after = frame.scroll_info(plan.node).map(|info| info.offset);
        debug!(node = %plan.node, before = ?plan.info.offset, ?after, "scroll applied");
        if after == Some(plan.info.offset) {
            return ActionResult::new(
                ActionResultCode::ScrollOffsetDidNotChange,
                format!("offset stayed at {:?}", plan.info.offset),
            );
        }

        self.smooth.set(plan.info.smooth);
        ActionResult::ok()
    }

    fn debug_string(&self) -> String {
        format!(
            "ScrollTool[{}; {:?} {}px]",
            self.action.target, self.action.direction, self.action.distance
        )
    }

    fn execution_observation_delay(&self) -> Duration {
        if self.smooth.get() {
            self.ctx.timings().smooth_scroll_delay()
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FramePort;
    use crate::testing::{MockFrame, MockNode};
    use soulbrowser_core_types::{Point, Rect};

    fn scroll(target: Target, direction: ScrollDirection, distance: i32) -> ScrollAction {
        ScrollAction {
            target,
            direction,
            distance,
        }
    }

    #[test]
    fn scrolls_element_in_local_units() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::scroller(6, Rect::new(0, 0, 300, 300)).zoom(2.0));
        let tool = ScrollTool::new(
            ctx,
            scroll(Target::NodeHandle(DomNodeId(6)), ScrollDirection::Down, 100),
        );

        assert!(tool.execute().is_ok());
        let offset = frame.scroll_info(DomNodeId(6)).unwrap().offset;
        assert_eq!(offset, Vector2d::new(0.0, 50.0));
        assert_eq!(tool.execution_observation_delay(), Duration::ZERO);
    }

    #[test]
    fn root_handle_uses_scrolling_element() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::scroller(1, Rect::new(0, 0, 800, 600)).smooth());
        frame.set_scrolling_element(Some(DomNodeId(1)));
        let tool = ScrollTool::new(
            ctx,
            scroll(Target::NodeHandle(DomNodeId::ROOT), ScrollDirection::Right, 40),
        );

        assert!(tool.execute().is_ok());
        assert_eq!(
            frame.scroll_info(DomNodeId(1)).unwrap().offset,
            Vector2d::new(40.0, 0.0)
        );
        assert_eq!(tool.execution_observation_delay(), Duration::from_millis(300));
    }

    #[test]
    fn root_without_scroller_fails() {
        let (_frame, ctx) = MockFrame::context();
        let tool = ScrollTool::new(
            ctx,
            scroll(Target::NodeHandle(DomNodeId::ROOT), ScrollDirection::Down, 10),
        );
        assert_eq!(
            tool.execute().code,
            ActionResultCode::ScrollNoScrollingElement
        );
    }

    #[test]
    fn non_positive_distance_is_invalid() {
        let (_frame, ctx) = MockFrame::context();
        for distance in [0, -5] {
            let tool = ScrollTool::new(
                ctx.clone(),
                scroll(Target::NodeHandle(DomNodeId(99)), ScrollDirection::Up, distance),
            );
            assert_eq!(tool.validate().unwrap_err().code, ActionResultCode::ArgumentsInvalid);
        }
    }

    #[test]
    fn coordinate_targets() {
        let (_frame, ctx) = MockFrame::context();
        let inside = ScrollTool::new(
            ctx.clone(),
            scroll(Target::Coordinate(Point::new(5, 5)), ScrollDirection::Down, 10),
        );
        assert_eq!(inside.execute().code, ActionResultCode::NotImplemented);

        let outside = ScrollTool::new(
            ctx,
            scroll(Target::Coordinate(Point::new(5, 5000)), ScrollDirection::Down, 10),
        );
        assert_eq!(outside.execute().code, ActionResultCode::CoordinatesOutOfBounds);
    }

    #[test]
    fn blocked_axis_and_plain_elements_are_not_scrollable() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::scroller(6, Rect::new(0, 0, 300, 300)).vertical_only());
        frame.insert(MockNode::button(7, Rect::new(0, 0, 30, 30)));

        let code = |id, direction| {
            ScrollTool::new(
                ctx.clone(),
                scroll(Target::NodeHandle(DomNodeId(id)), direction, 10),
            )
            .execute()
            .code
        };
        assert_eq!(
            code(6, ScrollDirection::Left),
            ActionResultCode::ScrollTargetNotUserScrollable
        );
        assert_eq!(
            code(7, ScrollDirection::Down),
            ActionResultCode::ScrollTargetNotUserScrollable
        );
    }

    #[test]
    fn text_node_is_not_an_element() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::text(2, Rect::new(0, 0, 30, 30)));
        let tool = ScrollTool::new(
            ctx,
            scroll(Target::NodeHandle(DomNodeId(2)), ScrollDirection::Down, 10),
        );
        assert_eq!(tool.execute().code, ActionResultCode::ScrollTargetNotElement);
    }

    #[test]
    fn pinned_offset_reports_no_change() {
        let (frame, ctx) = MockFrame::context();
        frame.insert(MockNode::scroller(6, Rect::new(0, 0, 300, 300)).at_limit());
        let tool = ScrollTool::new(
            ctx,
            scroll(Target::NodeHandle(DomNodeId(6)), ScrollDirection::Down, 10),
        );
        assert_eq!(
            tool.execute().code,
            ActionResultCode::ScrollOffsetDidNotChange
        );
    }
}
