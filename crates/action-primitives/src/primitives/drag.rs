use soulbrowser_core_types::Point;
use tracing::{debug, warn};

use crate::{
    errors::{ActionResult, ActionResultCode},
    locator::{resolve_target, ResolvePolicy},
    ports::{EventDisposition, MouseEvent},
    primitives::{dispatch_mouse_checked, Tool, ToolContext},
    types::{DragAndReleaseAction, MouseBtn},
};

pub struct DragAndReleaseTool {
    pub(crate) ctx: ToolContext,
    action: DragAndReleaseAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragPoints {
    pub source: Point,
    pub destination: Point,
}

impl DragAndReleaseTool {
    pub fn new(ctx: ToolContext, action: DragAndReleaseAction) -> Self {
        Self { ctx, action }
    }
}

impl Tool for DragAndReleaseTool {
    type Validated = DragPoints;

    fn validate(&self) -> Result<DragPoints, ActionResult> {
        let frame = self.ctx.frame()?;
        let source = resolve_target(&self.action.source, frame.as_ref(), ResolvePolicy::pointer())?;
        let destination = resolve_target(
            &self.action.destination,
            frame.as_ref(),
            ResolvePolicy::pointer(),
        )?;

        // Pointer policy rejects offscreen elements, so both points exist.
        match (source.point(), destination.point()) {
            (Some(source), Some(destination)) => Ok(DragPoints {
                source,
                destination,
            }),
            _ => Err(ActionResultCode::ElementOffscreen.into()),
        }
    }

    fn execute(&self) -> ActionResult {
        let points = match self.validate() {
            Ok(points) => points,
            Err(result) => return result,
        };
        let frame = match self.ctx.frame() {
            Ok(frame) => frame,
            Err(result) => return result,
        };

        let steps = [
            MouseEvent::moved(points.source),
            MouseEvent::pressed(points.source, MouseBtn::Left, 1),
            MouseEvent::moved(points.destination),
            MouseEvent::released(points.destination, MouseBtn::Left, 1),
        ];
        for event in steps {
            match dispatch_mouse_checked(frame.as_ref(), event) {
                Ok(EventDisposition::Suppressed) => {
                    self.ctx
                        .journal("MouseEventSuppressed", &format!("{:?}", event.kind));
                    warn!(kind = ?event.kind, position = %event.position, "drag step suppressed");
                }
                Ok(_) => {}
                Err(result) => return result,
            }
        }
        debug!(from = %points.source, to = %points.destination, "drag completed");
        ActionResult::ok()
    }

    fn debug_string(&self) -> String {
        format!(
            "DragAndReleaseTool[{} -> {}]",
            self.action.source, self.action.destination
        )
    }
}
