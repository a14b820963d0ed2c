use soulbrowser_core_types::Point;

use crate::{
    errors::{ActionResult, ActionResultCode},
    locator::{resolve_target, ResolvePolicy},
    ports::{EventDisposition, MouseEvent},
    primitives::{dispatch_mouse_checked, Tool, ToolContext},
    types::MouseMoveAction,
};

pub struct MouseMoveTool {
    pub(crate) ctx: ToolContext,
    action: MouseMoveAction,
}

impl MouseMoveTool {
    pub fn new(ctx: ToolContext, action: MouseMoveAction) -> Self {
        Self { ctx, action }
    }
}

impl Tool for MouseMoveTool {
    type Validated = Point;

    fn validate(&self) -> Result<Point, ActionResult> {
        let frame = self.ctx.frame()?;
        resolve_target(&self.action.target, frame.as_ref(), ResolvePolicy::pointer())?
            .point()
            .ok_or_else(|| ActionResultCode::ElementOffscreen.into())
    }

    fn execute(&self) -> ActionResult {
        let point = match self.validate() {
            Ok(point) => point,
            Err(result) => return result,
        };
        let frame = match self.ctx.frame() {
            Ok(frame) => frame,
            Err(result) => return result,
        };

        match dispatch_mouse_checked(frame.as_ref(), MouseEvent::moved(point)) {
            Ok(EventDisposition::Handled) => ActionResult::ok(),
            Ok(disposition) => ActionResult::new(
                ActionResultCode::MouseMoveEventSuppressed,
                format!("move to {} was {:?}", point, disposition),
            ),
            Err(result) => result,
        }
    }

    fn debug_string(&self) -> String {
        format!("MouseMoveTool[{}]", self.action.target)
    }
}
