//! Click tool - press and release a mouse button over a target

use soulbrowser_core_types::Point;

use crate::{
    errors::{ActionResult, ActionResultCode},
    locator::{resolve_target, ResolvePolicy},
    primitives::{dispatch_click, Tool, ToolContext},
    types::{ClickAction, MouseBtn},
};

pub struct ClickTool {
    pub(crate) ctx: ToolContext,
    action: ClickAction,
}

/// Click parameters after target resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickParams {
    pub point: Point,
    pub button: MouseBtn,
    pub count: u8,
}

impl ClickTool {
    pub fn new(ctx: ToolContext, action: ClickAction) -> Self {
        Self { ctx, action }
    }
}

impl Tool for ClickTool {
    type Validated = ClickParams;

    fn validate(&self) -> Result<ClickParams, ActionResult> {
        if !(1..=2).contains(&self.action.count) {
            return Err(ActionResult::new(
                ActionResultCode::ArgumentsInvalid,
                format!("click count must be 1 or 2, got {}", self.action.count),
            ));
        }

        let frame = self.ctx.frame()?;
        let resolved = resolve_target(&self.action.target, frame.as_ref(), ResolvePolicy::pointer())?;
        let point = resolved
            .point()
            .ok_or_else(|| ActionResult::from(ActionResultCode::ElementOffscreen))?;

        Ok(ClickParams {
            point,
            button: self.action.button,
            count: self.action.count,
        })
    }

    fn execute(&self) -> ActionResult {
        let params = match self.validate() {
            Ok(params) => params,
            Err(result) => return result,
        };
        let frame = match self.ctx.frame() {
            Ok(frame) => frame,
            Err(result) => return result,
        };
        dispatch_click(frame.as_ref(), params.point, params.button, params.count)
    }

    fn debug_string(&self) -> String {
        format!(
            "ClickTool[{}; button={:?}; count={}]",
            self.action.target, self.action.button, self.action.count
        )
    }
}
