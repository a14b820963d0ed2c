use soulbrowser_core_types::DomNodeId;

use crate::{
    errors::{ActionResult, ActionResultCode},
    locator::{resolve_target, ResolvePolicy},
    primitives::{Tool, ToolContext},
    types::SelectAction,
};

pub struct SelectTool {
    pub(crate) ctx: ToolContext,
    action: SelectAction,
}

impl SelectTool {
    pub fn new(ctx: ToolContext, action: SelectAction) -> Self {
        Self { ctx, action }
    }
}

impl Tool for SelectTool {
    /// Node whose value will be written.
    type Validated = DomNodeId;

    fn validate(&self) -> Result<DomNodeId, ActionResult> {
        let frame = self.ctx.frame()?;
        let policy = ResolvePolicy::element(ActionResultCode::SelectInvalidElement).enabled();
        let resolved = resolve_target(&self.action.target, frame.as_ref(), policy)?;
        let Some(node) = resolved.node() else {
            return Err(ActionResult::new(
                ActionResultCode::NotImplemented,
                "selecting at a coordinate is not supported",
            ));
        };

        let Some(options) = frame.select_options(node.id) else {
            return Err(ActionResult::new(
                ActionResultCode::SelectInvalidElement,
                format!("<{}> has no options", node.tag),
            ));
        };

        let mut matching = options
            .iter()
            .filter(|option| option.value == self.action.value)
            .peekable();
        if matching.peek().is_none() {
            return Err(ActionResult::new(
                ActionResultCode::SelectNoSuchOption,
                format!("no option with value {:?}", self.action.value),
            ));
        }
        if matching.all(|option| option.disabled) {
            return Err(ActionResult::new(
                ActionResultCode::SelectOptionDisabled,
                format!("option {:?} is disabled", self.action.value),
            ));
        }

        Ok(node.id)
    }

    fn execute(&self) -> ActionResult {
        let node = match self.validate() {
            Ok(node) => node,
            Err(result) => return result,
        };
        let frame = match self.ctx.frame() {
            Ok(frame) => frame,
            Err(result) => return result,
        };

        frame.set_select_value(node, &self.action.value);
        if !frame.is_attached() {
            return ActionResult::new(
                ActionResultCode::FrameWentAway,
                "document detached by change handlers",
            );
        }

        match frame.select_value(node) {
            Some(value) if value == self.action.value => ActionResult::ok(),
            other => ActionResult::new(
                ActionResultCode::SelectUnexpectedValue,
                format!("expected {:?}, found {:?}", self.action.value, other),
            ),
        }
    }

    fn debug_string(&self) -> String {
        format!(
            "SelectTool[{}; value={:?}]",
            self.action.target, self.action.value
        )
    }
}
