//! Target resolution shared by every tool
//!
//! Turns an abstract [`Target`] into a concrete viewport point and/or live
//! element, applying the edge-case policy once for the whole tool family.

use soulbrowser_core_types::{Point, Rect};
use tracing::debug;

use crate::errors::{ActionResult, ActionResultCode};
use crate::ports::{FramePort, NodeInfo};
use crate::types::Target;

/// Per-tool knobs for [`resolve_target`].
#[derive(Clone, Copy, Debug)]
pub struct ResolvePolicy {
    /// Code reported when a handle resolves to a non-element node
    pub not_element: ActionResultCode,
    /// Disabled form controls fail `ElementDisabled`
    pub require_enabled: bool,
    /// Read-only form controls fail `ElementDisabled`
    pub require_writable: bool,
    /// Elements without any viewport intersection fail `ElementOffscreen`
    pub require_onscreen: bool,
}

impl ResolvePolicy {
    /// Policy used by pointer tools (click, move, drag).
    pub const fn pointer() -> Self {
        Self {
            not_element: ActionResultCode::TargetNotElement,
            require_enabled: true,
            require_writable: false,
            require_onscreen: true,
        }
    }

    pub const fn element(not_element: ActionResultCode) -> Self {
        Self {
            not_element,
            require_enabled: false,
            require_writable: false,
            require_onscreen: false,
        }
    }

    pub const fn enabled(mut self) -> Self {
        self.require_enabled = true;
        self
    }

    pub const fn writable(mut self) -> Self {
        self.require_writable = true;
        self
    }
}

/// A target checked against the frame at resolution time.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedTarget {
    Point(Point),
    Element {
        node: NodeInfo,
        /// Interaction point; present when the element intersects the viewport
        point: Option<Point>,
    },
}

impl ResolvedTarget {
    pub fn point(&self) -> Option<Point> {
        match self {
            ResolvedTarget::Point(point) => Some(*point),
            ResolvedTarget::Element { point, .. } => *point,
        }
    }

    pub fn node(&self) -> Option<&NodeInfo> {
        match self {
            ResolvedTarget::Point(_) => None,
            ResolvedTarget::Element { node, .. } => Some(node),
        }
    }
}

pub fn resolve_target(
    target: &Target,
    frame: &dyn FramePort,
    policy: ResolvePolicy,
) -> Result<ResolvedTarget, ActionResult> {
    if !frame.is_attached() {
        return Err(ActionResultCode::FrameWentAway.into());
    }

    let viewport = frame.viewport();
    match *target {
        Target::Coordinate(point) => {
            if !viewport.contains(point) {
                return Err(ActionResult::new(
                    ActionResultCode::CoordinatesOutOfBounds,
                    format!("{} outside viewport {}", point, viewport),
                ));
            }
            Ok(ResolvedTarget::Point(point))
        }
        Target::NodeHandle(id) => {
            let Some(node) = frame.node(id) else {
                return Err(ActionResult::new(
                    ActionResultCode::InvalidDomNodeId,
                    format!("node {} does not resolve", id),
                ));
            };
            let node = check_element(node, viewport, policy)?;
            let point = interaction_point(&node, viewport);
            debug!(node = %id, tag = %node.tag, ?point, "resolved node target");
            Ok(ResolvedTarget::Element { node, point })
        }
    }
}

fn check_element(
    node: NodeInfo,
    viewport: Rect,
    policy: ResolvePolicy,
) -> Result<NodeInfo, ActionResult> {
    if !node.is_element {
        return Err(ActionResult::new(
            policy.not_element,
            format!("node {} is not an element", node.id),
        ));
    }

    if let Some(control) = node.form_control {
        if policy.require_enabled && control.disabled {
            return Err(ActionResult::new(
                ActionResultCode::ElementDisabled,
                format!("<{}> is disabled", node.tag),
            ));
        }
        if policy.require_writable && control.read_only {
            return Err(ActionResult::new(
                ActionResultCode::ElementDisabled,
                format!("<{}> is read-only", node.tag),
            ));
        }
    }

    if policy.require_onscreen && interaction_point(&node, viewport).is_none() {
        return Err(ActionResult::new(
            ActionResultCode::ElementOffscreen,
            format!("<{}> bounds {} miss viewport {}", node.tag, node.bounds, viewport),
        ));
    }

    Ok(node)
}

/// Center of the element's visible part.
pub fn interaction_point(node: &NodeInfo, viewport: Rect) -> Option<Point> {
    viewport.intersect(&node.bounds).map(|visible| visible.center())
}
