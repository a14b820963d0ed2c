//! Actor action primitives - validated synthetic input against a live frame
//!
//! This crate provides the tool family behind single agent actions:
//! - 6 tools: click, mouse move, type, scroll, select, drag-and-release
//! - Shared target resolution with one edge-case policy
//! - Typed result codes reported for every outcome
//! - The frame port the tools drive, so any document model can back them

pub mod errors;
pub mod keyboard;
mod locator;
pub mod policy;
pub mod ports;
mod primitives;
pub mod types;

#[cfg(test)]
mod testing;

pub use errors::*;
pub use locator::*;
pub use policy::ToolTimings;
pub use ports::*;
pub use primitives::*;
pub use types::*;
