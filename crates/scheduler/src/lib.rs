pub mod api;
pub mod error;
pub mod fixture;
pub mod metrics;
pub mod model;
pub mod registry;

pub use api::{ActionDispatcher, Dispatcher};
pub use error::DispatchError;
pub use model::{ActionRequest, DispatcherConfig};
pub use registry::{FrameBinding, FrameRegistry, InMemoryFrameRegistry};
