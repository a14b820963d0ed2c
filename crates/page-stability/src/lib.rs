//! Page stability monitoring
//!
//! After an action's input has been dispatched, [`PageStabilityMonitor`]
//! decides when the frame has settled enough to be observed: it waits out any
//! navigation, then network activity that started after the action, then a
//! main-thread idle period and a presented frame. Two timeouts bound the wait;
//! neither is ever reported as an error.

pub mod config;
pub mod error;
pub mod monitor;
pub mod ports;
pub mod state;

pub use config::StabilityConfig;
pub use error::StabilityError;
pub use monitor::{PageStabilityMonitor, StabilityCallback, StabilityReport, StabilityTimeout};
pub use ports::{
    NavigationCallback, NavigationOutcome, NetworkIdleRegistration, SignalCallback, StabilityHost,
};
pub use state::StabilityState;
