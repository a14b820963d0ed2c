pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod run;
pub mod runtime;

pub use app::run;
pub use run::{run_fixture_action, RunOutcome};
pub use runtime::{init_logging, LogFormat};
