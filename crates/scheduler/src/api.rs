use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use action_primitives::{ActionResult, ActionResultCode, ToolContext, ToolInstance};
use async_trait::async_trait;
use page_stability::PageStabilityMonitor;
use soulbrowser_core_types::SoulError;
use tracing::{debug, info, instrument, warn};

use crate::error::DispatchError;
use crate::metrics;
use crate::model::{ActionRequest, DispatcherConfig};
use crate::registry::FrameRegistry;

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Runs one action and waits for its frame to settle.
    ///
    /// The returned result is always the tool's; stability timing is only
    /// logged and journaled.
    async fn invoke(&self, request: ActionRequest) -> Result<ActionResult, SoulError>;
}

#[async_trait]
impl<D> Dispatcher for Arc<D>
where
    D: Dispatcher + ?Sized,
{
    async fn invoke(&self, request: ActionRequest) -> Result<ActionResult, SoulError> {
        (**self).invoke(request).await
    }
}

/// Single-flight dispatcher over a frame registry.
pub struct ActionDispatcher<R>
where
    R: FrameRegistry + 'static,
{
    registry: Arc<R>,
    config: DispatcherConfig,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, DispatchError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| DispatchError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R> ActionDispatcher<R>
where
    R: FrameRegistry + 'static,
{
    pub fn new(registry: Arc<R>, config: DispatcherConfig) -> Self {
        Self {
            registry,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<R> Dispatcher for ActionDispatcher<R>
where
    R: FrameRegistry + 'static,
{
    #[instrument(
        skip_all,
        fields(action = request.action.name(), frame = %request.frame, action_id = %request.action_id)
    )]
    async fn invoke(&self, request: ActionRequest) -> Result<ActionResult, SoulError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let ActionRequest {
            frame: frame_id,
            action,
            journal,
            ..
        } = request;
        let tool_name = action.name();
        metrics::record_invoked(tool_name);

        let binding = match self.registry.resolve(&frame_id) {
            Some(binding) if binding.is_usable() => binding,
            _ => {
                metrics::record_frame_gone(tool_name);
                journal.record(&frame_id, "FrameWentAway", tool_name);
                warn!("target frame unavailable; no tool built");
                return Ok(ActionResult::new(
                    ActionResultCode::FrameWentAway,
                    format!("frame {} is not available", frame_id),
                ));
            }
        };

        let (result, observation_delay) = {
            let ctx = ToolContext::new(
                &binding.frame,
                Arc::clone(&journal),
                self.config.tools.clone(),
            );
            let tool = ToolInstance::build(action, ctx);
            let result = tool.execute();
            (result, tool.execution_observation_delay())
        };

        if binding.frame.is_attached() {
            let monitor = PageStabilityMonitor::new(
                &binding.signals,
                Arc::clone(&journal),
                self.config.stability.clone(),
            );
            // Only the registry keeps the frame alive while waiting.
            drop(binding);
            match monitor.wait_until_stable(observation_delay).await {
                Ok(report) => {
                    if report.timed_out() {
                        metrics::record_stability_timeout(tool_name);
                    }
                    debug!(
                        path = ?report.path,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        timeout = ?report.timeout,
                        "stability report"
                    );
                }
                Err(err) => warn!(%err, "stability wait not performed"),
            }
        } else {
            debug!("frame detached by the tool; skipping stability wait");
        }

        if result.is_ok() {
            metrics::record_succeeded(tool_name);
        } else {
            metrics::record_failed(tool_name);
        }
        info!(code = ?result.code, "action finished");
        Ok(result)
    }
}
