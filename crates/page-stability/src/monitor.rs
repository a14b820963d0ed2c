//! Stability monitor
//!
//! One monitor watches one frame for a single wait. The wait runs on its own
//! task: host signals and timers are funnelled into a channel and applied in
//! arrival order, each step checked against the transition table. Signals are
//! stamped with the generation of the state that registered them, so a signal
//! arriving after its state was left is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use soulbrowser_core_types::{FrameId, Journal};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::StabilityConfig;
use crate::error::StabilityError;
use crate::ports::{NavigationOutcome, NetworkIdleRegistration, StabilityHost};
use crate::state::{advance, StabilityState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StabilityTimeout {
    Global,
    MainThread,
}

/// Diagnostic summary handed to the wait's callback.
#[derive(Clone, Debug, PartialEq)]
pub struct StabilityReport {
    /// States entered, in order, ending with `Done`
    pub path: Vec<StabilityState>,
    pub elapsed: Duration,
    pub timeout: Option<StabilityTimeout>,
    pub frame_went_away: bool,
}

impl StabilityReport {
    pub fn timed_out(&self) -> bool {
        self.timeout.is_some()
    }

    pub fn visited(&self, state: StabilityState) -> bool {
        self.path.contains(&state)
    }
}

pub type StabilityCallback = Box<dyn FnOnce(StabilityReport) + Send + 'static>;

pub struct PageStabilityMonitor {
    host: Weak<dyn StabilityHost>,
    frame_id: FrameId,
    journal: Arc<dyn Journal>,
    config: StabilityConfig,
    waiting: AtomicBool,
}

impl PageStabilityMonitor {
    pub fn new(
        host: &Arc<dyn StabilityHost>,
        journal: Arc<dyn Journal>,
        config: StabilityConfig,
    ) -> Self {
        Self {
            host: Arc::downgrade(host),
            frame_id: host.frame_id(),
            journal,
            config: config.normalized(),
            waiting: AtomicBool::new(false),
        }
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    /// Starts the single wait this monitor allows.
    ///
    /// `callback` runs exactly once, on the monitor's task, after the frame
    /// settled or a timeout elapsed.
    ///
    /// # Panics
    /// Outside a tokio runtime.
    #[instrument(skip_all, fields(frame = %self.frame_id, delay_ms = delay.as_millis() as u64))]
    pub fn wait_for_stable(
        &self,
        delay: Duration,
        callback: StabilityCallback,
    ) -> Result<(), StabilityError> {
        if self.waiting.swap(true, Ordering::AcqRel) {
            return Err(StabilityError::AlreadyWaiting);
        }
        if self.host.strong_count() == 0 {
            return Err(StabilityError::FrameGone);
        }

        let (events, inbox) = mpsc::unbounded_channel();
        let wait = Wait {
            host: self.host.clone(),
            frame_id: self.frame_id.clone(),
            journal: Arc::clone(&self.journal),
            config: self.config.clone(),
            delay,
            events,
            state: StabilityState::Initial,
            generation: 0,
            path: Vec::new(),
            started_at: Instant::now(),
            baseline: 0,
            timeout: None,
            frame_went_away: false,
            timers: Vec::new(),
            network_idle: None,
            callback: Some(callback),
        };
        tokio::spawn(wait.run(inbox));
        Ok(())
    }

    /// Future form of [`wait_for_stable`](Self::wait_for_stable).
    pub async fn wait_until_stable(
        &self,
        delay: Duration,
    ) -> Result<StabilityReport, StabilityError> {
        let (tx, rx) = oneshot::channel();
        self.wait_for_stable(
            delay,
            Box::new(move |report| {
                let _ = tx.send(report);
            }),
        )?;
        rx.await.map_err(|_| StabilityError::Interrupted)
    }
}

#[derive(Debug)]
enum HostSignal {
    NavigationSettled(NavigationOutcome),
    NetworkIdle,
    MainThreadIdle,
    FramePresented,
    /// The host dropped a callback without running it
    Dropped,
}

#[derive(Debug)]
enum MonitorEvent {
    StartDelayElapsed,
    GlobalTimeout,
    MainThreadTimeout,
    Signal { generation: u64, signal: HostSignal },
}

/// Carried inside host callbacks; reports `Dropped` if never fired.
struct SignalSender {
    events: mpsc::UnboundedSender<MonitorEvent>,
    generation: u64,
    fired: bool,
}

impl SignalSender {
    fn fire(mut self, signal: HostSignal) {
        self.fired = true;
        let _ = self.events.send(MonitorEvent::Signal {
            generation: self.generation,
            signal,
        });
    }
}

impl Drop for SignalSender {
    fn drop(&mut self) {
        if !self.fired {
            let _ = self.events.send(MonitorEvent::Signal {
                generation: self.generation,
                signal: HostSignal::Dropped,
            });
        }
    }
}

struct Wait {
    host: Weak<dyn StabilityHost>,
    frame_id: FrameId,
    journal: Arc<dyn Journal>,
    config: StabilityConfig,
    delay: Duration,
    events: mpsc::UnboundedSender<MonitorEvent>,
    state: StabilityState,
    generation: u64,
    path: Vec<StabilityState>,
    started_at: Instant,
    baseline: usize,
    timeout: Option<StabilityTimeout>,
    frame_went_away: bool,
    timers: Vec<JoinHandle<()>>,
    network_idle: Option<NetworkIdleRegistration>,
    callback: Option<StabilityCallback>,
}

impl Wait {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<MonitorEvent>) {
        self.started_at = Instant::now();
        self.transition(StabilityState::MonitorStartDelay);
        while !self.state.is_terminal() {
            match inbox.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
    }

    fn transition(&mut self, next: StabilityState) {
        let from = self.state;
        self.state = advance(from, next);
        self.generation += 1;
        self.path.push(next);
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        self.journal
            .record(&self.frame_id, next.name(), &format!("{elapsed_ms}ms"));
        debug!(frame = %self.frame_id, %from, to = %next, elapsed_ms, "stability transition");
        self.on_enter(from, next);
    }

    fn on_enter(&mut self, from: StabilityState, state: StabilityState) {
        use StabilityState::*;

        match state {
            MonitorStartDelay => {
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                self.baseline = host.active_request_count();
                self.arm(self.config.global_timeout(), MonitorEvent::GlobalTimeout);
                self.arm(self.delay, MonitorEvent::StartDelayElapsed);
            }
            StartMonitoring => {
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                let next = if host.is_navigation_in_flight() {
                    WaitForNavigation
                } else if host.active_request_count() > self.baseline {
                    WaitForNetworkIdle
                } else {
                    WaitForMainThreadIdle
                };
                drop(host);
                self.transition(next);
            }
            WaitForNavigation => {
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                let signal = self.signal();
                host.on_navigation_settled(Box::new(move |outcome| {
                    signal.fire(HostSignal::NavigationSettled(outcome))
                }));
            }
            WaitForNetworkIdle => {
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                let signal = self.signal();
                let registration =
                    host.register_network_idle(Box::new(move || signal.fire(HostSignal::NetworkIdle)));
                drop(host);
                match registration {
                    Some(registration) => self.network_idle = Some(registration),
                    None => self.transition(WaitForMainThreadIdle),
                }
            }
            WaitForMainThreadIdle => {
                self.network_idle = None;
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                self.arm(
                    self.config.main_thread_timeout(),
                    MonitorEvent::MainThreadTimeout,
                );
                let signal = self.signal();
                host.post_idle_task(Box::new(move || signal.fire(HostSignal::MainThreadIdle)));
            }
            WaitForVisualStateRequest => {
                let Some(host) = self.host.upgrade() else {
                    return self.frame_went_away();
                };
                let signal = self.signal();
                let requested = host
                    .request_presentation(Box::new(move || signal.fire(HostSignal::FramePresented)));
                drop(host);
                if !requested {
                    debug!(frame = %self.frame_id, "no compositor; not waiting for presentation");
                    self.transition(InvokeCallback);
                }
            }
            TimeoutGlobal | TimeoutMainThread => {
                let timeout = if state == TimeoutGlobal {
                    StabilityTimeout::Global
                } else {
                    StabilityTimeout::MainThread
                };
                self.timeout = Some(timeout);
                warn!(
                    frame = %self.frame_id,
                    waiting_in = %from,
                    ?timeout,
                    "stability wait timed out; treating frame as stable"
                );
                self.transition(InvokeCallback);
            }
            InvokeCallback => {
                for timer in self.timers.drain(..) {
                    timer.abort();
                }
                self.network_idle = None;
                let callback = self.callback.take();
                self.transition(Done);

                let report = self.report();
                info!(
                    frame = %self.frame_id,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    timeout = ?report.timeout,
                    "frame considered stable"
                );
                if let Some(callback) = callback {
                    callback(report);
                }
            }
            Initial | Done => {}
        }
    }

    fn handle(&mut self, event: MonitorEvent) {
        use StabilityState::*;

        match event {
            MonitorEvent::StartDelayElapsed => {
                if self.state == MonitorStartDelay {
                    self.transition(StartMonitoring);
                }
            }
            MonitorEvent::GlobalTimeout => self.fire_timeout(TimeoutGlobal),
            MonitorEvent::MainThreadTimeout => self.fire_timeout(TimeoutMainThread),
            MonitorEvent::Signal { generation, signal } => {
                if generation != self.generation {
                    debug!(frame = %self.frame_id, ?signal, "stale stability signal ignored");
                    return;
                }
                match (self.state, signal) {
                    (WaitForNavigation, HostSignal::NavigationSettled(outcome)) => {
                        let event = match outcome {
                            NavigationOutcome::Committed => "NavigationCommitted",
                            NavigationOutcome::Failed => "NavigationFailed",
                        };
                        self.journal.record(&self.frame_id, event, "");
                        self.transition(InvokeCallback);
                    }
                    (WaitForNetworkIdle, HostSignal::NetworkIdle) => {
                        self.transition(WaitForMainThreadIdle)
                    }
                    (WaitForMainThreadIdle, HostSignal::MainThreadIdle) => {
                        self.transition(WaitForVisualStateRequest)
                    }
                    (WaitForVisualStateRequest, HostSignal::FramePresented) => {
                        self.transition(InvokeCallback)
                    }
                    (_, HostSignal::Dropped) if self.host.strong_count() == 0 => {
                        self.frame_went_away()
                    }
                    (state, signal) => {
                        debug!(frame = %self.frame_id, %state, ?signal, "signal ignored");
                    }
                }
            }
        }
    }

    fn fire_timeout(&mut self, timeout: StabilityState) {
        if self.state.can_transition_to(timeout) {
            self.transition(timeout);
        } else {
            debug!(frame = %self.frame_id, state = %self.state, %timeout, "late timeout ignored");
        }
    }

    fn frame_went_away(&mut self) {
        self.frame_went_away = true;
        self.journal
            .record(&self.frame_id, "FrameWentAway", self.state.name());
        warn!(frame = %self.frame_id, state = %self.state, "frame went away during stability wait");
        self.transition(StabilityState::InvokeCallback);
    }

    fn signal(&self) -> SignalSender {
        SignalSender {
            events: self.events.clone(),
            generation: self.generation,
            fired: false,
        }
    }

    fn arm(&mut self, after: Duration, event: MonitorEvent) {
        let events = self.events.clone();
        self.timers.push(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(event);
        }));
    }

    fn report(&self) -> StabilityReport {
        StabilityReport {
            path: self.path.clone(),
            elapsed: self.started_at.elapsed(),
            timeout: self.timeout,
            frame_went_away: self.frame_went_away,
        }
    }
}
