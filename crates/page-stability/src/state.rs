use std::fmt;

/// States of the stability monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StabilityState {
    Initial,
    MonitorStartDelay,
    StartMonitoring,
    WaitForNavigation,
    WaitForNetworkIdle,
    WaitForMainThreadIdle,
    WaitForVisualStateRequest,
    TimeoutGlobal,
    TimeoutMainThread,
    InvokeCallback,
    Done,
}

use StabilityState::*;

impl StabilityState {
    pub fn name(self) -> &'static str {
        match self {
            Initial => "Initial",
            MonitorStartDelay => "MonitorStartDelay",
            StartMonitoring => "StartMonitoring",
            WaitForNavigation => "WaitForNavigation",
            WaitForNetworkIdle => "WaitForNetworkIdle",
            WaitForMainThreadIdle => "WaitForMainThreadIdle",
            WaitForVisualStateRequest => "WaitForVisualStateRequest",
            TimeoutGlobal => "TimeoutGlobal",
            TimeoutMainThread => "TimeoutMainThread",
            InvokeCallback => "InvokeCallback",
            Done => "Done",
        }
    }

    /// Allowed successors.
    ///
    /// `InvokeCallback` out of `MonitorStartDelay`, `StartMonitoring`,
    /// `WaitForNetworkIdle` and `WaitForMainThreadIdle` is only taken when the
    /// bound frame went away.
    pub fn allowed_next(self) -> &'static [StabilityState] {
        match self {
            Initial => &[MonitorStartDelay],
            MonitorStartDelay => &[StartMonitoring, TimeoutGlobal, InvokeCallback],
            StartMonitoring => &[
                WaitForNavigation,
                WaitForNetworkIdle,
                WaitForMainThreadIdle,
                InvokeCallback,
            ],
            WaitForNavigation => &[InvokeCallback, TimeoutGlobal],
            WaitForNetworkIdle => &[WaitForMainThreadIdle, TimeoutGlobal, InvokeCallback],
            WaitForMainThreadIdle => &[
                WaitForVisualStateRequest,
                TimeoutGlobal,
                TimeoutMainThread,
                InvokeCallback,
            ],
            WaitForVisualStateRequest => &[InvokeCallback, TimeoutGlobal, TimeoutMainThread],
            TimeoutGlobal | TimeoutMainThread => &[InvokeCallback],
            InvokeCallback => &[Done],
            Done => &[],
        }
    }

    pub fn can_transition_to(self, next: StabilityState) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self == Done
    }
}

impl fmt::Display for StabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checked step through the transition table.
///
/// # Panics
/// When `next` is not an allowed successor of `from`.
pub(crate) fn advance(from: StabilityState, next: StabilityState) -> StabilityState {
    assert!(
        from.can_transition_to(next),
        "illegal stability transition {from} -> {next}"
    );
    next
}
