use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use crate::error::ViewFault;

/// Shown in place of the routed tree once a fault is trapped.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please reload the page.";

/// FaultState
///
/// Whether the boundary has trapped a descendant failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FaultState {
    #[default]
    Clear,
    Trapped(ViewFault),
}

impl FaultState {
    /// Transition on a captured fault. The first fault sticks; nothing resets it.
    pub fn capture(self, fault: ViewFault) -> FaultState {
        match self {
            FaultState::Clear => FaultState::Trapped(fault),
            trapped @ FaultState::Trapped(_) => trapped,
        }
    }

    pub fn is_trapped(&self) -> bool {
        matches!(self, FaultState::Trapped(_))
    }
}

/// FaultBoundary
///
/// Last-resort trap above everything routed. Every descendant failure, returned
/// or panicked, is handled the same way. Recovery needs a new boundary.
#[derive(Debug, Default)]
pub struct FaultBoundary {
    state: FaultState,
}

impl FaultBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FaultState {
        &self.state
    }

    pub fn is_faulted(&self) -> bool {
        self.state.is_trapped()
    }

    /// Records a fault raised outside a guarded render (e.g. a failed view load).
    pub fn trap(&mut self, fault: ViewFault) {
        if !self.is_faulted() {
            tracing::error!(error = %fault, "fault boundary trapped an error");
        }
        self.state = std::mem::take(&mut self.state).capture(fault);
    }

    /// Runs `render` beneath the boundary. Returns `None` once faulted, whether
    /// by this call or an earlier one.
    pub fn guard<T>(&mut self, render: impl FnOnce() -> Result<T, ViewFault>) -> Option<T> {
        if self.is_faulted() {
            return None;
        }

        match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(fault)) => {
                self.trap(fault);
                None
            }
            Err(payload) => {
                self.trap(ViewFault::Panicked(panic_message(&*payload)));
                None
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
