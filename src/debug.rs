//! Hand-off of an executable fragment to an external code-level stepper.

use log::{info, warn};

use crate::types::{
    DebugError, Document, Fragment, NavigatorCursor, SessionEvent, SessionLog, StepperAbort,
};

/// What the stepper is asked to run, with a read-only view of the frozen
/// navigator state.
#[derive(Debug, Clone, Copy)]
pub struct DebugRequest<'a> {
    fragment: &'a Fragment,
    identity: &'a str,
    document: &'a Document,
    cursor: &'a NavigatorCursor,
}

impl<'a> DebugRequest<'a> {
    #[must_use]
    pub fn new(
        fragment: &'a Fragment,
        identity: &'a str,
        document: &'a Document,
        cursor: &'a NavigatorCursor,
    ) -> Self {
        Self {
            fragment,
            identity,
            document,
            cursor,
        }
    }

    #[must_use]
    pub fn fragment(&self) -> &'a Fragment {
        self.fragment
    }

    /// Base name of the defining file, or the display surface identifier.
    #[must_use]
    pub fn identity(&self) -> &'a str {
        self.identity
    }

    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.document
    }

    #[must_use]
    pub fn cursor(&self) -> &'a NavigatorCursor {
        self.cursor
    }

    /// The search limit a matcher fragment would be called with.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.cursor.limit()
    }
}

/// An external stepper with single-statement control over fragments.
///
/// `invoke` blocks until the stepping session ends.
pub trait Stepper {
    /// # Errors
    ///
    /// Returns [`StepperAbort`] if the session ended abnormally.
    fn invoke(&mut self, request: &DebugRequest<'_>) -> Result<(), StepperAbort>;
}

impl<F> Stepper for F
where
    F: FnMut(&DebugRequest<'_>) -> Result<(), StepperAbort>,
{
    fn invoke(&mut self, request: &DebugRequest<'_>) -> Result<(), StepperAbort> {
        self(request)
    }
}

/// Pairs a [`Stepper`] with the [`SessionLog`] its sessions are recorded in.
#[derive(Debug)]
pub struct DebugBridge<S, L> {
    stepper: S,
    log: L,
}

/// Records the stop event when dropped, on return and on unwinding alike.
struct StopGuard<'a, L: SessionLog> {
    log: &'a mut L,
}

impl<L: SessionLog> Drop for StopGuard<'_, L> {
    fn drop(&mut self) {
        self.log.log(SessionEvent::Stopped);
        info!("debugger stopped");
    }
}

impl<S: Stepper, L: SessionLog> DebugBridge<S, L> {
    pub fn new(stepper: S, log: L) -> Self {
        Self { stepper, log }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn stepper_mut(&mut self) -> &mut S {
        &mut self.stepper
    }

    pub fn into_parts(self) -> (S, L) {
        (self.stepper, self.log)
    }

    /// Log `started`, block in the stepper, then log `stopped`.
    ///
    /// Exactly one `stopped` follows the `started`, even when the stepper
    /// fails or panics.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::Aborted`] if the stepper aborted.
    pub fn enter(
        &mut self,
        request: &DebugRequest<'_>,
        explanation: String,
    ) -> Result<(), DebugError> {
        info!(
            "debugging {} from {} at: {explanation}",
            request.fragment(),
            request.identity()
        );
        self.log.log(SessionEvent::started(request.identity(), explanation));
        let result = {
            let _guard = StopGuard { log: &mut self.log };
            self.stepper.invoke(request)
        };
        result.map_err(|abort| {
            warn!("{abort}");
            DebugError::Aborted(abort)
        })
    }
}
