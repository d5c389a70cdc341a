//! Deferred one-shot invocations
//!
//! A thumbnail notification does not invoke right away: it schedules a single
//! dispatch on the tokio timer. Pending calls can be cancelled through their
//! [`DeferredHandle`] or all at once through the [`DeferredInvoker`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

use super::dispatcher::InvocationDispatcher;
use super::error::Result;
use super::invocation::Disposition;

/// What a new schedule does to calls that are still pending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReschedulePolicy {
    /// Cancel pending calls so only the newest fires
    #[default]
    Replace,
    /// Leave pending calls alone; every schedule fires
    Independent,
}

/// Handle to a single scheduled invocation
#[derive(Debug, Clone)]
pub struct DeferredHandle {
    abort: AbortHandle,
    delay: Duration,
}

impl DeferredHandle {
    /// Cancel the call if it has not fired yet
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Whether the call has fired or been cancelled
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Delay the call was scheduled with
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Schedules delayed dispatches of the default request
pub struct DeferredInvoker {
    dispatcher: InvocationDispatcher,
    policy: ReschedulePolicy,
    pending: Mutex<Vec<JoinHandle<Disposition>>>,
}

impl DeferredInvoker {
    /// Create a deferred invoker
    pub fn new(dispatcher: InvocationDispatcher, policy: ReschedulePolicy) -> Self {
        Self {
            dispatcher,
            policy,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Active reschedule policy
    pub fn policy(&self) -> ReschedulePolicy {
        self.policy
    }

    /// Schedule one dispatch after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, delay: Duration) -> DeferredHandle {
        let mut pending = self.pending.lock();
        pending.retain(|task| !task.is_finished());

        if self.policy == ReschedulePolicy::Replace && !pending.is_empty() {
            tracing::debug!(replaced = pending.len(), "replacing pending invocation");
            for task in pending.drain(..) {
                task.abort();
            }
        }

        let dispatcher = self.dispatcher.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("deferred invoke firing");
            dispatcher.dispatch_default()
        });

        let handle = DeferredHandle {
            abort: task.abort_handle(),
            delay,
        };
        pending.push(task);
        handle
    }

    /// Cancel every pending call, returning how many were still pending
    ///
    /// A call whose dispatch is already running on another worker thread
    /// cannot be stopped and still counts here. On a current-thread runtime
    /// that cannot happen, since dispatch never yields.
    pub fn cancel_pending(&self) -> usize {
        let mut pending = self.pending.lock();
        let mut cancelled = 0;
        for task in pending.drain(..) {
            if !task.is_finished() {
                task.abort();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Number of calls that have neither fired nor been cancelled
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Wait for every scheduled call and collect the dispositions of those that fired
    pub async fn drain(&self) -> Result<Vec<Disposition>> {
        let tasks: Vec<_> = self.pending.lock().drain(..).collect();
        let mut fired = Vec::with_capacity(tasks.len());

        for task in tasks {
            match task.await {
                Ok(disposition) => fired.push(disposition),
                Err(err) if err.is_cancelled() => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(fired)
    }
}
