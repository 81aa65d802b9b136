//! Async execution bookkeeping: in-flight flags and fetch sequencing.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use byline_core::api::ApiResult;

use crate::policy::ErrorPolicy;
use crate::signal::Signal;

/// Identifier for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchId(u64);

/// Monotonic fetch sequence.
///
/// In-flight requests cannot be aborted; what can race is their effect on
/// shared state. A response is applied only while its id is still the most
/// recently issued one, so a slower, superseded request never overwrites
/// newer state.
#[derive(Debug, Default)]
pub struct FetchSeq {
    latest: Cell<u64>,
}

impl FetchSeq {
    /// Issues the next fetch id, superseding all earlier ones.
    pub fn issue(&self) -> FetchId {
        let id = self.latest.get().wrapping_add(1);
        self.latest.set(id);
        FetchId(id)
    }

    /// Returns true while `id` is the most recently issued fetch.
    pub fn is_latest(&self, id: FetchId) -> bool {
        self.latest.get() == id.0
    }
}

/// Wraps a fallible asynchronous operation with a single in-flight flag and
/// routes failures through the global error policy.
///
/// One guard per wrapped operation: the feed controller and each favorite
/// toggle own their own flag.
pub struct AsyncGuard {
    active: Signal<bool>,
    policy: Rc<ErrorPolicy>,
}

impl AsyncGuard {
    pub fn new(policy: Rc<ErrorPolicy>) -> Self {
        Self {
            active: Signal::new(false),
            policy,
        }
    }

    /// Observable in-flight flag; true exactly while a wrapped operation
    /// runs.
    pub fn active(&self) -> &Signal<bool> {
        &self.active
    }

    pub fn in_flight(&self) -> bool {
        self.active.get()
    }

    /// Runs `fut`, mirroring its lifetime into the in-flight flag.
    ///
    /// Success yields `Ok(Some(value))`. Failures go to the error policy:
    /// absorbed ones (session expiry) yield `Ok(None)`; any other error is
    /// returned to the caller unchanged. The flag is cleared last, after
    /// error routing, whatever the outcome.
    pub async fn run<T>(&self, fut: impl Future<Output = ApiResult<T>>) -> ApiResult<Option<T>> {
        self.active.set(true);
        let result = fut.await;
        let outcome = match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.policy.absorb(err) {
                None => Ok(None),
                Some(err) => Err(err),
            },
        };
        self.active.set(false);
        outcome
    }
}
