//! Retry-with-reauthentication wrapper and API circuit breaker.
//!
//! Every API call made by the controllers and the poller goes through
//! [`Session::call`]:
//!
//! ```text
//! Idle ─► Attempt(0) ─┬─ ok ─────────────────────────────► Done(Some)
//!                     ├─ 401 ─► Reauth ─► Attempt(1) ─┬─ ok ──► Done(Some)
//!                     │                               └─ 401 ─► Done(None)
//!                     ├─ 404 ────────────────────────────► Err(NotFound)
//!                     └─ other ──────────────────────────► Disabled
//! ```
//!
//! Re-login is coalesced, so a burst of concurrent 401s logs in once.
//! `Disabled` is permanent for the life of the process.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bedcontrol_api::Error as ApiError;
use tracing::{debug, error, warn};

use crate::api::BedApi;
use crate::coalesce::Coalescer;
use crate::error::CoreError;

/// Outcome of a (shared) re-login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Relogin {
    Ok,
    Rejected,
    Failed(ApiFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ApiFailure {
    message: String,
    status: Option<u16>,
}

impl From<&ApiError> for ApiFailure {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.to_string(),
            status: err.status(),
        }
    }
}

/// Shared handle to the vendor API with re-login and circuit breaking.
pub struct Session<A> {
    api: Arc<A>,
    relogin: Coalescer<(), Relogin>,
    disabled: AtomicBool,
}

impl<A: BedApi> Session<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            relogin: Coalescer::new(),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Whether the circuit breaker has tripped.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Log in up front. Shares the in-flight attempt with any concurrent
    /// re-login.
    pub async fn login(&self) -> Result<bool, CoreError> {
        if self.is_disabled() {
            return Err(CoreError::ApiDisabled);
        }
        match self.relogin().await {
            Relogin::Ok => Ok(true),
            Relogin::Rejected => Ok(false),
            Relogin::Failed(failure) => Err(self.trip(failure)),
        }
    }

    /// Run `op`, re-authenticating and retrying once on an expired session.
    ///
    /// Returns `Ok(None)` when the session cannot be re-established; the
    /// caller decides how to surface that. A 404 is returned as
    /// [`CoreError::NotFound`] without retrying. Any other failure trips
    /// the circuit breaker, after which every call returns
    /// [`CoreError::ApiDisabled`] without touching the network.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<Option<T>, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if self.is_disabled() {
            return Err(CoreError::ApiDisabled);
        }

        match op().await {
            Ok(value) => return Ok(Some(value)),
            Err(e) if e.is_auth_expired() => {
                debug!(error = %e, "session expired, logging in again");
            }
            Err(e) => return Err(self.fail(&e)),
        }

        match self.relogin().await {
            Relogin::Ok => {}
            Relogin::Rejected => {
                warn!("re-login rejected by SleepIQ");
                return Ok(None);
            }
            Relogin::Failed(failure) => return Err(self.trip(failure)),
        }

        match op().await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_auth_expired() => {
                warn!(error = %e, "still unauthorized after re-login, giving up");
                Ok(None)
            }
            Err(e) => Err(self.fail(&e)),
        }
    }

    fn relogin(&self) -> impl Future<Output = Relogin> + Send + 'static {
        let api = Arc::clone(&self.api);
        self.relogin.coalesce((), move || async move {
            match api.login().await {
                Ok(()) => Relogin::Ok,
                Err(e) if e.is_auth_expired() => Relogin::Rejected,
                Err(e) => Relogin::Failed(ApiFailure::from(&e)),
            }
        })
    }

    fn fail(&self, err: &ApiError) -> CoreError {
        if err.is_not_found() {
            return not_found(err);
        }
        self.trip(ApiFailure::from(err))
    }

    fn trip(&self, failure: ApiFailure) -> CoreError {
        if self.disabled.swap(true, Ordering::SeqCst) {
            return CoreError::ApiDisabled;
        }
        error!(
            error = %failure.message,
            "Failed to interact with SleepIQ API. Disabling further API calls"
        );
        CoreError::Api {
            message: failure.message,
            status: failure.status,
        }
    }
}

fn not_found(err: &ApiError) -> CoreError {
    match err {
        ApiError::NotFound { path } => CoreError::NotFound { path: path.clone() },
        other => CoreError::NotFound {
            path: other.to_string(),
        },
    }
}
