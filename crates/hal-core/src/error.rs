//! Error kinds crossing the HAL's public boundary (§7).

use thiserror::Error;

/// Control-plane error: returned by `register`, `select`, `init`.
///
/// Every fallible public function returns one of these instead of
/// panicking or unwinding; there is no out-of-band error channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HalError {
    /// The chosen backend's `init` hook rejected its state.
    #[error("backend init hook failed: {0}")]
    InitFailed(String),

    /// No registered backend's required features are a subset of the probed bitmask.
    #[error("no eligible backend for the probed feature set")]
    NoBackend,

    /// Bad parameters: null mandatory pointer, zero-sized capacity, missing name, capacity exceeded.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),

    /// Requested backend type not registered, or not feasible on this hardware.
    #[error("backend type unsupported on this hardware")]
    Unsupported,
}

/// Hot-path dispatch result. Carries no heap allocation so it is safe
/// to construct from inside a kernel call on any thread (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Ok,
    /// `n % qk != 0`, a required pointer was null, or `nrc`/shape was malformed.
    Invalid,
    /// The active backend declined this shape.
    Unsupported,
    /// No active backend; caller must call `init()` first.
    NoBackend,
}

impl DispatchStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, DispatchStatus::Ok)
    }
}

impl From<HalError> for DispatchStatus {
    fn from(e: HalError) -> Self {
        match e {
            HalError::InitFailed(_) => DispatchStatus::NoBackend,
            HalError::NoBackend => DispatchStatus::NoBackend,
            HalError::Invalid(_) => DispatchStatus::Invalid,
            HalError::Unsupported => DispatchStatus::Unsupported,
        }
    }
}
