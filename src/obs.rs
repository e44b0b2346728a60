//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `digilib_client.call` with the
//!   `call` (kind) and `stage` (call site) fields, plus warnings for swallowed failures.
//! - Enable `metrics` to increment the `digilib_client_call_total` counter for every
//!   attempt/success/failure/queued event, labeled by `call` + `outcome`, and the
//!   `digilib_client_store_failure_total` counter labeled by `op`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, store::StoreError};

/// Kinds of calls observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Caller-issued API request.
	Request,
	/// Access-token refresh call.
	Refresh,
	/// Replay of a request after a successful refresh.
	Replay,
	/// Session helpers (login, register, logout, restore).
	Session,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Replay => "replay",
			CallKind::Session => "session",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Request parked behind an in-flight refresh.
	Queued,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Queued => "queued",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a persistence failure that was absorbed by the token store.
pub fn record_store_failure(op: &'static str, err: &StoreError) {
	#[cfg(feature = "tracing")]
	::tracing::warn!(op, error = %err, "token persistence failed; continuing with in-memory state");
	#[cfg(not(feature = "tracing"))]
	let _ = err;

	record_store_failure_metric(op);
}

/// Records an error that a helper deliberately swallowed (e.g. best-effort logout).
pub fn record_swallowed_error(kind: CallKind, stage: &'static str, err: &Error) {
	#[cfg(feature = "tracing")]
	::tracing::warn!(call = kind.as_str(), stage, error = %err, "ignoring best-effort call failure");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, err);

	record_call_outcome(kind, CallOutcome::Failure);
}
