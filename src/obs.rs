//! Observability helpers for provider and plugin operations.
//!
//! Every operation runs inside a structured span named `social_auth.operation` with the
//! `operation` (kind) and `stage` (call site) fields.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `social_auth_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Building the login redirect.
	Authorize,
	/// Verifying the callback and exchanging the code.
	Verify,
	/// Fetching the user profile.
	Profile,
	/// Fetching the contact list.
	Contacts,
	/// Posting a status update.
	StatusUpdate,
	/// Generic authenticated call.
	Api,
	/// Feed plugin call.
	Feed,
	/// Career plugin call.
	Career,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Authorize => "authorize",
			OperationKind::Verify => "verify",
			OperationKind::Profile => "profile",
			OperationKind::Contacts => "contacts",
			OperationKind::StatusUpdate => "status_update",
			OperationKind::Api => "api",
			OperationKind::Feed => "feed",
			OperationKind::Career => "career",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs an async operation inside its span and records the outcome.
pub(crate) async fn observe<T, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_result(kind, &result);

	result
}

/// Runs a synchronous operation inside its span and records the outcome.
pub(crate) fn observe_sync<T>(
	kind: OperationKind,
	stage: &'static str,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	let _guard = OperationSpan::new(kind, stage).entered();

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = f();

	record_result(kind, &result);

	result
}

fn record_result<T>(kind: OperationKind, result: &Result<T>) {
	match result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(_) => record_operation_outcome(kind, OperationOutcome::Failure),
	}
}
