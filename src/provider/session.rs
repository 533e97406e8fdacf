//! Per-provider session record and its state machine.
//!
//! ```text
//! Unauthenticated --login_redirect_url--> AwaitingCallback --verify_response--> Authenticated
//!        ^                                     |   ^                                  |
//!        +--------------logout-----------------+   +--login_redirect_url (re-issue)   |
//!        +--------------------------------------logout--------------------------------+
//! set_access_grant: any state --> Authenticated
//! ```

// self
use crate::{
	_prelude::*,
	auth::{AntiForgeryState, CallbackParams, PendingAuthorization, Permission},
	model::Profile,
};

/// Lifecycle states of a provider session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	/// No authorization in flight and no grant.
	#[default]
	Unauthenticated,
	/// Redirect issued; waiting for the provider callback.
	AwaitingCallback,
	/// Grant stored.
	Authenticated,
}
impl SessionState {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionState::Unauthenticated => "unauthenticated",
			SessionState::AwaitingCallback => "awaiting_callback",
			SessionState::Authenticated => "authenticated",
		}
	}
}
impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Mutable session state owned by one provider instance.
#[derive(Clone, Debug)]
pub struct Session {
	state: SessionState,
	anti_forgery: AntiForgeryState,
	permission: Permission,
	redirect_uri: Option<Url>,
	profile: Option<Profile>,
}
impl Session {
	/// Starts an unauthenticated session with a fresh anti-forgery token.
	pub fn new(permission: Permission) -> Self {
		Self {
			state: SessionState::Unauthenticated,
			anti_forgery: AntiForgeryState::generate(),
			permission,
			redirect_uri: None,
			profile: None,
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Anti-forgery token issued for this session.
	pub fn anti_forgery(&self) -> &AntiForgeryState {
		&self.anti_forgery
	}

	/// Requested permission level.
	pub fn permission(&self) -> Permission {
		self.permission
	}

	/// Changes the permission used by the next authorization redirect.
	pub fn set_permission(&mut self, permission: Permission) {
		self.permission = permission;
	}

	/// Return URL of the authorization in flight.
	pub fn redirect_uri(&self) -> Option<&Url> {
		self.redirect_uri.as_ref()
	}

	/// Cached profile.
	pub fn profile(&self) -> Option<&Profile> {
		self.profile.as_ref()
	}

	/// Caches the profile fetched for the current grant.
	pub fn cache_profile(&mut self, profile: Profile) {
		self.profile = Some(profile);
	}

	/// Moves to [`SessionState::AwaitingCallback`]; re-issuing keeps the same token.
	pub fn begin_authorization(&mut self, return_url: Url) -> Result<()> {
		if self.state == SessionState::Authenticated {
			return Err(Error::invalid_input(
				"session is already authenticated; log out before starting a new authorization",
			));
		}

		self.state = SessionState::AwaitingCallback;
		self.redirect_uri = Some(return_url);

		Ok(())
	}

	/// Checks a callback against the authorization in flight and returns its return URL.
	///
	/// A callback without a `state` parameter is accepted; one whose `state` differs from the
	/// issued token fails with [`Error::StateMismatch`] tagged with `authorization_endpoint`.
	/// The session is left unchanged either way.
	pub fn check_callback(
		&self,
		callback: &CallbackParams,
		authorization_endpoint: &str,
	) -> Result<Url> {
		let redirect_uri = match (self.state, self.redirect_uri.as_ref()) {
			(SessionState::AwaitingCallback, Some(redirect_uri)) => redirect_uri,
			(state, _) =>
				return Err(Error::invalid_input(format!(
					"no authorization is awaiting a callback (session is {state})"
				))),
		};

		match callback.state() {
			Some(returned) if !self.anti_forgery.matches(returned) => {
				tracing::warn!("Callback state does not match the issued anti-forgery token.");

				Err(Error::StateMismatch { endpoint: authorization_endpoint.to_owned() })
			},
			Some(_) => Ok(redirect_uri.clone()),
			None => {
				tracing::debug!("Callback carries no state parameter; skipping the check.");

				Ok(redirect_uri.clone())
			},
		}
	}

	/// Moves to [`SessionState::Authenticated`] for a newly stored grant.
	pub fn authenticate(&mut self) {
		self.state = SessionState::Authenticated;
		self.redirect_uri = None;
		self.profile = None;
	}

	/// Fails with [`Error::NotAuthenticated`] unless a grant is stored.
	pub fn require_authenticated(&self, endpoint: &str) -> Result<()> {
		if self.state == SessionState::Authenticated {
			Ok(())
		} else {
			Err(Error::NotAuthenticated { endpoint: endpoint.to_owned() })
		}
	}

	/// Snapshot of the authorization in flight, for handling the callback elsewhere.
	pub fn pending(&self) -> Option<PendingAuthorization> {
		match (self.state, self.redirect_uri.as_ref()) {
			(SessionState::AwaitingCallback, Some(redirect_uri)) => Some(PendingAuthorization {
				state: self.anti_forgery.clone(),
				redirect_uri: redirect_uri.clone(),
			}),
			_ => None,
		}
	}

	/// Restores an authorization issued by another session.
	pub fn resume(&mut self, pending: PendingAuthorization) -> Result<()> {
		if self.state == SessionState::Authenticated {
			return Err(Error::invalid_input(
				"session is already authenticated; log out before resuming an authorization",
			));
		}

		self.anti_forgery = pending.state;
		self.state = SessionState::AwaitingCallback;
		self.redirect_uri = Some(pending.redirect_uri);

		Ok(())
	}

	/// Returns to [`SessionState::Unauthenticated`]; idempotent.
	pub fn logout(&mut self) {
		self.state = SessionState::Unauthenticated;
		self.redirect_uri = None;
		self.profile = None;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const AUTHORIZE: &str = "https://idp.example.com/authorize";

	fn return_url() -> Url {
		Url::parse("https://app.example.com/callback").expect("Return URL fixture should parse.")
	}

	fn awaiting() -> Session {
		let mut session = Session::new(Permission::Default);

		session.begin_authorization(return_url()).expect("Authorization should begin.");

		session
	}

	#[test]
	fn redirect_can_be_reissued_until_authenticated() {
		let mut session = awaiting();
		let token = session.anti_forgery().clone();

		session.begin_authorization(return_url()).expect("Re-issuing should be allowed.");

		assert_eq!(session.state(), SessionState::AwaitingCallback);
		assert_eq!(session.anti_forgery(), &token);

		session.authenticate();

		assert!(matches!(
			session.begin_authorization(return_url()),
			Err(Error::InvalidInput { .. })
		));
		assert_eq!(session.state(), SessionState::Authenticated);
	}

	#[test]
	fn callbacks_require_an_authorization_in_flight() {
		let mut session = Session::new(Permission::Default);
		let callback: CallbackParams = [("code", "abc")].into_iter().collect();
		let err = session
			.check_callback(&callback, AUTHORIZE)
			.expect_err("Idle sessions should reject callbacks.");

		assert!(matches!(err, Error::InvalidInput { .. }));

		session.authenticate();

		let err = session
			.check_callback(&callback, AUTHORIZE)
			.expect_err("Authenticated sessions should reject callbacks.");

		assert!(matches!(err, Error::InvalidInput { .. }));
	}

	#[test]
	fn state_check_is_skipped_only_when_absent() {
		let session = awaiting();
		let issued = session.anti_forgery().as_str().to_owned();
		let absent: CallbackParams = [("code", "abc")].into_iter().collect();
		let matching: CallbackParams =
			[("code", "abc"), ("state", issued.as_str())].into_iter().collect();
		let forged: CallbackParams = [("code", "abc"), ("state", "forged")].into_iter().collect();
		let empty: CallbackParams = [("code", "abc"), ("state", "")].into_iter().collect();

		assert_eq!(
			session.check_callback(&absent, AUTHORIZE).expect("Absent state should pass."),
			return_url()
		);
		assert!(session.check_callback(&matching, AUTHORIZE).is_ok());

		for callback in [forged, empty] {
			let err = session
				.check_callback(&callback, AUTHORIZE)
				.expect_err("Mismatched state must be rejected.");

			assert!(matches!(err, Error::StateMismatch { ref endpoint } if endpoint == AUTHORIZE));
			assert_eq!(session.state(), SessionState::AwaitingCallback);
		}
	}

	#[test]
	fn authentication_gates_and_logout() {
		let mut session = awaiting();

		assert!(matches!(
			session.require_authenticated("https://api.example.com/me"),
			Err(Error::NotAuthenticated { .. })
		));

		session.authenticate();
		session.cache_profile(Profile { id: "me".into(), ..Default::default() });

		assert!(session.require_authenticated("https://api.example.com/me").is_ok());
		assert_eq!(session.profile().map(|profile| profile.id.as_str()), Some("me"));

		session.logout();
		session.logout();

		assert_eq!(session.state(), SessionState::Unauthenticated);
		assert!(session.profile().is_none());
		assert!(session.redirect_uri().is_none());
	}

	#[test]
	fn pending_authorization_moves_between_sessions() {
		let issuer = awaiting();
		let pending = issuer.pending().expect("Awaiting sessions expose a pending authorization.");
		let mut handler = Session::new(Permission::Default);

		assert!(handler.pending().is_none());

		handler.resume(pending.clone()).expect("Pending authorization should resume.");

		let callback: CallbackParams =
			[("code", "abc"), ("state", pending.state.as_str())].into_iter().collect();

		assert_eq!(handler.state(), SessionState::AwaitingCallback);
		assert_eq!(
			handler.check_callback(&callback, AUTHORIZE).expect("Resumed state should match."),
			pending.redirect_uri
		);
	}
}
