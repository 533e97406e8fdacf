//! Anti-forgery state and the parameters a provider sends back on the redirect callback.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const STATE_LEN: usize = 32;

/// Per-session random token embedded in the authorization redirect.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AntiForgeryState(String);
impl AntiForgeryState {
	/// Generates a fresh random token.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect())
	}

	/// Restores a token issued earlier (e.g. read back from a cookie).
	pub fn from_issued(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the token value.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Compares the token with a returned value without short-circuiting on the first mismatch.
	pub fn matches(&self, returned: &str) -> bool {
		let expected = self.0.as_bytes();
		let returned = returned.as_bytes();

		if expected.len() != returned.len() {
			return false;
		}

		expected.iter().zip(returned).fold(0_u8, |acc, (lhs, rhs)| acc | (lhs ^ rhs)) == 0
	}
}
impl Debug for AntiForgeryState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AntiForgeryState").field(&self.0).finish()
	}
}

/// Query parameters received on the OAuth redirect callback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams(BTreeMap<String, String>);
impl CallbackParams {
	/// Callback parameter carrying the anti-forgery token.
	pub const STATE: &'static str = "state";
	/// Callback parameter carrying the authorization code.
	pub const CODE: &'static str = "code";
	/// Callback parameter carrying a provider-side failure code.
	pub const ERROR: &'static str = "error";
	/// Callback parameter carrying a provider-side failure description.
	pub const ERROR_DESCRIPTION: &'static str = "error_description";

	/// Collects the query pairs of the URL the provider redirected to.
	pub fn from_redirect(url: &Url) -> Self {
		url.query_pairs().into_owned().collect()
	}

	/// Returns a parameter by name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	/// Returns the `state` parameter, if the provider sent one.
	pub fn state(&self) -> Option<&str> {
		self.get(Self::STATE)
	}

	/// Returns the `code` parameter, if the provider sent one.
	pub fn code(&self) -> Option<&str> {
		self.get(Self::CODE)
	}

	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.insert(name.into(), value.into());
	}
}
impl<K, V> FromIterator<(K, V)> for CallbackParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// In-flight authorization that can be persisted between the redirect and the callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
	/// Anti-forgery token embedded in the redirect.
	pub state: AntiForgeryState,
	/// Return URL the provider redirects back to; reused for the code exchange.
	pub redirect_uri: Url,
}
