//! Permission levels and deterministic scope-string construction.

// self
use crate::_prelude::*;

/// Scope request level chosen before the authorization redirect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
	/// Minimal scopes needed to identify the user.
	AuthenticateOnly,
	/// Provider's full default scope set.
	#[default]
	Default,
	/// Alias of [`Permission::Default`] kept for callers that ask for everything.
	All,
	/// Caller-supplied comma-separated scope list from the configuration.
	Custom,
}
impl Permission {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Permission::AuthenticateOnly => "authenticate_only",
			Permission::Default => "default",
			Permission::All => "all",
			Permission::Custom => "custom",
		}
	}
}
impl Display for Permission {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-provider scope tables consulted by [`build_scope`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeTable {
	/// Scopes requested for [`Permission::AuthenticateOnly`].
	pub authenticate_only: &'static [&'static str],
	/// Scopes requested for [`Permission::Default`] and [`Permission::All`].
	pub all: &'static [&'static str],
}

/// Builds the scope string sent with the authorization redirect.
///
/// Base tokens are selected by `permission` (custom permissions are split on commas) and
/// followed by `plugin_scopes` in registration order. Tokens are joined with `delimiter`;
/// repeated tokens keep their first position.
pub fn build_scope<'a, I>(
	permission: Permission,
	table: &ScopeTable,
	custom_permissions: Option<&'a str>,
	plugin_scopes: I,
	delimiter: char,
) -> Result<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let base: Vec<&'a str> = match permission {
		Permission::AuthenticateOnly => table.authenticate_only.to_vec(),
		Permission::Default | Permission::All => table.all.to_vec(),
		Permission::Custom => {
			let custom: Vec<&'a str> = custom_permissions
				.unwrap_or_default()
				.split(',')
				.map(str::trim)
				.filter(|token| !token.is_empty())
				.collect();

			if custom.is_empty() {
				return Err(Error::invalid_input(
					"custom permission requires a non-empty comma-separated scope list",
				));
			}

			custom
		},
	};
	let mut tokens: Vec<&'a str> = Vec::with_capacity(base.len());

	for token in base.into_iter().chain(plugin_scopes.into_iter().map(str::trim)) {
		if !token.is_empty() && !tokens.contains(&token) {
			tokens.push(token);
		}
	}

	let mut buf = String::new();

	for (idx, token) in tokens.iter().enumerate() {
		if idx > 0 {
			buf.push(delimiter);
		}

		buf.push_str(token);
	}

	Ok(buf)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const TABLE: ScopeTable =
		ScopeTable { authenticate_only: &["profile", "email"], all: &["profile", "email", "network"] };

	#[test]
	fn base_sets_follow_permission() {
		let auth_only = build_scope(Permission::AuthenticateOnly, &TABLE, None, [], ' ')
			.expect("Authenticate-only scope should build.");
		let default = build_scope(Permission::Default, &TABLE, None, [], ' ')
			.expect("Default scope should build.");
		let all =
			build_scope(Permission::All, &TABLE, None, [], ' ').expect("All scope should build.");

		assert_eq!(auth_only, "profile email");
		assert_eq!(default, "profile email network");
		assert_eq!(all, default);
	}

	#[test]
	fn plugin_scopes_follow_base_tokens_in_order() {
		let scope = build_scope(
			Permission::AuthenticateOnly,
			&TABLE,
			None,
			["rw_nus", "email", "r_career"],
			' ',
		)
		.expect("Scope with plugin tokens should build.");

		assert_eq!(scope, "profile email rw_nus r_career");
	}

	#[test]
	fn custom_permissions_split_on_commas() {
		let scope = build_scope(Permission::Custom, &TABLE, Some("r_basic, r_email,,"), [], ' ')
			.expect("Custom scope should build.");

		assert_eq!(scope, "r_basic r_email");

		let scope = build_scope(Permission::Custom, &TABLE, Some("a,b"), [], ',')
			.expect("Custom scope with comma delimiter should build.");

		assert_eq!(scope, "a,b");
	}

	#[test]
	fn custom_permissions_must_not_be_empty() {
		for custom in [None, Some(""), Some(" , ,")] {
			let err = build_scope(Permission::Custom, &TABLE, custom, ["plugin"], ' ')
				.expect_err("Empty custom permissions must be rejected.");

			assert!(matches!(err, Error::InvalidInput { .. }));
		}
	}
}
