//! Provider-independent entities produced by the normalizers.
//!
//! Every optional field is left unset when the provider omits it or returns an unparsable
//! value; only identity fields are mandatory.

// self
use crate::{_prelude::*, auth::ProviderId, http::ApiResponse};

/// Canonical user profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Provider-scoped user identifier.
	pub id: String,
	/// Given name.
	pub first_name: Option<String>,
	/// Family name.
	pub last_name: Option<String>,
	/// Primary e-mail address.
	pub email: Option<String>,
	/// Avatar URL.
	pub profile_image_url: Option<String>,
	/// Free-form location label.
	pub location: Option<String>,
	/// Date of birth; any component may be missing.
	pub dob: Option<BirthDate>,
	/// Additional contact details keyed by kind (phone type, `mainAddress`).
	pub contact_info: BTreeMap<String, String>,
	/// Provider that produced the profile.
	pub provider_id: Option<ProviderId>,
	/// Raw provider document, when the configuration asks for it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_response: Option<String>,
}

/// Partial date of birth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
	/// Year component.
	pub year: Option<i32>,
	/// Month component (1-12).
	pub month: Option<u8>,
	/// Day component (1-31).
	pub day: Option<u8>,
}
impl BirthDate {
	/// Returns `true` when no component is set.
	pub fn is_empty(&self) -> bool {
		self.year.is_none() && self.month.is_none() && self.day.is_none()
	}
}

/// Connection of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
	/// Provider-scoped identifier.
	pub id: String,
	/// Given name.
	pub first_name: Option<String>,
	/// Family name.
	pub last_name: Option<String>,
	/// Public profile URL.
	pub profile_url: Option<String>,
	/// Avatar URL.
	pub profile_image_url: Option<String>,
	/// Raw provider fragment, when the configuration asks for it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raw_response: Option<String>,
}

/// Single feed entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Entry text.
	pub message: Option<String>,
	/// Author identifier.
	pub id: Option<String>,
	/// Author display name.
	pub from: Option<String>,
	/// Author handle.
	pub screen_name: Option<String>,
}

/// Professional history of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Career {
	/// Provider-scoped identifier.
	pub id: Option<String>,
	/// Professional headline.
	pub headline: Option<String>,
	/// Positions held, in provider order.
	pub positions: Vec<Position>,
	/// Education entries, in provider order.
	pub educations: Vec<Education>,
	/// Recommendations received, in provider order.
	pub recommendations: Vec<Recommendation>,
}

/// Position held at a company.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
	/// Provider-scoped identifier.
	pub id: Option<String>,
	/// Job title.
	pub title: Option<String>,
	/// Company name.
	pub company_name: Option<String>,
	/// Start year.
	pub start_year: Option<i32>,
	/// End year; unset for a current position.
	pub end_year: Option<i32>,
	/// Whether this is the current position.
	pub is_current: bool,
}

/// Education entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
	/// Provider-scoped identifier.
	pub id: Option<String>,
	/// School name.
	pub school_name: Option<String>,
	/// Degree.
	pub degree: Option<String>,
	/// Field of study.
	pub field_of_study: Option<String>,
	/// Start year.
	pub start_year: Option<i32>,
	/// End year.
	pub end_year: Option<i32>,
}

/// Recommendation received from another member.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
	/// Provider-scoped identifier.
	pub id: Option<String>,
	/// Recommendation kind.
	pub kind: Option<String>,
	/// Recommendation text.
	pub text: Option<String>,
	/// Recommender's display name.
	pub recommender: Option<String>,
}

/// Outcome of a status update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
	/// Provider response.
	pub response: ApiResponse,
	/// Number of characters actually posted.
	pub effective_length: usize,
	/// Whether the message was truncated to the provider limit.
	pub truncated: bool,
}
