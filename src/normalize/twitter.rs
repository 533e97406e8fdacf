//! Twitter v1.1 JSON documents.

// crates.io
use serde_json::Value;
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::{
	error::NormalizeError,
	model::Feed,
	normalize::{self, MAX_FEED_ENTRIES},
};

/// Format of `created_at` values, e.g. `Wed Aug 27 13:08:45 +0000 2008`.
pub const CREATED_AT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
	"[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);

/// Maps a home-timeline array into at most [`MAX_FEED_ENTRIES`] entries.
pub fn home_timeline(body: &str) -> Result<Vec<Feed>, NormalizeError> {
	let document: Value = serde_json::from_str(body)?;
	let entries = document
		.as_array()
		.ok_or(NormalizeError::UnexpectedShape { expected: "a JSON array of statuses" })?;

	Ok(entries.iter().take(MAX_FEED_ENTRIES).map(status).collect())
}

fn status(entry: &Value) -> Feed {
	let user = entry.get("user").filter(|user| user.is_object());

	Feed {
		created_at: normalize::json_str(entry, "created_at")
			.and_then(|raw| normalize::parse_timestamp(&raw, CREATED_AT_FORMAT)),
		message: normalize::json_str(entry, "text"),
		id: user.and_then(|user| normalize::json_str(user, "id_str")),
		from: user.and_then(|user| normalize::json_str(user, "name")),
		screen_name: user.and_then(|user| normalize::json_str(user, "screen_name")),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn timeline_maps_statuses_and_authors() {
		let body = r#"[
			{"created_at":"Wed Aug 27 13:08:45 +0000 2008","text":"just setting up",
			 "user":{"id_str":"12","name":"Jack","screen_name":"jack"}},
			{"created_at":"not a date","text":"orphan"}
		]"#;
		let feeds = home_timeline(body).expect("Timeline should normalize.");

		assert_eq!(feeds.len(), 2);
		assert_eq!(feeds[0].created_at, Some(macros::datetime!(2008-08-27 13:08:45 UTC)));
		assert_eq!(feeds[0].message.as_deref(), Some("just setting up"));
		assert_eq!(feeds[0].id.as_deref(), Some("12"));
		assert_eq!(feeds[0].from.as_deref(), Some("Jack"));
		assert_eq!(feeds[0].screen_name.as_deref(), Some("jack"));
		assert_eq!(feeds[1].created_at, None);
		assert_eq!(feeds[1].id, None);
	}

	#[test]
	fn timeline_is_capped_and_must_be_an_array() {
		let body = format!("[{}]", vec![r#"{"text":"x"}"#; 30].join(","));

		assert_eq!(home_timeline(&body).expect("Timeline should normalize.").len(), MAX_FEED_ENTRIES);
		assert!(matches!(
			home_timeline(r#"{"errors":[{"code":89}]}"#),
			Err(NormalizeError::UnexpectedShape { .. })
		));
		assert!(matches!(home_timeline("<html>"), Err(NormalizeError::Json(_))));
	}
}
