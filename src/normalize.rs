//! Pure mappings from provider documents to the canonical [`model`](crate::model) entities.
//!
//! Functions here never touch the network. Absent or unparsable optional fields are left
//! unset; a document whose overall shape is wrong fails with [`NormalizeError`], which the
//! caller wraps together with the endpoint and status it came from.

pub mod linkedin;
pub mod twitter;

// crates.io
use roxmltree::{Document, Node};
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
// self
use crate::{
	_prelude::*,
	error::NormalizeError,
	http::{ApiResponse, endpoint_label},
};

/// Upper bound on feed entries returned by feed normalizers.
pub const MAX_FEED_ENTRIES: usize = 20;

/// Decodes a response body as UTF-8 and maps it with `map`.
///
/// Failures become [`Error::MalformedResponse`] tagged with the endpoint and status.
pub fn decode<T, F>(endpoint: &Url, response: &ApiResponse, map: F) -> Result<T>
where
	F: FnOnce(&str) -> Result<T, NormalizeError>,
{
	response.text().map_err(NormalizeError::from).and_then(map).map_err(|source| {
		Error::MalformedResponse {
			endpoint: endpoint_label(endpoint),
			status: Some(response.status),
			source,
		}
	})
}

/// Parses an XML document and checks the root element's tag name.
pub fn parse_xml<'input>(
	body: &'input str,
	root: &str,
	expected: &'static str,
) -> Result<Document<'input>, NormalizeError> {
	let doc = Document::parse(body)?;

	if doc.root_element().has_tag_name(root) {
		Ok(doc)
	} else {
		Err(NormalizeError::UnexpectedShape { expected })
	}
}

/// Returns the first descendant element (excluding `node` itself) with the given tag name.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
	node.descendants().skip(1).find(|child| child.is_element() && child.has_tag_name(tag))
}

/// Returns the first direct child element with the given tag name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
	node.children().find(|child| child.is_element() && child.has_tag_name(tag))
}

/// Returns the trimmed text of the first descendant element with the given tag name.
pub fn descendant_text(node: Node, tag: &str) -> Option<String> {
	descendant(node, tag).and_then(text_of)
}

/// Returns the trimmed text of the first direct child element with the given tag name.
pub fn child_text(node: Node, tag: &str) -> Option<String> {
	child(node, tag).and_then(text_of)
}

/// Returns the trimmed text content of an element, or `None` when it is empty.
pub fn text_of(node: Node) -> Option<String> {
	let text: String = node.descendants().filter(Node::is_text).filter_map(|n| n.text()).collect();
	let text = text.trim();

	if text.is_empty() { None } else { Some(text.to_owned()) }
}

/// Parses an integer field, leaving it unset when the value is not numeric.
pub fn parse_number<T>(raw: Option<String>) -> Option<T>
where
	T: FromStr,
{
	raw.and_then(|value| value.parse().ok())
}

/// Returns the exact source text of an element, tags included.
pub fn raw_xml(node: Node) -> String {
	node.document().input_text()[node.range()].to_owned()
}

/// Reads an optional string member of a JSON object.
pub fn json_str(value: &Value, key: &str) -> Option<String> {
	value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Parses a timestamp with the given format, returning `None` when it does not match.
pub fn parse_timestamp(raw: &str, format: &[BorrowedFormatItem<'_>]) -> Option<OffsetDateTime> {
	OffsetDateTime::parse(raw.trim(), format).ok()
}

/// Converts epoch milliseconds into a UTC instant.
pub fn timestamp_from_millis(millis: i64) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn text_helpers_distinguish_children_from_descendants() {
		let doc = parse_xml(
			"<person><id>root</id><location><name> Pune </name></location><empty/></person>",
			"person",
			"a person",
		)
		.expect("Fixture should parse.");
		let root = doc.root_element();

		assert_eq!(child_text(root, "id").as_deref(), Some("root"));
		assert_eq!(child_text(root, "name"), None);
		assert_eq!(descendant_text(root, "name").as_deref(), Some("Pune"));
		assert_eq!(descendant_text(root, "empty"), None);
		assert_eq!(
			raw_xml(descendant(root, "location").expect("Location should exist.")),
			"<location><name> Pune </name></location>"
		);
	}

	#[test]
	fn wrong_root_is_an_unexpected_shape() {
		let err = parse_xml("<error><status>401</status></error>", "person", "a person")
			.expect_err("Wrong root must be rejected.");

		assert!(matches!(err, NormalizeError::UnexpectedShape { expected: "a person" }));
		assert!(matches!(
			parse_xml("<person>", "person", "a person"),
			Err(NormalizeError::Xml(_))
		));
	}

	#[test]
	fn decode_tags_failures_with_endpoint_and_status() {
		let endpoint = Url::parse("https://api.example.com/v1/people?oauth2_access_token=secret")
			.expect("Endpoint fixture should parse.");
		let response = ApiResponse::new(200, vec![0xff_u8, 0xfe]);
		let err = decode(&endpoint, &response, |body| Ok(body.len()))
			.expect_err("Invalid UTF-8 must be rejected.");

		assert!(matches!(
			err,
			Error::MalformedResponse { ref endpoint, status: Some(200), source: NormalizeError::Utf8(_) }
				if endpoint == "https://api.example.com/v1/people"
		));
		assert_eq!(
			decode(&endpoint, &ApiResponse::new(200, "abc"), |body| Ok(body.len()))
				.expect("Valid body should decode."),
			3
		);
	}

	#[test]
	fn numbers_and_timestamps_fail_soft() {
		assert_eq!(parse_number::<u8>(Some("7".into())), Some(7));
		assert_eq!(parse_number::<u8>(Some("July".into())), None);
		assert_eq!(parse_number::<i32>(None), None);
		assert_eq!(
			timestamp_from_millis(1_285_179_722_006),
			Some(macros::datetime!(2010-09-22 18:22:02.006 UTC))
		);
		assert_eq!(parse_timestamp("yesterday", twitter::CREATED_AT_FORMAT), None);
	}
}
