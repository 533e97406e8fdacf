//! LinkedIn v1 XML documents.

// crates.io
use roxmltree::Node;
// self
use crate::{
	_prelude::*,
	error::NormalizeError,
	model::{BirthDate, Career, Contact, Education, Feed, Position, Profile, Recommendation},
	normalize::{self, MAX_FEED_ENTRIES},
};

/// Contact-info key for the member's main address.
pub const MAIN_ADDRESS_KEY: &str = "mainAddress";

/// Maps a `person` profile document.
pub fn profile(body: &str, save_raw: bool) -> Result<Profile, NormalizeError> {
	let doc = normalize::parse_xml(body, "person", "a `person` element")?;
	let root = doc.root_element();
	let id = normalize::descendant_text(root, "id")
		.ok_or(NormalizeError::MissingIdentity { entity: "profile" })?;
	let dob = normalize::descendant(root, "date-of-birth")
		.map(|node| BirthDate {
			year: normalize::parse_number(normalize::child_text(node, "year")),
			month: normalize::parse_number(normalize::child_text(node, "month")),
			day: normalize::parse_number(normalize::child_text(node, "day")),
		})
		.filter(|dob| !dob.is_empty());
	let mut contact_info = BTreeMap::new();

	if let Some(phone) = normalize::descendant(root, "phone-number") {
		let kind = normalize::child_text(phone, "phone-type");
		let number = normalize::child_text(phone, "phone-number");

		if let (Some(kind), Some(number)) = (kind, number) {
			contact_info.insert(kind, number);
		}
	}
	if let Some(address) = normalize::descendant_text(root, "main-address") {
		contact_info.insert(MAIN_ADDRESS_KEY.into(), address);
	}

	Ok(Profile {
		id,
		first_name: normalize::descendant_text(root, "first-name"),
		last_name: normalize::descendant_text(root, "last-name"),
		email: normalize::descendant_text(root, "email-address"),
		profile_image_url: normalize::descendant_text(root, "picture-url"),
		location: normalize::descendant(root, "location")
			.and_then(|node| normalize::child_text(node, "name")),
		dob,
		contact_info,
		provider_id: None,
		raw_response: save_raw.then(|| normalize::raw_xml(root)),
	})
}

/// Maps a `connections` document; `person` entries without an id are dropped.
pub fn contacts(body: &str, save_raw: bool) -> Result<Vec<Contact>, NormalizeError> {
	let doc = normalize::parse_xml(body, "connections", "a `connections` element")?;
	let mut contacts = Vec::new();

	for (idx, person) in
		doc.root_element().descendants().filter(|node| node.has_tag_name("person")).enumerate()
	{
		let Some(id) = normalize::child_text(person, "id") else {
			tracing::warn!(position = idx, "Dropped connection without an id.");

			continue;
		};

		contacts.push(Contact {
			id,
			first_name: normalize::child_text(person, "first-name"),
			last_name: normalize::child_text(person, "last-name"),
			profile_url: normalize::child_text(person, "public-profile-url"),
			profile_image_url: normalize::child_text(person, "picture-url"),
			raw_response: save_raw.then(|| normalize::raw_xml(person)),
		});
	}

	Ok(contacts)
}

/// Maps a network `updates` document into at most [`MAX_FEED_ENTRIES`] entries.
pub fn network_updates(body: &str) -> Result<Vec<Feed>, NormalizeError> {
	let doc = normalize::parse_xml(body, "updates", "an `updates` element")?;
	let feeds = doc
		.root_element()
		.children()
		.filter(|node| node.has_tag_name("update"))
		.take(MAX_FEED_ENTRIES)
		.map(network_update)
		.collect();

	Ok(feeds)
}

fn network_update(update: Node) -> Feed {
	let person = normalize::child(update, "update-content")
		.and_then(|content| normalize::child(content, "person"));
	let message = person.and_then(|person| {
		normalize::child(person, "current-share")
			.and_then(|share| normalize::child_text(share, "comment"))
			.or_else(|| normalize::child_text(person, "current-status"))
	});
	let from = person.and_then(full_name);

	Feed {
		created_at: normalize::parse_number(normalize::child_text(update, "timestamp"))
			.and_then(normalize::timestamp_from_millis),
		message,
		id: person.and_then(|person| normalize::child_text(person, "id")),
		from,
		screen_name: None,
	}
}

/// Maps a `person` document carrying headline, positions, educations, and recommendations.
pub fn career(body: &str) -> Result<Career, NormalizeError> {
	let doc = normalize::parse_xml(body, "person", "a `person` element")?;
	let root = doc.root_element();

	Ok(Career {
		id: normalize::child_text(root, "id"),
		headline: normalize::child_text(root, "headline"),
		positions: collection(root, "positions", "position").map(position).collect(),
		educations: collection(root, "educations", "education").map(education).collect(),
		recommendations: collection(root, "recommendations-received", "recommendation")
			.map(recommendation)
			.collect(),
	})
}

fn collection<'a, 'input>(
	root: Node<'a, 'input>,
	container: &'a str,
	item: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
	normalize::child(root, container)
		.into_iter()
		.flat_map(|node| node.children())
		.filter(move |node| node.has_tag_name(item))
}

fn year_of(node: Node, tag: &str) -> Option<i32> {
	normalize::child(node, tag)
		.and_then(|date| normalize::parse_number(normalize::child_text(date, "year")))
}

fn position(node: Node) -> Position {
	Position {
		id: normalize::child_text(node, "id"),
		title: normalize::child_text(node, "title"),
		company_name: normalize::child(node, "company")
			.and_then(|company| normalize::child_text(company, "name")),
		start_year: year_of(node, "start-date"),
		end_year: year_of(node, "end-date"),
		is_current: normalize::child_text(node, "is-current").is_some_and(|flag| flag == "true"),
	}
}

fn education(node: Node) -> Education {
	Education {
		id: normalize::child_text(node, "id"),
		school_name: normalize::child_text(node, "school-name"),
		degree: normalize::child_text(node, "degree"),
		field_of_study: normalize::child_text(node, "field-of-study"),
		start_year: year_of(node, "start-date"),
		end_year: year_of(node, "end-date"),
	}
}

fn recommendation(node: Node) -> Recommendation {
	Recommendation {
		id: normalize::child_text(node, "id"),
		kind: normalize::child(node, "recommendation-type")
			.and_then(|kind| normalize::child_text(kind, "code")),
		text: normalize::child_text(node, "recommendation-text"),
		recommender: normalize::child(node, "recommender").and_then(full_name),
	}
}

fn full_name(person: Node) -> Option<String> {
	let names: Vec<String> = ["first-name", "last-name"]
		.into_iter()
		.filter_map(|tag| normalize::child_text(person, tag))
		.collect();

	if names.is_empty() { None } else { Some(names.join(" ")) }
}
