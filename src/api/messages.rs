//! Turns client errors into short messages suitable for showing to a user.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::StatusError};

const BAD_INPUT: &str = "Bad input data. Please check your fields.";
const NO_DETAILS: &str = "Something went wrong. Please try again.";
const UNEXPECTED: &str = "Unexpected error. Please try again.";

/// Fallback messages used when the API response carries none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDefaults {
	/// Shown for a `401` without a message, e.g. on the login form.
	pub invalid_credentials: String,
	/// Shown for any other failure without a message.
	pub default: String,
}
impl Default for MessageDefaults {
	fn default() -> Self {
		Self {
			invalid_credentials: "Bad credentials. Please check your email and password.".into(),
			default: NO_DETAILS.into(),
		}
	}
}

impl Error {
	/// Renders the error as one or more user-facing messages.
	///
	/// - `401`: the body's `message`, else [`MessageDefaults::invalid_credentials`].
	/// - `422`: the body's `message` followed by every string under `errors` (string or array
	///   values, in the order the API sent the fields), else a generic bad-input message.
	/// - Other statuses: the body's `message`, else [`MessageDefaults::default`].
	/// - A failed refresh is rendered from the refresh failure.
	/// - Network failures use [`MessageDefaults::default`]; anything else is reported as an
	///   unexpected error.
	pub fn user_messages(&self, defaults: &MessageDefaults) -> Vec<String> {
		match self {
			Self::Status(e) => status_messages(e, defaults),
			Self::SessionExpired { source } => source.user_messages(defaults),
			Self::Transport(_) => vec![defaults.default.clone()],
			_ => vec![UNEXPECTED.into()],
		}
	}
}

fn status_messages(err: &StatusError, defaults: &MessageDefaults) -> Vec<String> {
	let body = err.json_body();
	let message = body.as_ref().and_then(body_message);

	match err.status.as_u16() {
		401 => vec![message.unwrap_or_else(|| defaults.invalid_credentials.clone())],
		422 => match body {
			Some(body) => validation_messages(&body),
			None => vec![NO_DETAILS.into()],
		},
		_ => vec![message.unwrap_or_else(|| defaults.default.clone())],
	}
}

fn validation_messages(body: &Value) -> Vec<String> {
	let mut messages = body_message(body).into_iter().collect::<Vec<_>>();

	if let Some(errors) = body.get("errors").and_then(Value::as_object) {
		for value in errors.values() {
			match value {
				Value::Array(items) => messages.extend(items.iter().filter_map(non_blank)),
				other => messages.extend(non_blank(other)),
			}
		}
	}

	if messages.is_empty() {
		messages.push(BAD_INPUT.into());
	}

	messages
}

fn body_message(body: &Value) -> Option<String> {
	body.get("message").and_then(non_blank)
}

fn non_blank(value: &Value) -> Option<String> {
	value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_owned)
}
