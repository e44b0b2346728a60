//! Identifiers for API resources.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Account identifier as issued by the API.
///
/// The API may render ids as JSON strings or numbers; both deserialize into the same textual form
/// so ids can be spliced into resource paths unchanged.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct UserId(String);
impl UserId {
	/// Wraps an identifier value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl From<i64> for UserId {
	fn from(value: i64) -> Self {
		Self(value.to_string())
	}
}
impl From<&str> for UserId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl<'de> Deserialize<'de> for UserId {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Number(i64),
		}

		Ok(match Raw::deserialize(deserializer)? {
			Raw::Text(value) => Self(value),
			Raw::Number(value) => Self(value.to_string()),
		})
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UserId({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_id_accepts_strings_and_numbers() {
		let from_text: UserId =
			serde_json::from_str("\"u-7\"").expect("String ids should deserialize.");
		let from_number: UserId =
			serde_json::from_str("42").expect("Numeric ids should deserialize.");

		assert_eq!(&*from_text, "u-7");
		assert_eq!(from_number.to_string(), "42");
		assert_eq!(
			serde_json::to_string(&from_number).expect("Ids should serialize."),
			"\"42\""
		);
	}
}
