//! Redacting access-token wrapper and the token endpoint payload.

// self
use crate::{_prelude::*, error::ConfigError};

/// Short-lived bearer credential attached to every authenticated request.
///
/// The value is guaranteed non-empty and is redacted from `Debug`/`Display` output so it never
/// reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token value, rejecting empty strings.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(ConfigError::EmptyAccessToken);
		}

		Ok(Self(value))
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value for this token.
	pub fn bearer_header(&self) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Body returned by the login, register, and refresh endpoints.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
	/// Freshly issued access token; the refresh token travels in an http-only cookie.
	#[serde(default)]
	pub access_token: Option<String>,
}
impl TokenResponse {
	/// Validates the payload into an [`AccessToken`].
	pub fn into_access_token(self) -> Result<AccessToken> {
		self.access_token
			.and_then(|value| AccessToken::new(value).ok())
			.ok_or_else(|| crate::error::DecodeError::MissingAccessToken.into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret").expect("Token fixture should be valid.");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn empty_tokens_are_rejected() {
		assert!(matches!(AccessToken::new(""), Err(ConfigError::EmptyAccessToken)));
		assert!(matches!(AccessToken::new("   "), Err(ConfigError::EmptyAccessToken)));
	}

	#[test]
	fn bearer_header_is_sensitive() {
		let token = AccessToken::new("T1").expect("Token fixture should be valid.");
		let header = token.bearer_header().expect("Bearer header should render.");

		assert_eq!(header.to_str().expect("Header should be ASCII."), "Bearer T1");
		assert!(header.is_sensitive());
	}

	#[test]
	fn token_response_requires_access_token() {
		let ok: TokenResponse = serde_json::from_str("{\"accessToken\":\"T2\"}")
			.expect("Token payload should deserialize.");

		assert_eq!(ok.into_access_token().expect("Token should be present.").expose(), "T2");

		let missing: TokenResponse =
			serde_json::from_str("{}").expect("Empty payload should deserialize.");

		assert!(matches!(
			missing.into_access_token(),
			Err(Error::Decode(crate::error::DecodeError::MissingAccessToken))
		));
	}
}
