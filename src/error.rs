//! Client-level error types shared across the transport, token store, and API helpers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The API answered with a non-success status.
	#[error(transparent)]
	Status(#[from] StatusError),
	/// The access token could not be refreshed; every request waiting on that refresh receives
	/// the same underlying error.
	#[error("Session expired because the access-token refresh failed.")]
	SessionExpired {
		/// Failure reported by the refresh call.
		#[source]
		source: Arc<Error>,
	},
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Persistence backend failure surfaced by an explicit storage call.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
}
impl Error {
	/// Returns the HTTP status if the error came from an API response.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Status(e) => Some(e.status),
			_ => None,
		}
	}

	/// Returns `true` if the caller should treat the session as gone (e.g. prompt a new login).
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired { .. })
	}

	/// Returns `true` for a `401` that was not recovered by a refresh.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(StatusCode::UNAUTHORIZED)
	}
}

/// Non-success HTTP response, preserved verbatim for caller-level handling.
#[derive(Clone, ThisError)]
#[error("{method} {path} returned {status}.")]
pub struct StatusError {
	/// Response status code.
	pub status: StatusCode,
	/// Method of the failed request.
	pub method: Method,
	/// Path of the failed request, relative to the configured base URL.
	pub path: String,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl StatusError {
	/// Parses the body as JSON, returning `None` when it is empty or not JSON.
	pub fn json_body(&self) -> Option<serde_json::Value> {
		if self.body.is_empty() {
			return None;
		}

		serde_json::from_slice(&self.body).ok()
	}
}
impl Debug for StatusError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StatusError")
			.field("status", &self.status)
			.field("method", &self.method)
			.field("path", &self.path)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https, or cannot carry paths.
	#[error("Base URL `{url}` must be an http(s) URL that can carry paths.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint path is not absolute.
	#[error("Endpoint path `{path}` must start with `/`.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
	/// Storage key is empty.
	#[error("Token storage key must not be empty.")]
	EmptyStorageKey,
	/// Access token value is empty.
	#[error("Access token must not be empty.")]
	EmptyAccessToken,
	/// Caller attempted to set a header the client owns.
	#[error("The `{name}` header is managed by the client and must not be set by callers.")]
	ReservedHeader {
		/// Header name.
		name: HeaderName,
	},
	/// Header value contains characters that cannot be sent.
	#[error("Header value is invalid.")]
	InvalidHeaderValue(#[from] ::http::header::InvalidHeaderValue),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body {
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// User update carries no changes.
	#[error("Nothing to update. Change at least one field.")]
	EmptyUpdate,
	/// Password and its confirmation differ.
	#[error("Passwords do not match.")]
	PasswordMismatch,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Response bodies that could not be decoded.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON for the expected type.
	#[error("Response body is malformed at `{}`.", .source.path())]
	Json {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the decoded response.
		status: StatusCode,
	},
	/// Token endpoint answered without a usable access token.
	#[error("Token endpoint response did not carry an access token.")]
	MissingAccessToken,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn status_error(status: StatusCode) -> StatusError {
		StatusError {
			status,
			method: Method::GET,
			path: "/books".into(),
			body: b"{\"message\":\"nope\"}".to_vec(),
		}
	}

	#[test]
	fn status_helpers_classify_errors() {
		let unauthorized = Error::from(status_error(StatusCode::UNAUTHORIZED));
		let invalid = Error::from(status_error(StatusCode::UNPROCESSABLE_ENTITY));

		assert!(unauthorized.is_unauthorized());
		assert!(!invalid.is_unauthorized());
		assert_eq!(invalid.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
		assert_eq!(Error::from(DecodeError::MissingAccessToken).status(), None);
	}

	#[test]
	fn session_expired_exposes_shared_source() {
		let source = Arc::new(Error::from(status_error(StatusCode::FORBIDDEN)));
		let err = Error::SessionExpired { source: source.clone() };

		assert!(err.is_session_expired());
		assert_eq!(err.to_string(), "Session expired because the access-token refresh failed.");

		let exposed = StdError::source(&err).expect("Session expiry should expose its cause.");

		assert_eq!(exposed.to_string(), source.to_string());
		assert!(exposed.to_string().contains("403"));
	}

	#[test]
	fn status_error_debug_omits_body() {
		let rendered = format!("{:?}", status_error(StatusCode::UNAUTHORIZED));

		assert!(rendered.contains("body_len"));
		assert!(!rendered.contains("nope"));
	}
}
