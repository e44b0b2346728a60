//! Caller-facing request description and the wire-ready form handed to transports.

// self
use crate::{_prelude::*, error::ConfigError};

/// Description of an API call relative to the configured base URL.
///
/// The path is a literal, already URL-safe prefix; values such as ISBNs or account ids are
/// appended with [`ApiRequest::segment`] and percent-encoded when the URL is resolved.
///
/// The client owns the `Authorization` header; requests that carry one are rejected before
/// dispatch. The `retried` flag is sticky: once a request has been replayed after a refresh it is
/// never replayed again.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: Method,
	path: String,
	segments: Vec<String>,
	query: Vec<(String, String)>,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for the provided method and path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			segments: Vec::new(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: None,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends one raw path segment after the literal path.
	pub fn segment(mut self, value: impl ToString) -> Self {
		self.segments.push(value.to_string());

		self
	}

	/// Appends a query pair; repeated keys are preserved in order.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Adds a header, replacing any previous value with the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload and sets the content type.
	pub fn json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(|source| ConfigError::Body { source })?;

		self.headers
			.insert(::http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Some(bytes);

		Ok(self)
	}

	/// Request method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Literal path prefix relative to the base URL.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Raw segments appended after [`ApiRequest::path`].
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Path with the raw segments joined on, for matching and diagnostics.
	pub fn full_path(&self) -> String {
		if self.segments.is_empty() {
			return self.path.clone();
		}

		self.segments.iter().fold(self.path.trim_end_matches('/').to_owned(), |mut path, segment| {
			path.push('/');
			path.push_str(segment);

			path
		})
	}

	/// Query pairs in insertion order.
	pub fn query_pairs(&self) -> &[(String, String)] {
		&self.query
	}

	/// Caller-supplied headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Serialized body, if any.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Returns `true` once the request has been replayed after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(mut self) -> Self {
		self.retried = true;

		self
	}

	pub(crate) fn ensure_no_reserved_headers(&self) -> Result<(), ConfigError> {
		if self.headers.contains_key(::http::header::AUTHORIZATION) {
			return Err(ConfigError::ReservedHeader { name: ::http::header::AUTHORIZATION });
		}

		Ok(())
	}
}

/// Fully resolved request handed to an [`ApiTransport`](crate::http::ApiTransport).
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// Request method.
	pub method: Method,
	/// Absolute target URL including the query string.
	pub url: Url,
	/// Headers to send, including `Authorization` when a token was attached.
	pub headers: HeaderMap,
	/// Serialized body, if any.
	pub body: Option<Vec<u8>>,
}
impl PreparedRequest {
	/// Returns the bearer token carried by the request, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.headers
			.get(::http::header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "))
	}
}
