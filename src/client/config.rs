//! Client configuration: API base URL, auth endpoint paths, and the token storage key.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError, http::ApiRequest, store::DEFAULT_STORAGE_KEY};

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const API_URL_ENV: &str = "DIGILIB_API_URL";
/// Base URL used when [`API_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Paths of the authentication endpoints, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthEndpoints {
	/// `POST` credentials, returns an access token.
	pub login: String,
	/// `POST` a new account, returns an access token.
	pub register: String,
	/// `POST` with the refresh cookie, returns a new access token.
	pub refresh: String,
	/// `POST` to end the server-side session.
	pub logout: String,
	/// `GET` the authenticated account.
	pub me: String,
}
impl AuthEndpoints {
	/// Returns `true` for endpoints whose `401` means bad credentials rather than an expired token.
	///
	/// Requests to these paths never enter refresh coordination.
	pub fn bypasses_refresh(&self, path: &str) -> bool {
		let path = normalize(path);

		[&self.login, &self.register, &self.refresh].into_iter().any(|p| normalize(p) == path)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		for path in [&self.login, &self.register, &self.refresh, &self.logout, &self.me] {
			ensure_absolute(path)?;
		}

		Ok(())
	}
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			login: "/auth/login".into(),
			register: "/auth/register".into(),
			refresh: "/auth/refresh".into(),
			logout: "/auth/logout".into(),
			me: "/auth/me".into(),
		}
	}
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API root; request paths are appended to it verbatim.
	pub base_url: Url,
	/// Authentication endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Key under which the access token is persisted.
	pub storage_key: String,
}
impl ClientConfig {
	/// Creates a configuration with default endpoints for the provided base URL.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		Self::builder(base_url).build()
	}

	/// Starts a builder for the provided base URL.
	pub fn builder(base_url: impl AsRef<str>) -> ClientConfigBuilder {
		ClientConfigBuilder {
			base_url: base_url.as_ref().to_owned(),
			endpoints: AuthEndpoints::default(),
			storage_key: DEFAULT_STORAGE_KEY.into(),
		}
	}

	/// Reads the base URL from [`API_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let base_url = lookup(API_URL_ENV)
			.filter(|value| !value.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_BASE_URL.into());

		Self::new(base_url.trim())
	}

	/// Resolves a request into an absolute URL under the base URL.
	///
	/// Raw segments are percent-encoded one by one, so a `/` inside a value never splits it.
	pub fn endpoint_url(&self, request: &ApiRequest) -> Result<Url, ConfigError> {
		let path = request.path();

		ensure_absolute(path)?;

		let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
		let mut url =
			Url::parse(&joined).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !request.segments().is_empty() {
			url.path_segments_mut()
				.map_err(|_| ConfigError::UnsupportedBaseUrl { url: self.base_url.to_string() })?
				.pop_if_empty()
				.extend(request.segments());
		}

		let query = request.query_pairs();

		if !query.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (key, value) in query {
				pairs.append_pair(key, value);
			}
		}

		Ok(url)
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	base_url: String,
	endpoints: AuthEndpoints,
	storage_key: String,
}
impl ClientConfigBuilder {
	/// Overrides the login path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.login = path.into();

		self
	}

	/// Overrides the register path.
	pub fn register_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.register = path.into();

		self
	}

	/// Overrides the refresh path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Overrides the logout path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.logout = path.into();

		self
	}

	/// Overrides the current-account path.
	pub fn me_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.me = path.into();

		self
	}

	/// Overrides the key under which the access token is persisted.
	pub fn storage_key(mut self, key: impl Into<String>) -> Self {
		self.storage_key = key.into();

		self
	}

	/// Validates and builds the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedBaseUrl { url: self.base_url });
		}
		if self.storage_key.trim().is_empty() {
			return Err(ConfigError::EmptyStorageKey);
		}

		self.endpoints.validate()?;
		base_url.set_query(None);
		base_url.set_fragment(None);

		Ok(ClientConfig { base_url, endpoints: self.endpoints, storage_key: self.storage_key })
	}
}

fn ensure_absolute(path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { path: path.into() })
	}
}

fn normalize(path: &str) -> &str {
	let trimmed = path.trim_end_matches('/');

	if trimmed.is_empty() { "/" } else { trimmed }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_url_keeps_base_path_and_query_order() {
		let config = ClientConfig::new("https://digilib.example.com/api/")
			.expect("Config fixture should be valid.");
		let request = ApiRequest::get("/books")
			.query("page", 1)
			.query("sorts", "lastName")
			.query("sorts", "firstName");
		let url = config.endpoint_url(&request).expect("Endpoint URL should resolve.");

		assert_eq!(
			url.as_str(),
			"https://digilib.example.com/api/books?page=1&sorts=lastName&sorts=firstName"
		);
	}

	#[test]
	fn builder_rejects_bad_inputs() {
		assert!(matches!(
			ClientConfig::new("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			ClientConfig::new("ftp://digilib.example.com"),
			Err(ConfigError::UnsupportedBaseUrl { .. })
		));
		assert!(matches!(
			ClientConfig::builder(DEFAULT_BASE_URL).refresh_path("auth/refresh").build(),
			Err(ConfigError::InvalidPath { .. })
		));
		assert!(matches!(
			ClientConfig::builder(DEFAULT_BASE_URL).storage_key(" ").build(),
			Err(ConfigError::EmptyStorageKey)
		));
	}

	#[test]
	fn relative_request_paths_are_rejected() {
		let config = ClientConfig::new(DEFAULT_BASE_URL).expect("Config fixture should be valid.");

		assert!(matches!(
			config.endpoint_url(&ApiRequest::get("books")),
			Err(ConfigError::InvalidPath { .. })
		));
	}

	#[test]
	fn segments_are_percent_encoded_individually() {
		let config = ClientConfig::new("https://digilib.example.com/api/")
			.expect("Config fixture should be valid.");
		let request = ApiRequest::get("/books").segment("a/b?c d%").segment("copies");
		let url = config.endpoint_url(&request).expect("Endpoint URL should resolve.");

		assert_eq!(url.as_str(), "https://digilib.example.com/api/books/a%2Fb%3Fc%20d%25/copies");

		let trailing = ApiRequest::get("/users/").segment(7).segment("enable");

		assert_eq!(
			config.endpoint_url(&trailing).expect("Endpoint URL should resolve.").path(),
			"/api/users/7/enable"
		);
	}

	#[test]
	fn auth_endpoints_bypass_refresh() {
		let endpoints = AuthEndpoints::default();

		assert!(endpoints.bypasses_refresh("/auth/login"));
		assert!(endpoints.bypasses_refresh("/auth/register/"));
		assert!(endpoints.bypasses_refresh("/auth/refresh"));
		assert!(!endpoints.bypasses_refresh("/auth/me"));
		assert!(!endpoints.bypasses_refresh("/auth/logout"));
		assert!(!endpoints.bypasses_refresh("/books/42/copies"));
	}

	#[test]
	fn env_lookup_falls_back_to_default() {
		let fallback =
			ClientConfig::from_lookup(|_| None).expect("Default base URL should be valid.");
		let blank = ClientConfig::from_lookup(|_| Some("  ".into()))
			.expect("Blank values should fall back to the default.");
		let custom = ClientConfig::from_lookup(|key| {
			(key == API_URL_ENV).then(|| "https://api.digilib.example.com".into())
		})
		.expect("Custom base URL should be valid.");

		assert_eq!(fallback.base_url.as_str(), "http://localhost:8080/");
		assert_eq!(blank.base_url, fallback.base_url);
		assert_eq!(custom.base_url.as_str(), "https://api.digilib.example.com/");
		assert_eq!(custom.storage_key, DEFAULT_STORAGE_KEY);
	}
}
