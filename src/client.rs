//! Authenticated API client with transparent access-token refresh.
//!
//! [`ApiClient::request`] attaches the current bearer token, and when the API answers `401` for a
//! request that carried a token, targets an ordinary resource, and has not been replayed yet, the
//! client runs refresh coordination (see [`refresh`]) before answering the caller. Every other
//! failure reaches the caller unchanged.

pub mod config;
pub mod refresh;

pub use config::*;
pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::StatusError,
	http::{ApiRequest, ApiResponse, ApiTransport, PreparedRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Issues authenticated calls against the Digilib API.
///
/// Clones share the transport, token store, metrics, and refresh state, so a single refresh is
/// coordinated across every clone. Construct one client per API deployment and pass clones to
/// every call site.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// Store holding the current access token.
	pub tokens: Arc<TokenStore>,
	/// Shared counters for refresh coordination.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh: Arc<Mutex<refresh::RefreshState>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client over the caller-provided transport with an in-memory token store.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let tokens = TokenStore::new(
			config.storage_key.clone(),
			Arc::new(crate::store::MemoryPersistence::default()),
		);

		Self {
			transport: transport.into(),
			config: Arc::new(config),
			tokens: Arc::new(tokens),
			refresh_metrics: Default::default(),
			refresh: Default::default(),
		}
	}

	/// Replaces the token store, e.g. with one backed by
	/// [`FilePersistence`](crate::store::FilePersistence).
	pub fn with_token_store(mut self, tokens: Arc<TokenStore>) -> Self {
		self.tokens = tokens;

		self
	}

	/// Returns the token store shared by this client.
	pub fn token_store(&self) -> &TokenStore {
		&self.tokens
	}

	/// Returns `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refresh.lock().is_refreshing()
	}

	/// Performs an authenticated call, refreshing the access token once on `401`.
	///
	/// # Errors
	///
	/// - [`ConfigError::ReservedHeader`](crate::error::ConfigError::ReservedHeader) when the
	///   request already carries `Authorization`.
	/// - [`Error::Status`] for non-success responses that were not recovered.
	/// - [`Error::SessionExpired`] when the refresh this request depended on failed.
	/// - [`Error::Transport`] when no response was received.
	pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "request");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				request.ensure_no_reserved_headers()?;

				let token = self.tokens.get_token();
				let result = self.dispatch(&request, token.as_ref()).await;

				match (result, token) {
					(Err(Error::Status(e)), Some(sent)) if self.should_refresh(&request, &e) =>
						self.refresh_and_replay(request.mark_retried(), &sent).await,
					(result, _) => result,
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Performs an authenticated call and decodes the JSON body.
	pub async fn request_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(request).await?.json()
	}

	/// Performs a call without attaching a token and without refresh handling.
	///
	/// Used for the login and register endpoints, whose `401` means bad credentials.
	pub async fn send_unauthenticated(&self, request: ApiRequest) -> Result<ApiResponse> {
		request.ensure_no_reserved_headers()?;

		self.dispatch(&request, None).await
	}

	fn should_refresh(&self, request: &ApiRequest, err: &StatusError) -> bool {
		err.status == StatusCode::UNAUTHORIZED
			&& !request.is_retried()
			&& !self.config.endpoints.bypasses_refresh(&request.full_path())
	}

	/// Sends one request as-is; non-success statuses become [`Error::Status`].
	pub(crate) async fn dispatch(
		&self,
		request: &ApiRequest,
		token: Option<&AccessToken>,
	) -> Result<ApiResponse> {
		let prepared = self.prepare(request, token)?;
		let response = self.transport.send(prepared).await?;

		if response.status.is_success() {
			return Ok(response);
		}

		Err(StatusError {
			status: response.status,
			method: request.method().clone(),
			path: request.full_path(),
			body: response.body,
		}
		.into())
	}

	fn prepare(&self, request: &ApiRequest, token: Option<&AccessToken>) -> Result<PreparedRequest> {
		let url = self.config.endpoint_url(request)?;
		let mut headers = request.headers().clone();

		if let Some(token) = token {
			headers.insert(::http::header::AUTHORIZATION, token.bearer_header()?);
		}

		headers
			.entry(::http::header::ACCEPT)
			.or_insert_with(|| HeaderValue::from_static("application/json"));

		Ok(PreparedRequest {
			method: request.method().clone(),
			url,
			headers,
			body: request.body().map(<[u8]>::to_vec),
		})
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a cookie-enabled reqwest transport and an in-memory token store.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let transport = ReqwestTransport::new()?;

		Ok(Self::with_transport(config, transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			tokens: self.tokens.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("tokens", &self.tokens)
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}
