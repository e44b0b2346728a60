//! Session lifecycle: login, registration, logout, and restoring a persisted session on startup.
//!
//! Login and register are sent without a token and outside refresh coordination, since their `401`
//! means bad credentials. Both store the returned access token and then load the account through
//! the authenticated `me` endpoint.

// self
use crate::{
	_prelude::*,
	api::User,
	auth::{LoginRequest, RegisterData, TokenResponse},
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges credentials for an access token and returns the signed-in account.
	///
	/// # Errors
	///
	/// A `401` from the login endpoint is returned as [`Error::Status`]; it never triggers a
	/// refresh.
	pub async fn login(&self, email: &str, password: &str) -> Result<User> {
		let request = ApiRequest::post(self.config.endpoints.login.clone())
			.json(&LoginRequest::new(email, password))?;

		self.authenticate("login", request).await
	}

	/// Creates an account, signs it in, and returns it.
	pub async fn register(&self, data: &RegisterData) -> Result<User> {
		let request = ApiRequest::post(self.config.endpoints.register.clone()).json(data)?;

		self.authenticate("register", request).await
	}

	/// Loads the account the current token belongs to.
	pub async fn current_user(&self) -> Result<User> {
		self.request_json(ApiRequest::get(self.config.endpoints.me.clone())).await
	}

	/// Ends the session. Server-side failures are logged and ignored; the local token is always
	/// cleared.
	pub async fn logout(&self) {
		const KIND: CallKind = CallKind::Session;

		let span = CallSpan::new(KIND, "logout");
		let request = ApiRequest::post(self.config.endpoints.logout.clone());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		match span.instrument(self.request(request)).await {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(e) => obs::record_swallowed_error(KIND, "logout", &e),
		}

		self.tokens.clear_token();
	}

	/// Resumes a persisted session.
	///
	/// Returns `None` without a network call when no token is stored. When the stored token cannot
	/// load the account, even after a refresh, the token is cleared and `None` is returned.
	pub async fn restore_session(&self) -> Option<User> {
		const KIND: CallKind = CallKind::Session;

		if !self.tokens.has_token() {
			return None;
		}

		let span = CallSpan::new(KIND, "restore_session");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		match span.instrument(self.current_user()).await {
			Ok(user) => {
				obs::record_call_outcome(KIND, CallOutcome::Success);

				Some(user)
			},
			Err(e) => {
				obs::record_swallowed_error(KIND, "restore_session", &e);
				self.tokens.clear_token();

				None
			},
		}
	}

	async fn authenticate(&self, stage: &'static str, request: ApiRequest) -> Result<User> {
		const KIND: CallKind = CallKind::Session;

		let span = CallSpan::new(KIND, stage);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let token =
					self.send_unauthenticated(request).await?.json::<TokenResponse>()?.into_access_token()?;

				self.tokens.set_token(token);

				self.current_user().await
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}
