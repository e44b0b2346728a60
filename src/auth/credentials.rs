//! Payloads posted to the login and register endpoints.

// self
use crate::_prelude::*;

/// Email + password pair for `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl LoginRequest {
	/// Builds a login payload.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Account details for `POST /auth/register`.
///
/// `admin_code` is only sent when present; the API grants the admin role when it matches.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
	/// Account email.
	pub email: String,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Chosen password.
	pub password: String,
	/// Password repeated for confirmation.
	pub password_confirmation: String,
	/// Optional administrator enrollment code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_code: Option<String>,
}
impl Debug for RegisterData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterData")
			.field("email", &self.email)
			.field("first_name", &self.first_name)
			.field("last_name", &self.last_name)
			.field("admin_code_set", &self.admin_code.is_some())
			.finish()
	}
}
