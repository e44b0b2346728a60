//! Account model, self-service profile updates, and administrator account management.

// self
use crate::{
	_prelude::*,
	api::{PageResponse, page::one_based},
	auth::UserId,
	client::ApiClient,
	error::ConfigError,
	http::{ApiRequest, ApiTransport},
};

/// Authenticated account as returned by `/auth/me` and `/users/*`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// Account identifier.
	pub id: UserId,
	/// Account email.
	pub email: String,
	/// Given name.
	#[serde(default)]
	pub first_name: String,
	/// Family name.
	#[serde(default)]
	pub last_name: String,
	/// Granted roles.
	#[serde(default)]
	pub roles: Vec<String>,
}
impl User {
	/// Returns `true` when the account holds the administrator role.
	pub fn is_admin(&self) -> bool {
		self.roles.iter().any(|role| role == "ADMIN" || role == "ROLE_ADMIN")
	}
}

/// Raw values of an account form, as typed by the user.
#[derive(Clone, Default)]
pub struct AccountForm {
	/// Email field.
	pub email: String,
	/// Given-name field.
	pub first_name: String,
	/// Family-name field.
	pub last_name: String,
	/// New password; empty keeps the current one.
	pub password: String,
	/// New password repeated.
	pub password_confirmation: String,
}
impl Debug for AccountForm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccountForm")
			.field("email", &self.email)
			.field("first_name", &self.first_name)
			.field("last_name", &self.last_name)
			.field("password_set", &!self.password.is_empty())
			.finish()
	}
}

/// Partial update sent with `PATCH /users/{id}`; absent fields are left unchanged.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
	/// New email.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// New given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// New family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// New password.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	/// New password repeated.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub password_confirmation: Option<String>,
}
impl UserUpdate {
	/// Builds an update holding only the fields of `form` that differ from `current`.
	///
	/// Names are trimmed and blank fields are ignored. A non-empty password must match its
	/// confirmation.
	pub fn diff(current: &User, form: &AccountForm) -> Result<Self, ConfigError> {
		if !form.password.is_empty() && form.password != form.password_confirmation {
			return Err(ConfigError::PasswordMismatch);
		}

		let changed = |value: &str, current: &str| {
			(!value.is_empty() && value != current).then(|| value.to_owned())
		};
		let update = Self {
			email: changed(&form.email, &current.email),
			first_name: changed(form.first_name.trim(), &current.first_name),
			last_name: changed(form.last_name.trim(), &current.last_name),
			password: (!form.password.is_empty()).then(|| form.password.clone()),
			password_confirmation: (!form.password.is_empty())
				.then(|| form.password_confirmation.clone()),
		};

		if update.is_empty() {
			return Err(ConfigError::EmptyUpdate);
		}

		Ok(update)
	}

	/// Returns `true` when no field is set.
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}
impl Debug for UserUpdate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserUpdate")
			.field("email", &self.email)
			.field("first_name", &self.first_name)
			.field("last_name", &self.last_name)
			.field("password_set", &self.password.is_some())
			.finish()
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Applies a partial update to an account (`PATCH /users/{id}`).
	pub async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<()> {
		let request = ApiRequest::patch("/users").segment(id).json(update)?;

		self.request(request).await?;

		Ok(())
	}

	/// Lists accounts, sorted by id (`GET /users/all`). Pages are 1-based.
	pub async fn users(&self, page: u32) -> Result<PageResponse<User>> {
		let request =
			ApiRequest::get("/users/all").query("page", one_based(page)).query("sorts", "id");

		self.request_json(request).await
	}

	/// Disables an account (`DELETE /users/{id}/disable`).
	pub async fn disable_user(&self, id: &UserId) -> Result<()> {
		self.request(ApiRequest::delete("/users").segment(id).segment("disable")).await?;

		Ok(())
	}

	/// Re-enables an account (`PUT /users/{id}/enable`).
	pub async fn enable_user(&self, id: &UserId) -> Result<()> {
		self.request(ApiRequest::put("/users").segment(id).segment("enable")).await?;

		Ok(())
	}
}
