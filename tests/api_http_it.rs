#![cfg(feature = "reqwest")]

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use digilib_client::{
	api::{BookQuery, BookScope, CopyStatus, MessageDefaults, SortOption, UserUpdate},
	auth::{AccessToken, RegisterData, UserId},
	client::{ApiClient, ClientConfig, ReqwestApiClient},
};

fn build_client(server: &MockServer) -> Result<ReqwestApiClient> {
	let config = ClientConfig::new(server.base_url())?;

	Ok(ApiClient::new(config)?)
}

fn seed_token(client: &ReqwestApiClient, token: &str) {
	client.tokens.set_token(AccessToken::new(token).expect("Token fixture should be valid."));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_copies_request_replayed() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/books/42/copies").header("authorization", "Bearer T1");
			then.status(401).json_body(json!({ "message": "Token expired" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").header_missing("authorization");
			then.status(200).json_body(json!({ "accessToken": "T2" }));
		})
		.await;
	let replayed = server
		.mock_async(|when, then| {
			when.method(GET).path("/books/42/copies").header("authorization", "Bearer T2");
			then.status(200).json_body(json!([
				{
					"id": 1,
					"barcode": "DL-0001",
					"status": "AVAILABLE",
					"libraryId": 3,
					"libraryName": "Central",
					"libraryAddress": "1 Main Street"
				},
				{ "id": 2, "barcode": "DL-0002", "status": "CHECKED_OUT", "libraryId": 3 }
			]));
		})
		.await;
	let copies = client.book_copies("42").await?;

	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	replayed.assert_calls_async(1).await;

	assert_eq!(copies.len(), 2);
	assert!(copies[0].is_available());
	assert_eq!(copies[1].status, CopyStatus::CheckedOut);
	assert_eq!(client.tokens.get_token().map(|t| t.expose().to_owned()), Some("T2".into()));

	Ok(())
}

#[tokio::test]
async fn login_stores_token_and_loads_account() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/login")
				.header_missing("authorization")
				.json_body(json!({ "email": "ada@example.com", "password": "hunter22" }));
			then.status(200).json_body(json!({ "accessToken": "T1" }));
		})
		.await;
	let me = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me").header("authorization", "Bearer T1");
			then.status(200).json_body(json!({
				"id": 7,
				"email": "ada@example.com",
				"firstName": "Ada",
				"lastName": "Lovelace",
				"roles": ["ADMIN"]
			}));
		})
		.await;
	let user = client.login("ada@example.com", "hunter22").await?;

	login.assert_calls_async(1).await;
	me.assert_calls_async(1).await;

	assert_eq!(user.id, UserId::from(7));
	assert!(user.is_admin());
	assert!(client.tokens.has_token());

	Ok(())
}

#[tokio::test]
async fn bad_credentials_surface_without_refresh() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "stale");

	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).json_body(json!({ "accessToken": "unused" }));
		})
		.await;
	let err = client
		.login("ada@example.com", "wrong")
		.await
		.expect_err("Bad credentials should fail the login.");

	login.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;

	assert!(err.is_unauthorized());
	assert_eq!(err.user_messages(&MessageDefaults::default()), [
		"Bad credentials. Please check your email and password."
	]);

	Ok(())
}

#[tokio::test]
async fn logout_clears_token_even_when_server_fails() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/logout").header("authorization", "Bearer T1");
			then.status(500);
		})
		.await;

	client.logout().await;

	logout.assert_calls_async(1).await;

	assert!(!client.tokens.has_token());

	Ok(())
}

#[tokio::test]
async fn restore_session_drops_rejected_token() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;
	let me = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401);
		})
		.await;

	assert!(client.restore_session().await.is_none(), "No token means no session.");

	me.assert_calls_async(0).await;
	seed_token(&client, "T1");

	assert!(client.restore_session().await.is_none(), "A rejected token ends the session.");

	me.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	assert!(!client.tokens.has_token());

	Ok(())
}

#[tokio::test]
async fn catalog_listing_sends_page_and_sort() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let books = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/genres/3/books")
				.query_param("page", "2")
				.query_param("sorts", "publicationDate");
			then.status(200).json_body(json!({
				"content": [{ "isbn": "978-0-13-110362-7", "title": "The C Programming Language" }],
				"page": { "size": 1, "number": 2, "totalElements": 3, "totalPages": 3 }
			}));
		})
		.await;
	let reserve = server
		.mock_async(|when, then| {
			when.method(POST).path("/books/9/reserve").header("authorization", "Bearer T1");
			then.status(200);
		})
		.await;
	let query =
		BookQuery::new().scope(BookScope::Genre(3)).page(2).sort(SortOption::PublicationDate);
	let page = client.books(&query).await?;

	client.reserve_copy(9).await?;

	books.assert_calls_async(1).await;
	reserve.assert_calls_async(1).await;

	assert_eq!(page.content[0].title, "The C Programming Language");
	assert!(page.has_next(2));

	Ok(())
}

#[tokio::test]
async fn user_update_sends_only_changed_fields() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let update = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/users/7").json_body(json!({ "lastName": "King" }));
			then.status(200);
		})
		.await;
	let disable = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/users/7/disable");
			then.status(204);
		})
		.await;
	let payload = UserUpdate { last_name: Some("King".into()), ..Default::default() };

	client.update_user(&UserId::from(7), &payload).await?;
	client.disable_user(&UserId::from(7)).await?;

	update.assert_calls_async(1).await;
	disable.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn register_posts_camel_case_payload_and_signs_in() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;
	let register = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/register").header_missing("authorization").json_body(
				json!({
					"email": "grace@example.com",
					"firstName": "Grace",
					"lastName": "Hopper",
					"password": "cobol1959",
					"passwordConfirmation": "cobol1959"
				}),
			);
			then.status(201).json_body(json!({ "accessToken": "T1" }));
		})
		.await;
	let me = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me").header("authorization", "Bearer T1");
			then.status(200).json_body(json!({
				"id": "u-9",
				"email": "grace@example.com",
				"firstName": "Grace",
				"lastName": "Hopper",
				"roles": ["USER"]
			}));
		})
		.await;
	let data = RegisterData {
		email: "grace@example.com".into(),
		first_name: "Grace".into(),
		last_name: "Hopper".into(),
		password: "cobol1959".into(),
		password_confirmation: "cobol1959".into(),
		admin_code: None,
	};
	let user = client.register(&data).await?;

	register.assert_calls_async(1).await;
	me.assert_calls_async(1).await;

	assert_eq!(user.id, UserId::from("u-9"));
	assert!(!user.is_admin());
	assert!(client.tokens.has_token());

	Ok(())
}

#[tokio::test]
async fn enable_user_puts_to_the_enable_endpoint() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let enable = server
		.mock_async(|when, then| {
			when.method(PUT).path("/users/7/enable").header("authorization", "Bearer T1");
			then.status(204);
		})
		.await;
	let listing = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/all").query_param("page", "1").query_param("sorts", "id");
			then.status(200).json_body(json!({
				"content": [{ "id": 7, "email": "ada@example.com" }],
				"page": { "size": 20, "number": 1, "totalElements": 1, "totalPages": 1 }
			}));
		})
		.await;

	client.enable_user(&UserId::from(7)).await?;

	let users = client.users(0).await?;

	enable.assert_calls_async(1).await;
	listing.assert_calls_async(1).await;

	assert_eq!(users.content[0].email, "ada@example.com");
	assert!(!users.has_next(1));

	Ok(())
}

#[tokio::test]
async fn genre_authors_sort_by_last_then_first_name() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server)?;

	seed_token(&client, "T1");

	let authors = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/genres/4/authors")
				.query_param("page", "1")
				.query_param("sorts", "lastName")
				.query_param("sorts", "firstName");
			then.status(200).json_body(json!({
				"content": [
					{ "id": 11, "firstName": "Ursula", "lastName": "Le Guin" },
					{ "id": 12, "firstName": "Stanislaw", "lastName": "Lem" }
				],
				"page": { "size": 2, "number": 1, "totalElements": 2, "totalPages": 1 }
			}));
		})
		.await;
	let genres = server
		.mock_async(|when, then| {
			when.method(GET).path("/genres");
			then.status(200).json_body(json!([{ "id": 4, "name": "Science fiction" }]));
		})
		.await;
	let listed = client.genres().await?;
	let page = client.genre_authors(listed[0].id, 1).await?;

	genres.assert_calls_async(1).await;
	authors.assert_calls_async(1).await;

	assert_eq!(page.content.iter().map(|a| a.last_name.as_str()).collect::<Vec<_>>(), [
		"Le Guin", "Lem"
	]);

	Ok(())
}

