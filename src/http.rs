//! Transport primitives for Digilib API calls.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack. The client resolves every
//! [`ApiRequest`] into a [`PreparedRequest`] (absolute URL, final headers) before handing it to the
//! transport, so implementations never see relative paths or decide on authentication. Transports
//! report non-success statuses as ordinary [`ApiResponse`] values; only failures that produced no
//! response at all (DNS, TCP, TLS, body read) are returned as [`TransportError`].
//!
//! The refresh token lives in an http-only cookie set by the API, so transports must keep a cookie
//! jar across calls. [`ReqwestTransport::new`] enables reqwest's cookie store for that reason.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing API calls.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by every
/// clone of an [`ApiClient`](crate::client::ApiClient), and the returned futures must be `Send` so
/// callers can move requests across executor threads.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the response, whatever its status.
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_>;
}
impl<T> ApiTransport for Arc<T>
where
	T: ?Sized + ApiTransport,
{
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Configure any custom [`ReqwestClient`] with a cookie store, otherwise the API's refresh cookie
/// is dropped and every refresh attempt fails.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a cookie store enabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let PreparedRequest { method, url, headers, body } = request;
			let mut builder = client.request(method, url.clone()).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response =
				builder.send().await.map_err(|e| TransportError::network(&url, e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body =
				response.bytes().await.map_err(|e| TransportError::network(&url, e))?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
