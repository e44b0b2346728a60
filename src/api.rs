//! Typed helpers for the Digilib endpoints, layered on [`ApiClient`](crate::client::ApiClient).
//!
//! Each submodule adds methods to the client for one resource family. All helpers except login and
//! register go through [`ApiClient::request`](crate::client::ApiClient::request) and therefore
//! benefit from transparent token refresh.

pub mod catalog;
pub mod messages;
pub mod page;
pub mod session;
pub mod users;

pub use catalog::*;
pub use messages::*;
pub use page::*;
pub use users::*;
