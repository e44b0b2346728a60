//! Raw API responses and JSON decoding.

// self
use crate::{_prelude::*, error::DecodeError};

/// Response returned by an [`ApiTransport`](crate::http::ApiTransport).
#[derive(Clone)]
pub struct ApiResponse {
	/// Response status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Builds a response from its parts.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError::Json { source, status: self.status }.into())
	}
}
impl Debug for ApiResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiResponse")
			.field("status", &self.status)
			.field("body_len", &self.body.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct CopyRow {
		barcode: String,
	}

	#[test]
	fn json_errors_report_the_failing_path() {
		let response = ApiResponse::new(StatusCode::OK, "[{\"barcode\":7}]");
		let err = response.json::<Vec<CopyRow>>().expect_err("Numeric barcode should not decode.");

		match err {
			Error::Decode(DecodeError::Json { source, status }) => {
				assert_eq!(status, StatusCode::OK);
				assert_eq!(source.path().to_string(), "[0].barcode");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn json_decodes_typed_payloads() {
		let response = ApiResponse::new(StatusCode::OK, "[{\"barcode\":\"B-1\"}]");
		let copies = response.json::<Vec<CopyRow>>().expect("Copies should decode.");

		assert_eq!(copies[0].barcode, "B-1");
	}
}
