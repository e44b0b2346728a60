//! Paged list envelope returned by collection endpoints.

// self
use crate::_prelude::*;

/// One page of a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
	/// Items on this page.
	#[serde(default = "Vec::new")]
	pub content: Vec<T>,
	/// Paging metadata.
	#[serde(default)]
	pub page: PageInfo,
}
impl<T> PageResponse<T> {
	/// Returns `true` when another page follows, given the 1-based page that was requested.
	pub fn has_next(&self, requested_page: u32) -> bool {
		u64::from(requested_page) < self.page.total_pages
	}
}

/// Paging metadata attached to a [`PageResponse`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
	/// Page size used by the server.
	pub size: u64,
	/// Page number as reported by the server.
	pub number: u64,
	/// Total number of items across all pages.
	pub total_elements: u64,
	/// Total number of pages.
	pub total_pages: u64,
}

/// Clamps a caller-supplied page to the API's 1-based numbering.
pub(crate) fn one_based(page: u32) -> u32 {
	page.max(1)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn page_response_tolerates_missing_metadata() {
		let page: PageResponse<String> = serde_json::from_str("{\"content\":[\"a\"]}")
			.expect("Pages without metadata should decode.");

		assert_eq!(page.content, ["a"]);
		assert_eq!(page.page, PageInfo::default());
		assert!(!page.has_next(1));
	}

	#[test]
	fn has_next_compares_against_total_pages() {
		let page: PageResponse<u8> = serde_json::from_str(
			"{\"content\":[],\"page\":{\"size\":20,\"number\":1,\"totalElements\":45,\"totalPages\":3}}",
		)
		.expect("Page fixture should decode.");

		assert!(page.has_next(1));
		assert!(page.has_next(2));
		assert!(!page.has_next(3));
	}
}
