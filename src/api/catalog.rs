//! Book catalog: browsing by genre and author, copy availability across libraries, reservations.

// self
use crate::{
	_prelude::*,
	api::{PageResponse, page::one_based},
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

/// Catalog entry for a title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
	/// ISBN, used as the resource key.
	pub isbn: String,
	/// Title.
	pub title: String,
	/// Blurb.
	#[serde(default)]
	pub summary: String,
	/// Cover image location.
	#[serde(default)]
	pub image_url: String,
	/// Page count, when known.
	#[serde(default)]
	pub page_count: Option<u32>,
	/// Publication date as rendered by the API, when known.
	#[serde(default)]
	pub publication_date: Option<String>,
	/// Language.
	#[serde(default)]
	pub language: String,
	/// Edition.
	#[serde(default)]
	pub edition: String,
}

/// Circulation status of a physical copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CopyStatus {
	/// On the shelf and reservable.
	Available,
	/// Held for a reader.
	Reserved,
	/// Lent out.
	CheckedOut,
	/// Status this client does not know about.
	Other(String),
}
impl From<String> for CopyStatus {
	fn from(value: String) -> Self {
		match value.as_str() {
			"AVAILABLE" => Self::Available,
			"RESERVED" => Self::Reserved,
			"CHECKED_OUT" => Self::CheckedOut,
			_ => Self::Other(value),
		}
	}
}
impl From<CopyStatus> for String {
	fn from(value: CopyStatus) -> Self {
		match value {
			CopyStatus::Available => "AVAILABLE".into(),
			CopyStatus::Reserved => "RESERVED".into(),
			CopyStatus::CheckedOut => "CHECKED_OUT".into(),
			CopyStatus::Other(value) => value,
		}
	}
}

/// Physical copy of a title held by one library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCopy {
	/// Copy identifier, used to reserve it.
	pub id: i64,
	/// Shelf barcode.
	pub barcode: String,
	/// Circulation status.
	pub status: CopyStatus,
	/// Holding library.
	pub library_id: i64,
	/// Holding library name.
	#[serde(default)]
	pub library_name: String,
	/// Holding library address.
	#[serde(default)]
	pub library_address: String,
}
impl LibraryCopy {
	/// Returns `true` when the copy can be reserved.
	pub fn is_available(&self) -> bool {
		self.status == CopyStatus::Available
	}
}

/// Genre used to narrow the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
	/// Genre identifier.
	pub id: i64,
	/// Display name.
	pub name: String,
}

/// Author listed under a genre.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
	/// Author identifier.
	pub id: i64,
	/// Given name.
	#[serde(default)]
	pub first_name: String,
	/// Family name.
	#[serde(default)]
	pub last_name: String,
}

/// Sort order for book listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
	/// By title.
	#[default]
	Title,
	/// By ISBN.
	Isbn,
	/// By publication date.
	PublicationDate,
}
impl SortOption {
	/// Returns the `sorts` query values for this option.
	pub const fn as_params(self) -> &'static [&'static str] {
		match self {
			SortOption::Title => &["title"],
			SortOption::Isbn => &["isbn"],
			SortOption::PublicationDate => &["publicationDate"],
		}
	}
}

/// Which slice of the catalog to list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BookScope {
	/// Every book.
	#[default]
	All,
	/// Books in one genre.
	Genre(i64),
	/// Books by one author within one genre.
	GenreAuthor {
		/// Genre identifier.
		genre: i64,
		/// Author identifier.
		author: i64,
	},
}

/// Parameters of a book listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookQuery {
	/// Catalog slice.
	pub scope: BookScope,
	/// 1-based page; `0` is treated as `1`.
	pub page: u32,
	/// Sort order.
	pub sort: SortOption,
}
impl BookQuery {
	/// Lists the first page of every book, sorted by title.
	pub fn new() -> Self {
		Self { page: 1, ..Default::default() }
	}

	/// Narrows the listing.
	pub fn scope(mut self, scope: BookScope) -> Self {
		self.scope = scope;

		self
	}

	/// Selects a 1-based page.
	pub fn page(mut self, page: u32) -> Self {
		self.page = page;

		self
	}

	/// Selects the sort order.
	pub fn sort(mut self, sort: SortOption) -> Self {
		self.sort = sort;

		self
	}

	/// Resource path for the selected scope.
	pub fn path(&self) -> String {
		match self.scope {
			BookScope::All => "/books".into(),
			BookScope::Genre(genre) => format!("/genres/{genre}/books"),
			BookScope::GenreAuthor { genre, author } =>
				format!("/genres/{genre}/authors/{author}/books"),
		}
	}

	fn to_request(&self) -> ApiRequest {
		self.sort
			.as_params()
			.iter()
			.fold(ApiRequest::get(self.path()).query("page", one_based(self.page)), |req, sort| {
				req.query("sorts", sort)
			})
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists books for the query's scope, page, and sort order.
	pub async fn books(&self, query: &BookQuery) -> Result<PageResponse<Book>> {
		self.request_json(query.to_request()).await
	}

	/// Fetches one title (`GET /books/{isbn}`).
	pub async fn book(&self, isbn: &str) -> Result<Book> {
		self.request_json(ApiRequest::get("/books").segment(isbn)).await
	}

	/// Lists the physical copies of a title across libraries (`GET /books/{isbn}/copies`).
	pub async fn book_copies(&self, isbn: &str) -> Result<Vec<LibraryCopy>> {
		self.request_json(ApiRequest::get("/books").segment(isbn).segment("copies")).await
	}

	/// Reserves a physical copy (`POST /books/{copy_id}/reserve`).
	pub async fn reserve_copy(&self, copy_id: i64) -> Result<()> {
		self.request(ApiRequest::post("/books").segment(copy_id).segment("reserve")).await?;

		Ok(())
	}

	/// Lists every genre (`GET /genres`).
	pub async fn genres(&self) -> Result<Vec<Genre>> {
		self.request_json(ApiRequest::get("/genres")).await
	}

	/// Lists the authors of a genre, sorted by family then given name.
	pub async fn genre_authors(&self, genre_id: i64, page: u32) -> Result<PageResponse<Author>> {
		let request = ApiRequest::get(format!("/genres/{genre_id}/authors"))
			.query("page", one_based(page))
			.query("sorts", "lastName")
			.query("sorts", "firstName");

		self.request_json(request).await
	}
}
