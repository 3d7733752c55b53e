//! Wire types of the remote catalog API
//!
//! Field names follow the backend's JSON. Unknown fields are ignored and
//! `null` collections are read as empty, since the backend emits `null` for
//! nil slices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A product as returned by `GET /products`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    pub name: String,

    /// Price in the smallest currency unit
    pub price: u64,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image_list: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Pagination metadata of one result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub first_page: u32,
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub total_records: u64,
}

impl PageMetadata {
    /// Metadata of a result set with no records
    #[must_use]
    pub const fn empty(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            first_page: 1,
            last_page: 1,
            total_records: 0,
        }
    }

    /// Repair metadata the backend leaves zeroed
    ///
    /// An empty result set comes back with every field set to zero; that is
    /// turned into a single empty page. Otherwise `first_page` is raised to 1
    /// and `last_page` to at least `first_page`, and a missing `current_page`
    /// or `page_size` is taken from the request.
    #[must_use]
    pub fn normalized(self, requested_page: u32, requested_size: u32) -> Self {
        if self.total_records == 0 && self.last_page == 0 {
            return Self::empty(requested_size);
        }

        let first_page = self.first_page.max(1);
        let last_page = self.last_page.max(first_page);
        let current_page = if self.current_page == 0 {
            requested_page.max(first_page)
        } else {
            self.current_page
        };
        let page_size = if self.page_size == 0 {
            requested_size
        } else {
            self.page_size
        };

        Self {
            current_page,
            page_size,
            first_page,
            last_page,
            total_records: self.total_records,
        }
    }

    /// Whether a page before the current one exists
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > self.first_page
    }

    /// Whether a page after the current one exists
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// Body of `GET /products`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    #[serde(default)]
    pub metadata: PageMetadata,
}

/// Body of `GET /products/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// Body of `GET /categories`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}

/// Body of `GET /tags`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// One page of results as the engine holds it
///
/// Replaced wholesale on every accepted response, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    /// Products in server order
    pub items: Vec<Product>,
    pub metadata: PageMetadata,
}

impl PageResult {
    /// Build a page from a response to a request for `page` of `page_size`
    #[must_use]
    pub fn from_response(response: ProductsResponse, page: u32, page_size: u32) -> Self {
        Self {
            items: response.products,
            metadata: response.metadata.normalized(page, page_size),
        }
    }
}

/// Selectable categories and tags, independent of the current filters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}
