//! Remote catalog API
//!
//! The engine treats the catalog backend as a black box reached through
//! `CatalogApi`. `HttpCatalogApi` talks to the real JSON endpoints:
//!
//! - `GET /products`: paginated search (see `query::RemoteQueryParams`)
//! - `GET /products/{id}`: single product
//! - `GET /categories` and `GET /tags`: selectable vocabulary

pub mod error;
pub mod http;
pub mod types;

pub use error::ApiError;
pub use http::HttpCatalogApi;
pub use types::{PageMetadata, PageResult, Product, ProductsResponse, Vocabulary};

use crate::query::RemoteQueryParams;
use async_trait::async_trait;

/// Operations the catalog backend provides
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Run one paginated product search
    async fn list_products(&self, params: &RemoteQueryParams) -> Result<ProductsResponse, ApiError>;

    /// Fetch a single product by id
    async fn product(&self, id: &str) -> Result<Product, ApiError>;

    /// All selectable category names
    async fn categories(&self) -> Result<Vec<String>, ApiError>;

    /// All selectable tag names
    async fn tags(&self) -> Result<Vec<String>, ApiError>;
}
