//! Testing utilities for catalogr
//!
//! This module provides product fixtures and `ScriptedCatalogApi`, an
//! in-process `CatalogApi` whose replies and latencies are scripted per
//! request. Combined with `#[tokio::test(start_paused = true)]` it makes
//! response ordering deterministic.
//!
//! Only available when compiled with `cfg(test)`.

use crate::api::{ApiError, CatalogApi, PageMetadata, PageResult, Product, ProductsResponse};
use crate::query::RemoteQueryParams;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Build a product with the given id, name and price
#[must_use]
pub fn product(id: &str, name: &str, price: u64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image: None,
        image_list: Vec::new(),
        description: None,
        category_id: None,
        tags: Vec::new(),
        created_at: None,
        modified_at: None,
    }
}

/// Build a product carrying `tags`
#[must_use]
pub fn tagged(id: &str, name: &str, price: u64, tags: &[&str]) -> Product {
    Product {
        tags: tags.iter().map(ToString::to_string).collect(),
        ..product(id, name, price)
    }
}

fn metadata(current: u32, last: u32, total: u64) -> PageMetadata {
    PageMetadata {
        current_page: current,
        page_size: 12,
        first_page: 1,
        last_page: last,
        total_records: total,
    }
}

/// A raw `GET /products` body
#[must_use]
pub fn products_response(
    items: Vec<Product>,
    current: u32,
    last: u32,
    total: u64,
) -> ProductsResponse {
    ProductsResponse {
        products: items,
        metadata: metadata(current, last, total),
    }
}

/// A page as the engine holds it
#[must_use]
pub fn page_of(items: Vec<Product>, current: u32, last: u32, total: u64) -> PageResult {
    PageResult {
        items,
        metadata: metadata(current, last, total),
    }
}

/// What a scripted endpoint answers
#[derive(Debug, Clone)]
pub enum Reply {
    Page(ProductsResponse),
    /// Filter, sort and paginate a product set the way the backend does
    Catalog(Vec<Product>),
    Status(u16),
    Malformed,
}

impl Reply {
    fn into_result(self, params: &RemoteQueryParams) -> Result<ProductsResponse, ApiError> {
        match self {
            Self::Page(response) => Ok(response),
            Self::Catalog(products) => Ok(query_catalog(products, params)),
            Self::Status(status) => Err(ApiError::Status {
                status,
                body: String::new(),
            }),
            Self::Malformed => {
                Err(serde_json::from_str::<ProductsResponse>("{").unwrap_err().into())
            }
        }
    }
}

fn matches_query(product: &Product, params: &RemoteQueryParams) -> bool {
    let category = params
        .category
        .as_ref()
        .is_none_or(|category| product.category_id.as_ref() == Some(category));
    // Every requested tag must be present
    let tags = params.tags.as_deref().is_none_or(|tags| {
        tags.split(',')
            .filter(|tag| !tag.is_empty())
            .all(|tag| product.tags.iter().any(|t| t == tag))
    });
    let name = params
        .name
        .as_ref()
        .is_none_or(|name| product.name.to_lowercase().contains(&name.to_lowercase()));
    let price = params.price_from.is_none_or(|from| product.price >= from)
        && params.price_to.is_none_or(|to| product.price <= to);

    category && tags && name && price
}

/// Answer `params` from an in-memory product set
///
/// A page with no rows, including one past the end, comes back with zeroed
/// metadata.
fn query_catalog(mut products: Vec<Product>, params: &RemoteQueryParams) -> ProductsResponse {
    products.retain(|product| matches_query(product, params));
    products.sort_by_key(|product| product.price);
    if params.sort.starts_with('-') {
        products.reverse();
    }

    let page_size = params.page_size.max(1) as usize;
    let total = products.len();
    let start = (params.page.max(1) as usize - 1).saturating_mul(page_size);
    let items: Vec<_> = products.into_iter().skip(start).take(page_size).collect();
    if items.is_empty() {
        return ProductsResponse::default();
    }

    let last = u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX);
    ProductsResponse {
        products: items,
        metadata: PageMetadata {
            current_page: params.page,
            page_size: params.page_size,
            first_page: 1,
            last_page: last,
            total_records: total as u64,
        },
    }
}

type Matcher = Box<dyn Fn(&RemoteQueryParams) -> bool + Send + Sync>;

struct Route {
    matches: Matcher,
    reply: Reply,
    delay: Duration,
}

struct Script {
    routes: Vec<Route>,
    fallback: Reply,
    categories: Vec<String>,
    tags: Vec<String>,
    vocabulary_status: Option<u16>,
    calls: Vec<String>,
}

/// Scripted in-memory catalog backend
///
/// Requests are matched against routes in registration order; unmatched
/// requests get the fallback reply (an empty page unless changed) without
/// delay. Every product query is recorded as its encoded query string.
///
/// # Examples
/// ```ignore
/// let api = ScriptedCatalogApi::new()
///     .route(|p| p.page == 2, products_response(vec![], 2, 2, 12), Duration::from_millis(80))
///     .with_vocabulary(&["Nature"], &["neon"]);
/// ```
pub struct ScriptedCatalogApi {
    script: Mutex<Script>,
}

impl ScriptedCatalogApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                routes: Vec::new(),
                fallback: Reply::Page(ProductsResponse::default()),
                categories: Vec::new(),
                tags: Vec::new(),
                vocabulary_status: None,
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer matching queries with `response` after `delay`
    #[must_use]
    pub fn route<F>(self, matches: F, response: ProductsResponse, delay: Duration) -> Self
    where
        F: Fn(&RemoteQueryParams) -> bool + Send + Sync + 'static,
    {
        self.lock().routes.push(Route {
            matches: Box::new(matches),
            reply: Reply::Page(response),
            delay,
        });
        self
    }

    /// Answer unmatched queries with `response`
    #[must_use]
    pub fn with_fallback(self, response: ProductsResponse) -> Self {
        self.set_fallback(response);
        self
    }

    /// Answer unmatched queries from `products`, applying the query's filters
    #[must_use]
    pub fn with_catalog(self, products: Vec<Product>) -> Self {
        self.lock().fallback = Reply::Catalog(products);
        self
    }

    /// Answer unmatched queries with an HTTP error
    #[must_use]
    pub fn with_status(self, status: u16) -> Self {
        self.lock().fallback = Reply::Status(status);
        self
    }

    /// Answer unmatched queries with an undecodable body
    #[must_use]
    pub fn with_malformed_body(self) -> Self {
        self.lock().fallback = Reply::Malformed;
        self
    }

    #[must_use]
    pub fn with_vocabulary(self, categories: &[&str], tags: &[&str]) -> Self {
        {
            let mut script = self.lock();
            script.categories = categories.iter().map(ToString::to_string).collect();
            script.tags = tags.iter().map(ToString::to_string).collect();
        }
        self
    }

    /// Make the vocabulary endpoints fail with `status`
    #[must_use]
    pub fn with_vocabulary_status(self, status: u16) -> Self {
        self.lock().vocabulary_status = Some(status);
        self
    }

    /// Replace the fallback reply after construction
    pub fn set_fallback(&self, response: ProductsResponse) {
        self.lock().fallback = Reply::Page(response);
    }

    /// Product queries received so far, as encoded query strings
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn vocabulary(&self, pick: fn(&Script) -> &Vec<String>) -> Result<Vec<String>, ApiError> {
        let script = self.lock();
        match script.vocabulary_status {
            Some(status) => Err(ApiError::Status {
                status,
                body: String::new(),
            }),
            None => Ok(pick(&script).clone()),
        }
    }
}

impl Default for ScriptedCatalogApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalogApi {
    async fn list_products(
        &self,
        params: &RemoteQueryParams,
    ) -> Result<ProductsResponse, ApiError> {
        let (reply, delay) = {
            let mut script = self.lock();
            script.calls.push(params.to_query_string());
            script
                .routes
                .iter()
                .find(|route| (route.matches)(params))
                .map_or_else(
                    || (script.fallback.clone(), Duration::ZERO),
                    |route| (route.reply.clone(), route.delay),
                )
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.into_result(params)
    }

    async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let script = self.lock();
        let candidates = script
            .routes
            .iter()
            .map(|r| &r.reply)
            .chain(std::iter::once(&script.fallback));
        candidates
            .filter_map(|reply| match reply {
                Reply::Page(response) => response.products.iter().find(|p| p.id == id),
                Reply::Catalog(products) => products.iter().find(|p| p.id == id),
                _ => None,
            })
            .next()
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("product {id} not found"),
            })
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.vocabulary(|script| &script.categories)
    }

    async fn tags(&self) -> Result<Vec<String>, ApiError> {
        self.vocabulary(|script| &script.tags)
    }
}
