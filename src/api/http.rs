//! HTTP implementation of `CatalogApi` backed by `reqwest`

use super::error::ApiError;
use super::types::{CategoriesResponse, Product, ProductResponse, ProductsResponse, TagsResponse};
use super::CatalogApi;
use crate::query::RemoteQueryParams;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog client for a JSON API rooted at `base_url`
#[derive(Clone, Debug)]
pub struct HttpCatalogApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpCatalogApi {
    /// Create a client for `base_url` (e.g. `http://localhost:4000/v1`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the URL cannot be parsed, or
    /// `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Base URL all endpoints are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        debug!(%url, ?query, "GET");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_products(
        &self,
        params: &RemoteQueryParams,
    ) -> Result<ProductsResponse, ApiError> {
        let url = self.endpoint("products")?;
        self.get_json(url, &params.to_pairs()).await
    }

    async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let mut url = self.endpoint("products/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id);
        let response: ProductResponse = self.get_json(url, &[]).await?;
        Ok(response.product)
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("categories")?;
        let response: CategoriesResponse = self.get_json(url, &[]).await?;
        Ok(response.categories)
    }

    async fn tags(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("tags")?;
        let response: TagsResponse = self.get_json(url, &[]).await?;
        Ok(response.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = HttpCatalogApi::new("http://localhost:4000/v1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:4000/v1/");
        assert_eq!(
            api.endpoint("products").unwrap().as_str(),
            "http://localhost:4000/v1/products"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpCatalogApi::new("localhost without scheme", DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
