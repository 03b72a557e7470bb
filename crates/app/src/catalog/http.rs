//! HTTP catalog client.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{auth::TokenProvider, domain::carts::models::ProductUuid};

use super::{CatalogClient, CatalogError, ProductQuote};

/// Configuration for [`HttpCatalogClient`].
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    /// Catalog service base URL, e.g. `"http://catalog:8080"`.
    pub base_url: String,

    /// Timeout applied to each request.
    pub timeout: Duration,
}

/// [`CatalogClient`] over the catalog service's internal JSON endpoints.
#[derive(Clone)]
pub struct HttpCatalogClient {
    base_url: String,
    http: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpCatalogClient {
    /// Create a client that authenticates with tokens from `tokens`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: HttpCatalogConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    fn product_url(&self, product: ProductUuid) -> String {
        format!("{}/internal/products/{product}", self.base_url)
    }

    /// Send an authenticated request, retrying once with a fresh token when
    /// the catalog answers `401`.
    async fn send_authorized<T, F>(&self, build: F) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let token = self.tokens.token().await?;
        let mut response = build().bearer_auth(&token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("catalog rejected service token, refreshing");

            self.tokens.invalidate(&token).await;

            let token = self.tokens.token().await?;

            response = build().bearer_auth(&token).send().await?;
        }

        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    match response.status() {
        status if status.is_success() => Ok(response.json().await?),
        StatusCode::NOT_FOUND => Err(CatalogError::ProductNotFound),
        StatusCode::UNAUTHORIZED => Err(CatalogError::Unauthorized),
        status => {
            let text = response.text().await.unwrap_or_default();

            Err(CatalogError::UnexpectedResponse(format!(
                "catalog request failed with status {status}: {text}"
            )))
        }
    }
}

impl fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn price_and_availability(
        &self,
        product: ProductUuid,
    ) -> Result<ProductQuote, CatalogError> {
        let url = self.product_url(product);

        let parsed: ProductResponse = self.send_authorized(|| self.http.get(&url)).await?;

        Ok(ProductQuote {
            price: parsed.price,
            available_qty: parsed.available_quantity,
        })
    }

    async fn availability(&self, product: ProductUuid) -> Result<i64, CatalogError> {
        let url = format!("{}/availability", self.product_url(product));

        let parsed: AvailabilityResponse = self.send_authorized(|| self.http.get(&url)).await?;

        Ok(parsed.available_quantity)
    }

    async fn verify_for_checkout(
        &self,
        product: ProductUuid,
        qty: i32,
    ) -> Result<bool, CatalogError> {
        let url = format!("{}/checkout", self.product_url(product));

        let parsed: CheckoutResponse = self
            .send_authorized(|| self.http.get(&url).query(&[("qty", qty)]))
            .await?;

        Ok(parsed.available)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductResponse {
    price: Decimal,
    available_quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityResponse {
    available_quantity: i64,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    available: bool,
}
