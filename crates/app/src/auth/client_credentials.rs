//! Client-credentials token exchange against the auth service.

use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ClientSecret, TokenError, TokenProvider};

/// Tokens closer than this to expiry are refreshed before use.
const REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(30);

/// Configuration for [`ClientCredentialsTokenProvider`].
#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    /// Auth service base URL, e.g. `"http://auth:8080"`.
    pub base_url: String,

    pub client_id: String,

    pub client_secret: ClientSecret,

    /// Timeout applied to each token request.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Timestamp,
}

impl CachedToken {
    fn is_fresh(&self, now: Timestamp) -> bool {
        self.expires_at.duration_since(now) > REFRESH_MARGIN
    }
}

/// Caches a service token and exchanges client credentials for a new one when
/// it nears expiry. Concurrent callers share a single exchange.
#[derive(Debug)]
pub struct ClientCredentialsTokenProvider {
    config: ClientCredentialsConfig,
    http: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl ClientCredentialsTokenProvider {
    /// Create a provider from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientCredentialsConfig) -> Result<Self, TokenError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            http,
            cached: RwLock::new(None),
        })
    }

    async fn fetch(&self) -> Result<CachedToken, TokenError> {
        let url = format!(
            "{}/api/v1/auth/token",
            self.config.base_url.trim_end_matches('/')
        );

        let body = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: self.config.client_secret.expose(),
        };

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(TokenError::UnexpectedResponse(format!(
                "token request failed with status {status}: {text}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;

        let expires_at = Timestamp::from_second(parsed.access_expires_at)?;

        debug!(%expires_at, "obtained service token");

        Ok(CachedToken {
            value: parsed.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn token(&self) -> Result<String, TokenError> {
        if let Some(cached) = self.cached.read().await.as_ref()
            && cached.is_fresh(Timestamp::now())
        {
            return Ok(cached.value.clone());
        }

        let mut cached = self.cached.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Timestamp::now())
        {
            return Ok(token.value.clone());
        }

        let fetched = self.fetch().await?;
        let value = fetched.value.clone();

        *cached = Some(fetched);

        Ok(value)
    }

    async fn invalidate(&self, stale: &str) {
        let mut cached = self.cached.write().await;

        if cached.as_ref().is_some_and(|token| token.value == stale) {
            *cached = None;
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    access_expires_at: i64,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use testresult::TestResult;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    use super::*;

    fn provider(server: &MockServer) -> Result<ClientCredentialsTokenProvider, TokenError> {
        ClientCredentialsTokenProvider::new(ClientCredentialsConfig {
            base_url: server.uri(),
            client_id: "cart-svc".to_string(),
            client_secret: ClientSecret::new("s3cret"),
            timeout: Duration::from_secs(5),
        })
    }

    fn token_response(token: &str, ttl_seconds: i64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": token,
            "accessExpiresAt": Timestamp::now().as_second() + ttl_seconds,
        }))
    }

    #[tokio::test]
    async fn exchanges_client_credentials_once_while_fresh() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/token"))
            .and(body_json(json!({
                "clientId": "cart-svc",
                "clientSecret": "s3cret",
            })))
            .respond_with(token_response("token-1", 3600))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server)?;

        assert_eq!(provider.token().await?, "token-1");
        assert_eq!(provider.token().await?, "token-1");

        Ok(())
    }

    #[tokio::test]
    async fn refreshes_token_inside_expiry_margin() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/token"))
            .respond_with(token_response("short-lived", 10))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server)?;

        provider.token().await?;
        provider.token().await?;

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_exchange() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/token"))
            .respond_with(token_response("shared", 3600).set_delay(Duration::from_millis(50)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Arc::new(provider(&server)?);

        let calls = (0..5).map(|_| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.token().await })
        });

        for call in calls.collect::<Vec<_>>() {
            assert_eq!(call.await??, "shared");
        }

        Ok(())
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_exchange() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/token"))
            .respond_with(token_response("token", 3600))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server)?;

        let token = provider.token().await?;

        provider.invalidate("some-other-token").await;
        provider.token().await?;

        provider.invalidate(&token).await;
        provider.token().await?;

        Ok(())
    }

    #[tokio::test]
    async fn rejected_credentials_return_unexpected_response() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let result = provider(&server)?.token().await;

        assert!(
            matches!(result, Err(TokenError::UnexpectedResponse(_))),
            "expected UnexpectedResponse, got {result:?}"
        );

        Ok(())
    }
}
