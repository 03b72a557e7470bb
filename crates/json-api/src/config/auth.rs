//! Auth Config

use std::{fmt, time::Duration};

use clap::Args;

use trolley_app::auth::{ClientCredentialsConfig, ClientSecret};

/// Client-credentials settings used to obtain service tokens.
#[derive(Args)]
pub struct AuthConfig {
    /// Auth service base URL
    #[arg(long, env = "AUTH_URL")]
    pub auth_url: String,

    /// Client identifier registered with the auth service
    #[arg(long, env = "AUTH_CLIENT_ID")]
    pub auth_client_id: String,

    /// Client secret registered with the auth service
    #[arg(long, env = "AUTH_CLIENT_SECRET", hide_env_values = true)]
    pub auth_client_secret: String,
}

impl AuthConfig {
    /// Settings for the client-credentials token provider.
    #[must_use]
    pub fn to_client_config(&self) -> ClientCredentialsConfig {
        ClientCredentialsConfig {
            base_url: self.auth_url.clone(),
            client_id: self.auth_client_id.clone(),
            client_secret: ClientSecret::new(self.auth_client_secret.clone()),
            timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("auth_url", &self.auth_url)
            .field("auth_client_id", &self.auth_client_id)
            .finish_non_exhaustive()
    }
}
