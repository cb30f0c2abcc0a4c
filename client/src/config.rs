use config::{ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;
use std::fmt;

const DEV_API_URL: &str = "http://localhost:1337";

/// Where the client reaches the content API.
///
/// The browser-visible and server-side bases differ in deployment. Both
/// fall back to the local development server.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "listings_public_api_url", default = "default_api_url")]
    pub public_api_url: String,
    #[serde(rename = "listings_api_url", default = "default_api_url")]
    pub server_api_url: String,
    #[serde(default)]
    pub map_api_key: Option<String>,
}

fn default_api_url() -> String {
    DEV_API_URL.to_string()
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let mut config: ClientConfig = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        config.public_api_url = config.public_api_url.trim_end_matches('/').to_string();
        config.server_api_url = config.server_api_url.trim_end_matches('/').to_string();
        config.map_api_key = config.map_api_key.filter(|key| !key.trim().is_empty());

        if config.map_api_key.is_none() {
            log::warn!("MAP_API_KEY is not set; the map view will not load");
        }
        if config.public_api_url == DEV_API_URL {
            log::warn!("LISTINGS_PUBLIC_API_URL not set, using {}", DEV_API_URL);
        }
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            public_api_url: default_api_url(),
            server_api_url: default_api_url(),
            map_api_key: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("public_api_url", &self.public_api_url)
            .field("server_api_url", &self.server_api_url)
            .field("map_api_key", &self.map_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
