use serde::{Deserialize, Serialize};

/// Path of the configuration relay endpoint.
pub const PUBLIC_CONFIG_PATH: &str = "/api/config/public-config";

/// Base URL reported when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapboxConfig {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

/// Body of a successful `GET /api/config/public-config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub mapbox: MapboxConfig,
    pub api: ApiConfig,
}

impl PublicConfig {
    /// Token usable to initialize the map, if present and non-blank.
    pub fn access_token(&self) -> Option<&str> {
        self.mapbox
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Body of a failed relay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
