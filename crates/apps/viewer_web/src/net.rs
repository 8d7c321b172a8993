use catalog::{CatalogError, LOCATIONS_PATH, PlaceCatalog};
use formats::{PUBLIC_CONFIG_PATH, PublicConfig};
use gloo_net::http::Request;
use layers::{FetchError, GeometryFetcher};
use wasm_bindgen::JsValue;

async fn get_text(path: &str) -> Result<String, FetchError> {
    let resp = Request::get(path)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchError::Status {
            path: path.to_string(),
            status: resp.status(),
        });
    }
    resp.text().await.map_err(|e| FetchError::Network(e.to_string()))
}

/// Boundary GeoJSON loader backed by `fetch`.
pub struct HttpFetcher;

impl GeometryFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        get_text(path).await
    }
}

pub async fn fetch_public_config() -> Result<PublicConfig, JsValue> {
    let text = get_text(PUBLIC_CONFIG_PATH)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub async fn fetch_catalog() -> Result<PlaceCatalog, JsValue> {
    let catalog = match get_text(LOCATIONS_PATH).await {
        Ok(text) => PlaceCatalog::from_json(&text),
        Err(err) => Err(CatalogError::Unavailable(err.to_string())),
    };
    catalog.map_err(|e| JsValue::from_str(&e.to_string()))
}
