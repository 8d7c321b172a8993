use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use formats::{ErrorBody, PUBLIC_CONFIG_PATH};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::{self, EnvSource, ProcessEnv};
use crate::static_data;

#[derive(Clone)]
pub struct AppState {
    pub data_root: PathBuf,
    pub web_root: PathBuf,
    pub env: Arc<dyn EnvSource>,
}

impl AppState {
    pub fn from_process_env(data_root: PathBuf, web_root: PathBuf) -> Self {
        Self {
            data_root,
            web_root,
            env: Arc::new(ProcessEnv),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let index = state.web_root.join("index.html");
    let spa = ServeDir::new(&state.web_root).fallback(ServeFile::new(index));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(PUBLIC_CONFIG_PATH, get(public_config))
        .route("/data/*path", get(data_file))
        .fallback_service(spa)
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn public_config(State(state): State<AppState>) -> Response {
    match config::public_config(state.env.as_ref()) {
        Ok(cfg) => (StatusCode::OK, Json(cfg)).into_response(),
        Err(err) => {
            error!("public config lookup failed: {err}");
            let body = ErrorBody {
                error: "internal server error".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn data_file(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    static_data::serve(&state.data_root, &path, &headers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, StaticEnv, TOKEN_VAR};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct BrokenEnv;

    impl EnvSource for BrokenEnv {
        fn get(&self, _key: &'static str) -> Result<Option<String>, ConfigError> {
            Err(ConfigError::Lookup("secret store offline".into()))
        }
    }

    fn state_with(env: Arc<dyn EnvSource>, data_root: PathBuf) -> AppState {
        AppState {
            web_root: data_root.join("web"),
            data_root,
            env,
        }
    }

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("locations.json"),
            r#"{"countries":[{"id":"br","name":"Brasil","geoJsonPath":"/data/br.geojson"}]}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("web")).unwrap();
        std::fs::write(dir.path().join("web/index.html"), "<html>app</html>").unwrap();
        dir
    }

    async fn get(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = Request::builder().uri(uri);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn config_without_token_is_ok_with_null() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(StaticEnv::default()), dir.path().into()));
        let resp = get(app, "/api/config/public-config", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["mapbox"]["accessToken"], serde_json::Value::Null);
        assert_eq!(json["api"]["baseUrl"], "http://localhost:3000");
    }

    #[tokio::test]
    async fn config_relays_token() {
        let dir = data_dir();
        let env = StaticEnv::default().with(TOKEN_VAR, "pk.test");
        let app = build_router(state_with(Arc::new(env), dir.path().into()));
        let json = body_json(get(app, "/api/config/public-config", &[]).await).await;
        assert_eq!(json["mapbox"]["accessToken"], "pk.test");
    }

    #[tokio::test]
    async fn config_failure_is_500_with_error_body() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(BrokenEnv), dir.path().into()));
        let resp = get(app, "/api/config/public-config", &[]).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({"error": "internal server error"}));
    }

    #[tokio::test]
    async fn data_is_served_with_etag_and_revalidates() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(StaticEnv::default()), dir.path().into()));

        let resp = get(app.clone(), "/data/locations.json", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let etag = resp.headers()[header::ETAG].to_str().unwrap().to_string();

        let resp = get(app, "/data/locations.json", &[("if-none-match", etag.as_str())]).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn data_missing_and_traversal() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(StaticEnv::default()), dir.path().into()));

        let resp = get(app.clone(), "/data/nope.geojson", &[]).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = get(app, "/data/..%2Fsecret.json", &[]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(StaticEnv::default()), dir.path().into()));
        let resp = get(app, "/healthz", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
        assert_eq!(resp.headers()["x-frame-options"], "DENY");
        assert_eq!(resp.headers()["x-xss-protection"], "1; mode=block");
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_index() {
        let dir = data_dir();
        let app = build_router(state_with(Arc::new(StaticEnv::default()), dir.path().into()));
        let resp = get(app, "/mapa", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>app</html>");
    }
}
