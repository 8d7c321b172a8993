use std::io;
use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

/// Joins a request path onto the data root. Only plain file-name components
/// are accepted, so the result never escapes the root.
pub fn resolve(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let mut out = root.to_path_buf();
    let mut any = false;
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => {
                out.push(part);
                any = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    any.then_some(out)
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("geojson") => "application/geo+json",
        _ => "application/octet-stream",
    }
}

pub fn etag_for(data: &[u8]) -> String {
    format!("\"{}\"", blake3::hash(data).to_hex())
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|tag| tag == "*" || tag == etag)
}

pub async fn serve(root: &Path, rel: &str, request_headers: &HeaderMap) -> Response {
    let Some(path) = resolve(root, rel) else {
        debug!("rejected data path {rel:?}");
        return (StatusCode::BAD_REQUEST, "bad path").into_response();
    };

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }
        Err(err) => {
            error!("file read failed: {path:?} -> {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "read failed").into_response();
        }
    };

    let etag = etag_for(&data);
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, v);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if etag_matches(request_headers, &etag) {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&path)),
    );
    (StatusCode::OK, headers, Body::from(data)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_escapes() {
        let root = Path::new("/srv/data");
        assert_eq!(
            resolve(root, "geo/sp.geojson"),
            Some(PathBuf::from("/srv/data/geo/sp.geojson"))
        );
        assert_eq!(resolve(root, "../secret"), None);
        assert_eq!(resolve(root, "geo/../../secret"), None);
        assert_eq!(resolve(root, "/etc/passwd"), None);
        assert_eq!(resolve(root, ""), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("locations.json")), "application/json");
        assert_eq!(content_type_for(Path::new("a.geojson")), "application/geo+json");
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn etag_is_stable_and_quoted() {
        let a = etag_for(b"{}");
        assert_eq!(a, etag_for(b"{}"));
        assert_ne!(a, etag_for(b"[]"));
        assert!(a.starts_with('"') && a.ends_with('"'));
    }

    #[test]
    fn if_none_match_lists_are_split() {
        let mut h = HeaderMap::new();
        h.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"x\", \"y\""));
        assert!(etag_matches(&h, "\"y\""));
        assert!(!etag_matches(&h, "\"z\""));
    }
}
