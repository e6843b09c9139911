use std::path::Path;

use rampart::http::request::{Method, Request, RequestBuilder};
use rampart::security::{GateError, SecurityGate};
use tempfile::TempDir;

fn fixture_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
    std::fs::write(dir.path().join("data.txt"), "payload").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/guide.html"), "<html>guide</html>").unwrap();
    dir
}

fn gate(root: &Path) -> SecurityGate {
    SecurityGate::new("127.0.0.1:8080".to_string(), root).unwrap()
}

fn with_host(host: &str) -> Request {
    RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", host)
        .build()
        .unwrap()
}

#[test]
fn test_missing_host_rejected() {
    let root = fixture_root();
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .build()
        .unwrap();

    assert!(matches!(
        gate(root.path()).check_host(&req),
        Err(GateError::MissingHost)
    ));
}

#[test]
fn test_mismatched_host_rejected() {
    let root = fixture_root();
    let g = gate(root.path());

    assert!(matches!(
        g.check_host(&with_host("evil.com")),
        Err(GateError::HostMismatch { .. })
    ));
    // Same host, wrong port.
    assert!(matches!(
        g.check_host(&with_host("127.0.0.1:9090")),
        Err(GateError::HostMismatch { .. })
    ));
    // No implied default port: the bare host does not match host:port.
    assert!(matches!(
        g.check_host(&with_host("127.0.0.1")),
        Err(GateError::HostMismatch { .. })
    ));
}

#[test]
fn test_exact_host_accepted_case_insensitively() {
    let root = fixture_root();
    let g = SecurityGate::new("localhost:8080".to_string(), root.path()).unwrap();

    assert!(g.check_host(&with_host("localhost:8080")).is_ok());
    assert!(g.check_host(&with_host("LOCALHOST:8080")).is_ok());
}

#[tokio::test]
async fn test_resolves_file_inside_root() {
    let root = fixture_root();
    let resolved = gate(root.path()).resolve_path("/data.txt").await.unwrap();

    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("data.txt"));
    assert_eq!(std::fs::read_to_string(&resolved).unwrap(), "payload");
}

#[tokio::test]
async fn test_root_serves_default_document() {
    let root = fixture_root();
    let resolved = gate(root.path()).resolve_path("/").await.unwrap();

    assert!(resolved.ends_with("index.html"));
}

#[tokio::test]
async fn test_nested_path_resolves() {
    let root = fixture_root();
    let resolved = gate(root.path())
        .resolve_path("/docs/guide.html")
        .await
        .unwrap();

    assert!(resolved.ends_with("docs/guide.html"));
}

#[tokio::test]
async fn test_traversal_variants_rejected_before_filesystem() {
    let root = fixture_root();
    let g = gate(root.path());

    // Targets that do not exist anywhere; a rejection proves the pattern
    // stage fired before any filesystem access.
    for raw in ["/../etc/passwd", "/./../x", "//x", "/docs/../../x", "relative"] {
        let err = g.resolve_path(raw).await.unwrap_err();
        assert!(
            matches!(err, GateError::SuspiciousPath(_)),
            "expected pattern rejection for {raw:?}, got {err:?}"
        );
    }
}

#[tokio::test]
async fn test_dot_segment_resolving_inside_root_still_contained() {
    let root = fixture_root();
    // "." segments are not in the rejection patterns; canonicalization
    // handles them and the result stays inside the root.
    let resolved = gate(root.path())
        .resolve_path("/./data.txt")
        .await
        .unwrap();
    assert!(resolved.ends_with("data.txt"));
}

#[tokio::test]
async fn test_symlink_escape_rejected_by_containment() {
    let outside = TempDir::new().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
    let root = fixture_root();
    std::os::unix::fs::symlink(
        outside.path().join("secret.txt"),
        root.path().join("link.txt"),
    )
    .unwrap();

    let err = gate(root.path()).resolve_path("/link.txt").await.unwrap_err();
    assert!(matches!(err, GateError::OutsideRoot(_)));
}

#[tokio::test]
async fn test_sibling_directory_prefix_not_confused() {
    // A sibling whose name extends the root's must never pass containment.
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("resources");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("ok.txt"), "ok").unwrap();
    let evil = parent.path().join("resources_evil");
    std::fs::create_dir(&evil).unwrap();
    std::fs::write(evil.join("leak.txt"), "leak").unwrap();
    std::os::unix::fs::symlink(evil.join("leak.txt"), root.join("leak.txt")).unwrap();

    let g = SecurityGate::new("127.0.0.1:8080".to_string(), &root).unwrap();
    assert!(g.resolve_path("/ok.txt").await.is_ok());
    let err = g.resolve_path("/leak.txt").await.unwrap_err();
    assert!(matches!(err, GateError::OutsideRoot(_)));
}

#[tokio::test]
async fn test_absent_resource_is_not_found() {
    let root = fixture_root();
    let err = gate(root.path()).resolve_path("/nope.html").await.unwrap_err();
    assert!(matches!(err, GateError::NotFound(_)));
}

#[tokio::test]
async fn test_path_through_regular_file_is_not_found() {
    let root = fixture_root();
    // data.txt exists but is a file, not a directory; anything below it is
    // absent, never an internal error.
    let err = gate(root.path())
        .resolve_path("/data.txt/x")
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::NotFound(_)), "got {err:?}");
}

#[test]
fn test_content_type_check() {
    let ok = RequestBuilder::new()
        .method(Method::POST)
        .path("/upload")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();
    assert!(SecurityGate::check_content_type(&ok).is_ok());

    let with_params = RequestBuilder::new()
        .method(Method::POST)
        .path("/upload")
        .header("Content-Type", "Application/JSON; charset=utf-8")
        .build()
        .unwrap();
    assert!(SecurityGate::check_content_type(&with_params).is_ok());

    let wrong = RequestBuilder::new()
        .method(Method::POST)
        .path("/upload")
        .header("Content-Type", "text/plain")
        .build()
        .unwrap();
    assert!(matches!(
        SecurityGate::check_content_type(&wrong),
        Err(GateError::UnsupportedMediaType(_))
    ));

    let missing = RequestBuilder::new()
        .method(Method::POST)
        .path("/upload")
        .build()
        .unwrap();
    assert!(matches!(
        SecurityGate::check_content_type(&missing),
        Err(GateError::UnsupportedMediaType(_))
    ));
}
