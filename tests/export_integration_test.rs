//! End-to-end export tests against a mock HTTP server

use design_export::config::{
    secret_string, CacheConfig, DesignExportConfig, FigmaConfig, RetryConfig,
};
use design_export::core::export::{ExportAllOptions, ExportCoordinator};
use design_export::domain::{DesignApiError, DesignExportError, FileKey};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

const FILE_KEY: &str = "aBcD1234";
const TOKEN: &str = "figd_test_token";

fn config(server: &ServerGuard, cache_dir: &TempDir) -> DesignExportConfig {
    let mut figma = FigmaConfig {
        base_url: server.url(),
        access_token: Some(secret_string(TOKEN.to_string())),
        timeout_seconds: 5,
        task_timeout_seconds: 10,
        retry: RetryConfig {
            max_retries: 2,
            initial_delay_ms: 10,
            max_delay_ms: 50,
            backoff_multiplier: 2.0,
        },
        ..Default::default()
    };
    // 10ms spacing keeps the tests fast while still going through the limiter
    figma.rate_limit.tier1_requests_per_minute = 6000;
    figma.rate_limit.tier2_requests_per_minute = 6000;

    DesignExportConfig {
        figma,
        cache: CacheConfig {
            directory: cache_dir.path().join("images").to_string_lossy().to_string(),
        },
        ..Default::default()
    }
}

fn frame(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "FRAME",
        "absoluteBoundingBox": {"x": 0.0, "y": 0.0, "width": 1440.0, "height": 900.0}
    })
}

fn document(frames: Vec<serde_json::Value>) -> String {
    json!({
        "name": "Landing",
        "lastModified": "2025-01-01T00:00:00Z",
        "document": {
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [{
                "id": "0:1",
                "name": "Page1",
                "type": "CANVAS",
                "children": frames
            }]
        }
    })
    .to_string()
}

fn key() -> FileKey {
    FileKey::new(FILE_KEY).unwrap()
}

#[tokio::test]
async fn test_export_hero_frame_end_to_end() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();
    let image_url = format!("{}/renders/hero.png", server.url());

    let file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .match_header("x-figma-token", TOKEN)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(document(vec![frame("1:2", "Hero")]))
        .expect(1)
        .create_async()
        .await;

    let images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_header("x-figma-token", TOKEN)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "1:2".into()),
            Matcher::UrlEncoded("format".into(), "png".into()),
            Matcher::UrlEncoded("scale".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"err": null, "images": {"1:2": image_url}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let render_mock = server
        .mock("GET", "/renders/hero.png")
        .match_header("x-figma-token", Matcher::Missing)
        .with_status(200)
        .with_body([1u8, 2, 3])
        .expect(1)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let nodes = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();

    assert_eq!(nodes.len(), 1);
    let hero = &nodes[0];
    assert_eq!(hero.node_id.as_str(), "1:2");
    assert_eq!(hero.name, "Hero");
    assert_eq!(hero.path, "Document / Page1 / Hero");
    assert_eq!(hero.width, 1440.0);
    assert_eq!(hero.image_url, image_url);

    let local_path = hero.local_path.as_ref().unwrap();
    assert_eq!(local_path.file_name().unwrap(), "1_2.png");
    assert_eq!(std::fs::read(local_path).unwrap(), vec![1u8, 2, 3]);

    file_mock.assert_async().await;
    images_mock.assert_async().await;
    render_mock.assert_async().await;
}

#[tokio::test]
async fn test_second_run_served_from_cache() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![frame("1:2", "Hero")]))
        .expect(2)
        .create_async()
        .await;
    // Render URLs are re-signed on every call
    let first_images = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"err": null, "images": {"1:2": format!("{}/renders/a.png", server.url())}})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second_images = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"err": null, "images": {"1:2": format!("{}/renders/b.png", server.url())}})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let render_a = server
        .mock("GET", "/renders/a.png")
        .with_status(200)
        .with_body("first")
        .expect(1)
        .create_async()
        .await;
    let render_b = server
        .mock("GET", "/renders/b.png")
        .with_status(200)
        .with_body("second")
        .expect(0)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let first = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();
    let second = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();

    assert!(second[0].image_url.ends_with("/renders/b.png"));
    assert_eq!(first[0].local_path, second[0].local_path);
    assert_eq!(
        std::fs::read_to_string(second[0].local_path.as_ref().unwrap()).unwrap(),
        "first"
    );

    first_images.assert_async().await;
    second_images.assert_async().await;
    render_a.assert_async().await;
    render_b.assert_async().await;
}

#[tokio::test]
async fn test_rate_limited_document_fetch_is_retried() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let throttled = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(429)
        .with_header("retry-after", "0")
        .with_body("Too many requests")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![]))
        .expect(1)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let nodes = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();

    assert!(nodes.is_empty());
    throttled.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let forbidden = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(403)
        .with_body(r#"{"status":403,"err":"Invalid token"}"#)
        .expect(1)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let result = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await;

    match result {
        Err(DesignExportError::Api(DesignApiError::AuthenticationFailed { status, message })) => {
            assert_eq!(status, 403);
            assert!(message.contains("Invalid token"));
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    forbidden.assert_async().await;
}

#[tokio::test]
async fn test_export_error_field_fails_run() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![frame("1:2", "Hero")]))
        .create_async()
        .await;
    let _images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"err": "Render timeout", "images": {}}).to_string())
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let result = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(DesignExportError::Api(DesignApiError::ExportFailed(msg))) if msg == "Render timeout"
    ));
}

#[tokio::test]
async fn test_missing_url_and_failed_download_are_skipped() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![
            frame("1:1", "Ok"),
            frame("1:2", "Gone"),
            frame("1:3", "Unrendered"),
        ]))
        .create_async()
        .await;
    let _images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "err": null,
                "images": {
                    "1:1": format!("{}/renders/ok.png", server.url()),
                    "1:2": format!("{}/renders/gone.png", server.url()),
                    "1:3": null
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _ok = server
        .mock("GET", "/renders/ok.png")
        .with_status(200)
        .with_body("png")
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/renders/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let nodes = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();

    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Ok", "Gone", "Unrendered"]);

    assert!(nodes[0].is_cached());
    assert!(nodes[1].is_exported() && !nodes[1].is_cached());
    assert!(!nodes[2].is_exported() && !nodes[2].is_cached());
}

#[tokio::test]
async fn test_no_download_option_skips_cache() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![frame("1:2", "Hero")]))
        .create_async()
        .await;
    let _images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"err": null, "images": {"1:2": format!("{}/renders/x.png", server.url())}})
                .to_string(),
        )
        .create_async()
        .await;
    let render = server
        .mock("GET", "/renders/x.png")
        .expect(0)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let options = ExportAllOptions {
        max_frames: 100,
        download_images: false,
    };
    let nodes = coordinator.export_all(&key(), &options).await.unwrap();

    assert!(nodes[0].is_exported());
    assert!(!nodes[0].is_cached());
    assert!(!coordinator.cache().directory().exists());
    render.assert_async().await;
}

fn nested_groups(depth: usize, leaf: serde_json::Value) -> serde_json::Value {
    let mut node = leaf;
    for level in (0..depth).rev() {
        node = json!({
            "id": format!("5:{level}"),
            "name": format!("Group {level}"),
            "type": "GROUP",
            "children": [node]
        });
    }
    node
}

#[tokio::test]
async fn test_deeply_nested_document_exports() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();
    let depth = 150;

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(document(vec![nested_groups(depth, frame("9:9", "Buried"))]))
        .create_async()
        .await;
    let _images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::UrlEncoded("ids".into(), "9:9".into()))
        .with_status(200)
        .with_body(
            json!({"err": null, "images": {"9:9": format!("{}/renders/buried.png", server.url())}})
                .to_string(),
        )
        .create_async()
        .await;
    let _render = server
        .mock("GET", "/renders/buried.png")
        .with_status(200)
        .with_body("deep")
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let nodes = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await
        .unwrap();

    assert_eq!(nodes.len(), 1);
    let buried = &nodes[0];
    assert!(buried.path.starts_with("Document / Page1 / Group 0 / Group 1 / "));
    assert!(buried.path.ends_with(&format!("Group {} / Buried", depth - 1)));
    assert_eq!(buried.path.matches(" / ").count(), depth + 2);
    assert!(buried.is_cached());
}

#[tokio::test]
async fn test_malformed_document_is_fatal() {
    let mut server = Server::new_async().await;
    let cache_dir = TempDir::new().unwrap();

    let _file_mock = server
        .mock("GET", format!("/files/{FILE_KEY}").as_str())
        .with_status(200)
        .with_body(
            json!({
                "name": "Broken",
                "document": {"id": "0:1", "name": "Page", "type": "CANVAS"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let images_mock = server
        .mock("GET", format!("/images/{FILE_KEY}").as_str())
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let coordinator = ExportCoordinator::new(&config(&server, &cache_dir)).unwrap();
    let result = coordinator
        .export_all(&key(), &ExportAllOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(DesignExportError::Api(DesignApiError::MalformedDocument(_)))
    ));
    images_mock.assert_async().await;
}
