// ABOUTME: Integration tests for image metadata extraction.
// ABOUTME: Drives extract_metadata through a scripted orchestrator and checks the report file.

mod support;

use deploy_verify::check::Status;
use deploy_verify::metadata::extract_metadata;
use deploy_verify::types::ImageRef;
use support::orchestrator::{FakeOrchestrator, proxy_container};

fn nginx() -> ImageRef {
    ImageRef::parse("nginx").unwrap()
}

#[tokio::test]
async fn writes_report_for_proxy_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image_metadata.txt");
    let fake = FakeOrchestrator::default();
    let containers = vec![proxy_container("mongo:7"), proxy_container("nginx:latest")];

    let result = extract_metadata(&fake, &containers, &nginx(), &path).await;

    assert_eq!(result.status(), Status::Ok, "{result}");
    assert_eq!(fake.calls(), ["inspect nginx:latest"]);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# deploy-verify image metadata\n"));
    assert!(written.contains("\"Cmd\": ["));
}

#[tokio::test]
async fn compose_built_proxy_image_is_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image_metadata.txt");
    let fake = FakeOrchestrator::default();
    let containers = vec![proxy_container("bankapp-proxy")];
    let wanted = ImageRef::parse("proxy").unwrap();

    let result = extract_metadata(&fake, &containers, &wanted, &path).await;

    assert_eq!(result.status(), Status::Ok);
    assert_eq!(fake.calls(), ["inspect bankapp-proxy"]);
}

#[tokio::test]
async fn no_matching_container_warns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image_metadata.txt");
    let fake = FakeOrchestrator::default();
    let containers = vec![proxy_container("mongo:7")];

    let result = extract_metadata(&fake, &containers, &nginx(), &path).await;

    assert_eq!(result.status(), Status::Warn);
    assert!(result.detail().contains("no running container uses image nginx"));
    assert!(fake.calls().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn inspect_failure_warns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image_metadata.txt");
    let fake = FakeOrchestrator {
        inspect: None,
        ..FakeOrchestrator::default()
    };

    let result = extract_metadata(&fake, &fake.containers, &nginx(), &path).await;

    assert_eq!(result.status(), Status::Warn);
    assert!(result.detail().starts_with("inspect failed"));
    assert!(!path.exists());
}

#[tokio::test]
async fn malformed_inspect_output_warns() {
    for payload in ["not json", "{}", "[]", r#"[{"Os":"linux"}]"#] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_metadata.txt");
        let fake = FakeOrchestrator {
            inspect: Some(payload.to_string()),
            ..FakeOrchestrator::default()
        };

        let result = extract_metadata(&fake, &fake.containers, &nginx(), &path).await;

        assert_eq!(result.status(), Status::Warn, "payload {payload}");
        assert!(!path.exists(), "payload {payload}");
    }
}

#[tokio::test]
async fn unwritable_report_warns() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be.
    let blocker = dir.path().join("reports");
    std::fs::write(&blocker, "").unwrap();
    let path = blocker.join("image_metadata.txt");
    let fake = FakeOrchestrator::default();

    let result = extract_metadata(&fake, &fake.containers, &nginx(), &path).await;

    assert_eq!(result.status(), Status::Warn);
    assert!(result.detail().contains("cannot write report"));
}
