use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_upload_server::config::UploadConfig;
use rust_upload_server::services::notifier::{ON_UPLOAD_EVENT, RecordingNotifier, SocketHub};
use rust_upload_server::{AppState, create_app};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn setup_app(folder: &Path, notifier: Arc<RecordingNotifier>) -> Router {
    let config = UploadConfig::development(folder);
    let state = AppState::new(config, Arc::new(SocketHub::new())).with_notifier(notifier);
    create_app(state)
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
        Content-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn fake_image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

async fn dir_entries(folder: &Path) -> Vec<String> {
    let mut entries = tokio::fs::read_dir(folder).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names
}

#[tokio::test]
async fn test_upload_file_to_folder() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Arc::new(RecordingNotifier::new()));
    let filename = "sky in norway.jpeg";
    let content = fake_image(64 * 1024);

    assert!(dir_entries(dir.path()).await.is_empty());

    let response = app
        .oneshot(upload_request(
            "/?socketId=10",
            multipart_body("photo", filename, &content),
        ))
        .await
        .unwrap();

    let status = response.status();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    if status != StatusCode::OK {
        panic!(
            "Upload failed with status {}: {:?}",
            status,
            String::from_utf8_lossy(&body)
        );
    }

    assert_eq!(&body[..], br#"{"result":"Files uploaded with success!"}"#);
    assert_eq!(dir_entries(dir.path()).await, vec![filename.to_string()]);
    assert_eq!(
        tokio::fs::read(dir.path().join(filename)).await.unwrap(),
        content
    );
}

#[tokio::test]
async fn test_upload_reports_progress_to_socket() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let app = setup_app(dir.path(), notifier.clone());
    let content = fake_image(300 * 1024);

    let response = app
        .oneshot(upload_request(
            "/?socketId=abc",
            multipart_body("video", "clip.mkv", &content),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = notifier.calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|(session, event, payload)| {
        session == "abc" && event == ON_UPLOAD_EVENT && payload["filename"] == "clip.mkv"
    }));

    let progress: Vec<u64> = calls
        .iter()
        .map(|(_, _, payload)| payload["processedAlready"].as_u64().unwrap())
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last().copied(), Some(content.len() as u64));
}

#[tokio::test]
async fn test_upload_rejects_path_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("downloads");
    tokio::fs::create_dir(&folder).await.unwrap();
    let app = setup_app(&folder, Arc::new(RecordingNotifier::new()));

    let response = app
        .oneshot(upload_request(
            "/",
            multipart_body("file", "../escaped.txt", b"nope"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(dir_entries(&folder).await.is_empty());
    assert!(!dir.path().join("escaped.txt").exists());
}

#[tokio::test]
async fn test_upload_without_multipart_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Arc::new(RecordingNotifier::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response.status().is_success());
    assert!(dir_entries(dir.path()).await.is_empty());
}

#[tokio::test]
async fn test_list_files() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("file.txt"), fake_image(5497))
        .await
        .unwrap();
    let app = setup_app(dir.path(), Arc::new(RecordingNotifier::new()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["file"], "file.txt");
    assert_eq!(files[0]["size"], "5.5 kB");
    assert_eq!(files[0]["owner"], "developer");
    assert!(files[0]["lastModified"].is_string());
}

#[tokio::test]
async fn test_list_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Arc::new(RecordingNotifier::new()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn test_list_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir.path().join("gone"), Arc::new(RecordingNotifier::new()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_multiple_files_in_one_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Arc::new(RecordingNotifier::new()));

    let mut body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"a\"; filename=\"first.bin\"\r\n\r\n\
        first\r\n\
        --{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"b\"; filename=\"second.bin\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&fake_image(2048));
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let response = app.oneshot(upload_request("/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut names = dir_entries(dir.path()).await;
    names.sort();
    assert_eq!(names, vec!["first.bin", "second.bin"]);
    assert_eq!(
        tokio::fs::metadata(dir.path().join("second.bin"))
            .await
            .unwrap()
            .len(),
        2048
    );
}

#[tokio::test]
async fn test_aborted_body_fails_the_upload() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let app = setup_app(dir.path(), notifier.clone());

    let head = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"photo\"; filename=\"cut.jpeg\"\r\n\r\n"
    );
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
        Ok(head.into_bytes()),
        Ok(fake_image(4096)),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "client went away",
        )),
    ];

    let request = Request::builder()
        .method("POST")
        .uri("/?socketId=10")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(!response.status().is_success());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(!String::from_utf8_lossy(&body).contains("Files uploaded with success!"));
}
