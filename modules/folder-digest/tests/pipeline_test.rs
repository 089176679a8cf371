//! Full pipeline runs with the network replaced by test doubles.

use std::path::Path;
use std::sync::Arc;

use folder_digest::fetcher::MockFileSource;
use folder_digest::summary::MockTransport;
use folder_digest::{
    ChatPayloadBuilder, FileFetcher, PayloadEncoder, Pipeline, RemoteFileRef, StaticFolderLister,
    SummaryClient, SummaryResult,
};

const FOLDER: &str = "https://drive.google.com/drive/folders/1x6EKNkVw6PlFVTr6cGrsVscmRuwqGrXd?usp=sharing";

fn lister() -> Arc<StaticFolderLister> {
    Arc::new(StaticFolderLister::new(vec![
        RemoteFileRef::new("contract.pdf", "id-pdf"),
        RemoteFileRef::new("photo.jpg", "id-jpg"),
        RemoteFileRef::new("scan.webp", "id-webp"),
    ]))
}

fn pipeline(source: Arc<MockFileSource>, transport: Arc<MockTransport>, dir: &Path) -> Pipeline {
    let fetcher = FileFetcher::new(lister(), source);
    let summarizer = SummaryClient::new(transport, ChatPayloadBuilder::default());
    Pipeline::new(
        Arc::new(fetcher),
        Arc::new(PayloadEncoder::new()),
        Arc::new(summarizer),
        dir,
    )
}

#[tokio::test]
async fn three_files_produce_one_summary() {
    let dir = tempfile::tempdir().unwrap();
    let downloads = dir.path().join("downloaded_files");
    let source = Arc::new(
        MockFileSource::new()
            .with_file("id-pdf", b"%PDF-1.7 body".to_vec())
            .with_file("id-jpg", vec![0xFF, 0xD8, 0xFF, 0xE0])
            .with_file("id-webp", b"RIFF....WEBP".to_vec()),
    );
    let transport = Arc::new(MockTransport::with_summary("Summary text."));

    let result = pipeline(source.clone(), transport.clone(), &downloads)
        .run(FOLDER)
        .await;

    let SummaryResult::Success(report) = &result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(report.summary, "Summary text.");
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.file_names, vec!["contract.pdf", "photo.jpg", "scan.webp"]);

    let stats = report.stats.unwrap();
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.files_prepared, 3);
    assert_eq!(stats.summary_length, 13);

    assert_eq!(source.calls(), vec!["id-pdf", "id-jpg", "id-webp"]);
    assert!(downloads.join("photo.jpg").exists());

    // One request: system turn, three file turns, final instruction.
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let body = serde_json::to_value(&requests[0]).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 5);
    assert_eq!(body["messages"][1]["content"][1]["type"], "file");
    assert_eq!(body["messages"][2]["content"][1]["type"], "image_url");
    assert_eq!(
        body["messages"][2]["content"][1]["image_url"]["url"],
        "data:image/jpeg;base64,/9j/4A=="
    );
    assert_eq!(body["plugins"][0]["id"], "file-parser");
    assert_eq!(body["plugins"][0]["pdf"]["engine"], "pdf-text");

    let output = dir.path().join("summary_results_v2.json");
    result.save(&output).unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["success"], true);
    assert_eq!(saved["stats"]["summary_length"], 13);
    assert!(saved.get("raw_response").is_none());
}

#[tokio::test]
async fn zero_downloads_never_reach_the_provider() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(MockTransport::with_summary("unused"));

    let result = pipeline(Arc::new(MockFileSource::new()), transport.clone(), dir.path())
        .run(FOLDER)
        .await;

    assert_eq!(result.error(), Some("Failed to download files"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn one_failed_download_still_summarizes_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(
        MockFileSource::new()
            .with_file("id-pdf", b"%PDF".to_vec())
            .with_file("id-webp", b"RIFF".to_vec()),
    );
    let transport = Arc::new(MockTransport::with_summary("Ok"));

    let result = pipeline(source, transport.clone(), dir.path())
        .run(FOLDER)
        .await;

    let SummaryResult::Success(report) = result else {
        panic!("expected success");
    };
    assert_eq!(report.file_names, vec!["contract.pdf", "scan.webp"]);
    assert_eq!(report.stats.unwrap().total_files, 2);
    assert_eq!(transport.requests()[0].messages.len(), 4);
}

#[tokio::test]
async fn provider_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockFileSource::new().with_file("id-jpg", vec![1, 2, 3]));
    let transport = Arc::new(MockTransport::failing("HTTP 401: invalid key"));

    let result = pipeline(source, transport, dir.path()).run(FOLDER).await;

    let error = result.error().unwrap();
    assert!(error.starts_with("LLM request failed"), "{error}");
    assert!(error.contains("401"), "{error}");
}

#[tokio::test]
async fn invalid_folder_link_fails_before_downloading() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockFileSource::new().with_file("id-pdf", b"%PDF".to_vec()));
    let transport = Arc::new(MockTransport::with_summary("unused"));

    let result = pipeline(source.clone(), transport.clone(), dir.path())
        .run("https://drive.google.com/file/d/abc/view")
        .await;

    assert!(result.error().unwrap().starts_with("Failed to download files"));
    assert!(source.calls().is_empty());
    assert_eq!(transport.call_count(), 0);
}
