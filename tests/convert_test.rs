//! End-to-end tests for `POST /convert`.

mod common;

use std::time::Duration;

use autoplay_server::infrastructure::http::fetcher::USER_AGENTS;
use autoplay_server::modules::convert::service::ConvertService;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use common::{body_bytes, body_json, sample_bytes, TestHarness};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_convert(h: &TestHarness, body: &str) -> Response {
    h.app()
        .oneshot(
            Request::post("/convert")
                .header(header::HOST, "media.test:3000")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn origin_serving(bytes: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn missing_url_is_rejected() {
    let h = TestHarness::new();
    let resp = post_convert(&h, "{}").await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json, serde_json::json!({ "error": "Missing URL" }));
    assert!(h.temp_files().is_empty());
    assert!(h.public_files().is_empty());
}

#[tokio::test]
async fn empty_or_blank_url_is_rejected() {
    let h = TestHarness::new();
    for body in [r#"{"url":""}"#, r#"{"url":"   "}"#, r#"{"url":null}"#] {
        let resp = post_convert(&h, body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Missing URL");
    }
    assert!(h.temp_files().is_empty());
}

#[tokio::test]
async fn non_json_body_is_treated_as_missing_url() {
    let h = TestHarness::new();
    let resp = h
        .app()
        .oneshot(
            Request::post("/convert")
                .body(Body::from("url=https://example.com/a.mp4"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["error"], "Missing URL");
}

#[tokio::test]
async fn unparsable_url_is_rejected() {
    let h = TestHarness::new();
    let resp = post_convert(&h, r#"{"url":"definitely not a url"}"#).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid URL"));
    assert!(h.temp_files().is_empty());
}

#[tokio::test]
async fn origin_404_is_a_server_error_without_assets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let h = TestHarness::new();
    let resp = post_convert(&h, &format!(r#"{{"url":"{}/gone.mp4"}}"#, server.uri())).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["error"], "Download failed (404)");
    assert!(h.temp_files().is_empty());
    assert!(h.public_files().is_empty());
}

#[tokio::test]
async fn missing_engine_fails_and_cleans_up() {
    let server = origin_serving(sample_bytes(4096)).await;
    let h = TestHarness::new();

    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("Transcode failed"));
    assert!(h.temp_files().is_empty());
    assert!(h.public_files().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn convert_then_stream_range() {
    let source = sample_bytes(5 * 1024 * 1024);
    let server = origin_serving(source.clone()).await;
    let h = TestHarness::with_ffmpeg_script(common::COPY_SCRIPT);

    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["success"], true);

    let url = json["url"].as_str().unwrap();
    let file_name = url.strip_prefix("http://media.test:3000/").unwrap();
    assert!(file_name.ends_with(".mp4"));

    // the download is gone, only the output remains
    assert!(h.temp_files().is_empty());
    assert_eq!(h.public_files().len(), 1);

    let resp = h
        .app()
        .oneshot(
            Request::get(format!("/{file_name}"))
                .header(header::RANGE, "bytes=0-1023")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        resp.headers()[header::CONTENT_RANGE],
        format!("bytes 0-1023/{}", source.len()).as_str()
    );
    let body = body_bytes(resp.into_body()).await;
    assert_eq!(body.as_ref(), &source[..1024]);
}

#[cfg(unix)]
#[tokio::test]
async fn download_uses_a_pooled_user_agent() {
    let server = origin_serving(sample_bytes(1024)).await;
    let h = TestHarness::with_ffmpeg_script(common::COPY_SCRIPT);

    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let agent = requests[0].headers[header::USER_AGENT].to_str().unwrap();
    assert!(USER_AGENTS.contains(&agent));
}

#[cfg(unix)]
#[tokio::test]
async fn concurrent_conversions_get_distinct_assets() {
    let server = origin_serving(sample_bytes(2048)).await;
    let h = TestHarness::with_ffmpeg_script(common::COPY_SCRIPT);
    let body = format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri());

    let (a, b) = tokio::join!(post_convert(&h, &body), post_convert(&h, &body));
    let a = body_json(a.into_body()).await;
    let b = body_json(b.into_body()).await;

    assert_ne!(a["url"], b["url"]);
    assert_eq!(h.public_files().len(), 2);
    assert!(h.temp_files().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn engine_failure_reports_cause_and_removes_partial_output() {
    let server = origin_serving(sample_bytes(4096)).await;
    let h = TestHarness::with_ffmpeg_script(common::FAILING_SCRIPT);

    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp.into_body()).await;
    assert_eq!(
        json["error"],
        "Transcode failed: input.mp4: Invalid data found when processing input"
    );
    assert!(h.temp_files().is_empty());
    assert!(h.public_files().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn engine_timeout_is_a_transcode_error() {
    let server = origin_serving(sample_bytes(1024)).await;
    let h = TestHarness::with_config(|root, config| {
        let bin = root.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        config.ffmpeg_path = common::write_script(&bin, "ffmpeg", common::SLOW_SCRIPT);
        config.transcode_timeout_secs = 1;
    });

    let started = std::time::Instant::now();
    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;

    assert!(started.elapsed() < Duration::from_secs(8));
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["error"], "Transcode failed: timed out after 1s");
    assert!(h.temp_files().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn configured_public_base_is_used() {
    let server = origin_serving(sample_bytes(16)).await;
    let h = TestHarness::with_config(|root, config| {
        let bin = root.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        config.ffmpeg_path = common::write_script(&bin, "ffmpeg", common::COPY_SCRIPT);
        config.public_base_url = Some("https://cdn.example".into());
    });

    let resp = post_convert(&h, &format!(r#"{{"url":"{}/a.mp4"}}"#, server.uri())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;
    assert!(json["url"].as_str().unwrap().starts_with("https://cdn.example/"));
}

#[cfg(unix)]
#[tokio::test]
async fn cancelled_conversion_leaves_no_assets() {
    let server = origin_serving(sample_bytes(1024)).await;
    let h = TestHarness::with_ffmpeg_script(common::PARTIAL_THEN_HANG_SCRIPT);
    let url = format!("{}/a.mp4", server.uri());

    let result = tokio::time::timeout(
        Duration::from_millis(1500),
        ConvertService::convert(&h.state, Some(&url), "http://media.test:3000"),
    )
    .await;

    assert!(result.is_err(), "conversion should still be running");
    assert!(h.temp_files().is_empty());
    assert!(h.public_files().is_empty());
}
