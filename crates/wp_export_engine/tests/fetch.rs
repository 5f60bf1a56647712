use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wp_export_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher};

#[tokio::test]
async fn fetcher_returns_body_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/wp-json/wp/v2/tags", server.uri());

    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.url, url);
    assert_eq!(output.status, 200);
    assert_eq!(output.status_line, "200 OK");
    assert!(output.is_success());
    assert_eq!(output.content_type.as_deref(), Some("application/json"));
    assert_eq!(&output.body[..], b"[]");
}

#[tokio::test]
async fn http_error_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/missing.png", server.uri());

    let output = fetcher.fetch(&url).await.expect("status is data");
    assert_eq!(output.status, 404);
    assert_eq!(output.status_line, "404 Not Found");
    assert!(!output.is_success());
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn requests_carry_the_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "wordpress-export-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = FetchSettings {
        user_agent: "wordpress-export-test/1.0".to_string(),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let output = fetcher
        .fetch(&format!("{}/ua", server.uri()))
        .await
        .unwrap();
    assert_eq!(output.status, 200);
}

#[tokio::test]
async fn malformed_url_is_an_invalid_url_failure() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn head_links_collects_every_link_header() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Link", "<https://example.com/?p=1>; rel=shortlink")
                .append_header("Link", "<https://example.com/wp-json/>; rel=\"https://api.w.org/\""),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let head = fetcher
        .head_links(&format!("{}/", server.uri()))
        .await
        .unwrap();
    assert_eq!(head.status, 200);
    assert_eq!(head.links.len(), 2);
    assert!(head.links[1].contains("api.w.org"));
}
