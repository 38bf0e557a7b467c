// tests/fetch_pipeline_test.rs

use galaxy_dl::{
    ApkFetcher,
    client::HttpClient,
    config::AppConfig,
    downloader::DirectoryDestination,
    error::{AppError, AppResult},
    models::{ApkQuery, DownloadOutcome, FailureKind},
};
use mockito::Matcher;
use std::sync::{Arc, atomic::AtomicBool};
use tempfile::tempdir;
use url::Url;

const PACKAGE: &str = "com.sec.android.app.myfiles";
const STUB_PATH: &str = "/stub/stubDownload.as";

fn build_fetcher(server_url: &str) -> AppResult<ApkFetcher> {
    let config = AppConfig {
        endpoint: Url::parse(&format!("{}{}", server_url, STUB_PATH))?,
        ..AppConfig::default()
    };
    let config = Arc::new(config);
    let http_client = Arc::new(HttpClient::new(config.clone())?);
    Ok(ApkFetcher::new(
        config,
        http_client,
        Arc::new(AtomicBool::new(false)),
    ))
}

fn success_body(download_uri: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<result>
    <appId>{PACKAGE}</appId>
    <resultCode>1</resultCode>
    <resultMsg>Success</resultMsg>
    <downloadURI><![CDATA[{download_uri}]]></downloadURI>
    <contentSize>20000</contentSize>
    <versionCode>1150403081</versionCode>
    <versionName>11.5.04.81</versionName>
    <productId>000001234567</productId>
</result>"#
    )
}

#[tokio::test]
async fn test_end_to_end_query_and_download() -> AppResult<()> {
    // --- 1. Arrange (准备阶段) ---
    let mut server = mockito::Server::new_async().await;
    let server_url = server.url();
    let download_uri = format!("{}/files/myfiles.apk?sig=abc", server_url);
    let apk_bytes: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();

    let query_mock = server
        .mock("GET", STUB_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("appId".into(), PACKAGE.into()),
            Matcher::UrlEncoded("deviceId".into(), "SM-G970F".into()),
            Matcher::UrlEncoded("sdkVer".into(), "29".into()),
            Matcher::UrlEncoded("callerId".into(), "com.sec.android.app.samsungapps".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(success_body(&download_uri))
        .create_async()
        .await;

    let apk_mock = server
        .mock("GET", "/files/myfiles.apk")
        .match_query(Matcher::UrlEncoded("sig".into(), "abc".into()))
        .with_status(200)
        .with_header("content-type", "application/vnd.android.package-archive")
        .with_body(apk_bytes.clone())
        .create_async()
        .await;

    let fetcher = build_fetcher(&server_url)?;
    let query = ApkQuery::new("sm-g970f", "29", PACKAGE);
    let dir = tempdir()?;
    let destination = DirectoryDestination::new(dir.path());

    let url = fetcher.request_url(&query);
    assert!(url.as_str().contains("deviceId=SM-G970F"));
    assert!(url.as_str().contains("sdkVer=29"));
    assert!(url.as_str().contains("appId=com.sec.android.app.myfiles"));

    // --- 2. Act (执行阶段) ---
    let mut progress = Vec::new();
    let fetched = fetcher
        .fetch(&query, &destination, |p| progress.push(p))
        .await?;

    // --- 3. Assert (断言阶段) ---
    query_mock.assert_async().await;
    apk_mock.assert_async().await;

    assert_eq!(fetched.info.package_name(), PACKAGE);
    assert_eq!(fetched.info.version_code(), "1150403081");
    assert_eq!(fetched.info.version_name(), "11.5.04.81");
    assert_eq!(fetched.info.download_uri(), download_uri);
    assert!(fetched.file_path.ends_with("com.sec.android.app.myfiles-1150403081.apk"));
    assert_eq!(std::fs::read(&fetched.file_path)?, apk_bytes);

    // 进度单调不减，且以 100 结束
    assert!(!progress.is_empty(), "已知长度时应该报告进度");
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "进度不应回退: {:?}", progress);
    assert!(progress.iter().all(|&p| p <= 100));
    assert_eq!(progress.last(), Some(&100));
    Ok(())
}

#[tokio::test]
async fn test_query_info_returns_server_message_on_rejection() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", STUB_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<result><resultCode>2</resultCode><resultMsg> Application not found </resultMsg></result>")
        .create_async()
        .await;

    let fetcher = build_fetcher(&server.url())?;
    let err = fetcher
        .query_info(&ApkQuery::new("SM-G970F", "29", "com.example.missing"))
        .await
        .unwrap_err();

    mock.assert_async().await;
    match &err {
        AppError::Parse { message } => assert_eq!(message, "Application not found"),
        other => panic!("应该是解析错误，实际为: {:?}", other),
    }
    assert_eq!(FailureKind::from(&err), FailureKind::ParseError);
    Ok(())
}

#[tokio::test]
async fn test_query_info_http_error_is_network_failure() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", STUB_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let fetcher = build_fetcher(&server.url())?;
    let err = fetcher
        .query_info(&ApkQuery::new("SM-G970F", "29", PACKAGE))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, AppError::Network(_)), "实际为: {:?}", err);
    assert_eq!(FailureKind::from(&err), FailureKind::HttpError);
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_reported() -> AppResult<()> {
    // 端口 1 上通常没有服务在监听
    let fetcher = build_fetcher("http://127.0.0.1:1")?;
    let err = fetcher
        .query_info(&ApkQuery::new("SM-G970F", "29", PACKAGE))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "实际为: {:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_fetch_stops_after_failed_query() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let query_mock = server
        .mock("GET", STUB_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("garbage")
        .create_async()
        .await;
    let apk_mock = server
        .mock("GET", Matcher::Regex(r"^/files/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let fetcher = build_fetcher(&server.url())?;
    let dir = tempdir()?;
    let destination = DirectoryDestination::new(dir.path().join("out"));
    let err = fetcher
        .fetch(&ApkQuery::new("SM-G970F", "29", PACKAGE), &destination, |_| {})
        .await
        .unwrap_err();

    query_mock.assert_async().await;
    apk_mock.assert_async().await;
    assert_eq!(err.to_string(), "Unknown server error");
    assert!(!dir.path().join("out").exists(), "查询失败时不应创建输出目录");
    Ok(())
}

#[tokio::test]
async fn test_fetcher_download_returns_outcome() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let server_url = server.url();
    let download_uri = format!("{}/files/app.apk", server_url);
    server
        .mock("GET", STUB_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(success_body(&download_uri))
        .create_async()
        .await;
    server
        .mock("GET", "/files/app.apk")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = build_fetcher(&server_url)?;
    let info = fetcher
        .query_info(&ApkQuery::new("SM-G970F", "29", PACKAGE))
        .await?;
    let dir = tempdir()?;
    let outcome = fetcher
        .download(&info, &DirectoryDestination::new(dir.path()), |_| {})
        .await;

    match outcome {
        DownloadOutcome::Failed { reason } => assert!(reason.contains("404"), "原因: {}", reason),
        other => panic!("404 应该导致下载失败，实际为: {:?}", other),
    }
    Ok(())
}
