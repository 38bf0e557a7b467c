// src/fetcher.rs

use crate::{
    client::HttpClient,
    config::AppConfig,
    downloader::{Destination, Downloader},
    error::*,
    models::{ApkQuery, DownloadOutcome, FetchedApk, ParsedApkInfo},
    parser::ResponseParser,
    request::RequestBuilder,
};
use log::{debug, info};
use std::sync::{Arc, atomic::AtomicBool};
use url::Url;

/// 查询 + 下载的完整流程。
///
/// 不持有任何可变共享状态，可以在多个任务中同时使用。
#[derive(Clone)]
pub struct ApkFetcher {
    http_client: Arc<HttpClient>,
    request_builder: RequestBuilder,
    parser: ResponseParser,
    downloader: Downloader,
}

impl ApkFetcher {
    pub fn new(
        config: Arc<AppConfig>,
        http_client: Arc<HttpClient>,
        cancellation_token: Arc<AtomicBool>,
    ) -> Self {
        Self {
            request_builder: RequestBuilder::new(config.endpoint.clone()),
            parser: ResponseParser::new(config.success_codes.iter().cloned()),
            downloader: Downloader::new(http_client.clone(), &config, cancellation_token),
            http_client,
        }
    }

    pub fn request_url(&self, query: &ApkQuery) -> Url {
        self.request_builder.build(query)
    }

    /// 第一步：向服务器查询最新版本信息
    pub async fn query_info(&self, query: &ApkQuery) -> AppResult<ParsedApkInfo> {
        let url = self.request_url(query);
        debug!("stubDownload 请求地址: {}", url);
        let body = self.http_client.fetch_text(url).await?;
        let info = self.parser.parse(&body, &query.package_name)?;
        info!("获取到 APK 信息: {}", info);
        Ok(info)
    }

    /// 第二步：下载查询到的 APK，文件名为 `<包名>-<版本号>.apk`
    pub async fn download<F>(
        &self,
        info: &ParsedApkInfo,
        destination: &dyn Destination,
        on_progress: F,
    ) -> DownloadOutcome
    where
        F: FnMut(u8) + Send,
    {
        self.downloader
            .download(
                info.download_uri(),
                &info.expected_filename(),
                destination,
                on_progress,
            )
            .await
    }

    /// 查询并下载。两次网络请求按顺序进行，任何一步失败都直接返回，不会重试。
    pub async fn fetch<F>(
        &self,
        query: &ApkQuery,
        destination: &dyn Destination,
        on_progress: F,
    ) -> AppResult<FetchedApk>
    where
        F: FnMut(u8) + Send,
    {
        let info = self.query_info(query).await?;
        let file_path = self
            .downloader
            .try_download(
                info.download_uri(),
                &info.expected_filename(),
                destination,
                on_progress,
            )
            .await?;
        Ok(FetchedApk { info, file_path })
    }
}
