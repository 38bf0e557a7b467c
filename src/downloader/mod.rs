// src/downloader/mod.rs

mod destination;
mod progress;

pub use destination::{Destination, DirectoryDestination, Sink};
pub use progress::ProgressTracker;

use crate::{client::HttpClient, config::AppConfig, error::*, models::DownloadOutcome};
use futures::StreamExt;
use log::{debug, error, info, warn};
use reqwest::Response;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// 将下载地址的内容以流的方式写入目标位置，并报告进度。
///
/// 失败时不会删除已写入的部分文件，由调用方决定如何清理。
#[derive(Clone)]
pub struct Downloader {
    http_client: Arc<HttpClient>,
    chunk_size: usize,
    cancellation_token: Arc<AtomicBool>,
}

impl Downloader {
    pub fn new(
        http_client: Arc<HttpClient>,
        config: &AppConfig,
        cancellation_token: Arc<AtomicBool>,
    ) -> Self {
        Self {
            http_client,
            chunk_size: config.chunk_size.max(1),
            cancellation_token,
        }
    }

    /// 下载并返回结果，所有错误都转换为 [`DownloadOutcome::Failed`]。
    pub async fn download<F>(
        &self,
        uri: &str,
        filename: &str,
        destination: &dyn Destination,
        on_progress: F,
    ) -> DownloadOutcome
    where
        F: FnMut(u8) + Send,
    {
        match self.try_download(uri, filename, destination, on_progress).await {
            Ok(file_path) => DownloadOutcome::Completed { file_path },
            Err(e) => {
                error!("下载 '{}' 失败: {}", filename, e);
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 与 [`Downloader::download`] 相同，但保留错误类型。成功时返回文件位置。
    pub async fn try_download<F>(
        &self,
        uri: &str,
        filename: &str,
        destination: &dyn Destination,
        mut on_progress: F,
    ) -> AppResult<String>
    where
        F: FnMut(u8) + Send,
    {
        self.check_cancelled()?;
        let url = Url::parse(uri)?;
        info!("开始下载: {} -> {}", url, filename);

        let res = self.http_client.get(url).await?;
        let mut tracker = ProgressTracker::new(res.content_length());
        debug!("文件大小: {:?} 字节", tracker.total());

        let Sink {
            location,
            mut writer,
        } = destination.open(filename).await?;

        let copied = self
            .copy_body(res, &mut tracker, writer.as_mut(), &mut on_progress)
            .await;
        // 失败时也先刷新，保证已写入的部分落盘
        let flushed = writer.flush().await;
        copied?;
        flushed?;
        writer.shutdown().await?;

        info!("下载完成: {} ({} 字节)", location, tracker.written());
        Ok(location)
    }

    async fn copy_body<F>(
        &self,
        res: Response,
        tracker: &mut ProgressTracker,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
        on_progress: &mut F,
    ) -> AppResult<()>
    where
        F: FnMut(u8) + Send,
    {
        let mut stream = res.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                // 连接在声明的长度之前断开
                Err(e) => match tracker.total() {
                    Some(expected) if tracker.written() < expected => {
                        debug!("响应体读取中断: {}", e);
                        return Err(AppError::Truncated {
                            expected,
                            actual: tracker.written(),
                        });
                    }
                    _ => return Err(e.into()),
                },
            };
            for slice in chunk.chunks(self.chunk_size) {
                self.check_cancelled()?;
                writer.write_all(slice).await?;
                if let Some(percent) = tracker.advance(slice.len() as u64) {
                    on_progress(percent);
                }
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> AppResult<()> {
        if self.cancellation_token.load(Ordering::Relaxed) {
            warn!("下载已被用户取消");
            return Err(AppError::UserInterrupt);
        }
        Ok(())
    }
}
