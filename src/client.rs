// src/client.rs

use crate::{config::AppConfig, error::*};
use log::debug;
use reqwest::{IntoUrl, Response, header};
use std::sync::Arc;

/// 共享的 HTTP 客户端。每次调用只发起一次请求，不做任何重试。
#[derive(Clone)]
pub struct HttpClient {
    pub client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// 发起 GET 请求，非 2xx 状态码转为错误。
    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self
            .client
            .get(url)
            .header(header::ACCEPT, "*/*")
            .send()
            .await?;
        debug!("GET {} -> {}", res.url(), res.status());
        Ok(res.error_for_status()?)
    }

    pub async fn fetch_text<T: IntoUrl>(&self, url: T) -> AppResult<String> {
        let body = self.get(url).await?.text().await?;
        debug!("响应长度: {} 字节", body.len());
        Ok(body)
    }
}
