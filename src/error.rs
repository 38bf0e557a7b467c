// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    /// 服务器响应无法解析，或服务器拒绝了查询。只携带服务器返回的信息。
    #[error("{message}")]
    Parse { message: String },
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("APK 下载失败: {0}")]
    DownloadFailed(String),
    #[error("下载内容不完整 (预期 {expected} 字节, 实际 {actual} 字节)")]
    Truncated { expected: u64, actual: u64 },
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
