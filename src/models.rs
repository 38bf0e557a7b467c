// src/models.rs

use crate::{constants, error::AppError, ui::symbols};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt;

/// 一次查询所需的三个输入。核心不做格式校验，由服务器决定是否接受。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApkQuery {
    pub device_model: String,
    pub sdk_version: String,
    pub package_name: String,
}

impl ApkQuery {
    pub fn new(
        device_model: impl Into<String>,
        sdk_version: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            device_model: device_model.into(),
            sdk_version: sdk_version.into(),
            package_name: package_name.into(),
        }
    }
}

/// 解析成功后的 APK 信息。
///
/// 只能通过 [`ParsedApkInfo::new`] 构造，构造时保证：
/// 四个字段去除首尾空白后均不为空，`download_uri` 以 `http://` 或 `https://` 开头，
/// `version_code` 只包含十进制数字。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedApkInfo {
    package_name: String,
    version_code: String,
    version_name: String,
    download_uri: String,
}

impl ParsedApkInfo {
    pub fn new(
        package_name: &str,
        version_code: &str,
        version_name: &str,
        download_uri: &str,
    ) -> Result<Self, String> {
        let package_name = package_name.trim();
        let version_code = version_code.trim();
        let version_name = version_name.trim();
        let download_uri = download_uri.trim();

        if package_name.is_empty() {
            return Err("包名不能为空".to_string());
        }
        if version_code.is_empty() {
            return Err("版本号不能为空".to_string());
        }
        if !version_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("版本号 '{}' 不是数字", version_code));
        }
        if version_name.is_empty() {
            return Err("版本名不能为空".to_string());
        }
        if download_uri.is_empty() {
            return Err("下载地址不能为空".to_string());
        }
        if !is_fetchable_uri(download_uri) {
            return Err(format!("下载地址 '{}' 不是 HTTP(S) 链接", download_uri));
        }

        Ok(Self {
            package_name: package_name.to_string(),
            version_code: version_code.to_string(),
            version_name: version_name.to_string(),
            download_uri: download_uri.to_string(),
        })
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn version_code(&self) -> &str {
        &self.version_code
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn download_uri(&self) -> &str {
        &self.download_uri
    }

    /// 尽力将版本号转换为整数，失败时返回 -1。
    pub fn version_code_as_int(&self) -> i32 {
        self.version_code.parse().unwrap_or(-1)
    }

    /// `<包名>-<版本号>.apk`
    pub fn expected_filename(&self) -> String {
        format!(
            "{}-{}.{}",
            self.package_name,
            self.version_code,
            constants::APK_EXTENSION
        )
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} v{} ({})",
            self.package_name, self.version_name, self.version_code
        )
    }

    pub fn version_display_string(&self) -> String {
        format!("v{} ({})", self.version_name, self.version_code)
    }
}

impl fmt::Display for ParsedApkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

fn is_fetchable_uri(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 单次二进制下载的结果。失败时不保留任何续传状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Completed { file_path: String },
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DownloadOutcome::Completed { .. })
    }
}

/// 完整流程 (查询 + 下载) 成功后的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedApk {
    pub info: ParsedApkInfo,
    pub file_path: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FailureKind {
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    ParseError,
    IoError,
    DownloadError,
    Cancelled,
    InputError,
    UnexpectedError,
}

impl FailureKind {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            FailureKind::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            FailureKind::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            FailureKind::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            FailureKind::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            FailureKind::ParseError => (&symbols::ERROR, |s| s.red(), "服务器拒绝了请求"),
            FailureKind::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            FailureKind::DownloadError => (&symbols::ERROR, |s| s.red(), "APK 下载失败"),
            FailureKind::Cancelled => (&symbols::WARN, |s| s.yellow(), "用户取消"),
            FailureKind::InputError => (&symbols::ERROR, |s| s.red(), "输入无效"),
            FailureKind::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }
}

impl From<&AppError> for FailureKind {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Truncated { .. } => FailureKind::NetworkError,
            AppError::Network(err) => {
                if err.is_timeout() {
                    FailureKind::TimeoutError
                } else if err.is_connect() {
                    FailureKind::ConnectionError
                } else if err.is_status() {
                    FailureKind::HttpError
                } else {
                    FailureKind::NetworkError
                }
            }
            AppError::Parse { .. } => FailureKind::ParseError,
            AppError::Io(_) => FailureKind::IoError,
            AppError::DownloadFailed(_) => FailureKind::DownloadError,
            AppError::UserInterrupt => FailureKind::Cancelled,
            AppError::UserInputError(_) => FailureKind::InputError,
            AppError::Json(_) | AppError::Url(_) | AppError::Other(_) => {
                FailureKind::UnexpectedError
            }
        }
    }
}
