// src/parser.rs

//! stubDownload 响应解析。
//!
//! 服务器返回的内容形似 XML，但不保证格式良好：字段可能乱序、被压缩成一行，
//! 或者部分值被 `<![CDATA[...]]>` 包裹。因此这里不做 DOM 解析，只按标签对逐个定位。
//!
//! 两种提取方式都会执行：
//! 1. 组合扫描：按固定顺序一次性匹配五个字段，匹配成功时其结果作为一条完整记录优先采用；
//! 2. 逐字段提取：每个字段独立查找，可以缺失，用于乱序响应以及补全组合扫描缺失的值。
//!
//! 结果码决定成败，存在下载地址也不会让失败的结果码变成成功。

use crate::{
    constants::{self, api::tags},
    error::{AppError, AppResult},
    models::ParsedApkInfo,
};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// 匹配标签内容：优先取 CDATA 内部文本，否则取普通文本。
/// `{n}` 会被替换为捕获组名前缀。
const TEXT_VALUE: &str = r"(?:\s*<!\[CDATA\[(?P<{n}_cdata>.*?)\]\]>\s*|(?P<{n}_plain>[^<]*))";

static COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?s)<{code}>\s*(?P<code>\d+)\s*</{code}>.*?<{msg}>{msg_value}</{msg}>.*?<{uri}>{uri_value}</{uri}>.*?<{vcode}>\s*(?P<vcode>\d+)\s*</{vcode}>.*?<{vname}>{vname_value}</{vname}>",
        code = tags::RESULT_CODE,
        msg = tags::RESULT_MSG,
        msg_value = TEXT_VALUE.replace("{n}", "msg"),
        uri = tags::DOWNLOAD_URI,
        uri_value = TEXT_VALUE.replace("{n}", "uri"),
        vcode = tags::VERSION_CODE,
        vname = tags::VERSION_NAME,
        vname_value = TEXT_VALUE.replace("{n}", "vname"),
    );
    Regex::new(&pattern).unwrap()
});

/// 单个字段的两种匹配模式
struct FieldPattern {
    cdata: Regex,
    plain: Regex,
}

impl FieldPattern {
    fn new(tag: &str) -> Self {
        let tag = regex::escape(tag);
        Self {
            cdata: Regex::new(&format!(r"(?s)<{tag}>\s*<!\[CDATA\[(.*?)\]\]>\s*</{tag}>")).unwrap(),
            plain: Regex::new(&format!(r"(?s)<{tag}>([^<]*)</{tag}>")).unwrap(),
        }
    }

    /// 先尝试 CDATA 包裹的内容，找不到时退回普通文本。
    fn extract(&self, body: &str) -> Option<String> {
        self.cdata
            .captures(body)
            .or_else(|| self.plain.captures(body))
            .and_then(|caps| caps.get(1))
            .and_then(|m| non_empty(m.as_str()))
    }
}

static RESULT_CODE_FIELD: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(tags::RESULT_CODE));
static RESULT_MSG_FIELD: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(tags::RESULT_MSG));
static DOWNLOAD_URI_FIELD: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(tags::DOWNLOAD_URI));
static VERSION_CODE_FIELD: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(tags::VERSION_CODE));
static VERSION_NAME_FIELD: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(tags::VERSION_NAME));

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// 从响应中提取出的原始字段，已去除首尾空白，空值记为 `None`。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct RawFields {
    result_code: Option<String>,
    result_msg: Option<String>,
    download_uri: Option<String>,
    version_code: Option<String>,
    version_name: Option<String>,
}

impl RawFields {
    /// 以 `self` 为准，缺失的字段由 `other` 补齐。
    fn or(self, other: RawFields) -> RawFields {
        RawFields {
            result_code: self.result_code.or(other.result_code),
            result_msg: self.result_msg.or(other.result_msg),
            download_uri: self.download_uri.or(other.download_uri),
            version_code: self.version_code.or(other.version_code),
            version_name: self.version_name.or(other.version_name),
        }
    }
}

fn extract_combined(body: &str) -> Option<RawFields> {
    let caps = COMBINED_RE.captures(body)?;
    let text = |name: &str| {
        caps.name(&format!("{}_cdata", name))
            .or_else(|| caps.name(&format!("{}_plain", name)))
            .and_then(|m| non_empty(m.as_str()))
    };
    Some(RawFields {
        result_code: caps.name("code").and_then(|m| non_empty(m.as_str())),
        result_msg: text("msg"),
        download_uri: text("uri"),
        version_code: caps.name("vcode").and_then(|m| non_empty(m.as_str())),
        version_name: text("vname"),
    })
}

fn extract_independent(body: &str) -> RawFields {
    RawFields {
        result_code: RESULT_CODE_FIELD.extract(body),
        result_msg: RESULT_MSG_FIELD.extract(body),
        download_uri: DOWNLOAD_URI_FIELD.extract(body),
        version_code: VERSION_CODE_FIELD.extract(body),
        version_name: VERSION_NAME_FIELD.extract(body),
    }
}

#[derive(Debug, Clone)]
pub struct ResponseParser {
    success_codes: Vec<String>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(constants::api::SUCCESS_RESULT_CODES.iter().map(|s| s.to_string()))
    }
}

impl ResponseParser {
    pub fn new(success_codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            success_codes: success_codes
                .into_iter()
                .map(|c| c.trim().to_string())
                .collect(),
        }
    }

    pub fn is_success_code(&self, code: &str) -> bool {
        self.success_codes.iter().any(|c| c == code.trim())
    }

    /// 解析服务器响应。成功时包名取自 `expected_package_name`，响应本身不回显包名。
    pub fn parse(&self, raw_body: &str, expected_package_name: &str) -> AppResult<ParsedApkInfo> {
        debug!("stubDownload 响应 ({} 字节): {}", raw_body.len(), raw_body);

        let combined = extract_combined(raw_body);
        let independent = extract_independent(raw_body);
        let fields = match combined {
            Some(combined) => {
                if combined != independent {
                    debug!(
                        "组合扫描与逐字段提取结果不一致，采用组合扫描结果。组合: {:?}, 逐字段: {:?}",
                        combined, independent
                    );
                }
                combined.or(independent)
            }
            None => {
                debug!("组合扫描未匹配，使用逐字段提取结果: {:?}", independent);
                independent
            }
        };

        self.classify(fields, expected_package_name)
    }

    fn classify(&self, fields: RawFields, package_name: &str) -> AppResult<ParsedApkInfo> {
        let code = match fields.result_code.as_deref() {
            Some(code) if self.is_success_code(code) => code,
            code => return Err(server_error(fields.result_msg, code)),
        };
        debug!("结果码 {} 表示成功", code);

        let download_uri = fields
            .download_uri
            .ok_or_else(|| AppError::parse("服务器响应中缺少下载地址"))?;
        let version_code = fields
            .version_code
            .ok_or_else(|| AppError::parse("服务器响应中缺少版本号"))?;
        let version_name = fields
            .version_name
            .unwrap_or_else(|| constants::UNKNOWN_VERSION_NAME.to_string());

        ParsedApkInfo::new(package_name, &version_code, &version_name, &download_uri)
            .map_err(AppError::parse)
    }
}

fn server_error(message: Option<String>, code: Option<&str>) -> AppError {
    match (message, code) {
        (Some(message), _) => AppError::parse(message),
        (None, Some(code)) => {
            AppError::parse(format!("{} (code {})", constants::UNKNOWN_SERVER_ERROR, code))
        }
        (None, None) => AppError::parse(constants::UNKNOWN_SERVER_ERROR),
    }
}
