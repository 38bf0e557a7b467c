// src/request.rs

use crate::{constants::api, models::ApkQuery};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// 查询参数值中保留不编码的字符 (RFC 3986 unreserved)
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 根据固定模板构造 stubDownload 查询地址。
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: Url,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        // 常量地址，解析必然成功
        Self::new(Url::parse(api::STUB_DOWNLOAD_ENDPOINT).unwrap())
    }
}

impl RequestBuilder {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// 相同输入总是得到相同的 URL。设备型号会先转为大写。
    pub fn build(&self, query: &ApkQuery) -> Url {
        let device_id = query.device_model.to_uppercase();
        let pairs: [(&str, &str); 11] = [
            (api::params::APP_ID, query.package_name.as_str()),
            (api::params::DEVICE_ID, device_id.as_str()),
            api::MCC,
            api::MNC,
            api::CSC,
            (api::params::SDK_VER, query.sdk_version.as_str()),
            api::PD,
            api::SYSTEM_ID,
            api::CALLER_ID,
            api::ABI_TYPE,
            api::EXTUK,
        ];

        let query_string = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&");

        let mut url = self.endpoint.clone();
        url.set_query(Some(&query_string));
        url
    }
}
