// src/config.rs

pub mod store;

use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub endpoint: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub chunk_size: Option<usize>,
    pub success_codes: Option<Vec<String>>,
}

/// 配置文件内容，同时保存宿主程序需要记住的状态 (设备型号列表、上次使用的输入等)。
/// 启动时加载一次，以引用方式传递给需要它的地方。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default = "default_saved_models")]
    pub saved_models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sdk_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<PathBuf>,
}

fn default_saved_models() -> Vec<String> {
    constants::DEFAULT_DEVICE_MODELS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn normalize_model(model: &str) -> Option<String> {
    let model = model.trim();
    (!model.is_empty()).then(|| model.to_uppercase())
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self::default_app_config()
    }
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        // 为 NetworkConfig 提供一组稳健的默认值
        let network_config = NetworkConfig {
            endpoint: Some(constants::api::STUB_DOWNLOAD_ENDPOINT.into()),
            user_agent: Some(constants::USER_AGENT.into()),
            connect_timeout_secs: Some(constants::CONNECT_TIMEOUT_SECS),
            read_timeout_secs: Some(constants::READ_TIMEOUT_SECS),
            chunk_size: Some(constants::CHUNK_SIZE),
            success_codes: Some(
                constants::api::SUCCESS_RESULT_CODES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        };

        Self {
            network: network_config,
            saved_models: default_saved_models(),
            last_device_model: None,
            last_sdk_version: None,
            storage_location: None,
        }
    }

    /// 已保存的设备型号，按字母排序且不重复
    pub fn saved_models(&self) -> Vec<String> {
        let mut models = self.saved_models.clone();
        models.sort();
        models.dedup();
        models
    }

    /// 添加型号 (统一转为大写)。已存在或为空时返回 false。
    pub fn add_model(&mut self, model: &str) -> bool {
        let Some(model) = normalize_model(model) else {
            return false;
        };
        if self.saved_models.contains(&model) {
            return false;
        }
        self.saved_models.push(model);
        true
    }

    pub fn remove_model(&mut self, model: &str) -> bool {
        let Some(model) = normalize_model(model) else {
            return false;
        };
        let original_len = self.saved_models.len();
        self.saved_models.retain(|m| m != &model);
        self.saved_models.len() != original_len
    }

    /// 恢复默认的设备型号列表
    pub fn reset_models(&mut self) {
        self.saved_models = default_saved_models();
    }

    pub fn set_storage_location(&mut self, dir: PathBuf) {
        self.storage_location = Some(dir);
    }

    /// 清除所有保存的状态，包括网络设置和设备型号，回到初始配置
    pub fn clear_all(&mut self) {
        *self = Self::default_app_config();
    }

    /// 记住上一次成功查询所用的型号和 SDK 版本
    pub fn remember_query(&mut self, device_model: &str, sdk_version: &str) {
        self.last_device_model = normalize_model(device_model);
        let sdk = sdk_version.trim();
        self.last_sdk_version = (!sdk.is_empty()).then(|| sdk.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: Url,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub chunk_size: usize,
    pub success_codes: Vec<String>,
}

impl AppConfig {
    pub fn new(args: &Cli, external_config: &ExternalConfig) -> AppResult<Self> {
        let mut config = Self::from_external(external_config)?;
        if let Some(secs) = args.connect_timeout {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = args.read_timeout {
            config.read_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn from_external(external_config: &ExternalConfig) -> AppResult<Self> {
        let network = &external_config.network;
        let endpoint = Url::parse(
            network
                .endpoint
                .as_deref()
                .unwrap_or(constants::api::STUB_DOWNLOAD_ENDPOINT),
        )?;

        Ok(Self {
            endpoint,
            user_agent: network
                .user_agent
                .clone()
                .unwrap_or_else(|| constants::USER_AGENT.into()),
            connect_timeout: Duration::from_secs(
                network
                    .connect_timeout_secs
                    .unwrap_or(constants::CONNECT_TIMEOUT_SECS),
            ),
            read_timeout: Duration::from_secs(
                network.read_timeout_secs.unwrap_or(constants::READ_TIMEOUT_SECS),
            ),
            chunk_size: network
                .chunk_size
                .filter(|&n| n > 0)
                .unwrap_or(constants::CHUNK_SIZE),
            success_codes: network
                .success_codes
                .clone()
                .filter(|codes| !codes.is_empty())
                .unwrap_or_else(|| {
                    constants::api::SUCCESS_RESULT_CODES
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
        })
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(constants::api::STUB_DOWNLOAD_ENDPOINT).unwrap(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(15),
            chunk_size: constants::CHUNK_SIZE,
            success_codes: constants::api::SUCCESS_RESULT_CODES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_list_management() {
        let mut config = ExternalConfig::default();
        assert_eq!(config.saved_models().len(), constants::DEFAULT_DEVICE_MODELS.len());

        assert!(config.add_model(" sm-s918b "));
        assert!(!config.add_model("SM-S918B"));
        assert!(!config.add_model("   "));
        assert!(config.saved_models().contains(&"SM-S918B".to_string()));

        assert!(config.remove_model("sm-s918b"));
        assert!(!config.remove_model("SM-S918B"));

        let models = config.saved_models();
        let mut sorted = models.clone();
        sorted.sort();
        assert_eq!(models, sorted);
    }

    #[test]
    fn test_remember_query() {
        let mut config = ExternalConfig::default();
        config.remember_query("sm-g970f", " 29 ");
        assert_eq!(config.last_device_model.as_deref(), Some("SM-G970F"));
        assert_eq!(config.last_sdk_version.as_deref(), Some("29"));
    }

    #[test]
    fn test_reset_models_and_clear_all() {
        let mut config = ExternalConfig::default();
        config.add_model("SM-S918B");
        config.remove_model("SM-G970F");
        config.reset_models();
        assert_eq!(config.saved_models, default_saved_models());

        config.add_model("SM-S918B");
        config.remember_query("SM-S918B", "34");
        config.set_storage_location(PathBuf::from("/tmp/apks"));
        config.network.read_timeout_secs = Some(99);
        config.clear_all();
        assert!(config.last_device_model.is_none());
        assert!(config.last_sdk_version.is_none());
        assert!(config.storage_location.is_none());
        assert_eq!(config.network.read_timeout_secs, Some(constants::READ_TIMEOUT_SECS));
        assert!(!config.saved_models().contains(&"SM-S918B".to_string()));
    }

    #[test]
    fn test_app_config_from_partial_file() {
        let external: ExternalConfig = serde_json::from_str(
            r#"{ "network": { "read_timeout_secs": 5, "chunk_size": 0, "success_codes": [] } }"#,
        )
        .unwrap();
        let config = AppConfig::from_external(&external).unwrap();
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(constants::CONNECT_TIMEOUT_SECS));
        assert_eq!(config.chunk_size, constants::CHUNK_SIZE);
        assert_eq!(config.success_codes.len(), constants::api::SUCCESS_RESULT_CODES.len());
        assert_eq!(config.endpoint.as_str(), constants::api::STUB_DOWNLOAD_ENDPOINT);
        assert_eq!(external.saved_models.len(), constants::DEFAULT_DEVICE_MODELS.len());
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let mut external = ExternalConfig::default();
        external.network.endpoint = Some("not a url".into());
        assert!(AppConfig::from_external(&external).is_err());
    }
}
