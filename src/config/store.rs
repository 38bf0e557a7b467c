// src/config/store.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    load_or_create_at(&get_config_path()?)
}

/// 读取指定位置的配置文件，不存在时写入一份默认配置。
pub fn load_or_create_at(config_path: &Path) -> AppResult<ExternalConfig> {
    if config_path.is_file() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();
        save_to(config_path, &config)?;
        Ok(config)
    }
}

pub fn save_external_config(config: &ExternalConfig) -> AppResult<()> {
    save_to(&get_config_path()?, config)
}

pub fn save_to(config_path: &Path, config: &ExternalConfig) -> AppResult<()> {
    if let Some(dir) = config_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json_content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, json_content)
        .with_context(|| format!("保存配置到 '{}' 失败", config_path.display()))?;
    Ok(())
}
