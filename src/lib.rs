// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod parser;
pub mod request;
pub mod ui;
pub mod utils;
pub mod validation;
mod workflows;

pub use fetcher::ApkFetcher;

use crate::{
    cli::Cli,
    client::HttpClient,
    config::{AppConfig, ExternalConfig, store},
    error::{AppError, AppResult},
    ui::symbols,
};
use anyhow::anyhow;
use colored::*;
use log::{debug, info, warn};
use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};

/// 核心的执行上下文，包含所有任务所需的状态和工具
#[derive(Clone)]
pub struct JobContext {
    pub fetcher: Arc<ApkFetcher>,
    pub config: Arc<AppConfig>,
    pub args: Arc<Cli>,
    pub device_model: String,
    pub sdk_version: String,
    pub output_dir: PathBuf,
    pub cancellation_token: Arc<AtomicBool>,
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: Arc<AtomicBool>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    let mut external_config = store::load_or_create_external_config()?;

    if args.list_models {
        workflows::list_models(&external_config);
        return Ok(());
    }
    if let Some(model) = &args.add_model {
        return workflows::add_model(&mut external_config, model);
    }
    if let Some(model) = &args.remove_model {
        return workflows::remove_model(&mut external_config, model);
    }
    if args.reset_models {
        return workflows::reset_models(&mut external_config);
    }
    if let Some(dir) = &args.set_output_dir {
        return workflows::set_output_dir(&mut external_config, dir);
    }
    if args.clear_data {
        return workflows::clear_data(&mut external_config, args.yes);
    }

    let config = Arc::new(AppConfig::new(&args, &external_config)?);
    debug!("加载的应用配置: {:?}", config);

    let (device_model, sdk_version) = resolve_device(&args, &external_config)?;
    let output_dir = args
        .output
        .clone()
        .or_else(|| external_config.storage_location.clone())
        .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_SAVE_DIR));

    let http_client = Arc::new(HttpClient::new(config.clone())?);
    let context = JobContext {
        fetcher: Arc::new(ApkFetcher::new(
            config.clone(),
            http_client,
            cancellation_token.clone(),
        )),
        config,
        args: args.clone(),
        device_model,
        sdk_version,
        output_dir,
        cancellation_token,
    };

    let report = if let Some(package) = &args.package {
        workflows::run_single(&context, package).await?
    } else if let Some(batch_file) = &args.batch_file {
        workflows::run_batch(&context, batch_file).await?
    } else {
        return Err(AppError::UserInputError("未指定运行模式".to_string()));
    };

    if report.succeeded > 0 {
        external_config.remember_query(&context.device_model, &context.sdk_version);
        if let Err(e) = store::save_external_config(&external_config) {
            warn!("保存上一次的查询参数失败: {}", e);
        }
    }

    if report.failed > 0 {
        return Err(AppError::Other(anyhow!("{} 个任务执行失败。", report.failed)));
    }
    Ok(())
}

/// 命令行参数优先，其次使用上一次成功查询时保存的型号和 SDK 版本。
/// 两者都会去除首尾空白，空值视为未指定。
fn resolve_device(args: &Cli, external_config: &ExternalConfig) -> AppResult<(String, String)> {
    let device_model = first_non_blank(&args.model, &external_config.last_device_model)
        .ok_or_else(|| {
            AppError::UserInputError("未指定设备型号 (--model)，也没有上一次使用的记录。".to_string())
        })?;
    let sdk_version = first_non_blank(&args.sdk, &external_config.last_sdk_version)
        .ok_or_else(|| {
            AppError::UserInputError("未指定 SDK 版本 (--sdk)，也没有上一次使用的记录。".to_string())
        })?;

    if args.model.is_none() || args.sdk.is_none() {
        info!("使用上一次的设备参数: {} / SDK {}", device_model, sdk_version);
        if !args.json {
            println!(
                "{} 使用设备 {} (SDK {})",
                *symbols::INFO,
                device_model.to_uppercase().cyan(),
                sdk_version
            );
        }
    }
    Ok((device_model, sdk_version))
}

fn first_non_blank(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("galaxy-dl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_resolve_device_trims_cli_values() {
        let args = parse(&["-p", "com.example.app", "-m", " sm-g970f ", "-s", " 29 "]);
        let (model, sdk) = resolve_device(&args, &ExternalConfig::default()).unwrap();
        assert_eq!(model, "sm-g970f");
        assert_eq!(sdk, "29");

        let query = models::ApkQuery::new(&model, &sdk, "com.example.app");
        let url = request::RequestBuilder::default().build(&query);
        assert!(url.as_str().contains("deviceId=SM-G970F&"));
        assert!(url.as_str().contains("sdkVer=29&"));
    }

    #[test]
    fn test_resolve_device_falls_back_to_last_query() {
        let mut external_config = ExternalConfig::default();
        external_config.remember_query("SM-A515F", "30");

        let args = parse(&["-p", "com.example.app", "-m", "   "]);
        let (model, sdk) = resolve_device(&args, &external_config).unwrap();
        assert_eq!(model, "SM-A515F");
        assert_eq!(sdk, "30");

        let err = resolve_device(&args, &ExternalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("未指定设备型号"));
    }
}
