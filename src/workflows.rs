// src/workflows.rs

use crate::{
    JobContext,
    config::{ExternalConfig, store},
    downloader::DirectoryDestination,
    error::{AppError, AppResult},
    models::{ApkQuery, DownloadOutcome, FailureKind, FetchedApk, ParsedApkInfo},
    ui::{self, symbols},
    utils, validation,
};
use colored::*;
use indicatif::HumanBytes;
use log::{debug, error, info};
use serde::Serialize;
use std::{
    path::Path,
    sync::atomic::Ordering,
};

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RunReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// 单个包名的处理结果
enum PackageResult {
    Downloaded(FetchedApk),
    InfoOnly(ParsedApkInfo),
    Declined(ParsedApkInfo),
}

/// `--json` 模式下每个包名输出一条记录
#[derive(Serialize)]
struct JsonRecord<'a> {
    query: &'a ApkQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<&'a ParsedApkInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<DownloadOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) fn list_models(external_config: &ExternalConfig) {
    let models = external_config.saved_models();
    let lines: Vec<&str> = models.iter().map(String::as_str).collect();
    ui::box_message(
        &format!("已保存的设备型号 ({}个)", models.len()),
        &lines,
        |s| s.cyan(),
    );
}

pub(crate) fn add_model(external_config: &mut ExternalConfig, model: &str) -> AppResult<()> {
    if !validation::is_valid_device_model(model) {
        return Err(AppError::UserInputError(format!(
            "设备型号 '{}' 不符合三星格式 (例如 {})",
            model,
            crate::constants::validation::DEVICE_MODEL_EXAMPLE
        )));
    }
    if external_config.add_model(model) {
        store::save_external_config(external_config)?;
        println!("{} 已保存设备型号 {}", *symbols::OK, model.trim().to_uppercase());
    } else {
        println!("{} 设备型号 {} 已存在。", *symbols::INFO, model.trim().to_uppercase());
    }
    Ok(())
}

pub(crate) fn remove_model(external_config: &mut ExternalConfig, model: &str) -> AppResult<()> {
    if external_config.remove_model(model) {
        store::save_external_config(external_config)?;
        println!("{} 已删除设备型号 {}", *symbols::OK, model.trim().to_uppercase());
    } else {
        println!("{} 未找到设备型号 {}", *symbols::WARN, model.trim().to_uppercase());
    }
    Ok(())
}

pub(crate) fn reset_models(external_config: &mut ExternalConfig) -> AppResult<()> {
    external_config.reset_models();
    store::save_external_config(external_config)?;
    println!(
        "{} 设备型号已恢复为默认列表 ({}个)。",
        *symbols::OK,
        external_config.saved_models().len()
    );
    Ok(())
}

/// 保存默认下载目录。目录不存在时会先创建，保存的是绝对路径。
pub(crate) fn set_output_dir(external_config: &mut ExternalConfig, dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        error!("创建目录 '{}' 失败: {}", dir.display(), e);
        AppError::from(e)
    })?;
    let dir = dunce::canonicalize(dir)?;
    external_config.set_storage_location(dir.clone());
    store::save_external_config(external_config)?;
    println!("{} 默认保存目录已设置为 {}", *symbols::OK, dir.display().to_string().green());
    Ok(())
}

pub(crate) fn clear_data(external_config: &mut ExternalConfig, skip_confirm: bool) -> AppResult<()> {
    if !skip_confirm && !ui::confirm("将清除所有设置和已保存的设备型号，是否继续?", false) {
        println!("{} 已取消。", *symbols::INFO);
        return Ok(());
    }
    external_config.clear_all();
    store::save_external_config(external_config)?;
    info!("已清除所有保存的数据");
    println!("{} 所有数据已清除。", *symbols::OK);
    Ok(())
}

/// 运行单任务模式 (--package)
pub(crate) async fn run_single(context: &JobContext, package: &str) -> AppResult<RunReport> {
    let query = ApkQuery::new(&context.device_model, &context.sdk_version, package.trim());
    match run_query(context, &query).await {
        Ok(_) => Ok(RunReport {
            succeeded: 1,
            failed: 0,
        }),
        Err(AppError::UserInterrupt) => Err(AppError::UserInterrupt),
        Err(e) => {
            // run_query 已经打印过错误，这里只计数
            error!("处理 '{}' 失败: {}", package, e);
            Ok(RunReport {
                succeeded: 0,
                failed: 1,
            })
        }
    }
}

/// 运行批量模式：文件中每行一个包名，空行和 `#` 开头的行会被忽略
pub(crate) async fn run_batch(context: &JobContext, batch_file: &Path) -> AppResult<RunReport> {
    let content = std::fs::read_to_string(batch_file).map_err(|e| {
        error!("读取批量文件 '{}' 失败: {}", batch_file.display(), e);
        AppError::from(e)
    })?;

    let packages: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect();
    let mut report = RunReport::default();
    if packages.is_empty() {
        log::warn!("批量文件 '{}' 为空或不含有效行。", batch_file.display());
        println!("{} 批量文件 '{}' 为空。", *symbols::WARN, batch_file.display());
        return Ok(report);
    }

    if !context.args.json {
        ui::print_header(&format!(
            "开始批量处理 {} 个包名 (按 {} 可随时退出)",
            packages.len(),
            *symbols::CTRL_C
        ));
    }
    for (i, package) in packages.iter().enumerate() {
        if context.cancellation_token.load(Ordering::Relaxed) {
            return Err(AppError::UserInterrupt);
        }
        if !context.args.json {
            ui::print_sub_header(&format!(
                "批量任务 {}/{} - {}",
                i + 1,
                packages.len(),
                utils::truncate_text(package, 60)
            ));
        }
        let query = ApkQuery::new(&context.device_model, &context.sdk_version, *package);
        match run_query(context, &query).await {
            Ok(_) => report.succeeded += 1,
            Err(AppError::UserInterrupt) => return Err(AppError::UserInterrupt),
            Err(e) => {
                report.failed += 1;
                error!("批量任务 '{}' 失败: {}", package, e);
            }
        }
    }

    if !context.args.json {
        ui::print_header("批量任务报告");
        println!(
            "{} | {} | 总计: {}",
            format!("成功任务: {}", report.succeeded).green(),
            format!("失败任务: {}", report.failed).red(),
            packages.len()
        );
    }
    Ok(report)
}

/// 处理一个包名并输出结果，失败时打印错误后原样返回
async fn run_query(context: &JobContext, query: &ApkQuery) -> AppResult<PackageResult> {
    let result = process_package(context, query).await;
    match &result {
        Ok(package_result) if context.args.json => print_json(query, Ok(package_result)),
        Ok(_) => {}
        Err(e) if context.args.json => print_json(query, Err(e)),
        Err(e) => print_failure(e),
    }
    result
}

async fn process_package(context: &JobContext, query: &ApkQuery) -> AppResult<PackageResult> {
    let args = &context.args;
    if !args.skip_validation {
        let validation = validation::validate_all_inputs(
            &query.device_model,
            &query.sdk_version,
            &query.package_name,
        );
        if !validation.is_valid() {
            return Err(AppError::UserInputError(validation.formatted_errors()));
        }
    }

    if !args.json {
        println!(
            "\n{} 正在从三星服务器获取 {} 的信息...",
            *symbols::INFO,
            query.package_name.cyan()
        );
    }
    let info = context.fetcher.query_info(query).await?;

    if !args.json {
        ui::print_apk_info(&info);
    }
    if args.info_only {
        return Ok(PackageResult::InfoOnly(info));
    }
    if !args.non_interactive() && !ui::confirm("是否下载该 APK?", true) {
        info!("用户取消下载 {}", info);
        return Ok(PackageResult::Declined(info));
    }

    let destination = DirectoryDestination::new(&context.output_dir);
    let pbar = if args.json {
        indicatif::ProgressBar::hidden()
    } else {
        ui::new_percent_progress_bar("下载")
    };
    pbar.set_message(info.expected_filename());

    let outcome = context
        .fetcher
        .download(&info, &destination, |percent| pbar.set_position(u64::from(percent)))
        .await;
    pbar.finish_and_clear();

    match outcome {
        DownloadOutcome::Completed { file_path } => {
            if !args.json {
                print_download_summary(&file_path);
            }
            Ok(PackageResult::Downloaded(FetchedApk { info, file_path }))
        }
        DownloadOutcome::Failed { .. } if context.cancellation_token.load(Ordering::Relaxed) => {
            Err(AppError::UserInterrupt)
        }
        DownloadOutcome::Failed { reason } => Err(AppError::DownloadFailed(reason)),
    }
}

fn print_download_summary(file_path: &str) {
    let path = Path::new(file_path);
    println!("{} 下载完成: {}", *symbols::OK, file_path.green());
    match std::fs::metadata(path) {
        Ok(metadata) => println!("    大小: {}", HumanBytes(metadata.len())),
        Err(e) => debug!("读取文件大小失败: {}", e),
    }
    match utils::calculate_file_md5(path) {
        Ok(md5) => println!("    MD5:  {}", md5),
        Err(e) => debug!("计算 MD5 失败: {}", e),
    }
}

fn print_failure(e: &AppError) {
    let kind = FailureKind::from(e);
    let (symbol, color_fn, label) = kind.get_display_info();
    eprintln!(
        "\n{} {}",
        symbol,
        color_fn(format!("{}: {}", label, e).into())
    );
}

fn print_json(query: &ApkQuery, result: Result<&PackageResult, &AppError>) {
    let record = match result {
        Ok(PackageResult::Downloaded(fetched)) => JsonRecord {
            query,
            info: Some(&fetched.info),
            outcome: Some(DownloadOutcome::Completed {
                file_path: fetched.file_path.clone(),
            }),
            error: None,
        },
        Ok(PackageResult::InfoOnly(info)) | Ok(PackageResult::Declined(info)) => JsonRecord {
            query,
            info: Some(info),
            outcome: None,
            error: None,
        },
        Err(e) => JsonRecord {
            query,
            info: None,
            outcome: None,
            error: Some(e.to_string()),
        },
    };
    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("序列化 JSON 输出失败: {}", e),
    }
}
