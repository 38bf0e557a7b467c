// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use galaxy_dl::{cli::Cli, error::AppError, logging, run_from_cli};
use std::{
    env,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    // 第一次 Ctrl+C 通知正在进行的下载停止，第二次直接退出
    let cancellation_token = Arc::new(AtomicBool::new(false));
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        token.store(true, Ordering::Relaxed);
        eprintln!("\n{} 正在取消，再次按 Ctrl+C 强制退出。", "[!]".yellow());
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "galaxy-dl".to_string());

    let after_help = format!(
        "示例:\n  # 查询并下载 (会在下载前确认)\n  {bin} -p com.sec.android.app.myfiles -m SM-G970F -s 29\n\n  # 只查看最新版本信息\n  {bin} -p com.sec.android.app.myfiles --info-only\n\n  # 批量下载\n  {bin} -b packages.txt -m SM-S918B -s 34 -o apks\n\n  # 管理设备型号\n  {bin} --list-models",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logging::setup_logging(args.log_level);

    if let Err(e) = run_from_cli(args, cancellation_token).await {
        if matches!(e, AppError::UserInterrupt) {
            eprintln!("\n{} 用户中断。", "[!]".yellow());
            std::process::exit(130);
        }
        eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
