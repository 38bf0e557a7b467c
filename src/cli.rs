// src/cli.rs

use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// command 属性
#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&[
            "package",
            "batch_file",
            "list_models",
            "add_model",
            "remove_model",
            "reset_models",
            "set_output_dir",
            "clear_data",
        ]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 查询并下载指定包名的 APK
    #[arg(short, long, help_heading = "Mode")]
    pub package: Option<String>,
    /// 从文本文件批量下载多个包名 (每行一个)
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub batch_file: Option<PathBuf>,
    /// 列出已保存的设备型号并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub list_models: bool,
    /// 保存一个设备型号并退出
    #[arg(long, value_name = "MODEL", help_heading = "Mode")]
    pub add_model: Option<String>,
    /// 删除一个已保存的设备型号并退出
    #[arg(long, value_name = "MODEL", help_heading = "Mode")]
    pub remove_model: Option<String>,
    /// 将设备型号列表恢复为默认值并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub reset_models: bool,
    /// 保存默认的文件保存目录并退出
    #[arg(long, value_name = "DIR", help_heading = "Mode")]
    pub set_output_dir: Option<PathBuf>,
    /// 清除所有已保存的设置和设备型号并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub clear_data: bool,

    // --- 查询选项 (Options) ---
    /// 设备型号，例如 SM-G970F (默认使用上一次的型号)
    #[arg(short, long, help_heading = "Options")]
    pub model: Option<String>,
    /// Android SDK 版本，例如 29 (默认使用上一次的版本)
    #[arg(short, long, help_heading = "Options")]
    pub sdk: Option<String>,
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", help_heading = "Options")]
    pub output: Option<PathBuf>,
    /// 只查询版本信息，不下载
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub info_only: bool,
    /// 不再询问，直接下载 (或直接清除数据)
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub yes: bool,
    /// 以 JSON 格式输出结果
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub json: bool,
    /// 跳过设备型号、SDK 版本和包名的格式校验
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub skip_validation: bool,
    /// 连接超时 (秒)
    #[arg(long, value_name = "SECS", help_heading = "Options")]
    pub connect_timeout: Option<u64>,
    /// 读取超时 (秒)
    #[arg(long, value_name = "SECS", help_heading = "Options")]
    pub read_timeout: Option<u64>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

impl Cli {
    /// 不会弹出确认提示的运行方式
    pub fn non_interactive(&self) -> bool {
        self.yes || self.json || self.batch_file.is_some()
    }
}
