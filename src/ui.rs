// src/ui.rs

use crate::{constants, models::ParsedApkInfo};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

pub mod symbols {
    use colored::{ColoredString, Colorize};
    use std::sync::LazyLock;

    pub static OK: LazyLock<ColoredString> = LazyLock::new(|| "[OK]".green());
    pub static ERROR: LazyLock<ColoredString> = LazyLock::new(|| "[X]".red());
    pub static INFO: LazyLock<ColoredString> = LazyLock::new(|| "[i]".cyan());
    pub static WARN: LazyLock<ColoredString> = LazyLock::new(|| "[!]".yellow());
    pub static CTRL_C: LazyLock<ColoredString> = LazyLock::new(|| "Ctrl+C".yellow());
}

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn print_apk_info(info: &ParsedApkInfo) {
    let lines = [
        format!("包名:     {}", info.package_name()),
        format!("版本号:   {}", info.version_code()),
        format!("版本名:   {}", info.version_name()),
        format!("文件名:   {}", info.expected_filename()),
    ];
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    box_message("已获取 APK 信息", &lines, |s| s.green());
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

pub fn confirm(question: &str, default_yes: bool) -> bool {
    let options = if default_yes { "(Y/n)" } else { "(y/N)" };
    loop {
        match prompt(
            &format!("{} {} (按 {} 取消)", question, options, *symbols::CTRL_C),
            None,
        ) {
            Ok(choice) => {
                let choice = choice.to_lowercase();
                if choice == "y" {
                    return true;
                }
                if choice == "n" {
                    return false;
                }
                if choice.is_empty() {
                    return default_yes;
                }
                println!("{}", "无效输入，请输入 'y' 或 'n'。".red());
            }
            Err(_) => return false,
        }
    }
}

/// 按百分比显示的下载进度条
pub fn new_percent_progress_bar(prefix: &str) -> ProgressBar {
    let pbar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(
        "{prefix:7.bold.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pbar.set_style(style);
    pbar.set_prefix(prefix.to_string());
    pbar
}
