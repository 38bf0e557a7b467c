// src/validation.rs

use crate::constants::validation::*;
use regex::Regex;
use std::sync::LazyLock;

static DEVICE_MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SM-[A-Z0-9]{4,6}[A-Z]?$").unwrap());
static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z0-9_]+)+[0-9a-z_]$").unwrap());

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

/// 输入校验结果，收集所有错误后一并报告
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn add_error(&mut self, message: &str) {
        let message = message.trim();
        if !message.is_empty() {
            self.errors.push(message.to_string());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn formatted_errors(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("• {}", e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn is_valid_sdk_version(sdk_version: &str) -> bool {
    sdk_version
        .trim()
        .parse::<u32>()
        .is_ok_and(|v| (MIN_SDK_VERSION..=MAX_SDK_VERSION).contains(&v))
}

pub fn is_valid_device_model(device_model: &str) -> bool {
    DEVICE_MODEL_RE.is_match(&device_model.trim().to_uppercase())
}

pub fn is_valid_package_name(package_name: &str) -> bool {
    let pkg = package_name.trim().to_lowercase();
    if !PACKAGE_NAME_RE.is_match(&pkg) {
        return false;
    }
    let components: Vec<&str> = pkg.split('.').collect();
    components.len() >= 2 && components.iter().all(|c| is_valid_package_component(c))
}

fn is_valid_package_component(component: &str) -> bool {
    let Some(first) = component.chars().next() else {
        return false;
    };
    first.is_alphabetic()
        && component.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !JAVA_KEYWORDS.contains(&component)
}

pub fn validate_all_inputs(device_model: &str, sdk_version: &str, package_name: &str) -> ValidationResult {
    let mut result = ValidationResult::default();
    if !is_valid_device_model(device_model) {
        result.add_error(&format!(
            "设备型号必须符合三星格式 SM-XXXXX (例如 {})",
            DEVICE_MODEL_EXAMPLE
        ));
    }
    if !is_valid_sdk_version(sdk_version) {
        result.add_error(&format!(
            "SDK 版本必须在 {} 到 {} 之间",
            MIN_SDK_VERSION, MAX_SDK_VERSION
        ));
    }
    if !is_valid_package_name(package_name) {
        result.add_error(&format!(
            "包名必须符合 Android 标准格式 (例如 {})",
            PACKAGE_NAME_EXAMPLE
        ));
    }
    result
}
