// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const USER_AGENT: &str = "SamsungApkDownloader/2.0";

pub const CONNECT_TIMEOUT_SECS: u64 = 15;
pub const READ_TIMEOUT_SECS: u64 = 30;
/// 流式写入时每次写出的字节数
pub const CHUNK_SIZE: usize = 8192;

pub const APK_EXTENSION: &str = "apk";
pub const UNKNOWN_VERSION_NAME: &str = "Unknown";
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

pub mod api {
    pub const STUB_DOWNLOAD_ENDPOINT: &str = "https://vas.samsungapps.com/stub/stubDownload.as";

    /// 服务器在不同版本中使用过的“成功”结果码
    pub const SUCCESS_RESULT_CODES: &[&str] = &["1", "1000", "0", "200"];

    pub mod params {
        pub const APP_ID: &str = "appId";
        pub const DEVICE_ID: &str = "deviceId";
        pub const SDK_VER: &str = "sdkVer";
    }

    /// 固定的查询参数，按请求中的顺序排列
    pub const MCC: (&str, &str) = ("mcc", "425");
    pub const MNC: (&str, &str) = ("mnc", "01");
    pub const CSC: (&str, &str) = ("csc", "ILO");
    pub const PD: (&str, &str) = ("pd", "0");
    pub const SYSTEM_ID: (&str, &str) = ("systemId", "1608665720954");
    pub const CALLER_ID: (&str, &str) = ("callerId", "com.sec.android.app.samsungapps");
    pub const ABI_TYPE: (&str, &str) = ("abiType", "64");
    pub const EXTUK: (&str, &str) = ("extuk", "0191d6627f38685f");

    pub mod tags {
        pub const RESULT_CODE: &str = "resultCode";
        pub const RESULT_MSG: &str = "resultMsg";
        pub const DOWNLOAD_URI: &str = "downloadURI";
        pub const VERSION_CODE: &str = "versionCode";
        pub const VERSION_NAME: &str = "versionName";
    }
}

pub mod validation {
    pub const MIN_SDK_VERSION: u32 = 19;
    pub const MAX_SDK_VERSION: u32 = 99;
    pub const DEVICE_MODEL_EXAMPLE: &str = "SM-G970F (Galaxy S10e)";
    pub const PACKAGE_NAME_EXAMPLE: &str = "com.sec.android.app.myfiles";
}

pub const DEFAULT_DEVICE_MODELS: &[&str] = &[
    // Galaxy S10
    "SM-G970F", "SM-G973F", "SM-G975F",
    // Galaxy S20
    "SM-G980F", "SM-G981B", "SM-G985F",
    // Galaxy S21
    "SM-G991B", "SM-G996B", "SM-G998B",
    // Galaxy S20 FE
    "SM-G781B", "SM-G780F",
    // Galaxy Note 10
    "SM-N970F", "SM-N975F",
    // Galaxy Note 20
    "SM-N980F", "SM-N985F", "SM-N986B",
    // Galaxy A
    "SM-A515F", "SM-A525F", "SM-A715F",
];
