// src/downloader/progress.rs

/// 根据已写入字节数计算下载百分比。
///
/// 只有在已知总长度时才会产生百分比，结果保证落在 [0, 100] 且不会回退。
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: Option<u64>,
    written: u64,
    last_percent: u8,
}

impl ProgressTracker {
    /// 总长度为 0 视同未知
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|&t| t > 0),
            written: 0,
            last_percent: 0,
        }
    }

    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.written = self.written.saturating_add(bytes);
        let total = self.total?;
        let percent = (u128::from(self.written) * 100 / u128::from(total)).min(100) as u8;
        self.last_percent = self.last_percent.max(percent);
        Some(self.last_percent)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }
}
