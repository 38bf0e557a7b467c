// src/downloader/destination.rs

use crate::{error::*, utils};
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use tokio::io::AsyncWrite;

/// 可写入的字节流以及它对应的位置描述 (文件路径或其他存储标识)
pub struct Sink {
    pub location: String,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

/// 下载目标的抽象：为给定文件名提供一个可写入的字节流。
#[async_trait]
pub trait Destination: Send + Sync {
    async fn open(&self, filename: &str) -> AppResult<Sink>;
}

/// 写入本地目录。目录不存在时会自动创建。
#[derive(Debug, Clone)]
pub struct DirectoryDestination {
    dir: PathBuf,
}

impl DirectoryDestination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl Destination for DirectoryDestination {
    async fn open(&self, filename: &str) -> AppResult<Sink> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = dunce::canonicalize(&self.dir)?;
        let path = dir.join(utils::sanitize_filename(filename));
        debug!("创建输出文件: {}", path.display());
        let file = tokio::fs::File::create(&path).await?;
        Ok(Sink {
            location: path.to_string_lossy().into_owned(),
            writer: Box::new(file),
        })
    }
}
