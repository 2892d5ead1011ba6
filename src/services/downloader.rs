//! 归档保存服务
//!
//! 对应"另存为"：写入输出目录，同名文件已存在时追加 ` (n)` 后缀，不覆盖

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::filename::sanitize_filename;
use crate::error::{ExportError, Result};

const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// 归档保存服务
#[derive(Debug, Clone)]
pub struct Downloader {
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 保存 ZIP，返回最终路径
    pub async fn save(&self, title: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| download_error(&self.output_dir, e))?;

        let filename = format!("{}.zip", sanitize_filename(title));
        let (mut file, path) = create_unique(&self.output_dir.join(filename)).await?;

        file.write_all(bytes)
            .await
            .map_err(|e| download_error(&path, e))?;
        file.flush().await.map_err(|e| download_error(&path, e))?;

        info!("💾 已保存: {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }
}

/// 以独占方式创建文件，同名文件存在时依次尝试 `name (1).zip`、`name (2).zip`…
///
/// 检查和创建是同一次系统调用，已存在的文件（包括悬空的符号链接）不会被截断
pub async fn create_unique(path: &Path) -> Result<(File, PathBuf)> {
    for attempt in 0..=MAX_RENAME_ATTEMPTS {
        let candidate = numbered_path(path, attempt);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("文件已存在，换下一个名字: {}", candidate.display());
            }
            Err(e) => return Err(download_error(&candidate, e)),
        }
    }

    Err(download_error(
        path,
        std::io::Error::new(ErrorKind::AlreadyExists, "无法找到可用的文件名"),
    ))
}

/// 第 0 次为原名，之后为 `stem (n).ext`
fn numbered_path(path: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    };
    path.with_file_name(name)
}

fn download_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Download {
        path: path.display().to_string(),
        source,
    }
}
