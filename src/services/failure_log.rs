//! 失败记录服务 - 业务能力层
//!
//! 只负责把下载失败的图片写进记录文件，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 失败记录服务
pub struct FailureLog {
    log_file_path: String,
}

impl FailureLog {
    pub fn new() -> Self {
        Self {
            log_file_path: "failed_images.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    /// 追加一次导出中失败的图片
    ///
    /// # 参数
    /// - `page_title`: 页面标题
    /// - `failed`: (图片序号, 地址)，序号从 1 开始
    pub fn write(&self, page_title: &str, failed: &[(usize, String)]) -> Result<()> {
        if failed.is_empty() {
            return Ok(());
        }
        debug!("写入失败记录: {} | {} 张图片", page_title, failed.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut lines = String::new();
        for (index, url) in failed {
            lines.push_str(&format!(
                "{} | 页面 {} | 图片 #{} | {}\n",
                timestamp, page_title, index, url
            ));
        }
        file.write_all(lines.as_bytes())?;

        Ok(())
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::new()
    }
}
