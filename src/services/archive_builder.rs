//! 归档打包服务

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::filename::sanitize_filename;
use crate::error::Result;
use crate::models::{ExportArchive, FetchedImage, IMAGES_DIR};

/// 组装导出包
///
/// Markdown 文件名由标题清洗得到；只收录下载成功的图片
pub fn build_archive(title: &str, markdown: String, images: &[Option<FetchedImage>]) -> ExportArchive {
    let markdown_name = format!("{}.md", sanitize_filename(title));
    let images = images
        .iter()
        .flatten()
        .map(|image| (image.archive_entry(), image.content.clone()))
        .collect();

    ExportArchive {
        markdown_name,
        markdown,
        images,
    }
}

impl ExportArchive {
    /// 序列化为 ZIP 字节
    ///
    /// Markdown 压缩存储；图片本身已压缩，直接存储
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let text_options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let image_options = FileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file(self.markdown_name.as_str(), text_options)?;
        zip.write_all(self.markdown.as_bytes())
            .map_err(zip::result::ZipError::Io)?;

        if !self.images.is_empty() {
            zip.add_directory(format!("{}/", IMAGES_DIR), image_options)?;
        }
        for (entry, content) in &self.images {
            zip.start_file(entry.as_str(), image_options)?;
            zip.write_all(content).map_err(zip::result::ZipError::Io)?;
        }

        let bytes = zip.finish()?.into_inner();
        debug!(
            "ZIP 已生成: {} ({} 张图片, {} 字节)",
            self.markdown_name,
            self.images.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}
