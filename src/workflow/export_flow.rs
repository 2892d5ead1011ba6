//! 导出流程 - 流程层
//!
//! 核心职责：定义"一次导出"的完整流程
//!
//! 流程顺序：
//! 1. 取回页面 → 提取快照
//! 2. 逐张请求图片（失败记为空位，继续）
//! 3. 改写 Markdown 图片链接 → 打包 ZIP
//! 4. 保存归档

use std::path::PathBuf;

use futures::StreamExt;
use tracing::{info, warn};

use super::export_state::{ExportSession, ExportState, StatusSink};
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::{FetchHandle, PageSource};
use crate::models::{assigned_filename, FetchRequest, FetchedImage};
use crate::services::image_fetcher::{decode_payload, DEFAULT_CONTENT_TYPE, DEFAULT_EXTENSION};
use crate::services::{build_archive, rewrite_image_links, Downloader, FailureLog, PageExtractor};

/// 一次导出的结果
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub title: String,
    pub archive_path: PathBuf,
    pub total_images: usize,
    pub fetched_images: usize,
    /// 下载失败的图片地址（Markdown 中保留原地址）
    pub failed_urls: Vec<String>,
}

/// 导出流程
///
/// - 编排一次完整的导出
/// - 不持有页面资源，只通过 `PageSource` 取回内容
/// - 图片只经由 `FetchHandle` 请求
pub struct ExportFlow {
    extractor: PageExtractor,
    fetch: FetchHandle,
    downloader: Downloader,
    failure_log: FailureLog,
    max_concurrent_fetches: usize,
}

impl ExportFlow {
    pub fn new(config: &Config, fetch: FetchHandle) -> Self {
        Self {
            extractor: PageExtractor::default(),
            fetch,
            downloader: Downloader::new(&config.output_dir),
            failure_log: FailureLog::with_path(&config.failure_log_file),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        }
    }

    /// 执行一次导出
    ///
    /// 返回的错误都是致命错误，由调用方渲染为 `Failed`
    pub async fn run<S: StatusSink>(
        &self,
        source: &PageSource,
        target: Option<&str>,
        session: &mut ExportSession<S>,
    ) -> Result<ExportReport> {
        // ========== 1. 提取 ==========
        session.advance(ExportState::Extracting)?;
        let raw = source.capture(target).await?;
        let snapshot = self.extractor.extract(&raw);
        info!("📄 页面: {}", snapshot.title);

        // ========== 2. 下载图片 ==========
        let total = snapshot.image_urls.len();
        session.advance(ExportState::FetchingImages { current: 0, total })?;
        let images = self.fetch_images(&snapshot.image_urls, session).await?;

        let failed: Vec<(usize, String)> = snapshot
            .image_urls
            .iter()
            .zip(&images)
            .enumerate()
            .filter(|(_, (_, image))| image.is_none())
            .map(|(index, (url, _))| (index + 1, url.clone()))
            .collect();
        if !failed.is_empty() {
            warn!("⚠️ {}/{} 张图片下载失败，保留原地址", failed.len(), total);
            if let Err(e) = self.failure_log.write(&snapshot.title, &failed) {
                warn!("写入失败记录出错 {}: {}", self.failure_log.path(), e);
            }
        }

        // ========== 3. 改写 + 打包 ==========
        session.advance(ExportState::Packaging)?;
        let markdown = rewrite_image_links(&snapshot.markdown, &images)?;
        let archive = build_archive(&snapshot.title, markdown, &images);
        let bytes = archive.to_zip_bytes()?;

        // ========== 4. 保存 ==========
        session.advance(ExportState::Downloading)?;
        let archive_path = self.downloader.save(&snapshot.title, &bytes).await?;
        session.advance(ExportState::Done {
            path: archive_path.clone(),
        })?;

        Ok(ExportReport {
            title: snapshot.title,
            archive_path,
            total_images: total,
            fetched_images: archive.image_count(),
            failed_urls: failed.into_iter().map(|(_, url)| url).collect(),
        })
    }

    /// 按原顺序请求所有图片
    ///
    /// 默认逐张顺序请求；`max_concurrent_fetches > 1` 时有界并发，结果仍按原序号排列
    async fn fetch_images<S: StatusSink>(
        &self,
        urls: &[String],
        session: &mut ExportSession<S>,
    ) -> Result<Vec<Option<FetchedImage>>> {
        let total = urls.len();
        let mut images = Vec::with_capacity(total);

        if self.max_concurrent_fetches <= 1 {
            for (index, url) in urls.iter().enumerate() {
                session.advance(ExportState::FetchingImages {
                    current: index + 1,
                    total,
                })?;
                images.push(self.fetch_one(index, url).await);
            }
            return Ok(images);
        }

        let stream = futures::stream::iter(urls.iter().enumerate())
            .map(|(index, url)| self.fetch_one(index, url))
            .buffered(self.max_concurrent_fetches);
        let mut stream = std::pin::pin!(stream);
        while let Some(image) = stream.next().await {
            images.push(image);
            session.advance(ExportState::FetchingImages {
                current: images.len(),
                total,
            })?;
        }
        Ok(images)
    }

    /// 请求单张图片，任何失败都返回 None
    async fn fetch_one(&self, index: usize, url: &str) -> Option<FetchedImage> {
        let request = FetchRequest::FetchImage {
            url: url.to_string(),
        };
        let response = match self.fetch.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("图片 #{} 请求失败: {}", index + 1, e);
                return None;
            }
        };

        if !response.success {
            warn!(
                "图片 #{} 下载失败: {} ({})",
                index + 1,
                url,
                response.error.as_deref().unwrap_or("未知错误")
            );
            return None;
        }

        let Some(content) = response.content.as_deref() else {
            warn!("图片 #{} 响应缺少内容: {}", index + 1, url);
            return None;
        };
        let bytes = match decode_payload(content) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("图片 #{} 内容解码失败: {} ({})", index + 1, url, e);
                return None;
            }
        };

        let extension = response.extension.as_deref().unwrap_or(DEFAULT_EXTENSION);
        Some(FetchedImage {
            source_url: url.to_string(),
            content: bytes,
            content_type: response
                .content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            assigned_filename: assigned_filename(index, extension),
        })
    }
}
