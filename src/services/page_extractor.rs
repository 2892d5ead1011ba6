//! 页面提取服务 - 业务能力层
//!
//! 把页面上下文交回的 `RawPage` 变成 `PageSnapshot`：标题、Markdown、去重后的图片列表。
//! 提取失败不会向上抛错，而是返回一份错误快照。

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::markdown_converter::MarkdownConverter;
use crate::error::{ExportError, Result};
use crate::models::{PageSnapshot, RawPage};

/// 标题为空时使用的占位标题
pub const UNTITLED_PAGE: &str = "Untitled Page";
/// 错误快照的标题
pub const ERROR_TITLE: &str = "Error";

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static BASE_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("valid selector"));

/// 页面提取服务
#[derive(Debug, Clone, Default)]
pub struct PageExtractor;

impl PageExtractor {

    /// 生成页面快照，任何失败都转成错误快照
    pub fn extract(&self, raw: &RawPage) -> PageSnapshot {
        match self.try_extract(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("页面内容提取失败: {}", e);
                let message = match e {
                    ExportError::Extraction(message) => message,
                    other => other.to_string(),
                };
                error_snapshot(&message)
            }
        }
    }

    fn try_extract(&self, raw: &RawPage) -> Result<PageSnapshot> {
        if let Some(message) = &raw.error {
            return Err(ExportError::Extraction(message.clone()));
        }

        let base_url = Url::parse(raw.base_url.trim()).map_err(|e| {
            ExportError::Extraction(format!("无效的页面地址 '{}': {}", raw.base_url, e))
        })?;

        let title = normalize_title(&raw.title);
        let image_urls = collect_image_urls(&raw.html, &base_url);
        debug!("提取到 {} 张图片: {}", image_urls.len(), title);

        let body = MarkdownConverter::new()
            .with_base_url(base_url)
            .convert(&raw.html)?;

        Ok(PageSnapshot {
            markdown: format!("# {}\n\n{}", title, body.trim()),
            title,
            image_urls,
        })
    }
}

/// 错误快照：Markdown 为错误说明，无图片
pub fn error_snapshot(message: &str) -> PageSnapshot {
    PageSnapshot {
        title: ERROR_TITLE.to_string(),
        markdown: format!("# Error\n\nFailed to extract page content: {}", message),
        image_urls: Vec::new(),
    }
}

/// 按 URL 规则把图片地址解析为绝对地址
pub fn resolve_url(base: &Url, raw: &str) -> std::result::Result<Url, url::ParseError> {
    base.join(raw.trim())
}

/// 收集所有 `<img>` 的绝对地址
///
/// 跳过空地址与 `data:` 内嵌图片；无法解析的地址记录警告后跳过；
/// 按首次出现顺序去重
pub fn collect_image_urls(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for img in document.select(&IMG) {
        let Some(src) = img.value().attr("src").map(str::trim) else {
            continue;
        };
        if src.is_empty() {
            continue;
        }

        let absolute = match resolve_url(base_url, src) {
            Ok(url) => url,
            Err(e) => {
                warn!("无效的图片地址: {} ({})", src, e);
                continue;
            }
        };
        if absolute.scheme() == "data" {
            continue;
        }

        let absolute = absolute.to_string();
        if seen.insert(absolute.clone()) {
            urls.push(absolute);
        }
    }

    urls
}

/// 静态 HTML 的标题（`<title>` 文本）
pub fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>())
        .unwrap_or_default()
}

/// 静态 HTML 的有效基准地址：有 `<base href>` 时以它为准
pub fn effective_base_url(html: &str, document_url: &Url) -> Url {
    let document = Html::parse_document(html);
    document
        .select(&BASE_HREF)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve_url(document_url, href).ok())
        .unwrap_or_else(|| document_url.clone())
}

/// 与 `document.title` 一致：压缩空白、去首尾，为空时用占位标题
fn normalize_title(title: &str) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        UNTITLED_PAGE.to_string()
    } else {
        collapsed
    }
}
