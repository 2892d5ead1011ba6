use serde::{Deserialize, Serialize};

/// 页面上下文交回的原始内容
///
/// 浏览器模式下由页面内 JS 生成；HTTP 模式下由 Rust 侧构造
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPage {
    /// `document.title`
    pub title: String,
    /// 页面 body（或完整文档）的 HTML
    pub html: String,
    /// 解析相对链接使用的基准 URL（浏览器中即 `document.baseURI`）
    pub base_url: String,
    /// 页面脚本内部抛出的异常信息
    pub error: Option<String>,
}

/// 一次导出的页面快照，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub markdown: String,
    /// 去重后的绝对图片 URL，保持首次出现的顺序
    pub image_urls: Vec<String>,
}
