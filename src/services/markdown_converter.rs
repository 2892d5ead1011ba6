//! HTML → Markdown 转换
//!
//! 基于 `htmd`：ATX 标题、围栏代码块、`-` 列表符号、`*` 强调，
//! 另加删除线、表格单元格和图片地址三条自定义规则。

use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use url::Url;

use super::page_extractor::resolve_url;
use crate::error::{ExportError, Result};

/// 转换时整体跳过的元素
const SKIPPED_TAGS: [&str; 6] = ["head", "title", "script", "style", "noscript", "template"];

/// HTML → Markdown 转换器
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    base_url: Option<Url>,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置基准 URL，图片地址会被解析成绝对地址
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// 转换 HTML 文档（或片段）
    pub fn convert(&self, html: &str) -> Result<String> {
        let base_url = self.base_url.clone();

        let converter = HtmlToMarkdown::builder()
            .skip_tags(SKIPPED_TAGS.to_vec())
            .options(Options {
                heading_style: HeadingStyle::Atx,
                code_block_style: CodeBlockStyle::Fenced,
                code_block_fence: CodeBlockFence::Backticks,
                bullet_list_marker: BulletListMarker::Dash,
                ..Default::default()
            })
            .add_handler(vec!["em", "i"], |element: Element| {
                Some(wrap_inline(element.content, "*"))
            })
            .add_handler(vec!["strong", "b"], |element: Element| {
                Some(wrap_inline(element.content, "**"))
            })
            .add_handler(vec!["del", "s", "strike"], |element: Element| {
                Some(wrap_inline(element.content, "~~"))
            })
            .add_handler(vec!["th", "td"], |element: Element| {
                Some(format!(" {} |", element.content.trim()))
            })
            .add_handler(vec!["tr"], |element: Element| {
                Some(format!("\n|{}\n", element.content.trim_end()))
            })
            .add_handler(vec!["table"], |element: Element| {
                Some(format!("\n\n{}\n\n", element.content.trim_matches('\n')))
            })
            .add_handler(vec!["img"], move |element: Element| {
                Some(render_image(&element, base_url.as_ref()))
            })
            .build();

        converter
            .convert(html)
            .map_err(|e| ExportError::Extraction(format!("Markdown 转换失败: {}", e)))
    }
}

fn attr<'a>(element: &Element<'a>, name: &str) -> Option<&'a str> {
    element
        .attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| &*a.value)
}

/// 与图片提取使用同一套解析规则，保证 Markdown 中的地址和图片列表一致
fn render_image(element: &Element<'_>, base_url: Option<&Url>) -> String {
    let src = attr(element, "src").map(str::trim).unwrap_or("");
    if src.is_empty() {
        return String::new();
    }
    let src = resolve_src(src, base_url);
    let alt = attr(element, "alt").map(clean_attribute).unwrap_or_default();

    match attr(element, "title").map(clean_attribute) {
        Some(title) if !title.is_empty() => {
            format!("![{}]({} \"{}\")", alt, src, title.replace('"', "\\\""))
        }
        _ => format!("![{}]({})", alt, src),
    }
}

fn resolve_src(src: &str, base_url: Option<&Url>) -> String {
    if src.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
        return src.to_string();
    }
    match base_url {
        Some(base) => resolve_url(base, src)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| src.to_string()),
        None => src.to_string(),
    }
}

/// 属性里的换行会破坏 Markdown 行结构
fn clean_attribute(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 行内强调：首尾空白移到分隔符外侧，空内容不加分隔符
fn wrap_inline(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{delimiter}{trimmed}{delimiter}{trailing}")
}
