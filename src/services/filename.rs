//! 文件名清洗

use regex::Regex;
use std::sync::LazyLock;

const MAX_FILENAME_CHARS: usize = 100;
const FALLBACK_NAME: &str = "page";

static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// 把页面标题转成可用的文件名（不含扩展名）
///
/// 非法字符与空白都变成 `-`，连续的 `-` 合并，去掉首尾 `-`，
/// 最长 100 个字符，结果为空时返回 `page`
pub fn sanitize_filename(title: &str) -> String {
    let replaced = FORBIDDEN.replace_all(title, "-");
    let replaced = WHITESPACE.replace_all(&replaced, "-");
    let replaced = HYPHENS.replace_all(&replaced, "-");

    let truncated: String = replaced
        .trim_matches('-')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect();
    // 截断可能留下结尾的 `-`
    let cleaned = truncated.trim_end_matches('-');

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
