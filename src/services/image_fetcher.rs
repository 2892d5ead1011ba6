//! 图片获取服务 - 业务能力层
//!
//! 只负责"下载一张图片"：请求、判断扩展名、base64 编码。
//! 任何失败都变成 `FetchResponse::failed`，不会向调用方抛错。

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::models::FetchResponse;

/// 响应头缺失时使用的类型
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
/// 无法识别时使用的扩展名
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// content-type 子串 → 扩展名，按顺序匹配
const CONTENT_TYPE_EXTENSIONS: [(&str, &str); 6] = [
    ("png", ".png"),
    ("gif", ".gif"),
    ("webp", ".webp"),
    ("svg", ".svg"),
    ("bmp", ".bmp"),
    ("ico", ".ico"),
];

static URL_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|bmp|ico)$").expect("valid regex")
});

/// 图片获取服务
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    /// 不带 cookie 的客户端（等价于 `credentials: 'omit'`）
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 下载图片
    pub async fn fetch(&self, url: &str) -> FetchResponse {
        match self.try_fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("图片下载失败 {}: {}", url, e);
                FetchResponse::failed(e.to_string())
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let extension = extension_for(&content_type, url);

        let bytes = response.bytes().await?;
        debug!(
            "图片下载完成: {} ({} 字节, {}, {})",
            url,
            bytes.len(),
            content_type,
            extension
        );

        Ok(FetchResponse::ok(STANDARD.encode(&bytes), content_type, extension))
    }
}

/// 决定扩展名
///
/// 先按 content-type 匹配；只有落到默认 `.jpg` 时才尝试用 URL 路径后缀覆盖
pub fn extension_for(content_type: &str, url: &str) -> String {
    let from_type = CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(needle, _)| content_type.contains(needle))
        .map(|(_, ext)| *ext);

    match from_type {
        Some(ext) => ext.to_string(),
        None => extension_from_url(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
    }
}

/// URL 路径后缀对应的扩展名（小写，含点）
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("解析图片地址失败 {}: {}", url, e);
            return None;
        }
    };
    URL_EXTENSION
        .captures(parsed.path())
        .map(|caps| format!(".{}", caps[1].to_ascii_lowercase()))
}

/// 传输格式解码回二进制
pub fn decode_payload(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(content)
}
