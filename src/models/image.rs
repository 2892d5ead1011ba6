use serde::{Deserialize, Serialize};

/// 本地图片目录（相对 Markdown 文件）
pub const IMAGES_DIR: &str = "images";

/// 发往图片获取端的请求
///
/// 序列化形式: `{"action":"fetchImage","url":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FetchRequest {
    FetchImage { url: String },
}

impl FetchRequest {
    pub fn url(&self) -> &str {
        match self {
            FetchRequest::FetchImage { url } => url,
        }
    }
}

/// 图片获取端的响应
///
/// 成功: `{success: true, content, contentType, extension}`，content 为 base64
/// 失败: `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl FetchResponse {
    pub fn ok(content: String, content_type: String, extension: String) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
            content_type: Some(content_type),
            extension: Some(extension),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(message.into()),
            content_type: None,
            extension: None,
        }
    }
}

/// 下载成功的图片，由编排层独占持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub source_url: String,
    pub content: Vec<u8>,
    pub content_type: String,
    /// 如 `image_001.png`
    pub assigned_filename: String,
}

impl FetchedImage {
    /// Markdown 中引用的本地路径，如 `./images/image_001.png`
    pub fn local_path(&self) -> String {
        format!("./{}/{}", IMAGES_DIR, self.assigned_filename)
    }

    /// 归档内的条目名，如 `images/image_001.png`
    pub fn archive_entry(&self) -> String {
        format!("{}/{}", IMAGES_DIR, self.assigned_filename)
    }
}

/// 按位置编号的文件名：从 1 开始，补齐 3 位
pub fn assigned_filename(index: usize, extension: &str) -> String {
    format!("image_{:03}{}", index + 1, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = FetchRequest::FetchImage {
            url: "https://a.com/x.png".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "fetchImage", "url": "https://a.com/x.png"})
        );
    }

    #[test]
    fn test_response_wire_shape() {
        let ok = FetchResponse::ok("AAA=".into(), "image/png".into(), ".png".into());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "content": "AAA=", "contentType": "image/png", "extension": ".png"})
        );

        let failed = FetchResponse::failed("HTTP error! status: 404");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "error": "HTTP error! status: 404"})
        );
    }

    #[test]
    fn test_assigned_filename_padding() {
        assert_eq!(assigned_filename(0, ".png"), "image_001.png");
        assert_eq!(assigned_filename(41, ".jpg"), "image_042.jpg");
        assert_eq!(assigned_filename(999, ".gif"), "image_1000.gif");
    }
}
