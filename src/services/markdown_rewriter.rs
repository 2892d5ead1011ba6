//! Markdown 图片链接改写
//!
//! 只改写下载成功的图片；失败的位置保持原远程地址

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::Result;
use crate::models::FetchedImage;

/// `![alt](地址 "标题")`，地址允许一层成对括号
static IMAGE_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(((?:[^()\s]|\([^()\s]*\))+)(\s+"(?:[^"\\]|\\.)*")?\)"#)
        .expect("valid regex")
});

/// 把 Markdown 中的远程图片地址替换为归档内的本地路径
///
/// 先按图片节点整体改写（地址完全相等才替换），再替换其余以完整地址出现的 URL 文本。
/// 一个地址是另一个地址的前缀时不会误改
pub fn rewrite_image_links(markdown: &str, images: &[Option<FetchedImage>]) -> Result<String> {
    let local_paths: HashMap<&str, String> = images
        .iter()
        .flatten()
        .map(|image| (image.source_url.as_str(), image.local_path()))
        .collect();
    if local_paths.is_empty() {
        return Ok(markdown.to_string());
    }

    let mut updated = IMAGE_NODE
        .replace_all(markdown, |caps: &Captures<'_>| {
            match local_paths.get(&caps[2]) {
                Some(local_path) => format!(
                    "![{}]({}{})",
                    &caps[1],
                    local_path,
                    caps.get(3).map_or("", |m| m.as_str())
                ),
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    for image in images.iter().flatten() {
        let local_path = image.local_path();
        // 地址后面必须是结尾或不能出现在 URL 中的字符
        let bare = Regex::new(&format!(r#"{}([\s)\]"'<>]|$)"#, regex::escape(&image.source_url)))?;
        updated = bare
            .replace_all(&updated, |caps: &Captures<'_>| format!("{}{}", local_path, &caps[1]))
            .into_owned();

        debug!("图片链接已改写: {} -> {}", image.source_url, local_path);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(url: &str, filename: &str) -> FetchedImage {
        FetchedImage {
            source_url: url.to_string(),
            content: vec![1, 2, 3],
            content_type: "image/png".to_string(),
            assigned_filename: filename.to_string(),
        }
    }

    #[test]
    fn test_image_reference_rewritten() {
        let md = "# T\n\n![a](http://x/y.png)\n";
        let out = rewrite_image_links(md, &[Some(fetched("http://x/y.png", "image_001.png"))])
            .unwrap();
        assert!(out.contains("![a](./images/image_001.png)"));
        assert!(!out.contains("http://x/y.png"));
    }

    #[test]
    fn test_bare_and_titled_occurrences_rewritten() {
        let md = "see http://x/y.png and ![b](http://x/y.png \"cap\")";
        let out = rewrite_image_links(md, &[Some(fetched("http://x/y.png", "image_001.png"))])
            .unwrap();
        assert_eq!(
            out,
            "see ./images/image_001.png and ![b](./images/image_001.png \"cap\")"
        );
    }

    #[test]
    fn test_failed_image_keeps_remote_url() {
        let md = "![ok](https://a.com/1.png)\n\n![bad](https://a.com/2.png)";
        let images = vec![Some(fetched("https://a.com/1.png", "image_001.png")), None];
        let out = rewrite_image_links(md, &images).unwrap();
        assert_eq!(out, "![ok](./images/image_001.png)\n\n![bad](https://a.com/2.png)");
    }

    #[test]
    fn test_regex_metacharacters_in_url_are_literal() {
        let md = "![q](https://a.com/p.png?w=1&h=(2)) ![r](https://a.com/pXpng?w=1&h=(2))";
        let out = rewrite_image_links(
            md,
            &[Some(fetched("https://a.com/p.png?w=1&h=(2)", "image_001.png"))],
        )
        .unwrap();
        assert!(out.starts_with("![q](./images/image_001.png)"));
        assert!(out.contains("https://a.com/pXpng?w=1&h=(2)"));
    }

    #[test]
    fn test_alt_text_with_dollar_preserved() {
        let md = "![$5 deal](https://a.com/d.png)";
        let out =
            rewrite_image_links(md, &[Some(fetched("https://a.com/d.png", "image_001.png"))]).unwrap();
        assert_eq!(out, "![$5 deal](./images/image_001.png)");
    }

    #[test]
    fn test_url_prefix_of_another_url_not_mismatched() {
        let md = "![a](http://x/a.png) ![b](http://x/a.png?v=2) [full](http://x/a.png?v=2)";
        let images = vec![
            Some(fetched("http://x/a.png", "image_001.png")),
            Some(fetched("http://x/a.png?v=2", "image_002.png")),
        ];
        let out = rewrite_image_links(md, &images).unwrap();
        assert_eq!(
            out,
            "![a](./images/image_001.png) ![b](./images/image_002.png) [full](./images/image_002.png)"
        );
    }

    #[test]
    fn test_no_fetched_images_leaves_markdown_unchanged() {
        let md = "![a](http://x/a.png)";
        assert_eq!(rewrite_image_links(md, &[None]).unwrap(), md);
    }
}
