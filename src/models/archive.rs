/// 内存中的导出包：一个 Markdown 文件 + 下载成功的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArchive {
    /// 归档根目录下的 Markdown 文件名，如 `My-Page.md`
    pub markdown_name: String,
    /// 已改写为本地路径的 Markdown
    pub markdown: String,
    /// (归档内条目名, 内容)，条目名形如 `images/image_001.png`
    pub images: Vec<(String, Vec<u8>)>,
}

impl ExportArchive {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
