pub mod archive_builder;
pub mod downloader;
pub mod failure_log;
pub mod filename;
pub mod image_fetcher;
pub mod markdown_converter;
pub mod markdown_rewriter;
pub mod page_extractor;

pub use archive_builder::build_archive;
pub use downloader::Downloader;
pub use failure_log::FailureLog;
pub use filename::sanitize_filename;
pub use image_fetcher::ImageFetcher;
pub use markdown_converter::MarkdownConverter;
pub use markdown_rewriter::rewrite_image_links;
pub use page_extractor::PageExtractor;
