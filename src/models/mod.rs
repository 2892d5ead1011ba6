pub mod archive;
pub mod image;
pub mod page;

pub use archive::ExportArchive;
pub use image::{assigned_filename, FetchRequest, FetchResponse, FetchedImage, IMAGES_DIR};
pub use page::{PageSnapshot, RawPage};
