pub mod fetch_worker;
pub mod js_executor;
pub mod page_source;

pub use fetch_worker::{FetchHandle, FetchWorker};
pub use js_executor::JsExecutor;
pub use page_source::PageSource;
