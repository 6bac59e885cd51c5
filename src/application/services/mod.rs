pub mod cursor;
pub mod filename_resolver;
pub mod url_extractor;

pub use filename_resolver::{resolve_filename, stored_filename};
pub use url_extractor::UrlExtractor;
