//! Image retrieval.

mod fetcher;

pub use fetcher::HttpImageFetcher;
