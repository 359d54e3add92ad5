mod consts;
pub mod extract;
pub mod fetcher;
pub mod reducer;

pub use extract::PkgSiteExtractor;
pub use fetcher::{FetcherConfig, ReqwestFetcher};
pub use reducer::MarkdownReducer;
