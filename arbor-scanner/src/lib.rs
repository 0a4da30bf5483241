pub mod crawler;
pub mod error;
pub mod frontier;
pub mod normalize;

pub use crawler::{CrawlConfig, ProgressCallback, SiteCrawler};
pub use error::CrawlError;
pub use frontier::Frontier;
pub use normalize::{is_in_scope, normalize};
