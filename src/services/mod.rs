pub mod browser;
pub mod review_extractor;
pub mod review_scraper;

pub use browser::*;
pub use review_extractor::*;
pub use review_scraper::*;
