pub mod csv_reader;
pub mod pages;

pub use csv_reader::{RankingFileConfig, RankingImportError, RankingParseResult};
pub use pages::{fetch_all_pages, page_url, PageFetchError, RankingPage, RankingPageRow, RankingPageSource};
