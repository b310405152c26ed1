pub mod config;
pub mod parser;
pub mod scraper;
pub mod session;
pub mod types;
pub mod utils;

pub use config::ExtractorConfig;
pub use parser::{extract, extract_html};
pub use scraper::{ScraperError, WebScraper};

pub const DEFAULT_URL: &str = "https://pt.wikipedia.org/wiki/Lista_de_praias_de_Pernambuco";
