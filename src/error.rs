use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("Excerpt has no '...' delimiter: {0:?}")]
    MalformedExcerpt(String),
    #[error("Unrecognized relative date: {0:?}")]
    RelativeDate(String),
    #[error("Unrecognized date: {0:?}")]
    AbsoluteDate(String),
    #[error("Date out of range: {0:?}")]
    DateOutOfRange(String),
    #[error("Card {0} has no picture element")]
    MissingPicture(usize),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("No file name in picture URL {0:?}")]
    NoFileName(String),
    #[error("HTTP {0}")]
    Http(reqwest::StatusCode),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON work item: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid YAML work item: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Missing required work item key {0:?}")]
    Missing(&'static str),
    #[error("Invalid value for {key:?}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
