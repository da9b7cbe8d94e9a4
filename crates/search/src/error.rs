use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(#[from] disclosure_index::IndexError),

    #[error("Cache error: {0}")]
    Cache(#[from] disclosure_cache::CacheError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),
}
