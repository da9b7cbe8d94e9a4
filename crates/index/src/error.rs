use thiserror::Error;

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised while loading or querying the metadata index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Two descriptors share an identifier; the load is rejected as a whole
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Point lookup for an unknown identifier
    #[error("Descriptor not found: {0}")]
    NotFound(String),

    /// Catalog document could not be parsed
    #[error("Catalog parse error: {0}")]
    Catalog(String),

    /// IO error while reading a catalog
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}
