use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Failure reported by a [`crate::ContentProducer`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProductionError {
    message: String,
}

impl ProductionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ProductionError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    /// The index has no descriptor for this identifier
    #[error("Descriptor not found: {0}")]
    NotFound(String),

    /// The content producer failed; nothing was cached
    #[error("Content production failed for {id}: {source}")]
    ProductionFailed {
        id: String,
        #[source]
        source: ProductionError,
    },
}

impl CacheError {
    pub fn id(&self) -> &str {
        match self {
            Self::NotFound(id) => id,
            Self::ProductionFailed { id, .. } => id,
        }
    }
}
