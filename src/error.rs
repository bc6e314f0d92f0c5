use thiserror::Error;

/// Failure reading or writing the key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a backup file could not be applied
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("backup is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("backup must be a JSON object at the top level")]
    NotAnObject,

    #[error("backup contains no usable profiles, question bank, attempts or settings")]
    NothingToImport,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Import failed: {0}")]
    ImportError(#[from] ImportError),

    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
