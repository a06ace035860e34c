use thiserror::Error;

/// VIGIL 统一错误类型
///
/// 结构性错误（存储缺失、表缺失、必需列缺失）必须可区分，
/// 以便展示层给出各自的提示；数据质量问题不在此处，
/// 它们始终被计数而不是抛出。
#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Record store not found: {0}")]
    SourceUnavailable(String),

    #[error("Record scan failed: {0}")]
    ScanFailure(String),

    #[error("Required metric column not resolved: {0}")]
    MissingRequiredColumn(String),

    #[error("Threshold update refused: {0}")]
    Unauthorized(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification dispatch error: {0}")]
    Dispatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VigilError>;

impl From<anyhow::Error> for VigilError {
    fn from(err: anyhow::Error) -> Self {
        VigilError::Internal(err.to_string())
    }
}
