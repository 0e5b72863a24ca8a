use thiserror::Error;

/// Fatal problems detected while mounting a poll. The poll is not created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("Please provide a unique ID to this poll.")]
    MissingId,

    #[error("A poll with ID '{0}' is already mounted on this page")]
    DuplicateId(String),
}

/// Failures of the durable layer. These never escape `TallyStore`; they are
/// logged and the widget degrades to a safe default.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
