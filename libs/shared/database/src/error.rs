use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Gateway rejected credentials: {0}")]
    Auth(String),

    #[error("Could not decode rows: {0}")]
    Decode(String),

    #[error("Statement affected no rows")]
    NotApplied,
}

impl From<reqwest::Error> for DatabaseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DatabaseError::Decode(err.to_string())
        } else {
            DatabaseError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Decode(err.to_string())
    }
}
