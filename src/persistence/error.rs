use thiserror::Error;

/// Every failure the engine can hand back to a caller.
///
/// The first four variants are expected outcomes of user input and the
/// shell translates them into plain messages. [`DatabaseError::Io`] and
/// [`DatabaseError::Malformed`] mean the backing files themselves are
/// unusable, which no retry of the same command will fix.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("no records match {column} = {value}")]
    RecordNotFound { column: String, value: String },

    #[error("could not reach the backing store: {0}")]
    Io(#[from] std::io::Error),

    #[error("the backing store holds malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl DatabaseError {
    pub fn validation(message: impl Into<String>) -> DatabaseError {
        DatabaseError::Validation(message.into())
    }
}
