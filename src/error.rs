use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The destination could not be opened. The driver error is passed through as-is.
    #[error("Connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A statement failed while recreating or filling `table`. The transaction was rolled back.
    #[error("Load failed on table {table}: {source}")]
    Load {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Transaction error: {0}")]
    Transaction(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
