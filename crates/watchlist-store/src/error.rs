use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchlistError {
    #[error("Malformed import data: {0}")]
    MalformedImportData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchlistError {
    pub fn is_malformed_import(&self) -> bool {
        matches!(self, WatchlistError::MalformedImportData(_))
    }
}
