use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Databasen kan inte öppnas alls (fatalt för hela applikationen)
    #[error("Lagringen är inte tillgänglig: {0}")]
    StorageUnavailable(String),

    #[error("Databasfel: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Hittades inte: {0}")]
    NotFound(String),

    /// Importdokumentet är felformat; lagringen har inte rörts
    #[error("Kunde inte tolka importfil: {0}")]
    ImportParse(String),

    #[error("Valideringsfel: {0}")]
    Validation(String),

    #[error("Ogiltig statusövergång: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Serialiseringsfel: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO-fel: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn import_parse(msg: impl Into<String>) -> Self {
        Self::ImportParse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Fel som ska visas som helsidesfel i stället för en notis
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Tyst varning, aldrig fatal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
