use humansize::{format_size, BINARY};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("enter text to generate")]
    EmptyInput,

    #[error("logo file too large: {} (limit {})", format_size(*size, BINARY), format_size(*limit, BINARY))]
    LogoTooLarge { size: u64, limit: u64 },

    #[error("unreadable file: {0}")]
    UnreadableFile(String),

    #[error("undecodable image: {0}")]
    UndecodableImage(String),

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Short machine-readable kind, used by the web API.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EmptyInput => "empty_input",
            AppError::LogoTooLarge { .. } => "logo_too_large",
            AppError::UnreadableFile(_) => "unreadable_file",
            AppError::UndecodableImage(_) => "undecodable_image",
            AppError::Encoder(_) => "encoder_failure",
            AppError::Export(_) => "export_failure",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::Io(_) => "io",
            AppError::Server(_) => "server",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message() {
        assert_eq!(AppError::EmptyInput.to_string(), "enter text to generate");
    }

    #[test]
    fn test_too_large_message_is_human_readable() {
        let err = AppError::LogoTooLarge {
            size: 5 * 1024 * 1024,
            limit: 4 * 1024 * 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("too large"));
        assert!(msg.contains("5 MiB"));
        assert!(msg.contains("4 MiB"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            AppError::EmptyInput,
            AppError::LogoTooLarge { size: 1, limit: 0 },
            AppError::UnreadableFile(String::new()),
            AppError::UndecodableImage(String::new()),
            AppError::Encoder(String::new()),
            AppError::Export(String::new()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(AppError::kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
