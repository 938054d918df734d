use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Login already taken: {0}")]
    DuplicateLogin(String),

    /// Deliberately does not say whether the login or the credential was wrong.
    #[error("Invalid login or password")]
    InvalidCredential,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid transaction kind: {0}")]
    InvalidKind(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown format: {0}")]
    InvalidFormat(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors the user can fix by changing their input.
    /// Storage failures are the only ones that are not.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, AppError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_database_errors_are_fatal() {
        assert!(AppError::DuplicateLogin("ana".into()).is_user_error());
        assert!(AppError::InvalidCredential.is_user_error());
        assert!(AppError::InvalidFormat("xml".into()).is_user_error());
        assert!(!AppError::Database(anyhow::anyhow!("disk I/O error")).is_user_error());
    }
}
