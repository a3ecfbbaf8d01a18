use std::time::Duration;
use thiserror::Error;

/// 估价服务错误
#[derive(Debug, Error)]
pub enum BoqError {
    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Upload has no `file` field")]
    MissingFile,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persisting BOQ items timed out after {0:?}")]
    PersistTimeout(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid project id: {0}")]
    InvalidProjectId(String),
}

impl BoqError {
    /// 输入问题 (调用方可修正), 其余视为服务端故障
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Workbook(_) | Self::MissingFile | Self::InvalidProjectId(_))
    }
}

pub type Result<T> = std::result::Result<T, BoqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_workbook() {
        let error = BoqError::Workbook("no sheets".to_string());
        assert_eq!(format!("{}", error), "Workbook error: no sheets");
    }

    #[test]
    fn test_error_from_sqlx() {
        let error: BoqError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, BoqError::Database(_)));
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(BoqError::MissingFile.is_client_error());
        assert!(BoqError::Workbook("bad".into()).is_client_error());
        assert!(BoqError::InvalidProjectId("abc".into()).is_client_error());
        assert!(!BoqError::Storage("down".into()).is_client_error());
    }

    #[tokio::test]
    async fn test_join_error_is_server_error() {
        let join_error = tokio::spawn(async { panic!("parser crashed"); }).await.unwrap_err();
        let error: BoqError = join_error.into();
        assert!(matches!(error, BoqError::Task(_)));
        assert!(!error.is_client_error());
    }
}
