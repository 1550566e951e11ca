use std::path::PathBuf;

use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("database error: {0}")]
    DatabaseError(#[from] crate::model::DatabaseError),
    #[error("invalid fixture json: {0}")]
    FixtureJsonError(#[from] serde_json::Error),
    #[error("fixture must contain quiz.question and quiz.choice rows")]
    FixtureIncomplete,
    #[error("fixture question {pk} has no order")]
    FixtureQuestionWithoutOrder { pk: String },
    #[error("no training module with slug '{0}'")]
    ModuleNotFound(String),
    #[error("no active training module")]
    NoActiveModule,
    #[error("content file {} does not exist", .0.display())]
    ContentFileMissing(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sqlx::Error> for TrainingError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.into())
    }
}
