use thiserror::Error;

#[derive(Debug, Error)]
pub enum TiddlyError {
    #[error("invalid event data")]
    InvalidEventData,

    #[error("invalid event type")]
    InvalidEventType,

    #[error("invalid event action type")]
    InvalidEventActionType,

    #[error("no command specified to run")]
    NoCommandSpecified,

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("invalid wiki name: {0}")]
    InvalidWikiName(String),

    #[error("wiki already exists: {0}")]
    WikiExists(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("unsupported config format: {0}")]
    UnsupportedConfigFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TiddlyError>;
