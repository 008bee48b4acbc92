use std::fmt::Debug;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Failures raised by the event pipeline itself. None of these are downgraded
/// to defaults; callers decide whether to re-prompt, skip or abort.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("cannot parse {field} value {value:?}")]
    Parse { field: &'static str, value: String },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AnalysisError {
    pub fn parse(field: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            field,
            value: value.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("http error: {0}")]
    Http(#[source] anyhow::Error),
    #[error("export error: {0}")]
    Export(#[source] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn http(err: impl Into<anyhow::Error>) -> Self {
        Self::Http(err.into())
    }

    pub fn export(err: impl Into<anyhow::Error>) -> Self {
        Self::Export(err.into())
    }
}
