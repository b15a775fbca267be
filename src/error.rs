use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinFlowError>;

#[derive(Debug, Error)]
pub enum FinFlowError {
    #[error("flow definition error: {0}")]
    Definition(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
