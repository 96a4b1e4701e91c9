use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("construct id {0:?} must contain at least one alphanumeric character")]
    InvalidConstructId(String),

    #[error("construct id {0:?} is already declared in this stack")]
    DuplicateConstruct(String),

    #[error("failed to render template: {0}")]
    Render(#[from] serde_json::Error),
}
