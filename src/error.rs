use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("unknown persona `{0}`")]
    InvalidPersona(String),
    #[error("completion request failed: {0}")]
    Service(String),
}
