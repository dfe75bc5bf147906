use thiserror::Error;

/// Errors raised while decoding wire payloads or parsing kind names.
///
/// Graph construction itself never fails: malformed optional fields are
/// replaced with defaults before they reach the presentation model.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid node kind: {0}")]
    InvalidNodeKind(String),
    #[error("Invalid link kind: {0}")]
    InvalidLinkKind(String),
    #[error("Malformed graph payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
