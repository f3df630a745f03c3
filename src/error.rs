use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("malformed json payload : {0}")]
    Json(#[from] serde_json::Error),
    /// The server answered outside the 2xx range; the original body is
    /// carried for diagnostics.
    #[error("server returned {status} : {body}")]
    BadResponse { status: StatusCode, body: String },
    /// A response parsed, but the expected envelope was not there.
    #[error("unexpected response shape : {0}")]
    UnexpectedShape(&'static str),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
