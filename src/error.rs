use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // request never completed: connect, timeout, broken body stream
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("not authorized ({status})")]
    Auth { status: StatusCode, message: Option<String> },
    #[error("rejected by server ({status})")]
    Validation { status: StatusCode, message: Option<String> },
    #[error("unexpected status {status}")]
    Status { status: StatusCode, message: Option<String> },
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Message the backend attached to the failure, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Auth { message, .. }
            | ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e)
        } else {
            ApiError::Network(e)
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} is not a valid url: {reason}")]
    BadUrl { name: &'static str, reason: String },
    #[error("{name} must be a number, got '{value}'")]
    BadNumber { name: &'static str, value: String },
    #[error("no credentials: set LUCT_API_TOKEN or LUCT_EMAIL and LUCT_PASSWORD")]
    MissingCredentials,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("session user has unknown role '{0}'")]
    UnknownRole(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("backend returned an empty spreadsheet")]
    Empty,
    #[error("report export is not available for this role")]
    Unavailable,
    #[error("could not save export: {0}")]
    Io(#[from] std::io::Error),
}
