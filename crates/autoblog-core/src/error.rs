use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoblogError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("social API credentials are not configured (consumer key/secret, access token/secret)")]
    MissingSocialCredentials,

    #[error("post rejected by social API: {status} - {body}")]
    PostFailed { status: u16, body: String },

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {service}: {reason}")]
    UnexpectedResponse {
        service: &'static str,
        reason: String,
    },

    #[error("git {step} failed: {stderr}")]
    Git { step: &'static str, stderr: String },

    #[error("git executable not found on PATH")]
    GitNotFound,

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("topic already in stock: {0}")]
    TopicExists(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AutoblogError>;
