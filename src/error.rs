use thiserror::Error;

/// 远端 CSV 拉取错误
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Missing Graph configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid Graph URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{stage} request returned {status}: {body}")]
    Status {
        stage: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Token response invalid: {0}")]
    Token(String),
}
