use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("managed scraper API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("headless browser error: {0}")]
    Browser(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("response body was empty or not HTML")]
    EmptyContent,

    #[error("no fetch strategy succeeded for this URL")]
    Unavailable,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(std::time::Duration::from_secs(0))
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<browserless_client::BrowserlessError> for FetchError {
    fn from(err: browserless_client::BrowserlessError) -> Self {
        match err {
            browserless_client::BrowserlessError::Network(msg) => FetchError::Network(msg),
            browserless_client::BrowserlessError::Api { status, message } => {
                FetchError::Api { status, message }
            }
        }
    }
}
