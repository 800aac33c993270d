//! Routing client error types.

use std::fmt;

/// Errors from the Distance Matrix HTTP client.
///
/// None of these escape a batch: each is recorded as the failing trip's
/// transport error.
#[derive(Debug)]
pub enum MapsError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// The service answered with a non-success HTTP status
    Status { status: u16, message: String },

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// The client could not be set up
    Config(String),
}

impl fmt::Display for MapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapsError::Http(e) => write!(f, "HTTP error: {e}"),
            MapsError::Status { status, message } => {
                write!(f, "HTTP status {status}")?;
                if !message.is_empty() {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            MapsError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            MapsError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for MapsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapsError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MapsError {
    /// Drops the request URL, which carries the API key as a query
    /// parameter, so that the error text is safe to write into results.
    fn from(err: reqwest::Error) -> Self {
        MapsError::Http(err.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MapsError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP status 503: Service Unavailable");

        let err = MapsError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP status 500");

        let err = MapsError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));

        let err = MapsError::Config("no mock entries".into());
        assert_eq!(err.to_string(), "configuration error: no mock entries");
    }
}
