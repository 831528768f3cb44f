//! Error handling for the farm API client

use strum::Display;
use thiserror::Error;

/// Coarse failure taxonomy shared by every fetch site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// The request never produced a response.
    Network,
    /// The server answered with a non-2xx status.
    HttpStatus,
    /// The body was not the JSON we expected.
    Parse,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Reqwest error, typically related to network issues or request failures.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the request.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Failed to decode a JSON body from the server
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        ApiError::Http { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { .. } => ErrorKind::HttpStatus,
            ApiError::Decode(_) => ErrorKind::Parse,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_variant() {
        let http = ApiError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(http.kind(), ErrorKind::HttpStatus);
        assert_eq!(http.status(), Some(500));

        let decode = ApiError::from(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(decode.kind(), ErrorKind::Parse);
        assert_eq!(decode.status(), None);
    }
}
