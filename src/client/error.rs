use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use reqwest::StatusCode;

#[derive(Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    Transport {
        status: StatusCode,
        url: String,
        body: String,
    },
    /// The request never got an answer: connection, TLS, body read...
    Http(reqwest::Error),
    /// The body is not JSON, or not the JSON we expected.
    Decoding(String),
    /// The request was refused before being sent.
    InvalidRequest(String),
    Config(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport { status, url, body } => {
                write!(f, "{} returned {}", url, status)?;
                if !body.is_empty() {
                    write!(f, ": {}", body)?;
                }
                Ok(())
            }
            ClientError::Http(err) => write!(f, "HTTP error: {}", err),
            ClientError::Decoding(message) => {
                write!(f, "Unable to decode response: {}", message)
            }
            ClientError::InvalidRequest(message) => write!(f, "Invalid request: {}", message),
            ClientError::Config(message) => write!(f, "Configuration error: {}", message),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decoding(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ClientError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Config(format!("invalid authorization header: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_name_the_url_and_status() {
        let err = ClientError::Transport {
            status: StatusCode::FORBIDDEN,
            url: "https://wsn.latice.eu/api/query/postgresql/".to_owned(),
            body: "{\"detail\":\"Invalid token.\"}".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "https://wsn.latice.eu/api/query/postgresql/ returned 403 Forbidden: {\"detail\":\"Invalid token.\"}"
        );
    }

    #[test]
    fn decoding_errors_wrap_serde() {
        let err: ClientError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, ClientError::Decoding(_)));
    }
}
