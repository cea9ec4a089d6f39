use std::error::Error as StdError;
use std::fmt;

/// Failures surfaced by a [`crate::core::backend::ChatBackend`].
///
/// `Display` renders only the underlying message because callers embed it in
/// user-facing text such as `Connection error: ...`.
#[derive(Debug)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    Http(reqwest::Error),

    /// A reply body was not the JSON shape the endpoint promises.
    Json(serde_json::Error),

    /// A failure from a [`crate::core::backend::ChatBackend`] that does not
    /// sit on `reqwest`, such as an in-process or scripted backend. The
    /// message is shown to the user verbatim.
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "{err}"),
            ClientError::Json(err) => write!(f, "{err}"),
            ClientError::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ClientError::Http(err) => Some(err),
            ClientError::Json(err) => Some(err),
            ClientError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let transport = ClientError::Transport("connection reset".to_string());
        assert_eq!(transport.to_string(), "connection reset");
        assert!(transport.source().is_none());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = json_err.to_string();
        let wrapped = ClientError::from(json_err);
        assert_eq!(wrapped.to_string(), expected);
        assert!(wrapped.source().is_some());
    }
}
