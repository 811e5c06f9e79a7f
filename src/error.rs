use std::error::Error as StdError;

use thiserror::Error;

/// Errors that abort a whole scan call before any address is processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid args: nothing to scan (software and root checks are both disabled)")]
    NothingToScan,
}

/// Address did not normalize to `http(s)://` + dotted quad + optional port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0} is not valid")]
pub struct InvalidAddress(pub String);

/// A GET that could not be completed at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("redirect failed: {0}")]
    Redirect(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        let msg = error_chain(&e);
        if e.is_timeout() {
            RequestError::Timeout(msg)
        } else if e.is_connect() {
            RequestError::Connect(msg)
        } else if e.is_redirect() {
            RequestError::Redirect(msg)
        } else if e.is_body() || e.is_decode() {
            RequestError::Body(msg)
        } else {
            RequestError::Other(msg)
        }
    }
}

// reqwest hides the interesting part (refused, reset, dns) in the source chain.
fn error_chain(e: &dyn StdError) -> String {
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(src) = cur {
        out.push_str(": ");
        out.push_str(&src.to_string());
        cur = src.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Leaf;
    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }
    impl StdError for Leaf {}

    #[derive(Debug)]
    struct Outer(Leaf);
    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("error sending request")
        }
    }
    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn chain_includes_sources() {
        assert_eq!(
            error_chain(&Outer(Leaf)),
            "error sending request: connection refused"
        );
    }

    #[test]
    fn request_error_display_carries_message() {
        let e = RequestError::Timeout("operation timed out".into());
        assert_eq!(e.to_string(), "request timed out: operation timed out");
    }
}
