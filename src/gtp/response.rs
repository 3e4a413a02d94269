//! GTP reply blocks.
//!
//! Success: `=[id] [payload]\n\n`. Failure: `?[id] [message]\n\n`. The space
//! is only written when there is text to follow.

use std::fmt;

use super::GtpError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub ok: bool,
    /// Ends the engine loop; only `quit` sets it.
    pub done: bool,
    pub id: Option<i64>,
    /// Payload when `ok`, error message otherwise.
    pub text: String,
}

impl Response {
    #[must_use]
    pub fn ok() -> Self {
        Response {
            ok: true,
            ..Response::default()
        }
    }

    #[must_use]
    pub fn ok_with(text: impl Into<String>) -> Self {
        Response {
            ok: true,
            text: text.into(),
            ..Response::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Response {
            ok: false,
            text: message.into(),
            ..Response::default()
        }
    }

    #[must_use]
    pub fn done() -> Self {
        Response {
            ok: true,
            done: true,
            ..Response::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }
}

impl From<GtpError> for Response {
    fn from(e: GtpError) -> Self {
        Response::error(e.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.ok { "=" } else { "?" })?;
        if let Some(id) = self.id {
            write!(f, "{id}")?;
        }
        if !self.text.is_empty() {
            write!(f, " {}", self.text)?;
        }
        f.write_str("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_success() {
        assert_eq!(Response::ok().to_string(), "=\n\n");
        assert_eq!(Response::ok_with("D4").with_id(Some(1)).to_string(), "=1 D4\n\n");
    }

    #[test]
    fn test_format_failure() {
        let response = Response::error("unknown command").with_id(Some(42));
        assert_eq!(response.to_string(), "?42 unknown command\n\n");
        assert_eq!(Response::error("illegal move").to_string(), "? illegal move\n\n");
    }

    #[test]
    fn test_format_multiline_payload() {
        let response = Response::ok_with("boardsize\nname\nquit");
        assert_eq!(response.to_string(), "= boardsize\nname\nquit\n\n");
    }

    #[test]
    fn test_done_is_ok() {
        let response = Response::done();
        assert!(response.ok);
        assert!(response.done);
        assert_eq!(response.with_id(Some(3)).to_string(), "=3\n\n");
    }

    #[test]
    fn test_from_error() {
        let response: Response = GtpError::UnknownCommand.into();
        assert!(!response.ok);
        assert_eq!(response.text, "unknown command");
    }
}
