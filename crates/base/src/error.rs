use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Classification of a [`LexviewError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Free-form error message.
    Message(String),
    /// I/O failure; the underlying `std::io::Error` is the source.
    Io,
    /// The lexer service could not be reached, or it answered with a
    /// non-success status.
    Transport {
        /// HTTP status code when the service did respond.
        status: Option<u16>,
    },
    /// The lexer service answered successfully but the body is not a token array
    /// of the expected shape.
    MalformedResponse(String),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Io => f.write_str("I/O error"),
            Self::Transport {
                status: Some(status),
            } => write!(f, "lexer service responded with status {status}"),
            Self::Transport { status: None } => f.write_str("failed to reach lexer service"),
            Self::MalformedResponse(detail) => write!(f, "malformed lexer response: {detail}"),
        }
    }
}

/// Error type used across lexview crates.
#[derive(Debug)]
pub struct LexviewError {
    kind: ErrorKind,
    source: Option<BoxedSource>,
}

impl LexviewError {
    /// Creates an error of the given kind without a source.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Creates a transport error, optionally tagged with the response status.
    pub fn transport(status: Option<u16>) -> Self {
        Self::new(ErrorKind::Transport { status })
    }

    /// Creates a malformed-response error with a detail message.
    pub fn malformed_response(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse(detail.into()))
    }

    /// Attaches another lexview error as the cause.
    pub fn with_source(self, source: LexviewError) -> Self {
        self.with_std_source(source)
    }

    /// Attaches any standard error as the cause.
    pub fn with_std_source<E>(self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.with_boxed_source(Box::new(source))
    }

    /// Attaches an already boxed error as the cause.
    pub fn with_boxed_source(mut self, source: BoxedSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` for [`ErrorKind::Transport`].
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport { .. })
    }

    /// Returns `true` for [`ErrorKind::MalformedResponse`].
    pub fn is_malformed_response(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedResponse(_))
    }

    /// Returns the HTTP status of a transport error that carried one.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Transport { status } => status,
            _ => None,
        }
    }

    /// Renders this error followed by its chain of causes, one per line.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut cause = StdError::source(self);
        while let Some(error) = cause {
            report.push_str("\n  caused by: ");
            report.push_str(&error.to_string());
            cause = error.source();
        }
        report
    }
}

impl Display for LexviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl StdError for LexviewError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for LexviewError {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::Io).with_std_source(value)
    }
}

impl From<String> for LexviewError {
    fn from(value: String) -> Self {
        Self::new(ErrorKind::Message(value))
    }
}

impl From<&str> for LexviewError {
    fn from(value: &str) -> Self {
        Self::new(ErrorKind::Message(value.to_owned()))
    }
}

/// Builds a [`LexviewError`] with a formatted [`ErrorKind::Message`].
#[macro_export]
macro_rules! lexview_message_error {
    ($($arg:tt)*) => {
        $crate::LexviewError::new($crate::ErrorKind::Message(format!($($arg)*)))
    };
}

/// Result alias that uses [`LexviewError`] as its error type.
pub type Result<T> = std::result::Result<T, LexviewError>;
