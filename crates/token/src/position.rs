use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use lexview_base::{lexview_message_error, LexviewError};
use serde::{Deserialize, Serialize};

/// Line/column pair as reported by the lexer service.
///
/// The numbering base is whatever the service uses; values are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePoint {
    pub line: usize,
    pub column: usize,
}

impl SourcePoint {
    /// Creates a point at `line`/`column`.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for SourcePoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start/end range of a token, the `location` object on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourcePoint,
    pub end: SourcePoint,
}

impl SourceSpan {
    /// Creates a span from `start` to `end`.
    pub fn new(start: SourcePoint, end: SourcePoint) -> Self {
        Self { start, end }
    }
}

impl Display for SourceSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Which of the two position encodings a deployment of the lexer service uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionShape {
    /// `location: { start, end }`
    #[default]
    Span,
    /// `position: { line, column }`
    Point,
}

impl PositionShape {
    /// Lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Span => "span",
            Self::Point => "point",
        }
    }

    /// Name of the JSON field that carries this shape.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Span => "location",
            Self::Point => "position",
        }
    }
}

impl Display for PositionShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionShape {
    type Err = LexviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "span" => Ok(Self::Span),
            "point" => Ok(Self::Point),
            other => Err(lexview_message_error!(
                "unknown position shape `{other}`, expected `span` or `point`"
            )),
        }
    }
}

/// Location of a token in the source text, in one of the two wire shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPosition {
    Span(SourceSpan),
    Point(SourcePoint),
}

impl TokenPosition {
    /// Returns which wire shape this position uses.
    pub fn shape(&self) -> PositionShape {
        match self {
            Self::Span(_) => PositionShape::Span,
            Self::Point(_) => PositionShape::Point,
        }
    }

    /// First character of the token.
    pub fn start(&self) -> SourcePoint {
        match self {
            Self::Span(span) => span.start,
            Self::Point(point) => *point,
        }
    }

    /// End of the token; only the span form carries one.
    pub fn end(&self) -> Option<SourcePoint> {
        match self {
            Self::Span(span) => Some(span.end),
            Self::Point(_) => None,
        }
    }
}

impl Display for TokenPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Span(span) => Display::fmt(span, f),
            Self::Point(point) => Display::fmt(point, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PositionShape, SourcePoint, SourceSpan, TokenPosition};

    #[test]
    fn parses_shape_names_case_insensitively() {
        assert_eq!("span".parse::<PositionShape>().ok(), Some(PositionShape::Span));
        assert_eq!(" Point ".parse::<PositionShape>().ok(), Some(PositionShape::Point));
        let error = "range"
            .parse::<PositionShape>()
            .expect_err("unknown shape should fail");
        assert!(error.to_string().contains("`range`"));
    }

    #[test]
    fn span_position_reports_start_and_end() {
        let position = TokenPosition::Span(SourceSpan::new(
            SourcePoint::new(2, 1),
            SourcePoint::new(2, 4),
        ));
        assert_eq!(position.shape(), PositionShape::Span);
        assert_eq!(position.start(), SourcePoint::new(2, 1));
        assert_eq!(position.end(), Some(SourcePoint::new(2, 4)));
        assert_eq!(position.to_string(), "2:1-2:4");
    }

    #[test]
    fn point_position_has_no_end() {
        let position = TokenPosition::Point(SourcePoint::new(1, 5));
        assert_eq!(position.shape(), PositionShape::Point);
        assert_eq!(position.end(), None);
        assert_eq!(position.to_string(), "1:5");
    }
}
