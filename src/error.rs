use std::fmt::{Display, Formatter};
use std::io;

use thiserror::Error;

/// A specialized `Result` type where the error is hard-wired to [`YamlError`].
pub type YamlResult<T> = Result<T, YamlError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum YamlError {
    /// First diagnostic, raised when [`crate::Options::throw_on_error`] is set.
    #[error("{0}")]
    Parse(Diagnostic),
    /// Failure in the underlying input, including invalid UTF-8.
    #[error("io error: {0}")]
    Io(String),
}

impl From<io::Error> for YamlError {
    #[inline]
    fn from(error: io::Error) -> YamlError {
        YamlError::Io(error.to_string())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorType {
    #[error("tabs cannot be used as indentation")]
    TabsNotAllowedAsIndentation,
    #[error("invalid escape character {found:?}")]
    InvalidEscapeCharacter { found: char },
    #[error("invalid hex digits in escape sequence")]
    InvalidHexEscape,
    #[error("unexpected end of scalar")]
    UnexpectedEndOfScalar,
    #[error("block scalar indent indicator must be between 1 and 9")]
    ExpectedChompBetween1and9,
    #[error("unexpected character {found:?} after block scalar header")]
    ExpectedNewlineInBlockHeader { found: char },
    #[error("spaces on a blank line exceed the block scalar indent")]
    SpacesFoundAfterIndent,
    #[error("expected start of document after end marker")]
    ExpectedDocumentStart,
    #[error("unexpected '-' at indent {actual}, sequence items start at {expected}")]
    UnexpectedSequenceItem { actual: i32, expected: i32 },
    #[error("unexpected '?' inside a sequence")]
    UnexpectedKeyIndicator,
    #[error("expected a scalar key after '?'")]
    ExpectedScalarAfterKeyIndicator,
    #[error("expected ':' after mapping key")]
    ExpectedColonAfterKey,
    #[error("indentation mismatch, got {actual} while the open block expects {expected}")]
    ExpectedIndent { actual: i32, expected: i32 },
    #[error("key at indent {actual} cannot follow a completed pair at {expected}")]
    InvalidKeyIndent { actual: i32, expected: i32 },
    #[error("internal: key dedented to {actual} below current indent {expected}")]
    UnexpectedDedent { actual: i32, expected: i32 },
}

/// A single reported problem and where it occurred.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 0-based line of the offending character.
    pub line: u32,
    /// 0-based column of the offending character.
    pub col: u32,
    pub error: ErrorType,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // rendered column is 1-based, line stays 0-based
        write!(f, "YAML({},{}): {}", self.line, self.col + 1, self.error)
    }
}

/// Single sink for lexer and parser diagnostics.
#[derive(Debug)]
pub(crate) struct Reporter {
    diagnostics: Vec<Diagnostic>,
    throw_on_error: bool,
}

impl Reporter {
    pub(crate) fn new(throw_on_error: bool) -> Reporter {
        Reporter {
            diagnostics: Vec::new(),
            throw_on_error,
        }
    }

    pub(crate) fn report(&mut self, line: u32, col: u32, error: ErrorType) -> YamlResult<()> {
        let diagnostic = Diagnostic { line, col, error };
        self.diagnostics.push(diagnostic);
        if self.throw_on_error {
            Err(YamlError::Parse(diagnostic))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub(crate) fn error_occurred(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    #[inline]
    pub(crate) fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format() {
        let diagnostic = Diagnostic {
            line: 2,
            col: 0,
            error: ErrorType::TabsNotAllowedAsIndentation,
        };
        assert_eq!(
            diagnostic.to_string(),
            "YAML(2,1): tabs cannot be used as indentation"
        );
    }

    #[test]
    fn reporter_accumulates_without_throw() {
        let mut reporter = Reporter::new(false);
        assert!(reporter.report(0, 0, ErrorType::UnexpectedEndOfScalar).is_ok());
        assert!(reporter.report(1, 3, ErrorType::ExpectedColonAfterKey).is_ok());
        assert!(reporter.error_occurred());
        assert_eq!(reporter.diagnostics().len(), 2);
    }

    #[test]
    fn reporter_raises_on_first_error() {
        let mut reporter = Reporter::new(true);
        let err = reporter
            .report(0, 4, ErrorType::UnexpectedEndOfScalar)
            .unwrap_err();
        assert_eq!(err.to_string(), "YAML(0,5): unexpected end of scalar");
    }
}
