//! Error types for jscarve.

use thiserror::Error;

/// All errors that an extraction attempt can produce.
///
/// Every variant carries enough context (usually a byte offset into the
/// scanned string) for the caller to produce a useful diagnostic.  This
/// component never logs or retries; an error is fatal only to the single
/// extraction attempt that produced it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarveError {
    /// The anchor text does not occur in the source.
    #[error("anchor {0:?} does not occur in the source")]
    AnchorNotFound(String),

    /// The first significant character after the anchor does not open a
    /// bracket pair.
    #[error("expected '{{', '(' or '[' after the anchor, found {found:?} at offset {offset}")]
    UnexpectedDelimiter {
        /// The offending character, or `None` when the source ended first.
        found: Option<char>,
        /// Byte offset of `found` (or of end-of-input).
        offset: usize,
    },

    /// A string, template literal, regex literal, or block comment was
    /// opened but never closed.
    #[error("unterminated {what} starting at offset {offset}")]
    UnterminatedLiteral {
        /// Which literal kind was left open.
        what: &'static str,
        /// Byte offset of the opening delimiter.
        offset: usize,
    },

    /// End of input was reached with open delimiters remaining, or a
    /// closing delimiter appeared with nothing left to close.
    #[error("unbalanced delimiters at offset {offset}")]
    UnbalancedDelimiters {
        /// Byte offset of the offending delimiter or of end-of-input.
        offset: usize,
    },

    /// A character sequence did not match any recognized token shape.
    #[error("unrecognized character sequence at offset {offset}")]
    InvalidSequence {
        /// Byte offset of the unclassifiable character.
        offset: usize,
    },
}

/// Convenient `Result` alias for fallible scanning and extraction.
pub type CarveResult<T> = Result<T, CarveError>;
