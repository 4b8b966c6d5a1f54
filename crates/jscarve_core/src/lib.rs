//! `jscarve_core` — a JavaScript tokenizer and balanced-expression
//! extractor.
//!
//! Given a blob of (usually minified) JavaScript and a textual *anchor*
//! marking the start of a function or expression of interest, this crate
//! returns the exact substring spanning from the anchor's opening delimiter
//! to its matching closing delimiter.  Naive character counting is unsound
//! for real JavaScript — a `/` may be division or the start of a regex
//! literal, and strings, templates, regexes, and comments can all contain
//! unbalanced `{`/`(`/`[` characters — so the extractor is driven by a
//! small but correct lexer that consumes each literal atomically.
//!
//! # Crate layout
//!
//! - [`scanner`] — single-pass JavaScript lexer with regex/division
//!   disambiguation and template-interpolation tracking.
//! - [`extract`] — the balanced-expression extractor built on the scanner.
//! - [`error`] — the typed error enum shared by both layers.
//!
//! # Example
//!
//! ```
//! use jscarve_core::extract::match_to_closing_brace;
//!
//! let src = r#"Wka=function(d){return d+1};Xka=0;"#;
//! let body = match_to_closing_brace(src, "Wka=function").unwrap();
//! assert_eq!(body, "(d){return d+1}");
//! ```

/// Typed errors shared by the scanner and the extractor.
pub mod error;
/// Balanced-expression extraction on top of the scanner.
pub mod extract;
/// Single-pass JavaScript lexer.
pub mod scanner;
