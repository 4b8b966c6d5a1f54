//! Balanced-expression extraction.
//!
//! Given a source string and an anchor substring, [`match_to_closing`]
//! returns the exact slice from the first delimiter after the anchor to
//! its matching closing delimiter.  The slice boundaries come from the
//! [`Scanner`], so delimiters inside strings, template literals, regex
//! literals, and comments never confuse the match.

use crate::error::{CarveError, CarveResult};
use crate::scanner::{is_js_whitespace, Scanner, TokenKind};

/// Which delimiter pair an extraction matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    /// `{` … `}`
    Brace,
    /// `(` … `)`
    Paren,
    /// `[` … `]`
    Bracket,
}

impl DelimiterKind {
    fn open_kind(self) -> TokenKind {
        match self {
            DelimiterKind::Brace => TokenKind::LeftBrace,
            DelimiterKind::Paren => TokenKind::LeftParen,
            DelimiterKind::Bracket => TokenKind::LeftBracket,
        }
    }
}

/// Extract the balanced expression following `anchor` in `source`.
///
/// The returned slice starts at the first non-whitespace character after
/// the anchor (which must be `{`, `(`, or `[`) and ends just past the
/// token at which an opening delimiter of the requested `kind` has been
/// seen and every nested context is closed again.
///
/// Offsets in returned errors are relative to `source`.
///
/// # Errors
///
/// * [`CarveError::AnchorNotFound`] — `anchor` does not occur in `source`.
/// * [`CarveError::UnexpectedDelimiter`] — the first significant character
///   after the anchor is not an opening delimiter.
/// * [`CarveError::UnbalancedDelimiters`] — input ends (or a stray closer
///   appears) before the expression closes.
/// * [`CarveError::UnterminatedLiteral`] — a string, template, regex, or
///   block comment inside the expression never terminates.
/// * [`CarveError::InvalidSequence`] — an unclassifiable character inside
///   the expression.
///
/// # Example
///
/// ```
/// use jscarve_core::extract::{match_to_closing, DelimiterKind};
///
/// let src = r#"var wka=function(d){return d.reverse()};wka("ab");"#;
/// let body = match_to_closing(src, "wka=function", DelimiterKind::Brace).unwrap();
/// assert_eq!(body, "(d){return d.reverse()}");
/// ```
pub fn match_to_closing<'s>(
    source: &'s str,
    anchor: &str,
    kind: DelimiterKind,
) -> CarveResult<&'s str> {
    let anchor_at = source
        .find(anchor)
        .ok_or_else(|| CarveError::AnchorNotFound(anchor.to_owned()))?;
    let after_anchor = anchor_at + anchor.len();

    // The slice begins at the first non-whitespace character after the
    // anchor, which must itself open a bracket pair.
    let rest = &source[after_anchor..];
    let Some((rel, first)) = rest.char_indices().find(|&(_, c)| !is_js_whitespace(c)) else {
        return Err(CarveError::UnexpectedDelimiter {
            found: None,
            offset: source.len(),
        });
    };
    let slice_start = after_anchor + rel;
    if !matches!(first, '{' | '(' | '[') {
        return Err(CarveError::UnexpectedDelimiter {
            found: Some(first),
            offset: slice_start,
        });
    }

    let js = &source[slice_start..];
    let mut scanner = Scanner::new(js);
    let mut seen_open = false;
    loop {
        let tok = scanner.next_token().map_err(|e| rebase(e, slice_start))?;
        match tok.kind {
            TokenKind::Eof => {
                return Err(CarveError::UnbalancedDelimiters {
                    offset: slice_start + tok.span.start.offset,
                });
            }
            TokenKind::InvalidSequence => {
                return Err(CarveError::InvalidSequence {
                    offset: slice_start + tok.span.start.offset,
                });
            }
            k if k == kind.open_kind() => seen_open = true,
            _ => {}
        }
        if seen_open && scanner.currently_balanced() {
            return Ok(&js[..tok.span.end.offset]);
        }
    }
}

/// [`match_to_closing`] for `{` … `}`.
///
/// The classic use is carving one function out of a large minified
/// script: anchor on `name=function` and the returned slice is the
/// parameter list plus body, `(…){…}`.
pub fn match_to_closing_brace<'s>(source: &'s str, anchor: &str) -> CarveResult<&'s str> {
    match_to_closing(source, anchor, DelimiterKind::Brace)
}

/// [`match_to_closing`] for `(` … `)`.
pub fn match_to_closing_paren<'s>(source: &'s str, anchor: &str) -> CarveResult<&'s str> {
    match_to_closing(source, anchor, DelimiterKind::Paren)
}

/// Shift scanner-relative error offsets back into `source` coordinates.
fn rebase(err: CarveError, base: usize) -> CarveError {
    match err {
        CarveError::UnterminatedLiteral { what, offset } => CarveError::UnterminatedLiteral {
            what,
            offset: base + offset,
        },
        CarveError::UnbalancedDelimiters { offset } => CarveError::UnbalancedDelimiters {
            offset: base + offset,
        },
        CarveError::InvalidSequence { offset } => {
            CarveError::InvalidSequence { offset: base + offset }
        }
        CarveError::UnexpectedDelimiter { found, offset } => CarveError::UnexpectedDelimiter {
            found,
            offset: base + offset,
        },
        other => other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_params_and_body() {
        let src = r#"Wka=function(d){d=d.split("");d.reverse();return d.join("")};Xka=0;"#;
        assert_eq!(
            match_to_closing_brace(src, "Wka=function").unwrap(),
            r#"(d){d=d.split("");d.reverse();return d.join("")}"#
        );
    }

    #[test]
    fn closing_braces_inside_strings_are_ignored() {
        let src = r#"var x = {a:"}}}",b:'}'};next()"#;
        assert_eq!(
            match_to_closing_brace(src, "var x =").unwrap(),
            r#"{a:"}}}",b:'}'}"#
        );
    }

    #[test]
    fn escaped_quote_does_not_end_the_string() {
        let src = r#"function(d){return ",}\"/"}"#;
        assert_eq!(
            match_to_closing_brace(src, "function(d)").unwrap(),
            r#"{return ",}\"/"}"#
        );
    }

    #[test]
    fn surplus_closers_in_strings_do_not_end_the_match() {
        let src = r#"v=function(){return "a"+"{{{}}}"+"}}"};w=2"#;
        assert_eq!(
            match_to_closing_brace(src, "v=function").unwrap(),
            r#"(){return "a"+"{{{}}}"+"}}"}"#
        );
    }

    #[test]
    fn regex_literals_hide_delimiters() {
        let src = r#"Nda=function(){var d=[/,,/,913,/(,)}/g,"abcdef}\"",null];return d}"#;
        assert_eq!(
            match_to_closing_brace(src, "Nda=function").unwrap(),
            r#"(){var d=[/,,/,913,/(,)}/g,"abcdef}\"",null];return d}"#
        );
    }

    #[test]
    fn trailing_comment_after_the_match_is_excluded() {
        let src = r#"Wka=function(d){var x = [/,,/,913,/(,)}/g,"abcdef}\"",];var y = 10/2/1;return x[1][y];}//some={}random-padding+;"#;
        assert_eq!(
            match_to_closing_brace(src, "Wka=function").unwrap(),
            r#"(d){var x = [/,,/,913,/(,)}/g,"abcdef}\"",];var y = 10/2/1;return x[1][y];}"#
        );
    }

    #[test]
    fn division_chain_is_not_a_regex() {
        let src = "f=function(){return 10/2/1};g=1";
        assert_eq!(
            match_to_closing_brace(src, "f=function").unwrap(),
            "(){return 10/2/1}"
        );
    }

    #[test]
    fn template_literal_braces_are_ignored() {
        let src = "t=function(a){return `x{y${a}z}`};u=0";
        assert_eq!(
            match_to_closing_brace(src, "t=function").unwrap(),
            "(a){return `x{y${a}z}`}"
        );
    }

    #[test]
    fn regex_inside_template_substitution() {
        // The `/` right after `${` opens a regex; the `[(` inside it must
        // not desynchronize the bracket bookkeeping.
        let src = "t=function(a){return `${/[(]/.test(a)}`};u=1";
        assert_eq!(
            match_to_closing_brace(src, "t=function").unwrap(),
            "(a){return `${/[(]/.test(a)}`}"
        );
    }

    #[test]
    fn nested_template_substitutions() {
        let src = "s=function(a,b){return`${a}${b?`:${b}`:``}`};r=1";
        assert_eq!(
            match_to_closing_brace(src, "s=function").unwrap(),
            "(a,b){return`${a}${b?`:${b}`:``}`}"
        );
    }

    #[test]
    fn comments_hide_delimiters() {
        let src = "k=function(){ // ignore }\n/* also } */ return 1};m=2";
        assert_eq!(
            match_to_closing_brace(src, "k=function").unwrap(),
            "(){ // ignore }\n/* also } */ return 1}"
        );
    }

    #[test]
    fn whitespace_between_anchor_and_delimiter_is_skipped() {
        let src = "fn =  \n  { a: 1 } ;";
        assert_eq!(match_to_closing_brace(src, "fn =").unwrap(), "{ a: 1 }");
    }

    #[test]
    fn paren_extraction() {
        let src = "call(a, f(b), [c]) ; tail";
        assert_eq!(
            match_to_closing_paren(src, "call").unwrap(),
            "(a, f(b), [c])"
        );
    }

    #[test]
    fn bracket_extraction() {
        let src = "var t=[1,[2,3],\"]\"];done";
        assert_eq!(
            match_to_closing(src, "var t=", DelimiterKind::Bracket).unwrap(),
            "[1,[2,3],\"]\"]"
        );
    }

    #[test]
    fn anchor_not_found() {
        assert_eq!(
            match_to_closing_brace("var a = 1;", "missing"),
            Err(CarveError::AnchorNotFound("missing".to_owned()))
        );
    }

    #[test]
    fn non_delimiter_after_anchor() {
        assert_eq!(
            match_to_closing_brace("f= 42;", "f="),
            Err(CarveError::UnexpectedDelimiter {
                found: Some('4'),
                offset: 3
            })
        );
    }

    #[test]
    fn nothing_after_anchor() {
        assert_eq!(
            match_to_closing_brace("f=  ", "f="),
            Err(CarveError::UnexpectedDelimiter {
                found: None,
                offset: 4
            })
        );
    }

    #[test]
    fn unclosed_expression_is_unbalanced() {
        assert!(matches!(
            match_to_closing_brace("a{{", "a"),
            Err(CarveError::UnbalancedDelimiters { .. })
        ));
    }

    #[test]
    fn unterminated_string_inside_expression() {
        let err = match_to_closing_brace("f={a:\"oops", "f=").unwrap_err();
        assert_eq!(
            err,
            CarveError::UnterminatedLiteral {
                what: "string literal",
                offset: 5
            }
        );
    }

    #[test]
    fn invalid_character_inside_expression() {
        assert!(matches!(
            match_to_closing_brace("f={a @ b}", "f="),
            Err(CarveError::InvalidSequence { .. })
        ));
    }

    #[test]
    fn stops_at_first_balanced_point_not_at_later_closers() {
        // Extra `}}` after the expression must not extend the match.
        let src = "a{{{}}}}}";
        assert_eq!(match_to_closing_brace(src, "a").unwrap(), "{{{}}}");
    }

    #[test]
    fn extracted_slice_is_itself_balanced() {
        let src = r#"Mda=function(a){a=a.split("");a.reverse();return a.join("")};x=1"#;
        let body = match_to_closing_brace(src, "Mda=function").unwrap();
        assert!(Scanner::new(body).is_balanced());
    }
}
