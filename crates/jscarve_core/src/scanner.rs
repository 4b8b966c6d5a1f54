//! Single-pass JavaScript lexer.
//!
//! See [`Scanner`] for the main entry point.  The scanner classifies one
//! token per call, tracks template-interpolation nesting with an explicit
//! stack, and decides whether a `/` starts a regex literal or is a division
//! operator by keeping a three-token look-behind together with per-paren
//! and per-brace metadata (the RESS/sweet.js bookkeeping scheme).

use crate::error::{CarveError, CarveResult};

// ─────────────────────────────────────────────────────────────────────────────
// Position / Span
// ─────────────────────────────────────────────────────────────────────────────

/// A byte offset + line/column location in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the beginning of the source string.
    pub offset: usize,
    /// 1-based line number (incremented on every line terminator).
    pub line: u32,
    /// 1-based column number, measured in Unicode scalar values.
    pub column: u32,
}

/// A half-open `[start, end)` source span.
///
/// Spans are the only per-token state the scanner retains; a token never
/// owns a copy of the text.  Consumers slice the original source as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start of the span.
    pub start: Position,
    /// Exclusive end of the span.
    pub end: Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────────────

/// The syntactic category of a JavaScript lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Decimal, hex (`0x…`), binary (`0b…`), octal (`0o…` / legacy `0…`),
    /// or BigInt (trailing `n`) numeric literal.
    NumericLiteral,
    /// String literal enclosed in `"` or `'`.
    StringLiteral,

    // ── Template literals ─────────────────────────────────────────────────
    /// A complete template literal with no substitutions: `` `…` ``.
    NoSubstitutionTemplate,
    /// Opening span of a substituted template: `` `…${ ``.
    TemplateHead,
    /// Middle span between two substitutions: `}…${`.
    TemplateMiddle,
    /// Closing span of a substituted template: `}…`` ` ``.
    TemplateTail,

    /// Regular expression literal `/pattern/flags`.
    RegexLiteral,

    /// An identifier that is not a reserved word.
    Identifier,
    /// A private identifier beginning with `#`.
    PrivateIdentifier,

    // ── Reserved words ────────────────────────────────────────────────────
    /// `await`
    Await,
    /// `break`
    Break,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `class`
    Class,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `debugger`
    Debugger,
    /// `default`
    Default,
    /// `delete`
    Delete,
    /// `do`
    Do,
    /// `else`
    Else,
    /// `enum`
    Enum,
    /// `export`
    Export,
    /// `extends`
    Extends,
    /// `false`
    False,
    /// `finally`
    Finally,
    /// `for`
    For,
    /// `function`
    Function,
    /// `if`
    If,
    /// `import`
    Import,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
    /// `let`
    Let,
    /// `new`
    New,
    /// `null`
    Null,
    /// `return`
    Return,
    /// `static`
    Static,
    /// `super`
    Super,
    /// `switch`
    Switch,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `true`
    True,
    /// `try`
    Try,
    /// `typeof`
    Typeof,
    /// `var`
    Var,
    /// `void`
    Void,
    /// `while`
    While,
    /// `with`
    With,
    /// `yield`
    Yield,

    // ── Punctuators ───────────────────────────────────────────────────────
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `===`
    EqualEqualEqual,
    /// `!==`
    BangEqualEqual,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `>>>`
    GreaterGreaterGreater,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `&&`
    AmpersandAmpersand,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `:`
    Colon,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `**=`
    StarStarEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `<<=`
    LessLessEqual,
    /// `>>=`
    GreaterGreaterEqual,
    /// `>>>=`
    GreaterGreaterGreaterEqual,
    /// `&=`
    AmpersandEqual,
    /// `|=`
    PipeEqual,
    /// `^=`
    CaretEqual,
    /// `&&=`
    AmpersandAmpersandEqual,
    /// `||=`
    PipePipeEqual,
    /// `??=`
    QuestionQuestionEqual,
    /// `=>`
    Arrow,

    // ── Comments ──────────────────────────────────────────────────────────
    /// Single-line comment `// …` (or a shebang line at byte 0).
    LineComment,
    /// Block comment `/* … */`.
    BlockComment,

    /// A character that matched no recognized token shape.  The scanner
    /// reports the character and keeps going; the caller decides whether
    /// to abort.
    InvalidSequence,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Reserved words, including the value keywords `true`/`false`/`null`/
    /// `this`/`super`.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Await
                | TokenKind::Break
                | TokenKind::Case
                | TokenKind::Catch
                | TokenKind::Class
                | TokenKind::Const
                | TokenKind::Continue
                | TokenKind::Debugger
                | TokenKind::Default
                | TokenKind::Delete
                | TokenKind::Do
                | TokenKind::Else
                | TokenKind::Enum
                | TokenKind::Export
                | TokenKind::Extends
                | TokenKind::False
                | TokenKind::Finally
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Import
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::Let
                | TokenKind::New
                | TokenKind::Null
                | TokenKind::Return
                | TokenKind::Static
                | TokenKind::Super
                | TokenKind::Switch
                | TokenKind::This
                | TokenKind::Throw
                | TokenKind::True
                | TokenKind::Try
                | TokenKind::Typeof
                | TokenKind::Var
                | TokenKind::Void
                | TokenKind::While
                | TokenKind::With
                | TokenKind::Yield
        )
    }

    /// Tokens after which a `{` opens an object literal rather than a
    /// block, and after which a `/` starts a regex.  Covers every binary /
    /// unary / assignment operator, including the keyword operators
    /// (`typeof`, `void`, `delete`, `throw`, `new`, `instanceof`, `in`).
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::StarStarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::LessLessEqual
                | TokenKind::GreaterGreaterEqual
                | TokenKind::GreaterGreaterGreaterEqual
                | TokenKind::AmpersandEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::AmpersandAmpersandEqual
                | TokenKind::PipePipeEqual
                | TokenKind::QuestionQuestionEqual
                | TokenKind::Comma
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::LessLess
                | TokenKind::GreaterGreater
                | TokenKind::GreaterGreaterGreater
                | TokenKind::Ampersand
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::AmpersandAmpersand
                | TokenKind::PipePipe
                | TokenKind::QuestionQuestion
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Instanceof
                | TokenKind::In
                | TokenKind::EqualEqualEqual
                | TokenKind::EqualEqual
                | TokenKind::GreaterEqual
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::Less
                | TokenKind::BangEqual
                | TokenKind::BangEqualEqual
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Tilde
                | TokenKind::Bang
                | TokenKind::Delete
                | TokenKind::Void
                | TokenKind::Typeof
                | TokenKind::Throw
                | TokenKind::New
        )
    }

    /// Symbol punctuators (brackets, operators, separators).  Keyword
    /// operators are *not* punctuators.
    pub fn is_punctuator(self) -> bool {
        matches!(
            self,
            TokenKind::LeftBrace
                | TokenKind::RightBrace
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::LeftBracket
                | TokenKind::RightBracket
                | TokenKind::Dot
                | TokenKind::DotDotDot
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
                | TokenKind::BangEqual
                | TokenKind::EqualEqualEqual
                | TokenKind::BangEqualEqual
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::LessLess
                | TokenKind::GreaterGreater
                | TokenKind::GreaterGreaterGreater
                | TokenKind::Ampersand
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::AmpersandAmpersand
                | TokenKind::PipePipe
                | TokenKind::QuestionQuestion
                | TokenKind::Question
                | TokenKind::QuestionDot
                | TokenKind::Colon
                | TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::StarStarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::LessLessEqual
                | TokenKind::GreaterGreaterEqual
                | TokenKind::GreaterGreaterGreaterEqual
                | TokenKind::AmpersandEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::AmpersandAmpersandEqual
                | TokenKind::PipePipeEqual
                | TokenKind::QuestionQuestionEqual
                | TokenKind::Arrow
        )
    }

    /// Keywords whose trailing `(…)` is a conditional head (`if`, `for`,
    /// `while`, `with`); a `/` after such a `)` starts a regex.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::For | TokenKind::While | TokenKind::With
        )
    }

    /// Line or block comment.
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────────────

/// A single lexical token produced by the [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The syntactic category.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

// ─────────────────────────────────────────────────────────────────────────────
// Character-classification helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Returns `true` for JavaScript *LineTerminator* code points.
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Returns `true` for JavaScript *WhiteSpace* **or** *LineTerminator*
/// characters.
pub(crate) fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t'                      // CHARACTER TABULATION
        | '\x0B'                  // LINE TABULATION
        | '\x0C'                  // FORM FEED
        | ' '                     // SPACE
        | '\u{00A0}'              // NO-BREAK SPACE
        | '\u{FEFF}'              // ZERO WIDTH NO-BREAK SPACE (BOM)
        | '\u{1680}'              // OGHAM SPACE MARK
        | '\u{2000}'
            ..='\u{200A}' // EN QUAD … HAIR SPACE
        | '\u{202F}'              // NARROW NO-BREAK SPACE
        | '\u{205F}'              // MEDIUM MATHEMATICAL SPACE
        | '\u{3000}'              // IDEOGRAPHIC SPACE
        | '\n'
        | '\r'
        | '\u{2028}'
        | '\u{2029}'
    )
}

/// Returns `true` for characters that may *start* a JS identifier.
fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

/// Returns `true` for characters that may *continue* a JS identifier.
fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}' || c.is_alphanumeric()
}

/// Map an identifier string to a reserved-word [`TokenKind`], or return
/// `None` for plain identifiers.  Contextual keywords (`async`, `of`,
/// `get`, …) are deliberately left as identifiers — for slicing purposes
/// they behave like any other name.
fn keyword_kind(s: &str) -> Option<TokenKind> {
    match s {
        "await" => Some(TokenKind::Await),
        "break" => Some(TokenKind::Break),
        "case" => Some(TokenKind::Case),
        "catch" => Some(TokenKind::Catch),
        "class" => Some(TokenKind::Class),
        "const" => Some(TokenKind::Const),
        "continue" => Some(TokenKind::Continue),
        "debugger" => Some(TokenKind::Debugger),
        "default" => Some(TokenKind::Default),
        "delete" => Some(TokenKind::Delete),
        "do" => Some(TokenKind::Do),
        "else" => Some(TokenKind::Else),
        "enum" => Some(TokenKind::Enum),
        "export" => Some(TokenKind::Export),
        "extends" => Some(TokenKind::Extends),
        "false" => Some(TokenKind::False),
        "finally" => Some(TokenKind::Finally),
        "for" => Some(TokenKind::For),
        "function" => Some(TokenKind::Function),
        "if" => Some(TokenKind::If),
        "import" => Some(TokenKind::Import),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "let" => Some(TokenKind::Let),
        "new" => Some(TokenKind::New),
        "null" => Some(TokenKind::Null),
        "return" => Some(TokenKind::Return),
        "static" => Some(TokenKind::Static),
        "super" => Some(TokenKind::Super),
        "switch" => Some(TokenKind::Switch),
        "this" => Some(TokenKind::This),
        "throw" => Some(TokenKind::Throw),
        "true" => Some(TokenKind::True),
        "try" => Some(TokenKind::Try),
        "typeof" => Some(TokenKind::Typeof),
        "var" => Some(TokenKind::Var),
        "void" => Some(TokenKind::Void),
        "while" => Some(TokenKind::While),
        "with" => Some(TokenKind::With),
        "yield" => Some(TokenKind::Yield),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Regex/division look-behind bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata recorded for each `(…)` pair.
#[derive(Debug, Clone, Copy)]
struct Paren {
    /// The `(` opens the parameter list of a function *expression*
    /// (`x = function (…)`, `return function (…)`), as opposed to a
    /// function declaration.
    func_expr: bool,
    /// The `(` directly follows `if`, `for`, `while`, or `with`.
    conditional: bool,
}

/// Metadata recorded for each `{…}` pair.
#[derive(Debug, Clone, Copy)]
struct Brace {
    /// The `{` opens a block, not an object literal.
    is_block: bool,
    /// Metadata of the `(…)` pair that immediately preceded the `{`, when
    /// the `{` follows a `)` (function body or conditional body).
    paren: Option<Paren>,
}

/// One entry of the three-token look-behind.
#[derive(Debug, Clone, Copy)]
struct MetaToken {
    kind: TokenKind,
    line: u32,
    /// Set for `(` and `)` entries.
    paren: Option<Paren>,
    /// Set for `{` and `}` entries.
    brace: Option<Brace>,
}

impl MetaToken {
    fn plain(kind: TokenKind, line: u32) -> Self {
        Self {
            kind,
            line,
            paren: None,
            brace: None,
        }
    }
}

/// The last three significant (non-comment) tokens, newest first.
#[derive(Debug, Default)]
struct LookBehind {
    slots: [Option<MetaToken>; 3],
}

impl LookBehind {
    fn push(&mut self, t: MetaToken) {
        self.slots = [Some(t), self.slots[0], self.slots[1]];
    }

    fn one(&self) -> Option<MetaToken> {
        self.slots[0]
    }

    fn two(&self) -> Option<MetaToken> {
        self.slots[1]
    }

    fn three(&self) -> Option<MetaToken> {
        self.slots[2]
    }

    fn one_is(&self, kind: TokenKind) -> bool {
        self.slots[0].is_some_and(|t| t.kind == kind)
    }

    fn two_is(&self, kind: TokenKind) -> bool {
        self.slots[1].is_some_and(|t| t.kind == kind)
    }
}

/// Tokens before a `function` keyword that make the function an
/// *expression* rather than a declaration.
fn is_expression_prefix(kind: TokenKind) -> bool {
    kind.is_operator() || kind == TokenKind::Return || kind == TokenKind::Case
}

// ─────────────────────────────────────────────────────────────────────────────
// Scanner
// ─────────────────────────────────────────────────────────────────────────────

/// Single-pass JavaScript lexer.
///
/// Produces a stream of [`Token`]s from a UTF-8 source string.  Call
/// [`Scanner::next_token`] repeatedly; once a token with [`TokenKind::Eof`]
/// has been returned, every further call keeps returning `Eof`.
///
/// A scanner is created once per extraction over one source string and
/// holds no cross-call state beyond its own cursor and bookkeeping stacks;
/// separate instances may run fully in parallel.
///
/// # Example
///
/// ```
/// use jscarve_core::scanner::{Scanner, TokenKind};
///
/// let mut sc = Scanner::new("let x = 42;");
/// loop {
///     let tok = sc.next_token().unwrap();
///     if tok.kind == TokenKind::Eof { break; }
///     println!("{:?}", tok.kind);
/// }
/// ```
pub struct Scanner<'src> {
    /// The complete source string.
    source: &'src str,
    /// Current byte position within `source`.
    pos: usize,
    /// Current 1-based line number.
    line: u32,
    /// Current 1-based column number.
    column: u32,
    /// The last three significant tokens, for regex/division and
    /// block/object-literal disambiguation.
    last_three: LookBehind,
    /// Metadata for every currently-open `{`.
    brace_stack: Vec<Brace>,
    /// Metadata for every currently-open `(`.
    paren_stack: Vec<Paren>,
    /// Nesting depth of `[…]` pairs.
    bracket_depth: usize,
    /// Stack of `brace_stack` lengths recorded when entering each template
    /// substitution (`` `…${ ``).  When a `}` appears and `brace_stack` is
    /// back at the recorded length, the `}` closes the substitution and
    /// raw template scanning resumes.
    template_stack: Vec<usize>,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner for the given UTF-8 source string.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            last_three: LookBehind::default(),
            brace_stack: Vec::new(),
            paren_stack: Vec::new(),
            bracket_depth: 0,
            template_stack: Vec::new(),
        }
    }

    /// Returns `true` when all input has been consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Returns `true` when no bracket pair, template substitution, or
    /// other nested context is open at the current scan position.
    ///
    /// The extractor polls this after every token to detect the point at
    /// which the expression it began inside has been fully closed.
    pub fn currently_balanced(&self) -> bool {
        self.brace_stack.is_empty()
            && self.paren_stack.is_empty()
            && self.bracket_depth == 0
            && self.template_stack.is_empty()
    }

    /// Run the scanner to end of input and report whether every `{`, `(`,
    /// `[` — and every opened string/template/regex/comment — was properly
    /// closed, with no unclassifiable characters along the way.
    ///
    /// A validation utility (e.g. for checking a whole source file), not
    /// part of the extraction hot path.
    pub fn is_balanced(mut self) -> bool {
        loop {
            match self.next_token() {
                Err(_) => return false,
                Ok(tok) => match tok.kind {
                    TokenKind::InvalidSequence => return false,
                    TokenKind::Eof => break,
                    _ => {}
                },
            }
        }
        self.currently_balanced()
    }

    // ── Low-level character helpers ─────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.source[self.pos..].chars();
        it.next();
        it.next()
    }

    /// Advance past the current character and update line/column tracking.
    ///
    /// `\r\n` is treated as a single line terminator; the `\n` is consumed
    /// automatically so callers never see a stray `\r`.
    fn advance(&mut self) -> char {
        let ch = self.source[self.pos..]
            .chars()
            .next()
            .expect("advance called past end of input");
        self.pos += ch.len_utf8();
        match ch {
            '\r' => {
                if self.source[self.pos..].starts_with('\n') {
                    self.pos += 1;
                }
                self.line += 1;
                self.column = 1;
            }
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.line += 1;
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        ch
    }

    fn current_pos(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if is_js_whitespace(c)) {
            self.advance();
        }
    }

    // ── Main public API ─────────────────────────────────────────────────────

    /// Scan and return the next [`Token`].
    ///
    /// Returns a token with [`TokenKind::Eof`] when the input is
    /// exhausted; further calls keep returning `Eof`.  An unclassifiable
    /// character yields an [`TokenKind::InvalidSequence`] token; an
    /// unterminated literal context is an error.
    pub fn next_token(&mut self) -> CarveResult<Token> {
        self.skip_whitespace();

        if self.is_eof() {
            let here = self.current_pos();
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span { start: here, end: here },
            });
        }

        // Shebang, only valid at byte 0.
        if self.pos == 0 && self.source.starts_with("#!") {
            let start = self.current_pos();
            while matches!(self.peek(), Some(c) if !is_line_terminator(c)) {
                self.advance();
            }
            return Ok(Token {
                kind: TokenKind::LineComment,
                span: Span {
                    start,
                    end: self.current_pos(),
                },
            });
        }

        let start = self.current_pos();
        let c = self.advance();

        let kind = match c {
            // Comment, regex literal, or division.
            '/' => self.scan_slash(start)?,

            '"' | '\'' => self.scan_string(c, start)?,

            '`' => {
                if self.scan_template_body(start)? {
                    self.template_stack.push(self.brace_stack.len());
                    TokenKind::TemplateHead
                } else {
                    TokenKind::NoSubstitutionTemplate
                }
            }

            c if c.is_ascii_digit() => {
                self.scan_numeric_tail(c);
                TokenKind::NumericLiteral
            }

            '.' => {
                if matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                    self.scan_decimal_digits();
                    self.scan_exponent();
                    TokenKind::NumericLiteral
                } else if self.peek() == Some('.') && self.peek2() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }

            '#' => self.scan_private_identifier(),

            c if is_id_start(c) => self.scan_identifier(start),

            // Identifier starting with a unicode escape `\uXXXX`.
            '\\' if self.peek() == Some('u') => self.scan_identifier(start),

            // `}` may close a template substitution rather than a brace.
            '}' => {
                if let Some(&mark) = self.template_stack.last()
                    && self.brace_stack.len() == mark
                {
                    self.template_stack.pop();
                    if self.scan_template_body(start)? {
                        self.template_stack.push(self.brace_stack.len());
                        TokenKind::TemplateMiddle
                    } else {
                        TokenKind::TemplateTail
                    }
                } else {
                    TokenKind::RightBrace
                }
            }

            '{' => TokenKind::LeftBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '~' => TokenKind::Tilde,
            ':' => TokenKind::Colon,

            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::LessLessEqual
                    } else {
                        TokenKind::LessLess
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }

            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        if self.peek() == Some('=') {
                            self.advance();
                            TokenKind::GreaterGreaterGreaterEqual
                        } else {
                            TokenKind::GreaterGreaterGreater
                        }
                    } else if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::GreaterGreaterEqual
                    } else {
                        TokenKind::GreaterGreater
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }

            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqualEqualEqual
                    } else {
                        TokenKind::EqualEqual
                    }
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Equal
                }
            }

            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::BangEqualEqual
                    } else {
                        TokenKind::BangEqual
                    }
                } else {
                    TokenKind::Bang
                }
            }

            '+' => {
                if self.peek() == Some('+') {
                    self.advance();
                    TokenKind::PlusPlus
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                }
            }

            '-' => {
                if self.peek() == Some('-') {
                    self.advance();
                    TokenKind::MinusMinus
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                }
            }

            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::StarStarEqual
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarEqual
                } else {
                    TokenKind::Star
                }
            }

            '%' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PercentEqual
                } else {
                    TokenKind::Percent
                }
            }

            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::AmpersandAmpersandEqual
                    } else {
                        TokenKind::AmpersandAmpersand
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::AmpersandEqual
                } else {
                    TokenKind::Ampersand
                }
            }

            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::PipePipeEqual
                    } else {
                        TokenKind::PipePipe
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PipeEqual
                } else {
                    TokenKind::Pipe
                }
            }

            '^' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::CaretEqual
                } else {
                    TokenKind::Caret
                }
            }

            '?' => {
                if self.peek() == Some('?') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::QuestionQuestionEqual
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else if self.peek() == Some('.')
                    && !matches!(self.peek2(), Some(d) if d.is_ascii_digit())
                {
                    // `?.` — but NOT `?.5` (that is `?` followed by `.5`).
                    self.advance();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }

            _ => TokenKind::InvalidSequence,
        };

        let tok = Token {
            kind,
            span: Span {
                start,
                end: self.current_pos(),
            },
        };
        self.keep_books(&tok)?;
        Ok(tok)
    }

    /// Convenience: tokenize the entire `source` string and return all
    /// tokens (the [`TokenKind::Eof`] sentinel is **not** included).
    ///
    /// # Errors
    ///
    /// Returns the first scan error encountered.
    pub fn tokenize_all(source: &'src str) -> CarveResult<Vec<Token>> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = scanner.next_token()?;
            if tok.kind == TokenKind::Eof {
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }

    // ── Slash: comment, regex, or division ──────────────────────────────────

    /// Classify a token starting with `/` (already consumed).
    fn scan_slash(&mut self, start: Position) -> CarveResult<TokenKind> {
        match self.peek() {
            Some('/') => {
                self.advance();
                while matches!(self.peek(), Some(c) if !is_line_terminator(c)) {
                    self.advance();
                }
                Ok(TokenKind::LineComment)
            }
            Some('*') => {
                self.advance();
                loop {
                    match self.peek() {
                        None => {
                            return Err(CarveError::UnterminatedLiteral {
                                what: "block comment",
                                offset: start.offset,
                            });
                        }
                        Some('*') if self.peek2() == Some('/') => {
                            self.advance();
                            self.advance();
                            return Ok(TokenKind::BlockComment);
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
            }
            // A `/` (or `/=`) where a value is expected opens a regex.
            _ if self.is_regex_start() => self.scan_regex(start),
            Some('=') => {
                self.advance();
                Ok(TokenKind::SlashEqual)
            }
            _ => Ok(TokenKind::Slash),
        }
    }

    /// Detect whether a `/` begins a regex literal or is division, based
    /// on the most recent significant token.
    ///
    /// A regex can only begin where a value is expected: after an
    /// operator, `(`, `[`, `,`, `;`, `{`, `${`, most keywords, or at the
    /// start of input — never directly after an identifier, a literal value, a
    /// `]`, a non-conditional `)`, or a `}` that closed an object literal
    /// or function-expression body.
    fn is_regex_start(&self) -> bool {
        let Some(mt) = self.last_three.one() else {
            return true;
        };
        let k = mt.kind;
        if k.is_keyword() {
            // Value keywords produce a value; everything else (`return`,
            // `typeof`, `case`, …) expects one.
            !matches!(
                k,
                TokenKind::This
                    | TokenKind::Super
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Null
            )
        } else if k == TokenKind::RightParen {
            mt.paren.is_some_and(|p| p.conditional)
        } else if k == TokenKind::RightBrace {
            match mt.brace {
                Some(b) if b.is_block => b.paren.is_none_or(|p| !p.func_expr),
                _ => false,
            }
        } else if k.is_punctuator() {
            k != TokenKind::RightBracket
        } else {
            // `${` opens an embedded expression, so a value is expected.
            matches!(k, TokenKind::TemplateHead | TokenKind::TemplateMiddle)
        }
    }

    /// Scan a regex literal; the opening `/` has already been consumed.
    /// An unescaped `/` inside a `[…]` character class does not terminate
    /// the literal.  Trailing identifier characters are consumed as flags.
    fn scan_regex(&mut self, start: Position) -> CarveResult<TokenKind> {
        let mut in_class = false;
        loop {
            match self.peek() {
                None => {
                    return Err(CarveError::UnterminatedLiteral {
                        what: "regex literal",
                        offset: start.offset,
                    });
                }
                Some(c) if is_line_terminator(c) => {
                    return Err(CarveError::UnterminatedLiteral {
                        what: "regex literal",
                        offset: start.offset,
                    });
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        None => {
                            return Err(CarveError::UnterminatedLiteral {
                                what: "regex literal",
                                offset: start.offset,
                            });
                        }
                        Some(c) if is_line_terminator(c) => {
                            return Err(CarveError::UnterminatedLiteral {
                                what: "regex literal",
                                offset: start.offset,
                            });
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        while matches!(self.peek(), Some(c) if is_id_continue(c)) {
            self.advance();
        }
        Ok(TokenKind::RegexLiteral)
    }

    // ── String literal ──────────────────────────────────────────────────────

    /// Scan a string literal; the opening quote has already been consumed.
    /// A backslash escapes the next character regardless of what it is.
    fn scan_string(&mut self, quote: char, start: Position) -> CarveResult<TokenKind> {
        loop {
            match self.peek() {
                None => {
                    return Err(CarveError::UnterminatedLiteral {
                        what: "string literal",
                        offset: start.offset,
                    });
                }
                Some(c) if is_line_terminator(c) => {
                    return Err(CarveError::UnterminatedLiteral {
                        what: "string literal",
                        offset: start.offset,
                    });
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral);
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_none() {
                        return Err(CarveError::UnterminatedLiteral {
                            what: "string literal",
                            offset: start.offset,
                        });
                    }
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    // ── Template literal body ───────────────────────────────────────────────

    /// Scan raw template characters after the opening `` ` `` or after a
    /// `}` that closes a substitution.  Returns `true` when the body was
    /// terminated by `${` (a substitution opens), `false` when it was
    /// terminated by the closing `` ` ``.
    fn scan_template_body(&mut self, start: Position) -> CarveResult<bool> {
        loop {
            match self.peek() {
                None => {
                    return Err(CarveError::UnterminatedLiteral {
                        what: "template literal",
                        offset: start.offset,
                    });
                }
                Some('`') => {
                    self.advance();
                    return Ok(false);
                }
                Some('$') if self.peek2() == Some('{') => {
                    self.advance();
                    self.advance();
                    return Ok(true);
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    // ── Numeric literal ─────────────────────────────────────────────────────

    /// Scan the remainder of a numeric literal whose first digit has
    /// already been consumed.  Covers hex/octal/binary prefixes, floats,
    /// exponents, numeric separators, and the BigInt `n` suffix.
    fn scan_numeric_tail(&mut self, first: char) {
        if first == '0' {
            match self.peek() {
                Some('x') | Some('X') => {
                    self.advance();
                    self.scan_radix_digits(16);
                }
                Some('o') | Some('O') => {
                    self.advance();
                    self.scan_radix_digits(8);
                }
                Some('b') | Some('B') => {
                    self.advance();
                    self.scan_radix_digits(2);
                }
                _ => self.scan_decimal_tail(),
            }
        } else {
            self.scan_decimal_tail();
        }
        if self.peek() == Some('n') {
            self.advance(); // BigInt suffix
        }
    }

    fn scan_decimal_tail(&mut self) {
        self.scan_decimal_digits();
        if self.peek() == Some('.') {
            self.advance();
            self.scan_decimal_digits();
        }
        self.scan_exponent();
    }

    fn scan_decimal_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    fn scan_radix_digits(&mut self, radix: u32) {
        while matches!(self.peek(), Some(c) if c.is_digit(radix) || c == '_') {
            self.advance();
        }
    }

    /// Consume an optional exponent part (`e` / `E`, optional sign, digits).
    fn scan_exponent(&mut self) {
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            self.scan_decimal_digits();
        }
    }

    // ── Identifier / keyword ────────────────────────────────────────────────

    /// Scan an identifier whose first character (or leading `\`) has
    /// already been consumed.
    fn scan_identifier(&mut self, start: Position) -> TokenKind {
        let mut escaped = self.source.as_bytes()[start.offset] == b'\\';
        if escaped {
            self.scan_unicode_escape_in_id();
        }
        loop {
            match self.peek() {
                Some(c) if is_id_continue(c) => {
                    self.advance();
                }
                Some('\\') if self.peek2() == Some('u') => {
                    escaped = true;
                    self.advance();
                    self.scan_unicode_escape_in_id();
                }
                _ => break,
            }
        }
        if escaped {
            // `if` is always an identifier, never the keyword `if`.
            TokenKind::Identifier
        } else {
            keyword_kind(&self.source[start.offset..self.pos]).unwrap_or(TokenKind::Identifier)
        }
    }

    /// After consuming `\`, consume the rest of a `\uXXXX` or `\u{…}`
    /// escape.
    fn scan_unicode_escape_in_id(&mut self) {
        if self.peek() != Some('u') {
            return;
        }
        self.advance(); // 'u'
        if self.peek() == Some('{') {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.advance();
            }
            if self.peek() == Some('}') {
                self.advance();
            }
        } else {
            for _ in 0..4 {
                if matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    self.advance();
                }
            }
        }
    }

    /// Scan a `#private` identifier; the `#` has already been consumed.
    fn scan_private_identifier(&mut self) -> TokenKind {
        if !matches!(self.peek(), Some(c) if is_id_start(c) || c == '\\') {
            return TokenKind::InvalidSequence;
        }
        loop {
            match self.peek() {
                Some(c) if is_id_continue(c) => {
                    self.advance();
                }
                Some('\\') if self.peek2() == Some('u') => {
                    self.advance();
                    self.scan_unicode_escape_in_id();
                }
                _ => break,
            }
        }
        TokenKind::PrivateIdentifier
    }

    // ── Look-behind bookkeeping ─────────────────────────────────────────────

    /// Update the look-behind and the brace/paren/bracket stacks for a
    /// freshly-scanned token.
    fn keep_books(&mut self, tok: &Token) -> CarveResult<()> {
        match tok.kind {
            TokenKind::LeftParen => {
                self.open_paren_books(tok.span.start.line);
                return Ok(());
            }
            TokenKind::LeftBrace => {
                self.open_brace_books(tok.span.start.line);
                return Ok(());
            }
            TokenKind::RightParen => return self.close_paren_books(tok.span.start),
            TokenKind::RightBrace => return self.close_brace_books(tok.span.start),
            TokenKind::LeftBracket => self.bracket_depth += 1,
            TokenKind::RightBracket => {
                self.bracket_depth = self.bracket_depth.checked_sub(1).ok_or(
                    CarveError::UnbalancedDelimiters {
                        offset: tok.span.start.offset,
                    },
                )?;
            }
            _ => {}
        }
        if !tok.kind.is_comment() {
            self.last_three
                .push(MetaToken::plain(tok.kind, tok.span.start.line));
        }
        Ok(())
    }

    /// Bookkeeping for `(`: record whether the paren belongs to a function
    /// expression and whether it is a conditional head.
    fn open_paren_books(&mut self, line: u32) {
        let func_expr = if self.last_three.one_is(TokenKind::Function) {
            self.last_three
                .two()
                .is_some_and(|t| is_expression_prefix(t.kind))
        } else if self.last_three.two_is(TokenKind::Function) {
            self.last_three
                .three()
                .is_some_and(|t| is_expression_prefix(t.kind))
        } else {
            false
        };

        let conditional = self.last_three.one().is_some_and(|t| t.kind.is_conditional());

        let paren = Paren {
            func_expr,
            conditional,
        };
        self.paren_stack.push(paren);
        self.last_three.push(MetaToken {
            kind: TokenKind::LeftParen,
            line,
            paren: Some(paren),
            brace: None,
        });
    }

    /// Bookkeeping for `{`: decide block vs object literal from the
    /// preceding token.
    fn open_brace_books(&mut self, line: u32) {
        let is_block = match self.last_three.one() {
            None => true,
            Some(one) => match one.kind {
                TokenKind::LeftParen | TokenKind::LeftBrace | TokenKind::Case => false,
                // `{key: {…}}` — nested object values, `case x: {` — block.
                TokenKind::Colon => self.brace_stack.last().is_some_and(|b| b.is_block),
                // `return {…}` on one line is an object; after a line break
                // ASI kicks in and the `{` opens a block.
                TokenKind::Return | TokenKind::Yield => {
                    self.last_three.two().is_some_and(|t| t.line != line)
                }
                k => !k.is_operator(),
            },
        };

        let paren = match self.last_three.one() {
            Some(one) if one.kind == TokenKind::RightParen => one.paren,
            _ => None,
        };

        let brace = Brace { is_block, paren };
        self.brace_stack.push(brace);
        self.last_three.push(MetaToken {
            kind: TokenKind::LeftBrace,
            line,
            paren: None,
            brace: Some(brace),
        });
    }

    fn close_paren_books(&mut self, start: Position) -> CarveResult<()> {
        let paren = self
            .paren_stack
            .pop()
            .ok_or(CarveError::UnbalancedDelimiters {
                offset: start.offset,
            })?;
        self.last_three.push(MetaToken {
            kind: TokenKind::RightParen,
            line: start.line,
            paren: Some(paren),
            brace: None,
        });
        Ok(())
    }

    fn close_brace_books(&mut self, start: Position) -> CarveResult<()> {
        let brace = self
            .brace_stack
            .pop()
            .ok_or(CarveError::UnbalancedDelimiters {
                offset: start.offset,
            })?;
        self.last_three.push(MetaToken {
            kind: TokenKind::RightBrace,
            line: start.line,
            paren: None,
            brace: Some(brace),
        });
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Tokenise `src`, ignoring comments, and return a list of token kinds.
    fn kinds(src: &str) -> Vec<TokenKind> {
        Scanner::tokenize_all(src)
            .unwrap()
            .into_iter()
            .filter(|t| !t.kind.is_comment())
            .map(|t| t.kind)
            .collect()
    }

    /// The raw source text covered by a token.
    fn text<'s>(src: &'s str, tok: &Token) -> &'s str {
        &src[tok.span.start.offset..tok.span.end.offset]
    }

    // ── Keywords and identifiers ──────────────────────────────────────────

    #[test]
    fn keywords_are_classified() {
        let toks = kinds("return typeof case function this null");
        assert_eq!(
            toks,
            vec![
                TokenKind::Return,
                TokenKind::Typeof,
                TokenKind::Case,
                TokenKind::Function,
                TokenKind::This,
                TokenKind::Null,
            ]
        );
    }

    #[test]
    fn contextual_keywords_are_identifiers() {
        let toks = kinds("async of get set from");
        assert!(toks.iter().all(|&k| k == TokenKind::Identifier));
    }

    #[test]
    fn identifier_shapes() {
        let src = "foo _bar $baz café";
        let toks = Scanner::tokenize_all(src).unwrap();
        assert!(toks.iter().all(|t| t.kind == TokenKind::Identifier));
        assert_eq!(text(src, &toks[2]), "$baz");
        assert_eq!(text(src, &toks[3]), "café");
    }

    #[test]
    fn escaped_identifier_is_never_a_keyword() {
        // `if` spells "if" but must stay an identifier.
        let toks = kinds(r"\u0069f");
        assert_eq!(toks, vec![TokenKind::Identifier]);
    }

    #[test]
    fn private_identifier() {
        let toks = kinds("#foo");
        assert_eq!(toks, vec![TokenKind::PrivateIdentifier]);
    }

    // ── Numeric literals ──────────────────────────────────────────────────

    #[test]
    fn numeric_forms() {
        let src = "0 42 1.5 .5 1e3 1.5e-2 0xFF 0o17 0b1010 123n 1_000_000";
        let toks = Scanner::tokenize_all(src).unwrap();
        assert!(toks.iter().all(|t| t.kind == TokenKind::NumericLiteral));
        assert_eq!(text(src, &toks[3]), ".5");
        assert_eq!(text(src, &toks[5]), "1.5e-2");
        assert_eq!(text(src, &toks[9]), "123n");
    }

    // ── String literals ───────────────────────────────────────────────────

    #[test]
    fn string_with_escapes() {
        let src = r#""a\"b\\" 'it\'s'"#;
        let toks = Scanner::tokenize_all(src).unwrap();
        assert_eq!(toks[0].kind, TokenKind::StringLiteral);
        assert_eq!(text(src, &toks[0]), r#""a\"b\\""#);
        assert_eq!(toks[1].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn string_may_contain_delimiters_and_slashes() {
        let src = r#"",}\"/""#;
        let toks = Scanner::tokenize_all(src).unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(
            Scanner::tokenize_all(r#""unterminated"#),
            Err(CarveError::UnterminatedLiteral {
                what: "string literal",
                offset: 0
            })
        );
        // Also at end-of-line.
        assert!(Scanner::tokenize_all("\"oops\nx").is_err());
    }

    // ── Template literals ─────────────────────────────────────────────────

    #[test]
    fn template_without_substitution() {
        let toks = kinds("`hello {(,[ world`");
        assert_eq!(toks, vec![TokenKind::NoSubstitutionTemplate]);
    }

    #[test]
    fn template_with_substitutions() {
        let toks = kinds("`${a} and ${b}`");
        assert_eq!(
            toks,
            vec![
                TokenKind::TemplateHead,
                TokenKind::Identifier,
                TokenKind::TemplateMiddle,
                TokenKind::Identifier,
                TokenKind::TemplateTail,
            ]
        );
    }

    #[test]
    fn template_substitution_may_contain_braces() {
        let toks = kinds("`a ${{k:1}} b`");
        assert_eq!(
            toks,
            vec![
                TokenKind::TemplateHead,
                TokenKind::LeftBrace,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::NumericLiteral,
                TokenKind::RightBrace,
                TokenKind::TemplateTail,
            ]
        );
    }

    #[test]
    fn template_nested_inside_substitution() {
        let toks = kinds("`outer ${`inner`} end`");
        assert_eq!(
            toks,
            vec![
                TokenKind::TemplateHead,
                TokenKind::NoSubstitutionTemplate,
                TokenKind::TemplateTail,
            ]
        );
    }

    #[test]
    fn unterminated_template_is_an_error() {
        assert!(Scanner::tokenize_all("`oops").is_err());
        assert!(Scanner::tokenize_all("`oops ${a}").is_err());
    }

    // ── Regex vs division ─────────────────────────────────────────────────

    #[test]
    fn regex_at_start_of_input() {
        let toks = kinds("/foo/gi");
        assert_eq!(toks, vec![TokenKind::RegexLiteral]);
    }

    #[test]
    fn regex_after_operators_and_openers() {
        for src in ["x = /a/", "f(/a/)", "[/a/]", "a, /a/", "; /a/", "{/a/}"] {
            let toks = kinds(src);
            assert!(
                toks.contains(&TokenKind::RegexLiteral),
                "expected a regex in {src:?}, got {toks:?}"
            );
        }
    }

    #[test]
    fn regex_after_expression_keywords() {
        assert_eq!(
            kinds("return /a/"),
            vec![TokenKind::Return, TokenKind::RegexLiteral]
        );
        assert_eq!(
            kinds("typeof /a/"),
            vec![TokenKind::Typeof, TokenKind::RegexLiteral]
        );
        assert_eq!(
            kinds("case /a/:"),
            vec![TokenKind::Case, TokenKind::RegexLiteral, TokenKind::Colon]
        );
    }

    #[test]
    fn division_after_values() {
        assert_eq!(
            kinds("x / y"),
            vec![
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier
            ]
        );
        assert_eq!(
            kinds("4 / 2"),
            vec![
                TokenKind::NumericLiteral,
                TokenKind::Slash,
                TokenKind::NumericLiteral
            ]
        );
        assert_eq!(
            kinds("x[1] / 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::NumericLiteral,
                TokenKind::RightBracket,
                TokenKind::Slash,
                TokenKind::NumericLiteral,
            ]
        );
        // After a literal value keyword `/` divides.
        assert_eq!(
            kinds("this / 2")[1],
            TokenKind::Slash
        );
    }

    #[test]
    fn chained_division() {
        assert_eq!(
            kinds("10/2/1"),
            vec![
                TokenKind::NumericLiteral,
                TokenKind::Slash,
                TokenKind::NumericLiteral,
                TokenKind::Slash,
                TokenKind::NumericLiteral,
            ]
        );
    }

    #[test]
    fn division_after_grouping_paren_but_regex_after_conditional() {
        // `(a) / b` — the paren is a grouping, so `/` divides.
        assert_eq!(kinds("(a) / b")[3], TokenKind::Slash);
        // `if (a) /re/` — the paren is a conditional head, so `/` opens a
        // regex.
        assert_eq!(kinds("if (a) /re/.test(b)")[4], TokenKind::RegexLiteral);
    }

    #[test]
    fn regex_after_block_but_division_after_object_literal() {
        // `{}` opens a block at statement position → regex.
        assert_eq!(kinds("{ } /re/ ;")[2], TokenKind::RegexLiteral);
        // `x = {}` is an object literal → division.
        assert_eq!(kinds("x = {} / 2")[4], TokenKind::Slash);
    }

    #[test]
    fn division_after_function_expression_body() {
        let toks = kinds("x = function(){} / 2");
        assert_eq!(toks[toks.len() - 2], TokenKind::Slash);
    }

    #[test]
    fn regex_after_function_declaration_body() {
        let toks = kinds("function f(){} /re/.test(x)");
        assert_eq!(toks[6], TokenKind::RegexLiteral);
    }

    #[test]
    fn regex_after_template_substitution_open() {
        assert_eq!(
            kinds("`${/re/.test(a)}`"),
            vec![
                TokenKind::TemplateHead,
                TokenKind::RegexLiteral,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::RightParen,
                TokenKind::TemplateTail,
            ]
        );
        // Same thing in a middle span.
        assert_eq!(
            kinds("`${a}${/b/}`")[3],
            TokenKind::RegexLiteral
        );
    }

    #[test]
    fn regex_character_class_hides_slash() {
        let src = "x = /[/,]/";
        let toks = Scanner::tokenize_all(src).unwrap();
        assert_eq!(toks[2].kind, TokenKind::RegexLiteral);
        assert_eq!(text(src, &toks[2]), "/[/,]/");
    }

    #[test]
    fn regex_may_contain_unbalanced_delimiters() {
        let src = "x = /(,)}/g";
        let toks = Scanner::tokenize_all(src).unwrap();
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[2].kind, TokenKind::RegexLiteral);
        assert_eq!(text(src, &toks[2]), "/(,)}/g");
    }

    #[test]
    fn slash_equal_in_regex_position_opens_a_regex() {
        // `/=foo/` at expression start is a regex whose pattern begins
        // with `=`, not the `/=` operator.
        assert_eq!(kinds("x = /=a/")[2], TokenKind::RegexLiteral);
        // In operand position it is the compound-assignment operator.
        assert_eq!(kinds("x /= 2")[1], TokenKind::SlashEqual);
    }

    #[test]
    fn unterminated_regex_is_an_error() {
        assert!(Scanner::tokenize_all("x = /oops").is_err());
    }

    // ── Comments ──────────────────────────────────────────────────────────

    #[test]
    fn line_comment_runs_to_end_of_line() {
        let src = "a // {([ not counted\nb";
        let toks = Scanner::tokenize_all(src).unwrap();
        assert_eq!(toks[1].kind, TokenKind::LineComment);
        assert_eq!(text(src, &toks[1]), "// {([ not counted");
        assert_eq!(toks[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn block_comment() {
        let toks = kinds("/* { ( [ */ x");
        assert_eq!(toks, vec![TokenKind::Identifier]);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert_eq!(
            Scanner::tokenize_all("a /* oops"),
            Err(CarveError::UnterminatedLiteral {
                what: "block comment",
                offset: 2
            })
        );
    }

    #[test]
    fn shebang_is_a_line_comment() {
        let toks = Scanner::tokenize_all("#!/usr/bin/env node\nx").unwrap();
        assert_eq!(toks[0].kind, TokenKind::LineComment);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
    }

    // ── Punctuators ───────────────────────────────────────────────────────

    #[test]
    fn compound_operators() {
        let toks = kinds("a >>>= b ?? c?.d ... => ++");
        assert_eq!(
            toks,
            vec![
                TokenKind::Identifier,
                TokenKind::GreaterGreaterGreaterEqual,
                TokenKind::Identifier,
                TokenKind::QuestionQuestion,
                TokenKind::Identifier,
                TokenKind::QuestionDot,
                TokenKind::Identifier,
                TokenKind::DotDotDot,
                TokenKind::Arrow,
                TokenKind::PlusPlus,
            ]
        );
    }

    #[test]
    fn question_dot_before_digit_is_ternary() {
        // `a?.5:b` is `a ? .5 : b`, not optional chaining.
        let toks = kinds("a?.5:b");
        assert_eq!(toks[1], TokenKind::Question);
        assert_eq!(toks[2], TokenKind::NumericLiteral);
    }

    // ── Invalid input ─────────────────────────────────────────────────────

    #[test]
    fn unclassifiable_character_yields_invalid_sequence() {
        let toks = Scanner::tokenize_all("a @ b").unwrap();
        assert_eq!(toks[1].kind, TokenKind::InvalidSequence);
        // The scanner keeps going.
        assert_eq!(toks[2].kind, TokenKind::Identifier);
    }

    // ── EOF behaviour ─────────────────────────────────────────────────────

    #[test]
    fn eof_is_idempotent() {
        let mut sc = Scanner::new("a");
        assert_eq!(sc.next_token().unwrap().kind, TokenKind::Identifier);
        for _ in 0..4 {
            let tok = sc.next_token().unwrap();
            assert_eq!(tok.kind, TokenKind::Eof);
            assert_eq!(tok.span.start.offset, 1);
        }
    }

    // ── Balance checking ──────────────────────────────────────────────────

    #[test]
    fn balanced_source_reports_balanced() {
        let src = r#"function f(a){var b=[/,}/,"{"];return `${a}{`+b.length/2}"#;
        assert!(Scanner::new(src).is_balanced());
    }

    #[test]
    fn unbalanced_sources_report_unbalanced() {
        for src in ["{", "(", "[", "}", ")", "]", "({)", "`${`", "\"x", "a @"] {
            assert!(!Scanner::new(src).is_balanced(), "{src:?} must be unbalanced");
        }
    }

    #[test]
    fn line_tracking_counts_crlf_once() {
        let toks = Scanner::tokenize_all("x\r\ny").unwrap();
        assert_eq!(toks[0].span.start.line, 1);
        assert_eq!(toks[1].span.start.line, 2);
    }
}
