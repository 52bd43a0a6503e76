//! Lexical analyzer for fd source text.
//!
//! The lexer is driven by the parser one token at a time. Each request
//! names a [`LexMode`] and the set of token kinds the current parser state
//! can accept. The mode decides which token shapes are considered at all
//! (free annotation text, raw string content, bare hex colors). The
//! expected set gates keyword recognition, so a reserved word lexes as a
//! plain identifier wherever the grammar does not want the keyword.
//!
//! The lexer never fails. Unrecognized characters become one-character
//! [`TokenKind::Error`] tokens for the parser to recover from, and
//! [`TokenKind::End`] repeats once the input is exhausted.

use log::trace;
use winnow::{
    Parser,
    ascii::digit1,
    combinator::{alt, not, opt, peek, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::{LineIndex, Span},
    tokens::{Token, TokenKind, TokenSet},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O>;

/// Lexical context selected by the parser for the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    /// General tokens: punctuation, keywords, identifiers, numbers.
    Code,
    /// A property value. Numbers win over hex colors, which win over
    /// identifiers.
    Value,
    /// After `@` or an annotation keyword. Newlines are significant and the
    /// rest of the line may lex as free text.
    AnnotationBody,
    /// Between double quotes.
    StringBody,
    /// Resynchronization after a syntax error. Every keyword is recognized.
    Recovery,
}

impl LexMode {
    /// The mode for a parser state that accepts `expected`.
    pub fn for_expected(expected: &TokenSet) -> Self {
        if expected.contains(TokenKind::StringContent) {
            LexMode::StringBody
        } else if expected.contains(TokenKind::AnnotationText) {
            LexMode::AnnotationBody
        } else if expected.contains(TokenKind::HexColor) {
            LexMode::Value
        } else {
            LexMode::Code
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0B' | '\r')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Run `parser`, rewinding the input if it does not match.
fn attempt<'a, O>(
    input: &mut Input<'a>,
    mut parser: impl Parser<Input<'a>, O, ErrMode<ContextError>>,
) -> Option<O> {
    let start = input.checkpoint();
    match parser.parse_next(input) {
        Ok(output) => Some(output),
        Err(_) => {
            input.reset(&start);
            None
        }
    }
}

fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    take_while(0.., |c: char| is_blank(c) || c == '\n')
        .void()
        .parse_next(input)
}

fn blanks(input: &mut Input<'_>) -> IResult<()> {
    take_while(0.., is_blank).void().parse_next(input)
}

fn word_boundary(input: &mut Input<'_>) -> IResult<()> {
    not(one_of(is_word_char)).parse_next(input)
}

/// `#` to end of line, newline excluded.
fn comment(input: &mut Input<'_>) -> IResult<TokenKind> {
    ('#', take_while(0.., |c: char| c != '\n'))
        .value(TokenKind::Comment)
        .parse_next(input)
}

/// Parse punctuation (`->` before anything single-character)
fn punctuation(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        literal("->").value(TokenKind::Arrow),
        '{'.value(TokenKind::LeftBrace),
        '}'.value(TokenKind::RightBrace),
        ':'.value(TokenKind::Colon),
        '='.value(TokenKind::Equals),
        '@'.value(TokenKind::At),
        '"'.value(TokenKind::Quote),
    ))
    .parse_next(input)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn word<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_word_char),
    )
        .take()
        .parse_next(input)
}

/// A keyword where `mode` and `expected` allow one, else an identifier.
fn word_kind(text: &str, mode: LexMode, expected: &TokenSet) -> TokenKind {
    match TokenKind::keyword(text) {
        Some(keyword) if mode == LexMode::Recovery || expected.contains(keyword) => keyword,
        _ => TokenKind::Identifier,
    }
}

/// `-?digits('.'digits)?('ms')?`, with no boundary check.
fn number(input: &mut Input<'_>) -> IResult<TokenKind> {
    (opt('-'), digit1, opt(('.', digit1)), opt(literal("ms")))
        .value(TokenKind::Number)
        .parse_next(input)
}

/// A number that is a whole word.
fn bounded_number(input: &mut Input<'_>) -> IResult<TokenKind> {
    terminated(number, word_boundary).parse_next(input)
}

/// One to six hex digits forming a whole word.
fn hex_color(input: &mut Input<'_>) -> IResult<TokenKind> {
    terminated(
        take_while(1..=6, |c: char| c.is_ascii_hexdigit()),
        word_boundary,
    )
    .value(TokenKind::HexColor)
    .parse_next(input)
}

/// Free text up to end of line or an unescaped `#`. `##` is kept verbatim.
fn annotation_text<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    repeat::<_, _, (), _, _>(
        1..,
        alt((literal("##").void(), none_of(['#', '\n']).void())),
    )
    .take()
    .parse_next(input)
}

/// A restartable, mode-driven token source over one document.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    lines: LineIndex,
    offset: usize,
    /// A string ran to end of input; the next token is its missing `"`.
    close_string: bool,
    previous: Option<Token>,
    diagnostics: DiagnosticCollector,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            offset: 0,
            close_string: false,
            previous: None,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset where the next token request starts scanning.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Restart scanning at `offset`.
    ///
    /// `offset` must lie on a char boundary, such as the start of a token
    /// previously returned by this lexer.
    pub fn reset(&mut self, offset: usize) {
        debug_assert!(self.source.is_char_boundary(offset));
        self.offset = offset.min(self.source.len());
        self.close_string = false;
        self.previous = None;
    }

    /// Scan the next token in `mode`.
    ///
    /// Keywords are only produced when `expected` contains them, except in
    /// [`LexMode::Recovery`].
    pub fn next_token(&mut self, mode: LexMode, expected: &TokenSet) -> Token {
        if self.close_string {
            self.close_string = false;
            let token = self.missing(TokenKind::Quote);
            self.previous = Some(token);
            return token;
        }

        let mut input = Input::new(self.source);
        input.next_slice(self.offset);

        let token = match mode {
            LexMode::StringBody => self.scan_string(&mut input),
            LexMode::AnnotationBody => match self.scan_annotation(&mut input, expected) {
                Some(token) => token,
                None => self.scan(&mut input, LexMode::Code, expected),
            },
            LexMode::Code | LexMode::Value | LexMode::Recovery => {
                self.scan(&mut input, mode, expected)
            }
        };

        self.offset = self.offset.max(token.span().end());
        trace!(kind:? = token.kind(), span:% = token.span(), mode:?; "Lexed token");
        self.previous = Some(token);
        token
    }

    /// Diagnostics recorded so far, in source order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.finish()
    }

    fn token(&self, kind: TokenKind, span: Span) -> Token {
        Token::new(
            kind,
            span,
            self.lines.line(span.start()),
            self.lines.column(span.start()),
        )
    }

    fn missing(&self, kind: TokenKind) -> Token {
        Token::missing(
            kind,
            self.offset,
            self.lines.line(self.offset),
            self.lines.column(self.offset),
        )
    }

    fn scan(&mut self, input: &mut Input<'src>, mode: LexMode, expected: &TokenSet) -> Token {
        let _ = whitespace(input);
        let start = input.current_token_start();
        if input.is_empty() {
            return self.token(TokenKind::End, Span::empty(start));
        }

        let kind = self.scan_kind(input, mode, expected);
        self.token(kind, Span::new(start..input.current_token_start()))
    }

    fn scan_kind(&mut self, input: &mut Input<'src>, mode: LexMode, expected: &TokenSet) -> TokenKind {
        if let Some(kind) = attempt(input, alt((comment, punctuation))) {
            return kind;
        }

        // `key=value` pairs: a word before `=` is never a value
        if mode == LexMode::Value
            && let Some(text) = attempt(input, terminated(word, peek((blanks, '='))))
        {
            return word_kind(text, mode, expected);
        }

        if mode == LexMode::Value
            && let Some(kind) = attempt(input, alt((bounded_number, hex_color)))
        {
            return kind;
        }

        if let Some(text) = attempt(input, word) {
            return word_kind(text, mode, expected);
        }

        if mode == LexMode::Recovery
            && let Some(kind) = attempt(input, alt((bounded_number, hex_color)))
        {
            return kind;
        }

        // A digit-led word that is neither: its numeric prefix
        if let Some(kind) = attempt(input, number) {
            return kind;
        }

        let _: IResult<char> = any(input);
        TokenKind::Error
    }

    fn scan_string(&mut self, input: &mut Input<'src>) -> Token {
        let start = input.current_token_start();

        if attempt(input, '"').is_some() {
            return self.token(TokenKind::Quote, Span::new(start..start + 1));
        }

        if input.is_empty() {
            // Only an opening quote right at the end still needs closing
            let opened = self.previous.is_some_and(|prev| {
                prev.kind() == TokenKind::Quote && !prev.is_missing() && prev.span().end() == start
            });
            if !opened {
                return self.token(TokenKind::End, Span::empty(start));
            }
            self.unterminated_string(start);
            return self.missing(TokenKind::Quote);
        }

        let _ = attempt(input, take_while(1.., |c: char| c != '"'));
        let end = input.current_token_start();
        if input.is_empty() {
            self.unterminated_string(start);
            self.close_string = true;
        }
        self.token(TokenKind::StringContent, Span::new(start..end))
    }

    fn unterminated_string(&mut self, content_start: usize) {
        let open = content_start.saturating_sub(1);
        self.diagnostics.emit(
            Diagnostic::error("unterminated string literal")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(open..self.source.len()), "string runs to end of input")
                .with_help("add closing `\"`"),
        );
    }

    /// Scan in annotation context; `None` at end of line or input.
    fn scan_annotation(&mut self, input: &mut Input<'src>, expected: &TokenSet) -> Option<Token> {
        let _ = blanks(input);
        let start = input.current_token_start();
        if input.is_empty() || input.starts_with('\n') {
            return None;
        }

        if input.starts_with('#') && !input.starts_with("##") {
            let _ = attempt(input, comment);
            let span = Span::new(start..input.current_token_start());
            return Some(self.token(TokenKind::Comment, span));
        }

        let checkpoint = input.checkpoint();
        if let Some(text) = attempt(input, word) {
            let span = Span::new(start..input.current_token_start());
            if let Some(keyword) = TokenKind::keyword(text).filter(|k| expected.contains(*k)) {
                return Some(self.token(keyword, span));
            }
            if expected.contains(TokenKind::Identifier)
                && attempt(input, peek((blanks, literal("->")))).is_some()
            {
                return Some(self.token(TokenKind::Identifier, span));
            }
            input.reset(&checkpoint);
        }

        if expected.contains(TokenKind::Colon) && attempt(input, ':').is_some() {
            return Some(self.token(TokenKind::Colon, Span::new(start..start + 1)));
        }

        if attempt(input, '"').is_some() {
            return Some(self.token(TokenKind::Quote, Span::new(start..start + 1)));
        }

        let text = attempt(input, annotation_text)?;
        let len = text.trim_end_matches(is_blank).len();
        Some(self.token(TokenKind::AnnotationText, Span::new(start..start + len)))
    }
}
