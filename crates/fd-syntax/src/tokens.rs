//! Token kinds for the fd language.
//!
//! [`TokenKind`] doubles as the terminal alphabet of the grammar. Its
//! declaration order matters: error recovery tries inserting expected
//! terminals in this order, so cheap placeholders (identifiers, values)
//! come before structural punctuation.

use std::fmt;

use crate::span::Span;

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    /// End of input; repeats once reached.
    End,
    /// `#` to end of line. An extra: valid between any two tokens.
    Comment,
    /// A character no lexer mode recognizes.
    Error,

    // Literals
    Identifier,
    Number,
    HexColor,
    AnnotationText,
    StringContent,

    // Annotation keywords
    Accept,
    Status,
    Priority,
    Tag,

    // Declaration keywords
    Style,
    Group,
    Rect,
    Ellipse,
    Path,
    Text,
    Anim,

    // Property keywords
    W,
    H,
    Width,
    Height,
    Fill,
    Stroke,
    Corner,
    Opacity,
    Font,
    Bg,
    Use,
    Layout,
    Shadow,
    Scale,
    Rotate,
    Translate,
    CenterIn,
    Offset,
    Ease,
    Duration,

    // Punctuation
    Equals,     // =
    Colon,      // :
    Arrow,      // ->
    At,         // @
    Quote,      // "
    LeftBrace,  // {
    RightBrace, // }
}

impl TokenKind {
    /// Number of token kinds.
    pub const COUNT: usize = TokenKind::RightBrace as usize + 1;

    /// All token kinds, in declaration order.
    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::End,
        TokenKind::Comment,
        TokenKind::Error,
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::HexColor,
        TokenKind::AnnotationText,
        TokenKind::StringContent,
        TokenKind::Accept,
        TokenKind::Status,
        TokenKind::Priority,
        TokenKind::Tag,
        TokenKind::Style,
        TokenKind::Group,
        TokenKind::Rect,
        TokenKind::Ellipse,
        TokenKind::Path,
        TokenKind::Text,
        TokenKind::Anim,
        TokenKind::W,
        TokenKind::H,
        TokenKind::Width,
        TokenKind::Height,
        TokenKind::Fill,
        TokenKind::Stroke,
        TokenKind::Corner,
        TokenKind::Opacity,
        TokenKind::Font,
        TokenKind::Bg,
        TokenKind::Use,
        TokenKind::Layout,
        TokenKind::Shadow,
        TokenKind::Scale,
        TokenKind::Rotate,
        TokenKind::Translate,
        TokenKind::CenterIn,
        TokenKind::Offset,
        TokenKind::Ease,
        TokenKind::Duration,
        TokenKind::Equals,
        TokenKind::Colon,
        TokenKind::Arrow,
        TokenKind::At,
        TokenKind::Quote,
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
    ];

    /// Index of this kind, for table lookups.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up the keyword spelled `word`, if any.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "accept" => TokenKind::Accept,
            "status" => TokenKind::Status,
            "priority" => TokenKind::Priority,
            "tag" => TokenKind::Tag,
            "style" => TokenKind::Style,
            "group" => TokenKind::Group,
            "rect" => TokenKind::Rect,
            "ellipse" => TokenKind::Ellipse,
            "path" => TokenKind::Path,
            "text" => TokenKind::Text,
            "anim" => TokenKind::Anim,
            "w" => TokenKind::W,
            "h" => TokenKind::H,
            "width" => TokenKind::Width,
            "height" => TokenKind::Height,
            "fill" => TokenKind::Fill,
            "stroke" => TokenKind::Stroke,
            "corner" => TokenKind::Corner,
            "opacity" => TokenKind::Opacity,
            "font" => TokenKind::Font,
            "bg" => TokenKind::Bg,
            "use" => TokenKind::Use,
            "layout" => TokenKind::Layout,
            "shadow" => TokenKind::Shadow,
            "scale" => TokenKind::Scale,
            "rotate" => TokenKind::Rotate,
            "translate" => TokenKind::Translate,
            "center_in" => TokenKind::CenterIn,
            "offset" => TokenKind::Offset,
            "ease" => TokenKind::Ease,
            "duration" => TokenKind::Duration,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this kind is spelled like an identifier.
    pub fn is_keyword(self) -> bool {
        (TokenKind::Accept..=TokenKind::Duration).contains(&self)
    }

    /// Whether this kind is a property name keyword.
    pub fn is_property_name(self) -> bool {
        (TokenKind::W..=TokenKind::Duration).contains(&self)
    }

    /// Whether this kind may appear between any two tokens.
    pub fn is_extra(self) -> bool {
        self == TokenKind::Comment
    }

    /// Whether tokens of this kind carry source-dependent text.
    ///
    /// Such tokens are "named" in the tree; fixed-spelling keywords and
    /// punctuation are anonymous.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            TokenKind::Comment
                | TokenKind::Error
                | TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::HexColor
                | TokenKind::AnnotationText
                | TokenKind::StringContent
        )
    }

    /// Fixed spelling for keywords and punctuation.
    pub fn static_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Accept => "accept",
            TokenKind::Status => "status",
            TokenKind::Priority => "priority",
            TokenKind::Tag => "tag",
            TokenKind::Style => "style",
            TokenKind::Group => "group",
            TokenKind::Rect => "rect",
            TokenKind::Ellipse => "ellipse",
            TokenKind::Path => "path",
            TokenKind::Text => "text",
            TokenKind::Anim => "anim",
            TokenKind::W => "w",
            TokenKind::H => "h",
            TokenKind::Width => "width",
            TokenKind::Height => "height",
            TokenKind::Fill => "fill",
            TokenKind::Stroke => "stroke",
            TokenKind::Corner => "corner",
            TokenKind::Opacity => "opacity",
            TokenKind::Font => "font",
            TokenKind::Bg => "bg",
            TokenKind::Use => "use",
            TokenKind::Layout => "layout",
            TokenKind::Shadow => "shadow",
            TokenKind::Scale => "scale",
            TokenKind::Rotate => "rotate",
            TokenKind::Translate => "translate",
            TokenKind::CenterIn => "center_in",
            TokenKind::Offset => "offset",
            TokenKind::Ease => "ease",
            TokenKind::Duration => "duration",
            TokenKind::Equals => "=",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "->",
            TokenKind::At => "@",
            TokenKind::Quote => "\"",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            _ => return None,
        };
        Some(text)
    }

    /// Name used in S-expressions and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::End => "end of input",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::HexColor => "hex_color",
            TokenKind::AnnotationText => "annotation_text",
            TokenKind::StringContent => "string_content",
            other => other.static_text().unwrap_or("token"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.static_text() {
            Some(text) => write!(f, "`{text}`"),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// A set of token kinds, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub fn insert(&mut self, kind: TokenKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn contains(&self, kind: TokenKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        TokenKind::ALL
            .into_iter()
            .filter(move |&kind| self.contains(kind))
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<T: IntoIterator<Item = TokenKind>>(iter: T) -> Self {
        let mut set = TokenSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// A classified slice of the source text.
///
/// Tokens do not own their text; resolve it with [`Token::text`] against
/// the source they were lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
    line: usize,
    column: usize,
    missing: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: usize, column: usize) -> Self {
        Self {
            kind,
            span,
            line,
            column,
            missing: false,
        }
    }

    /// A zero-width placeholder for a token that is absent from the source.
    pub fn missing(kind: TokenKind, offset: usize, line: usize, column: usize) -> Self {
        Self {
            kind,
            span: Span::empty(offset),
            line,
            column,
            missing: true,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// 1-based line of the token start.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based byte column of the token start.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Whether this token was synthesized rather than read from the source.
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// The token's text within `source`.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.span.range()).unwrap_or("")
    }

    /// Same token, reclassified.
    pub(crate) fn with_kind(self, kind: TokenKind) -> Self {
        Self { kind, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (index, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), index, "{kind:?} out of order");
        }
        assert!(TokenKind::COUNT <= 64, "TokenSet is a u64 bitmask");
    }

    #[test]
    fn test_keyword_round_trip() {
        for kind in TokenKind::ALL.into_iter().filter(|k| k.is_keyword()) {
            let text = kind.static_text().expect("keywords have fixed text");
            assert_eq!(TokenKind::keyword(text), Some(kind));
        }
        assert_eq!(TokenKind::keyword("center_in"), Some(TokenKind::CenterIn));
        assert_eq!(TokenKind::keyword("rectangle"), None);
    }

    #[test]
    fn test_property_names() {
        assert!(TokenKind::W.is_property_name());
        assert!(TokenKind::Duration.is_property_name());
        assert!(!TokenKind::Anim.is_property_name());
        assert!(!TokenKind::Equals.is_property_name());
        let count = TokenKind::ALL
            .into_iter()
            .filter(|k| k.is_property_name())
            .count();
        assert_eq!(count, 20);
    }

    #[test]
    fn test_token_set() {
        let set: TokenSet = [TokenKind::RightBrace, TokenKind::Identifier].into_iter().collect();
        assert!(set.contains(TokenKind::Identifier));
        assert!(!set.contains(TokenKind::Number));
        assert_eq!(set.len(), 2);
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, vec![TokenKind::Identifier, TokenKind::RightBrace]);
    }

    #[test]
    fn test_token_text() {
        let source = "rect @box1";
        let token = Token::new(TokenKind::Identifier, Span::new(6..10), 1, 7);
        assert_eq!(token.text(source), "box1");
        assert!(!token.is_missing());

        let missing = Token::missing(TokenKind::Identifier, 10, 1, 11);
        assert_eq!(missing.text(source), "");
        assert!(missing.is_missing());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::RightBrace.to_string(), "`}`");
        assert_eq!(TokenKind::HexColor.to_string(), "hex_color");
    }
}
