//! The immutable syntax tree produced by a parse.
//!
//! Nodes own their children outright. Tokens do not own text; resolve it
//! against the source with [`SyntaxTree::text`] or [`Element::text`].
//! Named fields are resolved when a node is built and stored as child
//! indices, so [`Node::field`] is a lookup, not a search.

use std::{borrow::Cow, iter};

use crate::{
    error::{Diagnostic, ParseError},
    grammar::{Field, ProductionId, Rule},
    printer,
    span::Span,
    tokens::{Token, TokenKind},
};

/// A child of a node: either a nested node or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Token(Token),
}

impl Element {
    pub fn span(&self) -> Span {
        match self {
            Element::Node(node) => node.span(),
            Element::Token(token) => token.span(),
        }
    }

    /// The source text this element covers.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.span().range()).unwrap_or("")
    }

    /// Whether this is a placeholder inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        matches!(self, Element::Token(token) if token.is_missing())
    }

    /// Whether this element sits outside the grammar: a comment or an
    /// `ERROR` node.
    pub fn is_extra(&self) -> bool {
        match self {
            Element::Node(node) => node.is_error(),
            Element::Token(token) => token.kind().is_extra(),
        }
    }

    /// Nodes and source-dependent tokens are named; keywords and
    /// punctuation are not.
    pub fn is_named(&self) -> bool {
        match self {
            Element::Node(_) => true,
            Element::Token(token) => token.kind().is_named(),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Node(_) => None,
            Element::Token(token) => Some(token),
        }
    }

    /// Token kind, if this element is a token.
    pub fn token_kind(&self) -> Option<TokenKind> {
        self.as_token().map(Token::kind)
    }

    /// Node kind, if this element is a node.
    pub fn node_kind(&self) -> Option<Rule> {
        self.as_node().map(Node::kind)
    }
}

/// An interior node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: Rule,
    production: Option<ProductionId>,
    children: Vec<Element>,
    fields: Vec<(Field, usize)>,
    span: Span,
}

impl Node {
    pub(crate) fn new(
        kind: Rule,
        production: Option<ProductionId>,
        children: Vec<Element>,
        fields: Vec<(Field, usize)>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            production,
            children,
            fields,
            span,
        }
    }

    /// Build a node whose span covers its children, or is empty at
    /// `fallback` when there are none.
    pub(crate) fn spanning(
        kind: Rule,
        production: Option<ProductionId>,
        children: Vec<Element>,
        fields: Vec<(Field, usize)>,
        fallback: usize,
    ) -> Self {
        let span = children
            .iter()
            .map(Element::span)
            .reduce(|acc, span| acc.union(span))
            .unwrap_or_else(|| Span::empty(fallback));
        Self::new(kind, production, children, fields, span)
    }

    pub(crate) fn into_children(self) -> Vec<Element> {
        self.children
    }

    pub fn kind(&self) -> Rule {
        self.kind
    }

    /// The production that built this node. `None` for `ERROR` nodes and
    /// for a root assembled after the error budget ran out.
    pub fn production(&self) -> Option<ProductionId> {
        self.production
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Children other than extras and anonymous tokens.
    pub fn named_children(&self) -> impl Iterator<Item = &Element> {
        self.children
            .iter()
            .filter(|child| child.is_named() && !child.is_extra())
    }

    /// Child nodes, extras included.
    pub fn child_nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.children.iter().filter_map(Element::as_node)
    }

    /// The child bound to `field`.
    pub fn field(&self, field: Field) -> Option<&Element> {
        self.fields
            .iter()
            .find(|(bound, _)| *bound == field)
            .and_then(|&(_, index)| self.children.get(index))
    }

    /// The child bound to the field called `name`.
    pub fn child_by_field_name(&self, name: &str) -> Option<&Element> {
        Field::from_name(name).and_then(|field| self.field(field))
    }

    /// The field bound to the child at `index`, if any.
    pub fn field_of_child(&self, index: usize) -> Option<Field> {
        self.fields
            .iter()
            .find(|(_, bound)| *bound == index)
            .map(|&(field, _)| field)
    }

    /// Field bindings, in child order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &Element)> {
        let mut fields = self.fields.clone();
        fields.sort_by_key(|&(_, index)| index);
        fields
            .into_iter()
            .filter_map(move |(field, index)| self.children.get(index).map(|child| (field, child)))
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_error(&self) -> bool {
        self.kind == Rule::Error
    }

    /// Whether this node or any descendant is an `ERROR` node or a missing
    /// token.
    pub fn has_error(&self) -> bool {
        self.is_error()
            || self.children.iter().any(|child| match child {
                Element::Node(node) => node.has_error(),
                Element::Token(token) => token.is_missing() || token.kind() == TokenKind::Error,
            })
    }

    /// Text of a `string` node without its quotes.
    pub fn string_value<'src>(&self, source: &'src str) -> Option<&'src str> {
        if self.kind != Rule::String {
            return None;
        }
        let content = self
            .children
            .iter()
            .find(|child| child.token_kind() == Some(TokenKind::StringContent));
        Some(content.map_or("", |child| child.text(source)))
    }
}

/// Turn the `##` escape in annotation text into a literal `#`.
pub fn unescape_annotation_text(text: &str) -> Cow<'_, str> {
    if text.contains("##") {
        Cow::Owned(text.replace("##", "#"))
    } else {
        Cow::Borrowed(text)
    }
}

/// The result of a parse: the source, the root node and diagnostics.
#[derive(Debug, Clone)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    root: Node,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> SyntaxTree<'src> {
    pub(crate) fn new(source: &'src str, root: Node, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            source,
            root,
            diagnostics,
        }
    }

    /// The `document` node spanning the whole source.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Diagnostics in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn text(&self, element: &Element) -> &'src str {
        element.text(self.source)
    }

    /// Every node in pre-order, starting with the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![&self.root],
        }
    }

    /// The tree as an S-expression of named nodes and fields.
    pub fn to_sexp(&self) -> String {
        printer::to_sexp(&self.root)
    }

    /// The tree if the parse was clean, otherwise its diagnostics.
    pub fn into_result(self) -> Result<Self, ParseError> {
        if self.has_errors() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self)
        }
    }
}

/// Pre-order node iterator returned by [`SyntaxTree::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().rev());
        Some(node)
    }
}

impl iter::FusedIterator for Walk<'_> {}
