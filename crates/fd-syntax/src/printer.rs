//! Text renderings of a syntax tree.
//!
//! [`to_sexp`] gives a compact S-expression of named nodes and fields, the
//! form tests compare against. [`print`] re-renders a document in canonical
//! layout: one item per line, bodies indented by two spaces.

use crate::{
    grammar::Rule,
    tokens::TokenKind,
    tree::{Element, Node, SyntaxTree},
};

const INDENT: &str = "  ";

/// Render `node` as an S-expression.
///
/// Named nodes and named tokens appear as `(kind ...)`. Anonymous tokens
/// are left out unless a field binds them. Placeholders inserted by error
/// recovery render as `(MISSING kind)`.
///
/// ```
/// let tree = fd_syntax::parse("rect @a");
/// assert_eq!(
///     tree.to_sexp(),
///     "(document (node_declaration kind: (node_kind) id: (node_id name: (identifier))))"
/// );
/// ```
pub fn to_sexp(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    out.push('(');
    out.push_str(node.kind().name());
    for (index, child) in node.children().iter().enumerate() {
        let field = node.field_of_child(index);
        if !child.is_named() && !child.is_missing() && field.is_none() {
            continue;
        }

        out.push(' ');
        if let Some(field) = field {
            out.push_str(field.name());
            out.push_str(": ");
        }
        match child {
            Element::Node(node) => write_node(out, node),
            Element::Token(token) => {
                let kind = token.kind();
                let name = match kind.static_text() {
                    Some(text) => format!("\"{text}\""),
                    None => kind.name().to_string(),
                };
                if token.is_missing() {
                    out.push_str("(MISSING ");
                    out.push_str(&name);
                    out.push(')');
                } else if kind.is_named() {
                    out.push('(');
                    out.push_str(&name);
                    out.push(')');
                } else {
                    out.push_str(&name);
                }
            }
        }
    }
    out.push(')');
}

/// Re-render a document in canonical layout.
///
/// Parsing the output gives back the same tree, up to whitespace. Missing
/// tokens print as nothing and `ERROR` nodes print their source text.
/// Comments stay where they are in the tree and end their line.
pub fn print(tree: &SyntaxTree<'_>) -> String {
    let mut printer = Printer {
        source: tree.source(),
        out: String::new(),
        depth: 0,
    };
    printer.items(tree.root().children());
    printer.out
}

/// A run of inline output.
#[derive(Debug)]
struct Piece {
    text: String,
    /// No space before this piece.
    glued: bool,
    /// The line ends after this piece.
    breaks: bool,
}

struct Printer<'src> {
    source: &'src str,
    out: String,
    depth: usize,
}

impl<'src> Printer<'src> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.trim_end());
        self.out.push('\n');
    }

    /// Print items one per line. Pieces of unfinished constructs left
    /// behind by an abandoned parse are joined onto a single line.
    fn items(&mut self, items: &[Element]) {
        let mut stray = Vec::new();
        for item in items {
            let block = item.node_kind().filter(|kind| {
                matches!(kind, Rule::StyleBlock | Rule::NodeDeclaration | Rule::AnimBlock)
            });
            let whole = item.token_kind() == Some(TokenKind::Comment)
                || block.is_some()
                || item.node_kind().is_some_and(|kind| {
                    matches!(
                        kind,
                        Rule::Annotation | Rule::Property | Rule::ConstraintLine | Rule::Error
                    )
                });
            if !whole {
                self.pieces(item, false, &mut stray);
                continue;
            }

            self.finish(std::mem::take(&mut stray));
            match item {
                Element::Node(node) if block.is_some() => self.block(node),
                _ => {
                    let mut pieces = Vec::new();
                    self.pieces(item, false, &mut pieces);
                    self.finish(pieces);
                }
            }
        }
        self.finish(stray);
    }

    /// Lay out `pieces`, printing each line a comment ends. Returns the
    /// unfinished last line.
    fn flow(&mut self, pieces: Vec<Piece>) -> String {
        let mut current = String::new();
        for piece in pieces {
            if !current.is_empty() && !piece.glued {
                current.push(' ');
            }
            current.push_str(&piece.text);
            if piece.breaks {
                self.line(&current);
                current.clear();
            }
        }
        current
    }

    fn finish(&mut self, pieces: Vec<Piece>) {
        let rest = self.flow(pieces);
        if !rest.is_empty() {
            self.line(&rest);
        }
    }

    /// A header followed by an optional braced body.
    fn block(&mut self, node: &Node) {
        let children = node.children();
        let open = children
            .iter()
            .position(|child| child.token_kind() == Some(TokenKind::LeftBrace));
        let (head, body) = children.split_at(open.unwrap_or(children.len()));

        let mut pieces = Vec::new();
        self.children_pieces(node.kind(), head, &mut pieces);
        let header = self.flow(pieces);

        if open.is_none() {
            if !header.is_empty() {
                self.line(&header);
            }
            return;
        }

        let inner = match body {
            [_open, inner @ .., close] if close.token_kind() == Some(TokenKind::RightBrace) => inner,
            [_open, inner @ ..] => inner,
            [] => &[],
        };
        if inner.is_empty() {
            self.line(&after(&header, "{}"));
            return;
        }

        self.line(&after(&header, "{"));
        self.depth += 1;
        self.items(inner);
        self.depth -= 1;
        self.line("}");
    }

    /// Inline pieces of `element`; `glued` applies to its first piece.
    fn pieces(&self, element: &Element, glued: bool, out: &mut Vec<Piece>) {
        let start = out.len();
        match element {
            Element::Token(token) if token.is_missing() => {}
            Element::Token(token) => out.push(Piece {
                text: token.text(self.source).to_string(),
                glued,
                breaks: token.kind() == TokenKind::Comment,
            }),
            Element::Node(node) => match node.kind() {
                Rule::String => out.push(Piece {
                    text: format!("\"{}\"", node.string_value(self.source).unwrap_or_default()),
                    glued,
                    breaks: false,
                }),
                Rule::Error => {
                    let text = element.text(self.source).trim();
                    let count = text.lines().count();
                    for (index, line) in text.lines().enumerate() {
                        let line = line.trim();
                        out.push(Piece {
                            text: line.to_string(),
                            glued: false,
                            breaks: index + 1 < count || line.contains('#'),
                        });
                    }
                }
                kind => self.children_pieces(kind, node.children(), out),
            },
        }
        if let Some(first) = out.get_mut(start) {
            first.glued = glued;
        }
    }

    /// Pieces of the children of a `parent` node. `@` binds to what follows
    /// it, and `:` binds to what precedes it except in constraints.
    fn children_pieces(&self, parent: Rule, children: &[Element], out: &mut Vec<Piece>) {
        let mut previous = None;
        for child in children {
            let kind = child.token_kind();
            let glued = match parent {
                Rule::Annotation | Rule::NodeId => previous == Some(TokenKind::At),
                Rule::AnimBlock => kind == Some(TokenKind::Colon),
                Rule::KeyValuePair => {
                    kind == Some(TokenKind::Equals) || previous == Some(TokenKind::Equals)
                }
                _ => false,
            } || (parent == Rule::Annotation && kind == Some(TokenKind::Colon));
            self.pieces(child, glued, out);
            if !child.is_extra() {
                previous = kind;
            }
        }
    }
}

fn after(header: &str, tail: &str) -> String {
    if header.is_empty() {
        tail.to_string()
    } else {
        format!("{header} {tail}")
    }
}
