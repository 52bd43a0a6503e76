//! Shift-reduce parser engine.
//!
//! The engine drives the [`ParseTable`] one lookahead at a time, asking
//! the lexer for each token in the mode of the current state. Comments are
//! shifted as extras without a state change and end up in whichever node
//! encloses them.
//!
//! # Error recovery
//!
//! When the table has no action for the lookahead, the engine tries, in
//! order:
//!
//! 1. inserting one zero-width missing token the state expects, if the
//!    lookahead can be shifted right after it;
//! 2. panic mode: discarding stack entries and input tokens until some
//!    state on the stack accepts a token, and wrapping everything
//!    discarded in an `ERROR` node.
//!
//! Each recovery produces exactly one diagnostic. An optional error budget
//! caps the number of recoveries; once it is spent the rest of the input
//! goes into a single `ERROR` node.

use std::iter;

use log::{debug, trace};

use crate::{
    config::ParseConfig,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    grammar::{ProductionId, Rule},
    lexer::{LexMode, Lexer},
    span::Span,
    table::{Action, ParseTable, StateId},
    tokens::{Token, TokenKind, TokenSet},
    tree::{Element, Node, SyntaxTree},
};

/// What a stack entry holds.
#[derive(Debug)]
enum StackItem {
    Element(Element),
    /// Children of a reduced hidden rule, waiting to be spliced.
    Hidden(Vec<Element>),
}

impl StackItem {
    fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            StackItem::Element(element) => out.push(element),
            StackItem::Hidden(elements) => out.extend(elements),
        }
    }
}

#[derive(Debug)]
struct Entry {
    /// State after this entry. Extras repeat the state beneath them.
    state: StateId,
    item: StackItem,
    extra: bool,
}

/// Outcome of feeding one token to a copy of the state stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simulation {
    Shifted,
    Accepted,
    Rejected,
}

/// One parse in progress.
pub(crate) struct Parser<'src, 'cfg> {
    table: &'static ParseTable,
    config: &'cfg ParseConfig,
    lexer: Lexer<'src>,
    stack: Vec<Entry>,
    lookahead: Option<Token>,
    /// A real lookahead held back while an inserted token is processed.
    pending: Option<Token>,
    diagnostics: DiagnosticCollector,
    recoveries: usize,
}

impl<'src, 'cfg> Parser<'src, 'cfg> {
    pub(crate) fn new(source: &'src str, config: &'cfg ParseConfig) -> Self {
        Self {
            table: ParseTable::get(),
            config,
            lexer: Lexer::new(source),
            stack: Vec::new(),
            lookahead: None,
            pending: None,
            diagnostics: DiagnosticCollector::new(),
            recoveries: 0,
        }
    }

    /// Run the parse to completion.
    pub(crate) fn parse(mut self) -> SyntaxTree<'src> {
        loop {
            let token = self.next_lookahead();
            if token.kind().is_extra() {
                self.push_extra(Element::Token(token));
                self.lookahead = None;
                continue;
            }

            match self.table.action(self.state(), token.kind()) {
                Action::Shift(next) => self.shift(next, token),
                Action::Reduce(production) => self.reduce(production, token.span().start()),
                Action::Accept => break,
                Action::Error => {
                    if self
                        .config
                        .error_budget()
                        .is_some_and(|budget| self.recoveries >= budget)
                    {
                        self.abandon(token);
                        break;
                    }
                    self.recoveries += 1;
                    if !self.try_insert(token) {
                        self.discard(token);
                    }
                }
            }
        }

        self.into_tree()
    }

    fn state(&self) -> StateId {
        self.stack.last().map_or(StateId::START, |entry| entry.state)
    }

    /// The state stack without extras, start state first.
    fn states(&self) -> Vec<StateId> {
        iter::once(StateId::START)
            .chain(
                self.stack
                    .iter()
                    .filter(|entry| !entry.extra)
                    .map(|entry| entry.state),
            )
            .collect()
    }

    fn next_lookahead(&mut self) -> Token {
        if let Some(token) = self.lookahead {
            return token;
        }
        let token = match self.pending.take() {
            Some(token) => token,
            None => {
                let state = self.state();
                self.lexer
                    .next_token(self.table.lex_mode(state), &self.table.expected(state))
            }
        };
        self.lookahead = Some(token);
        token
    }

    fn shift(&mut self, next: StateId, token: Token) {
        trace!(state:% = next, kind:? = token.kind(); "Shift");
        self.stack.push(Entry {
            state: next,
            item: StackItem::Element(Element::Token(token)),
            extra: false,
        });
        self.lookahead = None;
    }

    fn push_extra(&mut self, element: Element) {
        let state = self.state();
        self.stack.push(Entry {
            state,
            item: StackItem::Element(element),
            extra: true,
        });
    }

    /// Pop entries until `count` non-extra entries are off the stack,
    /// returned in stack order.
    fn pop_entries(&mut self, count: usize, context: &dyn Fn() -> String) -> Vec<Entry> {
        let mut taken = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            let Some(entry) = self.stack.pop() else {
                panic!("parse stack underflow in state {}: {}", self.state(), context());
            };
            if !entry.extra {
                remaining -= 1;
            }
            taken.push(entry);
        }
        taken.reverse();
        taken
    }

    fn reduce(&mut self, id: ProductionId, offset: usize) {
        let production = id.production();

        // Extras above the last rhs entry stay outside the new node
        let mut trailing = Vec::new();
        while self.stack.last().is_some_and(|entry| entry.extra) {
            trailing.extend(self.stack.pop());
        }

        let taken = self.pop_entries(production.rhs.len(), &|| format!("reducing {production}"));

        // Element range of each rhs position after splicing
        let mut children = Vec::new();
        let mut ranges = Vec::with_capacity(production.rhs.len());
        for entry in taken {
            let start = children.len();
            entry.item.flatten_into(&mut children);
            if !entry.extra {
                ranges.push(start..children.len());
            }
        }
        let fields = production
            .fields
            .iter()
            .filter_map(|&(field, position)| {
                let range = ranges.get(position)?;
                (!range.is_empty()).then_some((field, range.start))
            })
            .collect();

        let state = self.state();
        let Some(next) = self.table.goto(state, production.lhs) else {
            panic!("no goto on `{}` from state {state}", production.lhs);
        };

        let item = if production.lhs.is_hidden() {
            StackItem::Hidden(children)
        } else {
            StackItem::Element(Element::Node(Node::spanning(
                production.lhs,
                Some(id),
                children,
                fields,
                offset,
            )))
        };
        trace!(production:% = production, state:% = next; "Reduce");
        self.stack.push(Entry {
            state: next,
            item,
            extra: false,
        });

        for mut entry in trailing.into_iter().rev() {
            entry.state = next;
            self.stack.push(entry);
        }
    }

    /// Feed `kind` to a copy of the state stack, reducing as needed.
    fn simulate(&self, states: &mut Vec<StateId>, kind: TokenKind) -> Simulation {
        loop {
            let Some(&top) = states.last() else {
                return Simulation::Rejected;
            };
            match self.table.action(top, kind) {
                Action::Shift(next) => {
                    states.push(next);
                    return Simulation::Shifted;
                }
                Action::Accept => return Simulation::Accepted,
                Action::Error => return Simulation::Rejected,
                Action::Reduce(id) => {
                    let production = id.production();
                    let len = production.rhs.len();
                    if len >= states.len() {
                        return Simulation::Rejected;
                    }
                    states.truncate(states.len() - len);
                    let Some(next) = states
                        .last()
                        .and_then(|&state| self.table.goto(state, production.lhs))
                    else {
                        return Simulation::Rejected;
                    };
                    states.push(next);
                }
            }
        }
    }

    fn accepts(&self, states: &[StateId], kind: TokenKind) -> bool {
        self.simulate(&mut states.to_vec(), kind) != Simulation::Rejected
    }

    /// Recover by inserting a missing token in front of `lookahead`.
    ///
    /// The lookahead is read again in the mode of the state the inserted
    /// token leads to, since keyword gating may have read it differently.
    /// An insertion that would turn it into free annotation text is never
    /// taken; stray tokens are left to panic mode.
    fn try_insert(&mut self, lookahead: Token) -> bool {
        let state = self.state();
        let states = self.states();

        let mut chosen = None;
        for kind in self.table.expected(state).iter() {
            if kind == TokenKind::End {
                continue;
            }
            let mut after = states.clone();
            if self.simulate(&mut after, kind) != Simulation::Shifted {
                continue;
            }
            let resumed = self.reread(lookahead, &after).unwrap_or(lookahead);
            let swallowed = resumed.kind() == TokenKind::AnnotationText
                && lookahead.kind() != TokenKind::AnnotationText;
            if !swallowed && self.accepts(&after, resumed.kind()) {
                chosen = Some((kind, resumed));
                break;
            }
        }

        let Some((kind, resumed)) = chosen else {
            self.rewind_to_end(lookahead);
            return false;
        };
        if resumed == lookahead {
            self.rewind_to_end(lookahead);
        }
        self.insert(kind, lookahead, resumed);
        true
    }

    /// Put the lexer back just past `token` after trial rereads.
    fn rewind_to_end(&mut self, token: Token) {
        if !token.is_missing() && self.lexer.offset() != token.span().end() {
            self.lexer.reset(token.span().end());
        }
    }

    fn insert(&mut self, kind: TokenKind, lookahead: Token, resumed: Token) {
        debug!(
            state:% = self.state(),
            inserted:? = kind,
            lookahead:? = resumed.kind();
            "Recovered by inserting a missing token"
        );
        let missing = Token::missing(
            kind,
            lookahead.span().start(),
            lookahead.line(),
            lookahead.column(),
        );
        self.diagnostics.emit(
            Diagnostic::error(format!("expected {kind}, found {}", lookahead.kind()))
                .with_code(ErrorCode::E101)
                .with_label(missing.span(), format!("{kind} missing here")),
        );

        self.pending = Some(resumed);
        self.lookahead = Some(missing);
    }

    /// Read `token` again as the state on top of `states` would lex it,
    /// leaving the lexer just past the new token.
    ///
    /// Returns `None`, without touching the lexer, for tokens whose reading
    /// cannot depend on the state.
    fn reread(&mut self, token: Token, states: &[StateId]) -> Option<Token> {
        let &state = states.last()?;
        let mode = self.table.lex_mode(state);
        if token.is_missing()
            || matches!(token.kind(), TokenKind::End | TokenKind::Error)
            || mode == LexMode::StringBody
        {
            return None;
        }

        let start = token.span().start();
        self.lexer.reset(start);
        let reread = self.lexer.next_token(mode, &self.table.expected(state));
        (reread.span().start() == start && !reread.kind().is_extra()).then_some(reread)
    }

    /// Panic-mode recovery: skip input and pop the stack until they fit.
    fn discard(&mut self, first: Token) {
        let expected = self.table.expected(self.state());
        let states = self.states();

        let mut skipped = Vec::new();
        let mut token = first;
        let pops = loop {
            if let Some(pops) = self.sync_depth(&states, token) {
                break pops;
            }
            skipped.push(token);
            token = self.lexer.next_token(LexMode::Recovery, &TokenSet::EMPTY);
        };

        let resumed = &states[..states.len() - pops];
        if !skipped.is_empty() {
            token = self.relex(token, resumed);
        }
        if !self.accepts(resumed, token.kind()) {
            token = token.with_kind(TokenKind::Identifier);
        }

        let popped = self.pop_entries(pops, &|| "discarding input".to_string());
        let mut children = Vec::new();
        for entry in popped {
            entry.item.flatten_into(&mut children);
        }
        children.extend(skipped.iter().copied().map(Element::Token));

        debug!(
            popped = pops,
            skipped = skipped.len(),
            resume:? = token.kind();
            "Recovered by discarding input"
        );
        let diagnostic = self.discard_diagnostic(first, &skipped, &children, expected);
        self.diagnostics.emit(diagnostic);

        if !children.is_empty() {
            let error = Node::spanning(Rule::Error, None, children, Vec::new(), first.span().start());
            self.push_extra(Element::Node(error));
        }
        self.lookahead = Some(token);
    }

    /// How many non-extra entries to pop before some state accepts
    /// `token`, or `None` if no state on the stack does.
    ///
    /// A keyword also fits where an identifier is expected. `End` always
    /// fits once the stack is empty.
    fn sync_depth(&self, states: &[StateId], token: Token) -> Option<usize> {
        if token.kind().is_extra() || token.kind() == TokenKind::Error {
            return None;
        }
        (0..states.len()).find(|&pops| {
            let resumed = &states[..states.len() - pops];
            self.accepts(resumed, token.kind())
                || (token.kind().is_keyword() && self.accepts(resumed, TokenKind::Identifier))
        })
    }

    /// Re-read a token found in recovery mode using the mode of the state
    /// that will consume it, keeping the recovery reading if that fails.
    fn relex(&mut self, token: Token, states: &[StateId]) -> Token {
        if token.is_missing() || token.kind() == TokenKind::End {
            return token;
        }
        match self.reread(token, states) {
            Some(reread) if self.accepts(states, reread.kind()) => reread,
            _ => {
                self.lexer.reset(token.span().start());
                self.lexer.next_token(LexMode::Recovery, &TokenSet::EMPTY)
            }
        }
    }

    fn discard_diagnostic(
        &self,
        first: Token,
        skipped: &[Token],
        discarded: &[Element],
        expected: TokenSet,
    ) -> Diagnostic {
        let source = self.lexer.source();

        if first.kind() == TokenKind::Error {
            let span = skipped
                .iter()
                .map(Token::span)
                .fold(first.span(), |acc, span| acc.union(span));
            return Diagnostic::error(format!("unexpected character `{}`", first.text(source)))
                .with_code(ErrorCode::E002)
                .with_label(span, "not valid here");
        }

        let found = if first.kind().is_named() && !first.text(source).is_empty() {
            format!("{} `{}`", first.kind().name(), first.text(source))
        } else {
            first.kind().to_string()
        };
        let mut diagnostic = Diagnostic::error(format!(
            "expected {}, found {found}",
            describe_expected(expected)
        ))
        .with_code(ErrorCode::E100);

        match discarded
            .iter()
            .map(Element::span)
            .reduce(|acc, span| acc.union(span))
        {
            Some(span) if skipped.is_empty() => {
                diagnostic = diagnostic
                    .with_label(first.span(), "unexpected here")
                    .with_secondary_label(span, "discarded");
            }
            Some(span) => diagnostic = diagnostic.with_label(span, "skipped"),
            None => diagnostic = diagnostic.with_label(first.span(), "unexpected here"),
        }
        diagnostic
    }

    /// Give up: everything from `token` on goes into one `ERROR` node.
    fn abandon(&mut self, token: Token) {
        let budget = self.config.error_budget().unwrap_or_default();
        let source_len = self.lexer.source().len();
        let start = token.span().start();

        let mut children = Vec::new();
        let mut next = Some(token);
        let mut pending = self.pending.take();
        while let Some(token) = next.filter(|token| token.kind() != TokenKind::End) {
            if !token.is_missing() {
                children.push(Element::Token(token));
            }
            next = Some(
                pending
                    .take()
                    .unwrap_or_else(|| self.lexer.next_token(LexMode::Recovery, &TokenSet::EMPTY)),
            );
        }

        debug!(budget, unparsed = source_len - start; "Error budget exhausted");
        self.diagnostics.emit(
            Diagnostic::error(format!("too many syntax errors, stopped after {budget}"))
                .with_code(ErrorCode::E102)
                .with_label(Span::new(start..source_len), "not parsed")
                .with_help("raise the error budget to see further diagnostics"),
        );

        if !children.is_empty() {
            let error = Node::spanning(Rule::Error, None, children, Vec::new(), start);
            self.push_extra(Element::Node(error));
        }
        self.lookahead = None;
    }

    /// Assemble the root from whatever the stack holds.
    fn into_tree(self) -> SyntaxTree<'src> {
        let Parser {
            lexer,
            stack,
            diagnostics: mut collector,
            recoveries,
            ..
        } = self;
        let source = lexer.source();

        let mut production = None;
        let mut children = Vec::new();
        for entry in stack {
            match entry.item {
                StackItem::Element(Element::Node(node))
                    if !entry.extra && node.kind() == Rule::Document =>
                {
                    production = node.production();
                    children.extend(node.into_children());
                }
                item => item.flatten_into(&mut children),
            }
        }
        let root = Node::new(
            Rule::Document,
            production,
            children,
            Vec::new(),
            Span::new(0..source.len()),
        );

        for diagnostic in lexer.into_diagnostics() {
            collector.emit(diagnostic);
        }
        let diagnostics = collector.finish();
        trace!(
            bytes = source.len(),
            recoveries,
            diagnostics = diagnostics.len();
            "Parsed document"
        );

        SyntaxTree::new(source, root, diagnostics)
    }
}

/// Human-readable list of expected token kinds.
fn describe_expected(expected: TokenSet) -> String {
    let kinds: Vec<String> = expected.iter().map(|kind| kind.to_string()).collect();
    match kinds.as_slice() {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] if init.len() < 4 => format!("{} or {last}", init.join(", ")),
        [first, second, third, rest @ ..] => {
            format!("one of {first}, {second}, {third} and {} more", rest.len())
        }
        _ => kinds.join(", "),
    }
}
