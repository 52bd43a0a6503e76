//! The LR(1) parse table.
//!
//! The table is built from [`PRODUCTIONS`] by the canonical LR(1)
//! construction the first time it is needed, then shared read-only by every
//! parse in the process ([`ParseTable::get`]).
//!
//! States are numbered in discovery order; kernels are interned in an
//! insertion-ordered set so the numbering is the same on every build.
//! Conflicts are resolved while building:
//!
//! - shift/reduce: shift wins, so constructs extend as far as they can;
//! - reduce/reduce: the production declared first wins.
//!
//! Every resolution is recorded in [`ParseTable::conflicts`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::LazyLock,
};

use indexmap::IndexSet;
use log::debug;

use crate::{
    grammar::{Grammar, PRODUCTIONS, Production, ProductionId, Rule, Symbol},
    lexer::LexMode,
    tokens::{TokenKind, TokenSet},
};

static TABLE: LazyLock<ParseTable> = LazyLock::new(ParseTable::build);

/// An automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    /// The state the automaton starts in.
    pub const START: StateId = StateId(0);

    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// What the automaton does in a state on a lookahead token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
    Error,
}

/// A table cell that had more than one candidate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: TokenKind,
    pub chosen: Action,
    pub discarded: Action,
}

/// An LR(1) item: a production, a position in its rhs, and a lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    production: usize,
    dot: usize,
    lookahead: TokenKind,
}

impl Item {
    fn production(&self) -> &'static Production {
        &PRODUCTIONS[self.production]
    }

    fn next_symbol(&self) -> Option<Symbol> {
        self.production().rhs.get(self.dot).copied()
    }

    fn advance(self) -> Item {
        Item {
            dot: self.dot + 1,
            ..self
        }
    }
}

/// Nullability and FIRST sets of every rule.
struct FirstSets {
    nullable: [bool; Rule::COUNT],
    first: [TokenSet; Rule::COUNT],
}

impl FirstSets {
    fn compute(productions: &[Production]) -> Self {
        let mut sets = Self {
            nullable: [false; Rule::COUNT],
            first: [TokenSet::EMPTY; Rule::COUNT],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                let lhs = production.lhs.index();

                let mut first = sets.first[lhs];
                let mut nullable = true;
                for symbol in production.rhs {
                    match symbol {
                        Symbol::Token(kind) => {
                            first.insert(*kind);
                            nullable = false;
                        }
                        Symbol::Rule(rule) => {
                            first = first.union(sets.first[rule.index()]);
                            nullable = sets.nullable[rule.index()];
                        }
                    }
                    if !nullable {
                        break;
                    }
                }

                if first != sets.first[lhs] || (nullable && !sets.nullable[lhs]) {
                    sets.first[lhs] = first;
                    sets.nullable[lhs] |= nullable;
                    changed = true;
                }
            }
        }

        sets
    }

    /// FIRST of `symbols` followed by `lookahead`.
    fn of_sequence(&self, symbols: &[Symbol], lookahead: TokenKind) -> TokenSet {
        let mut set = TokenSet::EMPTY;
        for symbol in symbols {
            match symbol {
                Symbol::Token(kind) => {
                    set.insert(*kind);
                    return set;
                }
                Symbol::Rule(rule) => {
                    set = set.union(self.first[rule.index()]);
                    if !self.nullable[rule.index()] {
                        return set;
                    }
                }
            }
        }
        set.insert(lookahead);
        set
    }

    fn closure(&self, kernel: &BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = kernel.clone();
        let mut pending: Vec<Item> = kernel.iter().copied().collect();

        while let Some(item) = pending.pop() {
            let rhs = item.production().rhs;
            let Some(Symbol::Rule(rule)) = rhs.get(item.dot) else {
                continue;
            };
            let lookaheads = self.of_sequence(&rhs[item.dot + 1..], item.lookahead);
            for id in Grammar::productions_for(*rule) {
                for lookahead in lookaheads.iter() {
                    let derived = Item {
                        production: id.index(),
                        dot: 0,
                        lookahead,
                    };
                    if items.insert(derived) {
                        pending.push(derived);
                    }
                }
            }
        }

        items
    }
}

/// Dense action and goto tables plus per-state lexing information.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseTable {
    actions: Vec<Action>,
    gotos: Vec<Option<StateId>>,
    expected: Vec<TokenSet>,
    modes: Vec<LexMode>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    /// The process-wide table, built on first use.
    pub fn get() -> &'static ParseTable {
        &TABLE
    }

    /// Run the LR(1) construction over [`PRODUCTIONS`].
    pub fn build() -> ParseTable {
        let first = FirstSets::compute(PRODUCTIONS);

        let mut kernels: IndexSet<BTreeSet<Item>> = IndexSet::new();
        kernels.insert(BTreeSet::from([Item {
            production: 0,
            dot: 0,
            lookahead: TokenKind::End,
        }]));

        let mut table = ParseTable {
            actions: Vec::new(),
            gotos: Vec::new(),
            expected: Vec::new(),
            modes: Vec::new(),
            conflicts: Vec::new(),
        };

        let mut index = 0;
        while index < kernels.len() {
            let state = StateId::new(index);
            let items = first.closure(&kernels[index]);

            let mut row = [Action::Error; TokenKind::COUNT];
            let mut goto_row = [None; Rule::COUNT];

            let mut transitions: BTreeMap<Symbol, BTreeSet<Item>> = BTreeMap::new();
            let mut reductions = Vec::new();
            for item in &items {
                match item.next_symbol() {
                    Some(symbol) => {
                        transitions.entry(symbol).or_default().insert(item.advance());
                    }
                    None => reductions.push(*item),
                }
            }

            for (symbol, kernel) in transitions {
                let (target, _) = kernels.insert_full(kernel);
                let target = StateId::new(target);
                match symbol {
                    Symbol::Token(kind) => row[kind.index()] = Action::Shift(target),
                    Symbol::Rule(rule) => goto_row[rule.index()] = Some(target),
                }
            }

            for item in reductions {
                let action = if item.production == 0 {
                    Action::Accept
                } else {
                    Action::Reduce(ProductionId::new(item.production))
                };
                let slot = &mut row[item.lookahead.index()];
                let (chosen, discarded) = match (*slot, action) {
                    (Action::Error, _) => (action, None),
                    (Action::Reduce(kept), Action::Reduce(new)) if new < kept => {
                        (action, Some(*slot))
                    }
                    _ => (*slot, Some(action)),
                };
                *slot = chosen;
                if let Some(discarded) = discarded {
                    table.conflicts.push(Conflict {
                        state,
                        lookahead: item.lookahead,
                        chosen,
                        discarded,
                    });
                }
            }

            let expected: TokenSet = TokenKind::ALL
                .into_iter()
                .filter(|kind| row[kind.index()] != Action::Error)
                .collect();
            table.expected.push(expected);
            table.modes.push(LexMode::for_expected(&expected));
            table.actions.extend(row);
            table.gotos.extend(goto_row);

            index += 1;
        }

        debug!(
            states = table.state_count(),
            conflicts = table.conflicts.len();
            "Built parse table"
        );
        for conflict in &table.conflicts {
            debug!(
                state:% = conflict.state,
                lookahead:? = conflict.lookahead,
                chosen:? = conflict.chosen,
                discarded:? = conflict.discarded;
                "Resolved parse table conflict"
            );
        }

        table
    }

    pub fn state_count(&self) -> usize {
        self.expected.len()
    }

    pub fn action(&self, state: StateId, lookahead: TokenKind) -> Action {
        self.actions[state.index() * TokenKind::COUNT + lookahead.index()]
    }

    pub fn goto(&self, state: StateId, rule: Rule) -> Option<StateId> {
        self.gotos[state.index() * Rule::COUNT + rule.index()]
    }

    /// Token kinds with a non-error action in `state`.
    pub fn expected(&self, state: StateId) -> TokenSet {
        self.expected[state.index()]
    }

    /// The lexer mode for reading a lookahead in `state`.
    pub fn lex_mode(&self, state: StateId) -> LexMode {
        self.modes[state.index()]
    }

    /// Conflicts resolved while building, in discovery order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
