//! The fd grammar: rules, productions and field bindings.
//!
//! Productions are process-wide constant data. Their declaration order is
//! significant: [`ProductionId`] is the index into [`PRODUCTIONS`], and the
//! parse table breaks reduce/reduce ties in favor of the earlier production.
//!
//! Rules marked hidden ([`Rule::is_hidden`]) never appear in the syntax
//! tree. List repetitions and alternation wrappers are hidden; when one is
//! reduced, its children are spliced into the enclosing node.

use std::fmt;

use thiserror::Error;

use crate::tokens::TokenKind;

/// Non-terminal symbols of the grammar, plus [`Rule::Error`] for the nodes
/// error recovery creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    Start,
    Document,
    DocumentItems,
    DocumentItem,
    Annotation,
    AnnotationKeyword,
    StyleBlock,
    Properties,
    NodeDeclaration,
    NodeBody,
    NodeBodyItems,
    NodeBodyItem,
    NodeKind,
    NodeId,
    Property,
    PropertyName,
    Value,
    ValueItems,
    ValueItem,
    KeyValuePair,
    AnimBlock,
    AnimTrigger,
    ConstraintLine,
    NodeRef,
    String,
    Error,
}

impl Rule {
    /// Number of rules, [`Rule::Error`] included.
    pub const COUNT: usize = Rule::Error as usize + 1;

    pub const ALL: [Rule; Rule::COUNT] = [
        Rule::Start,
        Rule::Document,
        Rule::DocumentItems,
        Rule::DocumentItem,
        Rule::Annotation,
        Rule::AnnotationKeyword,
        Rule::StyleBlock,
        Rule::Properties,
        Rule::NodeDeclaration,
        Rule::NodeBody,
        Rule::NodeBodyItems,
        Rule::NodeBodyItem,
        Rule::NodeKind,
        Rule::NodeId,
        Rule::Property,
        Rule::PropertyName,
        Rule::Value,
        Rule::ValueItems,
        Rule::ValueItem,
        Rule::KeyValuePair,
        Rule::AnimBlock,
        Rule::AnimTrigger,
        Rule::ConstraintLine,
        Rule::NodeRef,
        Rule::String,
        Rule::Error,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in S-expressions.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Start => "start",
            Rule::Document => "document",
            Rule::DocumentItems => "document_items",
            Rule::DocumentItem => "document_item",
            Rule::Annotation => "annotation",
            Rule::AnnotationKeyword => "annotation_keyword",
            Rule::StyleBlock => "style_block",
            Rule::Properties => "properties",
            Rule::NodeDeclaration => "node_declaration",
            Rule::NodeBody => "node_body",
            Rule::NodeBodyItems => "node_body_items",
            Rule::NodeBodyItem => "node_body_item",
            Rule::NodeKind => "node_kind",
            Rule::NodeId => "node_id",
            Rule::Property => "property",
            Rule::PropertyName => "property_name",
            Rule::Value => "value",
            Rule::ValueItems => "value_items",
            Rule::ValueItem => "value_item",
            Rule::KeyValuePair => "key_value_pair",
            Rule::AnimBlock => "anim_block",
            Rule::AnimTrigger => "anim_trigger",
            Rule::ConstraintLine => "constraint_line",
            Rule::NodeRef => "node_ref",
            Rule::String => "string",
            Rule::Error => "ERROR",
        }
    }

    /// Whether nodes of this rule are spliced into their parent.
    pub fn is_hidden(self) -> bool {
        matches!(
            self,
            Rule::DocumentItems
                | Rule::DocumentItem
                | Rule::Properties
                | Rule::NodeBody
                | Rule::NodeBodyItems
                | Rule::NodeBodyItem
                | Rule::Value
                | Rule::ValueItems
                | Rule::ValueItem
                | Rule::NodeRef
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grammar symbol: a terminal token kind or a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Token(TokenKind),
    Rule(Rule),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Token(kind) => write!(f, "{kind}"),
            Symbol::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

/// Named roles a child can play within its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Kind,
    Id,
    Name,
    Key,
    Value,
    InlineText,
    Trigger,
    Source,
    Target,
    ConstraintType,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Kind,
        Field::Id,
        Field::Name,
        Field::Key,
        Field::Value,
        Field::InlineText,
        Field::Trigger,
        Field::Source,
        Field::Target,
        Field::ConstraintType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Kind => "kind",
            Field::Id => "id",
            Field::Name => "name",
            Field::Key => "key",
            Field::Value => "value",
            Field::InlineText => "inline_text",
            Field::Trigger => "trigger",
            Field::Source => "source",
            Field::Target => "target",
            Field::ConstraintType => "constraint_type",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a production in [`PRODUCTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(u32);

impl ProductionId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The production this id names.
    pub fn production(self) -> &'static Production {
        &PRODUCTIONS[self.index()]
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// One alternative of a rule, with its field bindings.
///
/// Field indices refer to positions in `rhs`, before hidden children are
/// spliced.
#[derive(Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: Rule,
    pub rhs: &'static [Symbol],
    pub fields: &'static [(Field, usize)],
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :=", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " ε")?;
        }
        for symbol in self.rhs {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

use Field as F;
use Rule as R;
use Symbol::{Rule as N, Token as T};
use TokenKind as K;

const fn p(lhs: Rule, rhs: &'static [Symbol], fields: &'static [(Field, usize)]) -> Production {
    Production { lhs, rhs, fields }
}

/// All productions, in declaration order. Production 0 is the start rule.
pub static PRODUCTIONS: &[Production] = &[
    p(R::Start, &[N(R::Document)], &[]),
    // Document
    p(R::Document, &[], &[]),
    p(R::Document, &[N(R::DocumentItems)], &[]),
    p(R::DocumentItems, &[N(R::DocumentItem)], &[]),
    p(R::DocumentItems, &[N(R::DocumentItems), N(R::DocumentItem)], &[]),
    p(R::DocumentItem, &[N(R::Annotation)], &[]),
    p(R::DocumentItem, &[N(R::StyleBlock)], &[]),
    p(R::DocumentItem, &[N(R::NodeDeclaration)], &[]),
    p(R::DocumentItem, &[N(R::ConstraintLine)], &[]),
    // Annotations
    p(
        R::Annotation,
        &[T(K::At), N(R::AnnotationKeyword), N(R::String)],
        &[(F::Kind, 1), (F::Value, 2)],
    ),
    p(
        R::Annotation,
        &[T(K::At), N(R::AnnotationKeyword), T(K::Colon), N(R::String)],
        &[(F::Kind, 1), (F::Value, 3)],
    ),
    p(
        R::Annotation,
        &[T(K::At), N(R::AnnotationKeyword), T(K::AnnotationText)],
        &[(F::Kind, 1), (F::InlineText, 2)],
    ),
    p(
        R::Annotation,
        &[
            T(K::At),
            N(R::AnnotationKeyword),
            T(K::Colon),
            T(K::AnnotationText),
        ],
        &[(F::Kind, 1), (F::InlineText, 3)],
    ),
    p(R::Annotation, &[T(K::At), N(R::String)], &[(F::Kind, 0), (F::Value, 1)]),
    p(
        R::Annotation,
        &[T(K::At), T(K::AnnotationText)],
        &[(F::Kind, 0), (F::InlineText, 1)],
    ),
    p(R::AnnotationKeyword, &[T(K::Accept)], &[]),
    p(R::AnnotationKeyword, &[T(K::Status)], &[]),
    p(R::AnnotationKeyword, &[T(K::Priority)], &[]),
    p(R::AnnotationKeyword, &[T(K::Tag)], &[]),
    // Styles
    p(
        R::StyleBlock,
        &[
            T(K::Style),
            T(K::Identifier),
            T(K::LeftBrace),
            T(K::RightBrace),
        ],
        &[(F::Name, 1)],
    ),
    p(
        R::StyleBlock,
        &[
            T(K::Style),
            T(K::Identifier),
            T(K::LeftBrace),
            N(R::Properties),
            T(K::RightBrace),
        ],
        &[(F::Name, 1)],
    ),
    p(R::Properties, &[N(R::Property)], &[]),
    p(R::Properties, &[N(R::Properties), N(R::Property)], &[]),
    // Nodes
    p(
        R::NodeDeclaration,
        &[N(R::NodeKind), N(R::NodeId)],
        &[(F::Kind, 0), (F::Id, 1)],
    ),
    p(
        R::NodeDeclaration,
        &[N(R::NodeKind), N(R::NodeId), N(R::NodeBody)],
        &[(F::Kind, 0), (F::Id, 1)],
    ),
    p(
        R::NodeDeclaration,
        &[N(R::NodeKind), N(R::NodeId), N(R::String)],
        &[(F::Kind, 0), (F::Id, 1), (F::InlineText, 2)],
    ),
    p(
        R::NodeDeclaration,
        &[
            N(R::NodeKind),
            N(R::NodeId),
            N(R::String),
            N(R::NodeBody),
        ],
        &[(F::Kind, 0), (F::Id, 1), (F::InlineText, 2)],
    ),
    p(
        R::NodeDeclaration,
        &[N(R::NodeKind), N(R::NodeBody)],
        &[(F::Kind, 0)],
    ),
    p(
        R::NodeDeclaration,
        &[N(R::NodeKind), N(R::String), N(R::NodeBody)],
        &[(F::Kind, 0), (F::InlineText, 1)],
    ),
    p(R::NodeBody, &[T(K::LeftBrace), T(K::RightBrace)], &[]),
    p(
        R::NodeBody,
        &[
            T(K::LeftBrace),
            N(R::NodeBodyItems),
            T(K::RightBrace),
        ],
        &[],
    ),
    p(R::NodeBodyItems, &[N(R::NodeBodyItem)], &[]),
    p(R::NodeBodyItems, &[N(R::NodeBodyItems), N(R::NodeBodyItem)], &[]),
    p(R::NodeBodyItem, &[N(R::Annotation)], &[]),
    p(R::NodeBodyItem, &[N(R::NodeDeclaration)], &[]),
    p(R::NodeBodyItem, &[N(R::Property)], &[]),
    p(R::NodeBodyItem, &[N(R::AnimBlock)], &[]),
    p(R::NodeKind, &[T(K::Group)], &[]),
    p(R::NodeKind, &[T(K::Rect)], &[]),
    p(R::NodeKind, &[T(K::Ellipse)], &[]),
    p(R::NodeKind, &[T(K::Path)], &[]),
    p(R::NodeKind, &[T(K::Text)], &[]),
    p(R::NodeId, &[T(K::At), T(K::Identifier)], &[(F::Name, 1)]),
    // Properties
    p(
        R::Property,
        &[N(R::PropertyName), T(K::Equals), N(R::Value)],
        &[(F::Name, 0), (F::Value, 2)],
    ),
    p(
        R::Property,
        &[
            N(R::PropertyName),
            T(K::Equals),
            N(R::Value),
            N(R::ValueItems),
        ],
        &[(F::Name, 0), (F::Value, 2)],
    ),
    p(R::PropertyName, &[T(K::W)], &[]),
    p(R::PropertyName, &[T(K::H)], &[]),
    p(R::PropertyName, &[T(K::Width)], &[]),
    p(R::PropertyName, &[T(K::Height)], &[]),
    p(R::PropertyName, &[T(K::Fill)], &[]),
    p(R::PropertyName, &[T(K::Stroke)], &[]),
    p(R::PropertyName, &[T(K::Corner)], &[]),
    p(R::PropertyName, &[T(K::Opacity)], &[]),
    p(R::PropertyName, &[T(K::Font)], &[]),
    p(R::PropertyName, &[T(K::Bg)], &[]),
    p(R::PropertyName, &[T(K::Use)], &[]),
    p(R::PropertyName, &[T(K::Layout)], &[]),
    p(R::PropertyName, &[T(K::Shadow)], &[]),
    p(R::PropertyName, &[T(K::Scale)], &[]),
    p(R::PropertyName, &[T(K::Rotate)], &[]),
    p(R::PropertyName, &[T(K::Translate)], &[]),
    p(R::PropertyName, &[T(K::CenterIn)], &[]),
    p(R::PropertyName, &[T(K::Offset)], &[]),
    p(R::PropertyName, &[T(K::Ease)], &[]),
    p(R::PropertyName, &[T(K::Duration)], &[]),
    p(R::Value, &[T(K::Identifier)], &[]),
    p(R::Value, &[T(K::Number)], &[]),
    p(R::Value, &[T(K::HexColor)], &[]),
    p(R::Value, &[N(R::String)], &[]),
    p(R::Value, &[N(R::NodeId)], &[]),
    // Trailing values never start with `@`, which begins the next annotation
    p(R::ValueItems, &[N(R::ValueItem)], &[]),
    p(R::ValueItems, &[N(R::ValueItems), N(R::ValueItem)], &[]),
    p(R::ValueItem, &[T(K::Identifier)], &[]),
    p(R::ValueItem, &[T(K::Number)], &[]),
    p(R::ValueItem, &[T(K::HexColor)], &[]),
    p(R::ValueItem, &[N(R::String)], &[]),
    p(R::ValueItem, &[N(R::KeyValuePair)], &[]),
    p(
        R::KeyValuePair,
        &[T(K::Identifier), T(K::Equals), N(R::Value)],
        &[(F::Key, 0), (F::Value, 2)],
    ),
    // Animation
    p(
        R::AnimBlock,
        &[
            T(K::Anim),
            T(K::Colon),
            N(R::AnimTrigger),
            T(K::LeftBrace),
            T(K::RightBrace),
        ],
        &[(F::Trigger, 2)],
    ),
    p(
        R::AnimBlock,
        &[
            T(K::Anim),
            T(K::Colon),
            N(R::AnimTrigger),
            T(K::LeftBrace),
            N(R::Properties),
            T(K::RightBrace),
        ],
        &[(F::Trigger, 2)],
    ),
    p(R::AnimTrigger, &[T(K::Identifier)], &[]),
    // Constraints
    p(
        R::ConstraintLine,
        &[
            N(R::NodeRef),
            T(K::Arrow),
            N(R::NodeRef),
            T(K::Colon),
            T(K::Identifier),
        ],
        &[(F::Source, 0), (F::Target, 2), (F::ConstraintType, 4)],
    ),
    p(R::NodeRef, &[N(R::NodeId)], &[]),
    p(R::NodeRef, &[T(K::Identifier)], &[]),
    // Strings
    p(
        R::String,
        &[T(K::Quote), T(K::StringContent), T(K::Quote)],
        &[],
    ),
    p(R::String, &[T(K::Quote), T(K::Quote)], &[]),
];

/// A defect found by [`Grammar::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("production {production} binds `{field}` to position {index} past its {len} symbols")]
    FieldOutOfRange {
        production: ProductionId,
        field: Field,
        index: usize,
        len: usize,
    },

    #[error("production {production} binds `{field}` more than once")]
    DuplicateField {
        production: ProductionId,
        field: Field,
    },

    #[error("production {production} binds two fields to position {index}")]
    SharedPosition {
        production: ProductionId,
        index: usize,
    },

    #[error("rule `{0}` has no production")]
    UnproducedRule(Rule),

    #[error("production {production} derives the start rule or the error rule")]
    ReservedRule { production: ProductionId },
}

/// Read-only access to the production set.
pub struct Grammar;

impl Grammar {
    pub fn productions() -> &'static [Production] {
        PRODUCTIONS
    }

    /// Ids of every production with `lhs` on the left, in declaration order.
    pub fn productions_for(lhs: Rule) -> impl Iterator<Item = ProductionId> {
        PRODUCTIONS
            .iter()
            .enumerate()
            .filter(move |(_, production)| production.lhs == lhs)
            .map(|(index, _)| ProductionId::new(index))
    }

    /// Check the static invariants of the production set.
    pub fn validate() -> Result<(), GrammarError> {
        Self::validate_productions(PRODUCTIONS)
    }

    fn validate_productions(productions: &[Production]) -> Result<(), GrammarError> {
        for (index, production) in productions.iter().enumerate() {
            let id = ProductionId::new(index);

            let reserved = production.rhs.iter().any(|symbol| {
                matches!(symbol, Symbol::Rule(Rule::Start) | Symbol::Rule(Rule::Error))
            });
            if reserved || production.lhs == Rule::Error || (index > 0 && production.lhs == Rule::Start) {
                return Err(GrammarError::ReservedRule { production: id });
            }

            for (position, &(field, field_index)) in production.fields.iter().enumerate() {
                if field_index >= production.rhs.len() {
                    return Err(GrammarError::FieldOutOfRange {
                        production: id,
                        field,
                        index: field_index,
                        len: production.rhs.len(),
                    });
                }
                for &(other, other_index) in &production.fields[..position] {
                    if other == field {
                        return Err(GrammarError::DuplicateField {
                            production: id,
                            field,
                        });
                    }
                    if other_index == field_index {
                        return Err(GrammarError::SharedPosition {
                            production: id,
                            index: field_index,
                        });
                    }
                }
            }
        }

        for rule in Rule::ALL {
            if rule != Rule::Error && !productions.iter().any(|production| production.lhs == rule) {
                return Err(GrammarError::UnproducedRule(rule));
            }
        }

        Ok(())
    }
}
