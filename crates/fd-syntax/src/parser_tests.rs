//! Unit tests for the parser engine
//!
//! These tests drive whole documents through lexer, table and engine, and
//! check the resulting trees and diagnostics, including error recovery.

use crate::{
    Element, Field, Node, ParseConfig, Rule, SyntaxTree,
    error::{DiagnosticKind, ErrorCode},
    parse, parse_with_config,
};

/// Parse `source` and assert it produced no diagnostics.
fn parse_clean(source: &str) -> SyntaxTree<'_> {
    let tree = parse(source);
    assert!(
        tree.diagnostics().is_empty(),
        "Expected a clean parse of {source:?}, got: {:?}",
        tree.diagnostics()
    );
    tree
}

/// Error codes of every diagnostic, in order.
fn codes(tree: &SyntaxTree<'_>) -> Vec<ErrorCode> {
    tree.diagnostics()
        .iter()
        .filter_map(|diagnostic| diagnostic.code())
        .collect()
}

/// The `index`th child node of the root.
fn item<'a>(tree: &'a SyntaxTree<'_>, index: usize) -> &'a Node {
    tree.root()
        .child_nodes()
        .nth(index)
        .unwrap_or_else(|| panic!("Expected a root item at {index} in {}", tree.to_sexp()))
}

/// Child nodes of `node` with the given kind.
fn nodes_of(node: &Node, kind: Rule) -> Vec<&Node> {
    node.child_nodes().filter(|child| child.kind() == kind).collect()
}

fn field_text<'src>(tree: &SyntaxTree<'src>, node: &Node, field: Field) -> &'src str {
    let element = node
        .field(field)
        .unwrap_or_else(|| panic!("Expected field `{field}` on {}", node.kind()));
    tree.text(element)
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_node_with_properties() {
        let tree = parse_clean("rect @box1 { width = 10 fill = FF0000 }");
        assert_eq!(tree.root().child_nodes().count(), 1);

        let node = item(&tree, 0);
        assert_eq!(node.kind(), Rule::NodeDeclaration);
        assert_eq!(field_text(&tree, node, Field::Kind), "rect");
        assert_eq!(field_text(&tree, node, Field::Id), "@box1");

        let id = node.field(Field::Id).and_then(Element::as_node).unwrap();
        assert_eq!(field_text(&tree, id, Field::Name), "box1");

        let properties = nodes_of(node, Rule::Property);
        assert_eq!(properties.len(), 2);
        assert_eq!(field_text(&tree, properties[0], Field::Name), "width");
        assert_eq!(field_text(&tree, properties[0], Field::Value), "10");
        assert_eq!(field_text(&tree, properties[1], Field::Name), "fill");
        assert_eq!(field_text(&tree, properties[1], Field::Value), "FF0000");

        assert_eq!(
            tree.to_sexp(),
            "(document (node_declaration kind: (node_kind) id: (node_id name: (identifier)) \
             (property name: (property_name) value: (number)) \
             (property name: (property_name) value: (hex_color))))"
        );
    }

    #[test]
    fn test_annotation_with_string() {
        let tree = parse_clean("@accept \"looks good\"");

        let annotation = item(&tree, 0);
        assert_eq!(annotation.kind(), Rule::Annotation);
        assert_eq!(field_text(&tree, annotation, Field::Kind), "accept");

        let value = annotation.field(Field::Value).and_then(Element::as_node).unwrap();
        assert_eq!(value.kind(), Rule::String);
        assert_eq!(value.string_value(tree.source()), Some("looks good"));
    }

    #[test]
    fn test_constraint_line() {
        let tree = parse_clean("box1 -> box2 : depends_on");

        let constraint = item(&tree, 0);
        assert_eq!(constraint.kind(), Rule::ConstraintLine);
        assert_eq!(field_text(&tree, constraint, Field::Source), "box1");
        assert_eq!(field_text(&tree, constraint, Field::Target), "box2");
        assert_eq!(field_text(&tree, constraint, Field::ConstraintType), "depends_on");
    }

    #[test]
    fn test_anim_block_in_group() {
        let tree = parse_clean("group @g { anim: on_hover { opacity = 50 } }");

        let group = item(&tree, 0);
        assert_eq!(field_text(&tree, group, Field::Kind), "group");

        let anims = nodes_of(group, Rule::AnimBlock);
        assert_eq!(anims.len(), 1);
        assert_eq!(field_text(&tree, anims[0], Field::Trigger), "on_hover");

        let properties = nodes_of(anims[0], Rule::Property);
        assert_eq!(properties.len(), 1);
        assert_eq!(field_text(&tree, properties[0], Field::Name), "opacity");
        assert_eq!(field_text(&tree, properties[0], Field::Value), "50");
    }

    #[test]
    fn test_missing_value_recovers() {
        let tree = parse("rect @box1 { width = } rect @next");

        assert_eq!(tree.diagnostics().len(), 1);
        let diagnostic = &tree.diagnostics()[0];
        assert_eq!(diagnostic.kind(), Some(DiagnosticKind::SyntaxError));
        assert_eq!(diagnostic.code(), Some(ErrorCode::E101));

        let node = item(&tree, 0);
        let property = nodes_of(node, Rule::Property)[0];
        let value = property.field(Field::Value).expect("value field");
        assert!(value.is_missing());
        assert_eq!(value.span().start(), 21);
        assert!(value.span().is_empty());

        let next = item(&tree, 1);
        assert_eq!(field_text(&tree, next, Field::Id), "@next");
    }
}

#[cfg(test)]
mod construct_tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let tree = parse_clean("");
        assert_eq!(tree.root().kind(), Rule::Document);
        assert!(tree.root().children().is_empty());
        assert_eq!(tree.to_sexp(), "(document)");
    }

    #[test]
    fn test_whitespace_only_document() {
        let tree = parse_clean("  \n\t\n");
        assert_eq!(tree.root().span().len(), 5);
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_annotation_forms() {
        let tree = parse_clean(
            "@status draft\n@priority: high\n@tag: \"ui\"\n@\"plain string\"\n@free text here\n",
        );
        assert_eq!(
            tree.to_sexp(),
            "(document \
             (annotation kind: (annotation_keyword) inline_text: (annotation_text)) \
             (annotation kind: (annotation_keyword) inline_text: (annotation_text)) \
             (annotation kind: (annotation_keyword) value: (string (string_content))) \
             (annotation kind: \"@\" value: (string (string_content))) \
             (annotation kind: \"@\" inline_text: (annotation_text)))"
        );

        let free = item(&tree, 4);
        assert_eq!(field_text(&tree, free, Field::InlineText), "free text here");
    }

    #[test]
    fn test_annotation_text_escape() {
        let tree = parse_clean("@tag issue ##42 # real comment");

        let annotation = item(&tree, 0);
        let text = field_text(&tree, annotation, Field::InlineText);
        assert_eq!(text, "issue ##42");
        assert_eq!(crate::unescape_annotation_text(text), "issue #42");

        let comment = tree.root().children().last().and_then(Element::as_token);
        assert_eq!(comment.map(|token| token.text(tree.source())), Some("# real comment"));
    }

    #[test]
    fn test_style_block() {
        let tree = parse_clean("style primary {\n  fill = 3B82F6\n  corner = 8\n}\nstyle empty {}");

        let style = item(&tree, 0);
        assert_eq!(style.kind(), Rule::StyleBlock);
        assert_eq!(field_text(&tree, style, Field::Name), "primary");
        assert_eq!(nodes_of(style, Rule::Property).len(), 2);

        let empty = item(&tree, 1);
        assert!(nodes_of(empty, Rule::Property).is_empty());
    }

    #[test]
    fn test_inline_text_and_body() {
        let tree = parse_clean("text @title \"Hello\" { font = \"Inter\" }");

        let node = item(&tree, 0);
        let inline = node.field(Field::InlineText).and_then(Element::as_node).unwrap();
        assert_eq!(inline.string_value(tree.source()), Some("Hello"));
        assert_eq!(nodes_of(node, Rule::Property).len(), 1);
    }

    #[test]
    fn test_anonymous_node() {
        let tree = parse_clean("group { rect { w = 1 } }");

        let group = item(&tree, 0);
        assert!(group.field(Field::Id).is_none());
        assert_eq!(field_text(&tree, group, Field::Kind), "group");
        assert_eq!(nodes_of(group, Rule::NodeDeclaration).len(), 1);
    }

    #[test]
    fn test_anonymous_node_with_inline_text() {
        let tree = parse_clean("text \"Hello\" { font = \"Inter\" }");

        let node = item(&tree, 0);
        assert_eq!(node.kind(), Rule::NodeDeclaration);
        assert!(node.field(Field::Id).is_none());
        assert_eq!(field_text(&tree, node, Field::Kind), "text");

        let text = node.field(Field::InlineText).and_then(Element::as_node).unwrap();
        assert_eq!(text.string_value(tree.source()), Some("Hello"));
        assert_eq!(nodes_of(node, Rule::Property).len(), 1);
    }

    #[test]
    fn test_property_with_trailing_values() {
        let tree = parse_clean("rect @a {\n  stroke = 000000 2\n  w = 1 2\n  fill = red\n}");

        let properties = nodes_of(item(&tree, 0), Rule::Property);
        assert_eq!(properties.len(), 3);
        assert_eq!(field_text(&tree, properties[0], Field::Value), "000000");
        assert_eq!(field_text(&tree, properties[1], Field::Value), "1");
        assert_eq!(field_text(&tree, properties[2], Field::Name), "fill");
        assert_eq!(
            tree.to_sexp(),
            "(document (node_declaration kind: (node_kind) id: (node_id name: (identifier)) \
             (property name: (property_name) value: (number) (number)) \
             (property name: (property_name) value: (number) (number)) \
             (property name: (property_name) value: (identifier))))"
        );
    }

    #[test]
    fn test_property_with_key_value_pairs() {
        let tree = parse_clean("group @g { layout = column gap=16 pad = 32 \"dense\" use = card }");

        let group = item(&tree, 0);
        let properties = nodes_of(group, Rule::Property);
        assert_eq!(properties.len(), 2);
        assert_eq!(field_text(&tree, properties[0], Field::Value), "column");

        let pairs = nodes_of(properties[0], Rule::KeyValuePair);
        assert_eq!(pairs.len(), 2);
        assert_eq!(field_text(&tree, pairs[0], Field::Key), "gap");
        assert_eq!(field_text(&tree, pairs[0], Field::Value), "16");
        assert_eq!(field_text(&tree, pairs[1], Field::Key), "pad");
        assert_eq!(nodes_of(properties[0], Rule::String).len(), 1);

        assert_eq!(field_text(&tree, properties[1], Field::Name), "use");
    }

    #[test]
    fn test_annotation_after_property_value() {
        let tree = parse_clean("rect @a {\n  center_in = @frame\n  @status draft\n  w = 1\n  @tag urgent\n}");

        let node = item(&tree, 0);
        assert_eq!(nodes_of(node, Rule::Property).len(), 2);
        assert_eq!(nodes_of(node, Rule::Annotation).len(), 2);
    }

    #[test]
    fn test_nested_declarations() {
        let tree = parse_clean("group @outer {\n  group @inner {\n    ellipse @dot\n  }\n  path @line\n}");

        let outer = item(&tree, 0);
        let children = nodes_of(outer, Rule::NodeDeclaration);
        assert_eq!(children.len(), 2);
        assert_eq!(field_text(&tree, children[0], Field::Id), "@inner");
        assert_eq!(field_text(&tree, children[1], Field::Kind), "path");

        let dot = nodes_of(children[0], Rule::NodeDeclaration)[0];
        assert_eq!(field_text(&tree, dot, Field::Kind), "ellipse");
    }

    #[test]
    fn test_value_kinds() {
        let tree = parse_clean(
            "rect @a { w = 10 h = -2.5 duration = 300ms fill = ABC stroke = red center_in = @frame font = \"Inter\" }",
        );

        let node = item(&tree, 0);
        let values: Vec<String> = nodes_of(node, Rule::Property)
            .into_iter()
            .map(|property| {
                let value = property.field(Field::Value).unwrap();
                match value {
                    Element::Token(token) => token.kind().name().to_string(),
                    Element::Node(node) => node.kind().name().to_string(),
                }
            })
            .collect();
        assert_eq!(
            values,
            vec!["number", "number", "number", "hex_color", "identifier", "node_id", "string"]
        );
    }

    #[test]
    fn test_keywords_as_identifiers() {
        let tree = parse_clean("rect @rect { use = fill }\nbox -> text : anim");

        let node = item(&tree, 0);
        let id = node.field(Field::Id).and_then(Element::as_node).unwrap();
        assert_eq!(field_text(&tree, id, Field::Name), "rect");

        let property = nodes_of(node, Rule::Property)[0];
        assert_eq!(field_text(&tree, property, Field::Value), "fill");

        let constraint = item(&tree, 1);
        assert_eq!(field_text(&tree, constraint, Field::Target), "text");
        assert_eq!(field_text(&tree, constraint, Field::ConstraintType), "anim");
    }

    #[test]
    fn test_constraint_with_node_ids() {
        let tree = parse_clean("@a -> @b : left_of");

        let constraint = item(&tree, 0);
        assert_eq!(constraint.kind(), Rule::ConstraintLine);
        let source = constraint.field(Field::Source).and_then(Element::as_node).unwrap();
        assert_eq!(source.kind(), Rule::NodeId);
        assert_eq!(field_text(&tree, constraint, Field::Target), "@b");
    }

    #[test]
    fn test_comments_attach_to_enclosing_node() {
        let tree = parse_clean("# header\nrect @a { # inline\n  w = 1\n}\n# trailer");

        assert_eq!(
            tree.to_sexp(),
            "(document (comment) \
             (node_declaration kind: (node_kind) id: (node_id name: (identifier)) (comment) \
             (property name: (property_name) value: (number))) \
             (comment))"
        );
    }

    #[test]
    fn test_comment_only_document() {
        let tree = parse_clean("# nothing but a comment");
        assert_eq!(tree.to_sexp(), "(document (comment))");
    }

    #[test]
    fn test_string_keeps_hash() {
        let tree = parse_clean("text @t \"#1 item\"");

        let node = item(&tree, 0);
        let inline = node.field(Field::InlineText).and_then(Element::as_node).unwrap();
        assert_eq!(inline.string_value(tree.source()), Some("#1 item"));
    }

    #[test]
    fn test_root_spans_whole_source() {
        let source = "\n\nrect @a\n\n";
        let tree = parse_clean(source);
        assert_eq!(tree.root().span().range(), 0..source.len());
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = parse_clean("group @g { rect @r }");

        let kinds: Vec<Rule> = tree.walk().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                Rule::Document,
                Rule::NodeDeclaration,
                Rule::NodeKind,
                Rule::NodeId,
                Rule::NodeDeclaration,
                Rule::NodeKind,
                Rule::NodeId,
            ]
        );
    }
}

#[cfg(test)]
mod recovery_tests {
    use super::*;

    #[test]
    fn test_missing_equals_is_inserted() {
        let tree = parse("rect @a { width 10 }");

        assert_eq!(codes(&tree), vec![ErrorCode::E101]);
        let property = nodes_of(item(&tree, 0), Rule::Property)[0];
        assert!(property.children()[1].is_missing());
        assert_eq!(field_text(&tree, property, Field::Value), "10");
    }

    #[test]
    fn test_token_after_insertion_is_read_again() {
        // `rect` is first read as an identifier; after the missing text is
        // inserted it starts a declaration.
        let tree = parse("@tag\nrect @a");

        assert_eq!(codes(&tree), vec![ErrorCode::E101]);
        assert_eq!(item(&tree, 0).kind(), Rule::Annotation);
        assert_eq!(item(&tree, 1).kind(), Rule::NodeDeclaration);
    }

    #[test]
    fn test_missing_closing_brace_at_end() {
        let tree = parse("group @g {\n  rect @a { w = 1 }\n");

        assert_eq!(codes(&tree), vec![ErrorCode::E101]);
        let group = item(&tree, 0);
        assert!(group.children().last().is_some_and(Element::is_missing));
        assert_eq!(tree.root().child_nodes().count(), 1);
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let tree = parse("rect @a { % }");

        assert_eq!(codes(&tree), vec![ErrorCode::E002]);
        let diagnostic = &tree.diagnostics()[0];
        assert_eq!(diagnostic.kind(), Some(DiagnosticKind::LexError));
        assert_eq!(diagnostic.message(), "unexpected character `%`");
        assert_eq!(
            tree.to_sexp(),
            "(document (node_declaration kind: (node_kind) id: (node_id name: (identifier)) (ERROR (error))))"
        );
    }

    #[test]
    fn test_skipped_tokens_wrapped_in_error() {
        let tree = parse("rect @a = 5\nrect @b");

        assert_eq!(codes(&tree), vec![ErrorCode::E100]);
        assert_eq!(tree.diagnostics()[0].span().map(|span| span.range()), Some(8..11));
        assert_eq!(
            tree.to_sexp(),
            "(document (node_declaration kind: (node_kind) id: (node_id name: (identifier))) \
             (ERROR (number)) \
             (node_declaration kind: (node_kind) id: (node_id name: (identifier))))"
        );
    }

    #[test]
    fn test_stray_brace_pops_into_error() {
        let tree = parse("rect @a { w = 1 } }\nrect @b");

        assert_eq!(codes(&tree), vec![ErrorCode::E100]);
        let labels = tree.diagnostics()[0].labels();
        assert_eq!(labels.len(), 2);

        let first = item(&tree, 0);
        let errors = nodes_of(first, Rule::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span().range(), 16..17);
        assert_eq!(field_text(&tree, item(&tree, 1), Field::Id), "@b");
    }

    #[test]
    fn test_stray_brace_after_block_is_not_an_annotation() {
        let tree = parse("rect @a { fill = \"x\" } }");

        assert_eq!(codes(&tree), vec![ErrorCode::E100]);
        assert!(tree.walk().all(|node| node.kind() != Rule::Annotation));
        assert!(tree.walk().any(|node| node.is_error()));
        assert!(tree.walk().all(|node| node.children().iter().all(|child| !child.is_missing())));
    }

    #[test]
    fn test_stray_token_in_body_is_skipped() {
        let tree = parse("rect @a {\n  w = 1 -> 2\n  h = 3\n}");

        assert_eq!(codes(&tree), vec![ErrorCode::E100]);
        let node = item(&tree, 0);
        assert!(nodes_of(node, Rule::Annotation).is_empty());
        assert_eq!(nodes_of(node, Rule::Property).len(), 2);
    }

    #[test]
    fn test_keyword_resumes_as_identifier() {
        let tree = parse("a -> % rect : dep");

        assert_eq!(codes(&tree), vec![ErrorCode::E002]);
        let constraint = item(&tree, 0);
        assert_eq!(constraint.kind(), Rule::ConstraintLine);
        assert_eq!(field_text(&tree, constraint, Field::Target), "rect");
        assert_eq!(nodes_of(constraint, Rule::Error).len(), 1);
    }

    #[test]
    fn test_unterminated_string() {
        let source = "text @t \"Hello";
        let tree = parse(source);

        let unterminated = tree
            .diagnostics()
            .iter()
            .filter(|d| d.kind() == Some(DiagnosticKind::UnterminatedConstruct))
            .count();
        assert_eq!(unterminated, 1);
        assert_eq!(tree.diagnostics().len(), 1);

        let node = item(&tree, 0);
        let string = node.field(Field::InlineText).and_then(Element::as_node).unwrap();
        assert_eq!(string.span().end(), source.len());
        assert!(string.children().last().is_some_and(Element::is_missing));
    }

    #[test]
    fn test_lone_quote_at_end() {
        let tree = parse("@accept \"");

        assert_eq!(codes(&tree), vec![ErrorCode::E001]);
        let annotation = item(&tree, 0);
        let string = annotation.field(Field::Value).and_then(Element::as_node).unwrap();
        assert_eq!(string.string_value(tree.source()), Some(""));
    }

    #[test]
    fn test_errors_never_stop_the_parse() {
        let tree = parse("}}} === @@ -> \"\n rect @ok");

        assert!(tree.has_errors());
        assert!(tree.root().has_error());
        assert_eq!(tree.root().span().range(), 0..tree.source().len());
    }

    #[test]
    fn test_into_result() {
        assert!(parse("rect @a").into_result().is_ok());

        let err = parse("rect @a { w = }").into_result().unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
    }
}

#[cfg(test)]
mod budget_tests {
    use super::*;

    const TWO_ERRORS: &str = "rect @a = 5\nrect @b = 6\nrect @c";

    #[test]
    fn test_unlimited_budget_recovers_everything() {
        let tree = parse(TWO_ERRORS);
        assert_eq!(codes(&tree), vec![ErrorCode::E100, ErrorCode::E100]);
        assert_eq!(nodes_of(tree.root(), Rule::NodeDeclaration).len(), 3);
    }

    #[test]
    fn test_budget_exhausted() {
        let config = ParseConfig::default().with_error_budget(1);
        let tree = parse_with_config(TWO_ERRORS, &config);

        assert_eq!(codes(&tree), vec![ErrorCode::E100, ErrorCode::E102]);

        let rest = tree.root().children().last().and_then(Element::as_node).unwrap();
        assert!(rest.is_error());
        assert_eq!(rest.span().start(), 20);
        assert_eq!(rest.span().end(), TWO_ERRORS.len());
    }

    #[test]
    fn test_zero_budget_stops_at_first_error() {
        let config = ParseConfig::new(Some(0));
        let tree = parse_with_config("rect @a { w = }\nrect @b", &config);

        assert_eq!(codes(&tree), vec![ErrorCode::E102]);
        assert!(tree.root().children().last().is_some_and(Element::is_extra));
    }

    #[test]
    fn test_budget_unused_on_clean_input() {
        let config = ParseConfig::new(Some(0));
        let tree = parse_with_config("rect @a { w = 1 }", &config);
        assert!(tree.diagnostics().is_empty());
    }
}

#[cfg(test)]
mod determinism_tests {
    use super::*;

    const SAMPLE: &str = "style s { fill = red }\n\
                          group @g \"G\" {\n  @status wip\n  rect @r { use = s w = 10 }\n  oops = }\n\
                          r -> @g : inside\n";

    #[test]
    fn test_reparse_is_identical() {
        let first = parse(SAMPLE);
        let second = parse(SAMPLE);

        assert_eq!(first.root(), second.root());
        assert_eq!(first.diagnostics(), second.diagnostics());
    }

    #[test]
    fn test_parallel_parses_agree() {
        let expected = parse(SAMPLE).to_sexp();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| parse(SAMPLE).to_sexp()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // Strategies

    fn identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}".prop_filter("keyword", |word| crate::TokenKind::keyword(word).is_none())
    }

    fn declaration_strategy() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["group", "rect", "ellipse", "path", "text"]),
            identifier_strategy(),
            prop::collection::vec((0u32..1000).prop_map(|n| format!("w = {n}")), 0..3),
        )
            .prop_map(|(kind, id, properties)| {
                if properties.is_empty() {
                    format!("{kind} @{id}")
                } else {
                    format!("{kind} @{id} {{ {} }}", properties.join(" "))
                }
            })
    }

    // Property Test Functions

    fn check_declarations_have_kind_and_id(source: &str) -> Result<(), TestCaseError> {
        let tree = parse(source);
        prop_assert!(tree.diagnostics().is_empty(), "{:?}", tree.diagnostics());

        for node in tree.walk().filter(|node| node.kind() == Rule::NodeDeclaration) {
            let kind = node.field(Field::Kind);
            let id = node.field(Field::Id);
            prop_assert!(kind.is_some_and(|kind| !kind.is_missing()));
            prop_assert!(id.is_some_and(|id| !id.is_missing()));
        }
        Ok(())
    }

    fn check_recoveries_within_budget(source: &str, budget: usize) -> Result<(), TestCaseError> {
        let config = ParseConfig::default().with_error_budget(budget);
        let tree = parse_with_config(source, &config);

        let recoveries = tree
            .diagnostics()
            .iter()
            .filter(|d| matches!(d.code(), Some(ErrorCode::E002 | ErrorCode::E100 | ErrorCode::E101)))
            .count();
        prop_assert!(recoveries <= budget);
        let exhausted = tree
            .diagnostics()
            .iter()
            .filter(|d| d.code() == Some(ErrorCode::E102))
            .count();
        prop_assert!(exhausted <= 1);
        Ok(())
    }

    // Proptest Wrappers

    proptest! {
        #[test]
        fn declarations_have_kind_and_id(
            declarations in prop::collection::vec(declaration_strategy(), 1..5)
        ) {
            check_declarations_have_kind_and_id(&declarations.join("\n"))?;
        }

        #[test]
        fn recoveries_within_budget(source in "[a-z@{}=:\"# \n0-9%-]{0,40}", budget in 0usize..4) {
            check_recoveries_within_budget(&source, budget)?;
        }
    }
}
