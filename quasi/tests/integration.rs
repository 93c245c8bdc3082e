use pretty_assertions::assert_eq;
use quasi::{Argument, Context, Session, SyntaxKind, SyntaxNode, Template, TemplateError};

fn render(template: &str, args: &[Argument]) -> Result<SyntaxNode, TemplateError> {
    quasi::render(&Session::default(), template, args, &Context::STATEMENT)
}

fn render_ok(template: &str, args: &[Argument]) -> SyntaxNode {
    render(template, args).expect("render failed")
}

fn expr(code: &str) -> SyntaxNode {
    quasi::fragment(&Session::default(), code, &Context::EXPRESSION).expect("fragment failed")
}

/// The argument expressions of the call `code`, still attached to its list.
fn call_arguments(code: &str) -> (SyntaxNode, Vec<SyntaxNode>) {
    let call = expr(code);
    let list = call.child_of_kind(SyntaxKind::ArgList).expect("not a call");
    let args = list.child_nodes();
    (call, args)
}

fn arg_texts(call: &SyntaxNode) -> Vec<String> {
    call.child_of_kind(SyntaxKind::ArgList)
        .expect("not a call")
        .child_nodes()
        .iter()
        .map(|n| n.text())
        .collect()
}

#[test]
fn literal_only_round_trip() {
    let node = render_ok("val %s = %d", &["x".into(), Argument::int(5)]);
    assert_eq!(node.text(), "val x = 5");
    assert_eq!(node.kind(), SyntaxKind::ValDecl);

    let direct = syntax::parse("val x = 5").unwrap();
    let direct_item = direct.child_nodes()[0].clone();
    assert_eq!(node.dump(), direct_item.dump());
}

#[test]
fn literal_text_is_parsed_as_code() {
    let node = render_ok("val y = %s", &["a * (b + 1)".into()]);
    let value = node.child_nodes()[1].clone();
    assert_eq!(value.kind(), SyntaxKind::Binary);
    assert_eq!(value.text(), "a * (b + 1)");
}

#[test]
fn result_is_a_root() {
    let node = render_ok("f(%d)", &[Argument::int(1)]);
    assert_eq!(node.parent(), None);
}

#[test]
fn fragment_identity_is_preserved() {
    let fragment = expr("a+  1");
    let before = fragment.dump();

    let node = render_ok("val y = %s", &[fragment.clone().into()]);
    assert_eq!(node.text(), "val y = a+  1");

    let value = node.child_nodes()[1].clone();
    assert_eq!(value, fragment);
    assert_eq!(value.dump(), before);
    assert_eq!(fragment.parent(), Some(node));
}

#[test]
fn fragment_may_fill_the_whole_template() {
    let fragment = expr("g(x)");
    let node = render_ok("%s", &[fragment.clone().into()]);
    assert_eq!(node, fragment);
    assert_eq!(node.parent(), None);
}

#[test]
fn sequence_of_free_fragments() {
    let (a, b, c) = (expr("a"), expr("b"), expr("c"));
    let node = render_ok(
        "foo(%s)",
        &[Argument::sequence(vec![a.clone(), b.clone(), c.clone()])],
    );
    assert_eq!(node.text(), "foo(a, b, c)");

    let args = node.child_of_kind(SyntaxKind::ArgList).unwrap().child_nodes();
    assert_eq!(args, vec![a, b, c]);
}

#[test]
fn sequence_from_one_list_reparents_that_list() {
    let (donor, args) = call_arguments("bar(x,  y,z)");
    let donor_list = donor.child_of_kind(SyntaxKind::ArgList).unwrap();

    let node = render_ok("foo(%s)", &[Argument::sequence(args.clone())]);

    // The donor's own list (and its spacing) moved into the result.
    assert_eq!(node.text(), "foo(x,  y,z)");
    assert_eq!(node.child_of_kind(SyntaxKind::ArgList), Some(donor_list));
    assert_eq!(arg_texts(&node), vec!["x", "y", "z"]);
    assert_eq!(donor.text(), "bar");
}

#[test]
fn partial_sequence_is_spliced_element_wise() {
    let (donor, args) = call_arguments("bar(x, y, z)");
    let node = render_ok("foo(%s)", &[Argument::sequence(args[..2].to_vec())]);
    assert_eq!(node.text(), "foo(x, y)");
    // Each element was moved out of the donor list on its own.
    assert_eq!(donor.text(), "bar(, , z)");
}

#[test]
fn sequence_next_to_other_arguments_is_spliced_element_wise() {
    let (_donor, args) = call_arguments("bar(x, y)");
    let node = render_ok("foo(1, %s)", &[Argument::sequence(args)]);
    assert_eq!(node.text(), "foo(1, x, y)");
    assert_eq!(arg_texts(&node), vec!["1", "x", "y"]);
}

#[test]
fn sequence_with_custom_separator() {
    let node = render_ok(
        "val s = %s",
        &[Argument::sequence_with(vec![expr("a"), expr("b"), expr("c")], " + ")],
    );
    assert_eq!(node.text(), "val s = a + b + c");
    assert_eq!(node.child_nodes()[1].kind(), SyntaxKind::Binary);
}

#[test]
fn parameter_sequence_into_definition() {
    let donor = render_ok("def f(a: Int, b: List[Int]) = 0", &[]);
    let params = donor
        .child_of_kind(SyntaxKind::ParamList)
        .unwrap()
        .child_nodes();

    let node = render_ok(
        "def %s(%s): Int = %s",
        &["add".into(), Argument::sequence(params), expr("a + b").into()],
    );
    assert_eq!(node.text(), "def add(a: Int, b: List[Int]): Int = a + b");
}

#[test]
fn several_fragment_kinds_in_one_template() {
    let node = render_ok(
        "val %s: %s = %s(%s)",
        &[
            "total".into(),
            quasi::fragment(&Session::default(), "Map[String, Int]", &Context::TYPE)
                .unwrap()
                .into(),
            expr("build").into(),
            Argument::sequence(vec![expr("k"), expr("v")]),
        ],
    );
    assert_eq!(node.text(), "val total: Map[String, Int] = build(k, v)");
}

#[test]
fn absent_optional_is_elided() {
    let node = render_ok("foo(%s)", &[Argument::optional(None)]);
    assert_eq!(node.text(), "foo()");
    assert!(arg_texts(&node).is_empty());
}

#[test]
fn present_optional_is_spliced() {
    let x = expr("x");
    let node = render_ok("foo(%s)", &[Argument::optional(Some(x.clone()))]);
    assert_eq!(node.text(), "foo(x)");
    assert_eq!(node.child_of_kind(SyntaxKind::ArgList).unwrap().child_nodes(), vec![x]);
}

#[test]
fn optional_trailing_clause() {
    let with_type = render_ok("val x%s = 1", &[": Int".into()]);
    let without = render_ok("val x%s = 1", &[Argument::optional(None)]);
    assert_eq!(with_type.text(), "val x: Int = 1");
    assert_eq!(without.text(), "val x = 1");
}

#[test]
fn empty_sequence_is_elided() {
    let node = render_ok("foo(%s)", &[Argument::sequence(Vec::new())]);
    assert_eq!(node.text(), "foo()");
}

#[test]
fn placeholder_swallowed_by_a_string_is_an_arity_mismatch() {
    let x = expr("x");
    let err = render("f(\"%s\")", &[x.clone().into()]).unwrap_err();
    match err {
        TemplateError::ArityMismatch { template, expected, found } => {
            assert_eq!(template, "f(\"%s\")");
            assert_eq!(expected, 1);
            assert_eq!(found, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing was spliced.
    assert_eq!(x.text(), "x");
}

#[test]
fn placeholder_glued_into_an_identifier_is_an_arity_mismatch() {
    let err = render("val y = x%s", &[expr("z").into()]).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::ArityMismatch { expected: 1, found: 0, .. }
    ));
}

#[test]
fn placeholder_in_a_comment_is_an_arity_mismatch() {
    let err = render("f() // %s", &[Argument::sequence(vec![expr("a"), expr("b")])]).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::ArityMismatch { expected: 2, found: 0, .. }
    ));
}

#[test]
fn failed_render_leaves_fragments_in_place() {
    let (donor, args) = call_arguments("g(q)");
    let err = render("\"%s\"", &[args[0].clone().into()]).unwrap_err();
    assert!(matches!(err, TemplateError::ArityMismatch { .. }));
    assert_eq!(donor.text(), "g(q)");
    assert!(args[0].parent().is_some());
}

#[test]
fn reserved_token_in_template_is_rejected() {
    let err = render("val placeholder$0 = %s", &[expr("1").into()]).unwrap_err();
    match err {
        TemplateError::PlaceholderCollision { template, text } => {
            assert_eq!(template, "val placeholder$0 = %s");
            assert_eq!(text, "val placeholder$0 = ");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reserved_token_in_literal_argument_is_rejected() {
    let err = render("val x = %s", &["placeholder$0".into()]).unwrap_err();
    assert!(matches!(err, TemplateError::PlaceholderCollision { .. }));
}

#[test]
fn longer_identifier_containing_the_token_is_allowed() {
    let node = render_ok("val myplaceholder$0 = %d", &[Argument::int(3)]);
    assert_eq!(node.text(), "val myplaceholder$0 = 3");
}

#[test]
fn malformed_template_is_a_parse_error() {
    let err = render("val = %d", &[Argument::int(1)]).unwrap_err();
    match &err {
        TemplateError::Parse { source_text, error } => {
            assert_eq!(source_text, "val = 1");
            assert_eq!(error.span, 4..5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("expected identifier"));
}

#[test]
fn empty_template_is_an_error() {
    let err = render("  // nothing", &[]).unwrap_err();
    assert!(matches!(err, TemplateError::Empty { .. }));
}

#[test]
fn type_context_selects_the_annotation() {
    let node = quasi::render(&Session::default(), "Int", &[], &Context::TYPE).unwrap();
    assert_eq!(node.text(), "Int");
    assert_eq!(node.kind(), SyntaxKind::Type);
    assert_eq!(node.parent(), None);
}

#[test]
fn type_context_with_fragments() {
    let session = Session::default();
    let inner = quasi::fragment(&session, "Option[Int]", &Context::TYPE).unwrap();
    let node = quasi::render(&session, "List[%s]", &[inner.into()], &Context::TYPE).unwrap();
    assert_eq!(node.text(), "List[Option[Int]]");
    assert_eq!(node.kind(), SyntaxKind::Type);
}

#[test]
fn expression_context_selects_the_initializer() {
    let session = Session::default();
    let node =
        quasi::render(&session, "%s * 2", &[expr("n").into()], &Context::EXPRESSION).unwrap();
    assert_eq!(node.text(), "n * 2");
    assert_eq!(node.kind(), SyntaxKind::Binary);
}

#[test]
fn context_that_selects_nothing_is_an_error() {
    let custom = Context::new("never", |s| s.to_string(), |_| None);
    let err = quasi::render(&Session::default(), "x", &[], &custom).unwrap_err();
    assert!(matches!(err, TemplateError::Selection { context: "never", .. }));
}

#[test]
fn failed_selection_leaves_fragments_in_place() {
    let never = Context::new("never", |s| s.to_string(), |_| None);
    let session = Session::default();

    let (donor, args) = call_arguments("bar(x, y)");
    let err = quasi::render(&session, "foo(%s)", &[Argument::sequence(args.clone())], &never)
        .unwrap_err();
    assert!(matches!(err, TemplateError::Selection { .. }));
    assert_eq!(donor.text(), "bar(x, y)");
    assert!(args.iter().all(|arg| arg.parent().is_some()));

    let (donor, args) = call_arguments("g(z2)");
    let err = quasi::render(&session, "f(%s)", &[args[0].clone().into()], &never).unwrap_err();
    assert!(matches!(err, TemplateError::Selection { .. }));
    assert_eq!(donor.text(), "g(z2)");
}

#[test]
fn selecting_a_placeholder_yields_its_fragment() {
    let fragment = expr("a + b");
    let node = render_ok("%s", &[fragment.clone().into()]);
    assert_eq!(node, fragment);
}

#[test]
fn selecting_a_reparented_list_yields_the_donor_list() {
    let arg_list = Context::new("arguments", |s| s.to_string(), |n| {
        n.child_of_kind(SyntaxKind::ArgList)
    });
    let (donor, args) = call_arguments("bar(x, y)");
    let donor_list = donor.child_of_kind(SyntaxKind::ArgList).unwrap();
    let node = quasi::render(
        &Session::default(),
        "foo(%s)",
        &[Argument::sequence(args)],
        &arg_list,
    )
    .unwrap();
    assert_eq!(node, donor_list);
    assert_eq!(node.text(), "(x, y)");
    assert_eq!(node.parent(), None);
}

#[test]
fn selecting_inside_a_placeholder_is_an_error() {
    let first_token = Context::new("token", |s| s.to_string(), |n| {
        n.descendants().into_iter().find(|d| d.kind() == SyntaxKind::Token)
    });
    let (donor, args) = call_arguments("g(q)");
    let err = quasi::render(&Session::default(), "%s", &[args[0].clone().into()], &first_token)
        .unwrap_err();
    assert!(matches!(err, TemplateError::Selection { context: "token", .. }));
    assert_eq!(donor.text(), "g(q)");
}

#[test]
fn repeated_fragment_is_an_error() {
    let x = expr("x");
    let err = render("f(%s, %s)", &[x.clone().into(), x.clone().into()]).unwrap_err();
    assert!(matches!(err, TemplateError::DuplicateFragment { ref text, .. } if text == "x"));
    assert_eq!(x.parent(), None);
}

#[test]
fn repeated_sequence_element_is_an_error() {
    let (donor, args) = call_arguments("bar(a, b)");
    let err = render(
        "f(%s, %s)",
        &[args[0].clone().into(), Argument::sequence(args.clone())],
    )
    .unwrap_err();
    assert!(matches!(err, TemplateError::DuplicateFragment { .. }));
    assert_eq!(donor.text(), "bar(a, b)");
}

#[test]
fn fragment_nested_in_another_is_an_error() {
    let (call, args) = call_arguments("g(z)");
    let err = render("f(%s, %s)", &[call.clone().into(), args[0].clone().into()]).unwrap_err();
    assert!(matches!(err, TemplateError::NestedFragment { .. }));
    assert_eq!(call.text(), "g(z)");
}

#[test]
fn placeholder_glued_across_a_slot_collides() {
    let err = render("val %s$0 = 1", &["placeholder".into()]).unwrap_err();
    assert!(matches!(err, TemplateError::PlaceholderCollision { .. }));
}

#[test]
fn scaffold_contexts_ignore_trailing_code() {
    let session = Session::default();
    let ty = quasi::render(&session, "Int = 1", &[], &Context::TYPE).unwrap();
    assert_eq!(ty.text(), "Int");

    let value = quasi::render(&session, "x; y", &[], &Context::EXPRESSION).unwrap();
    assert_eq!(value.text(), "x");
}

#[test]
fn explicit_segments_are_not_format_strings() {
    let template = Template::from_segments(["val p = \"%s\" + ", ""]);
    let args = [Argument::int(4)];
    let node = quasi::render(&Session::default(), &template, &args, &Context::STATEMENT).unwrap();
    assert_eq!(node.text(), "val p = \"%s\" + 4");
}

#[test]
fn extra_arguments_are_appended_after_the_last_segment() {
    let node = render_ok("f(%s)", &["a".into(), "; g()".into()]);
    assert_eq!(node.text(), "f(a)");
}

#[test]
fn nested_renders_compose() {
    let inner = render_ok(
        "if (%s) %s else %s",
        &[expr("ok").into(), expr("1").into(), expr("2").into()],
    );
    let outer = quasi::render(
        &Session::default(),
        "{ val r = %s; r }",
        &[inner.clone().into()],
        &Context::EXPRESSION,
    )
    .unwrap();
    assert_eq!(outer.text(), "{ val r = if (ok) 1 else 2; r }");
    assert_eq!(outer.kind(), SyntaxKind::Block);
    assert!(outer.descendants().contains(&inner));
}
