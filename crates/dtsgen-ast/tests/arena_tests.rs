use super::*;

#[test]
fn builder_links_parents_bottom_up() {
    let mut ast = Ast::new();
    let param = ast.add_declaration("a");
    let a_ref = ast.add_reference("a", param);
    let ret = ast.add_return(Some(a_ref));
    let body = ast.add_block(vec![ret]);
    let func = ast.add_function(None, vec![param], body);

    assert_eq!(ast.parent(a_ref), Some(ret));
    assert_eq!(ast.parent(ret), Some(body));
    assert_eq!(ast.parent(body), Some(func));
    assert_eq!(ast.parent(param), Some(func));
    assert_eq!(ast.parent(func), None);
    assert!(ast.is_within(a_ref, func));
    assert!(!ast.is_within(func, body));
    assert_eq!(ast.function_params(func), Some(&[param][..]));
}

#[test]
fn declarations_point_at_themselves() {
    let mut ast = Ast::new();
    let decl = ast.add_declaration("x");
    match ast.get(decl) {
        Some(NodeKind::Identifier { declaration, .. }) => assert_eq!(*declaration, Some(decl)),
        other => panic!("expected identifier, got {other:?}"),
    }
    assert_eq!(ast.identifier_name(decl), Some("x"));
}

#[test]
fn decodes_json_and_recomputes_parents() {
    let source = r#"{
        "nodes": [
            { "type": "numberLiteral", "value": 1.0 },
            { "type": "stringLiteral", "value": "a" },
            { "type": "binary", "op": "+", "lhs": 0, "rhs": 1 }
        ]
    }"#;
    let ast = Ast::from_json_str(source).unwrap();
    assert_eq!(ast.len(), 3);
    assert_eq!(ast.parent(AstId(0)), Some(AstId(2)));
    assert!(matches!(
        ast.get(AstId(2)),
        Some(NodeKind::Binary {
            op: BinaryOp::Plus,
            ..
        })
    ));
}

#[test]
fn rejects_dangling_children_and_unknown_operators() {
    let dangling = r#"{ "nodes": [ { "type": "return", "argument": 7 } ] }"#;
    assert_eq!(
        Ast::from_json_str(dangling).unwrap_err(),
        AstError::DanglingChild {
            parent: AstId(0),
            child: AstId(7)
        }
    );

    let bad_op = r#"{ "nodes": [
        { "type": "nullLiteral" },
        { "type": "binary", "op": "**", "lhs": 0, "rhs": 0 }
    ] }"#;
    assert!(matches!(
        Ast::from_json_str(bad_op),
        Err(AstError::Decode(_))
    ));
}

#[test]
fn rejects_shared_children_and_cycles() {
    let shared = r#"{ "nodes": [
        { "type": "nullLiteral" },
        { "type": "expressionStatement", "expression": 0 },
        { "type": "expressionStatement", "expression": 0 }
    ] }"#;
    assert_eq!(
        Ast::from_json_str(shared).unwrap_err(),
        AstError::SharedChild {
            child: AstId(0),
            first: AstId(1),
            second: AstId(2)
        }
    );

    let own_child = r#"{ "nodes": [ { "type": "block", "body": [0] } ] }"#;
    assert_eq!(Ast::from_json_str(own_child).unwrap_err(), AstError::Cycle(AstId(0)));

    let loop_of_two = r#"{ "nodes": [
        { "type": "block", "body": [1] },
        { "type": "block", "body": [0] }
    ] }"#;
    let err = Ast::from_json_str(loop_of_two).unwrap_err();
    assert_eq!(err, AstError::Cycle(AstId(0)));
    assert!(err.to_string().contains("own ancestor"));
}

#[test]
fn switch_children_include_tests_and_bodies() {
    let mut ast = Ast::new();
    let disc = ast.add_number(1.0);
    let test = ast.add_number(2.0);
    let brk = ast.add(NodeKind::Break);
    let switch = ast.add_switch(
        disc,
        vec![SwitchCase {
            test: Some(test),
            body: vec![brk],
        }],
    );
    assert_eq!(ast.parent(test), Some(switch));
    assert_eq!(ast.parent(brk), Some(switch));
    assert!(ast.get(switch).is_some_and(NodeKind::is_statement));
}
