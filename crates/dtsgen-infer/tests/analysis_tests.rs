use super::*;
use dtsgen_ast::BinaryOp;
use dtsgen_heap::Value;
use dtsgen_solver::PrimitiveSet;

/// `function fact(n) { return n * fact(n - 1); }`
#[test]
fn self_recursion_walks_the_closure_once() {
    let mut ast = Ast::new();
    let name = ast.add_declaration("fact");
    let n = ast.add_declaration("n");
    let rn = ast.add_reference("n", n);
    let rfact = ast.add_reference("fact", name);
    let rn2 = ast.add_reference("n", n);
    let one = ast.add_number(1.0);
    let minus = ast.add_binary(BinaryOp::Minus, rn2, one);
    let call = ast.add_call(rfact, vec![minus]);
    let mult = ast.add_binary(BinaryOp::Mult, rn, call);
    let ret = ast.add_return(Some(mult));
    let body = ast.add_block(vec![ret]);
    let function = ast.add_function(Some(name), vec![n], body);

    let mut snapshot = Snapshot::new();
    let global = snapshot.global();
    let fact = snapshot.add_user_function(function, &["n"], None);
    snapshot.set_property(global, "fact", Value::Object(fact));

    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    analysis.analyse_closure(fact).unwrap();
    let result = analysis.finish();

    assert_eq!(result.walk_count(fact), 1);
    assert_eq!(result.entered_closures().len(), 1);
    let call = result.node_at(fact, call).unwrap();
    assert_eq!(result.kinds(call), PrimitiveSet::NUMBER);
    let param = result.node_at(fact, n).unwrap();
    assert_eq!(result.kinds(param), PrimitiveSet::NUMBER);
}

/// Two globals `even` and `odd` calling each other.
#[test]
fn mutual_recursion_enters_each_closure_once() {
    let mut ast = Ast::new();
    let even_decl = ast.add_declaration("even");
    let odd_decl = ast.add_declaration("odd");

    let make = |ast: &mut Ast, callee_name: &str, callee: AstId| {
        let n = ast.add_declaration("n");
        let rcallee = ast.add_reference(callee_name, callee);
        let rn = ast.add_reference("n", n);
        let call = ast.add_call(rcallee, vec![rn]);
        let ret = ast.add_return(Some(call));
        let body = ast.add_block(vec![ret]);
        ast.add_function(None, vec![n], body)
    };
    let even_fn = make(&mut ast, "odd", odd_decl);
    let odd_fn = make(&mut ast, "even", even_decl);
    let var_even = ast.add_var(even_decl, Some(even_fn));
    let var_odd = ast.add_var(odd_decl, Some(odd_fn));
    ast.add_program(vec![var_even, var_odd]);

    let mut snapshot = Snapshot::new();
    let global = snapshot.global();
    let even = snapshot.add_user_function(even_fn, &["n"], None);
    let odd = snapshot.add_user_function(odd_fn, &["n"], None);
    snapshot.set_property(global, "even", Value::Object(even));
    snapshot.set_property(global, "odd", Value::Object(odd));

    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    let even_node = analysis.analyse_closure(even).unwrap();
    let result = analysis.finish();

    assert_eq!(result.walk_count(even), 1);
    assert_eq!(result.walk_count(odd), 1);
    let even_shape = result.function_shape(even_node).unwrap();
    let odd_shape = result.function_shape(result.function_node(odd).unwrap()).unwrap();
    assert_eq!(even_shape.ret, odd_shape.ret);
    assert_eq!(even_shape.args[0], odd_shape.args[0]);
}

#[test]
fn closure_pointing_at_non_function_syntax_is_rejected() {
    let mut ast = Ast::new();
    let block = ast.add_block(vec![]);
    let mut snapshot = Snapshot::new();
    let broken = snapshot.add_user_function(block, &[], None);

    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    let err = analysis.analyse_closure(broken).unwrap_err();
    assert_eq!(
        err,
        InferError::ClosureMismatch {
            closure: broken,
            ast: block
        }
    );
}

#[test]
fn plain_objects_are_not_closures() {
    let ast = Ast::new();
    let mut snapshot = Snapshot::new();
    let plain = snapshot.add_plain(None);

    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    assert_eq!(
        analysis.analyse_closure(plain),
        Err(InferError::NotAClosure(plain))
    );
}

#[test]
fn reachable_closures_include_bound_ones() {
    let mut ast = Ast::new();
    let one = ast.add_number(1.0);
    let ret = ast.add_return(Some(one));
    let body = ast.add_block(vec![ret]);
    let function = ast.add_function(None, vec![], body);

    let mut snapshot = Snapshot::new();
    let global = snapshot.global();
    let f = snapshot.add_user_function(function, &[], None);
    let g = snapshot.add_bound_function(f, Value::Undefined, Vec::new());
    let native = snapshot.add_native_function(Vec::new(), Vec::new());
    snapshot.set_property(global, "f", Value::Object(f));
    snapshot.set_property(global, "g", Value::Object(g));
    snapshot.set_property(global, "n", Value::Object(native));

    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    assert_eq!(analysis.analyse_reachable_closures().unwrap(), 2);
    let result = analysis.finish();

    assert_eq!(result.walk_count(f), 1);
    assert_eq!(result.walk_count(g), 1);
    assert_eq!(result.walk_count(native), 0);
    // Each closure handle keys its own program points.
    let under_f = result.node_at(f, one).unwrap();
    let under_g = result.node_at(g, one).unwrap();
    assert_ne!(under_f, under_g);
}

/// `this.x = 1; function sq(v) { return v * v; } sq(2);` at top level.
#[test]
fn program_walk_uses_the_global_receiver() {
    let mut ast = Ast::new();
    let this = ast.add_this();
    let member = ast.add_member(this, "x");
    let one = ast.add_number(1.0);
    let assign = ast.add_binary(BinaryOp::Assign, member, one);
    let s1 = ast.add_expression_statement(assign);

    let sq = ast.add_declaration("sq");
    let v = ast.add_declaration("v");
    let rv = ast.add_reference("v", v);
    let rv2 = ast.add_reference("v", v);
    let mult = ast.add_binary(BinaryOp::Mult, rv, rv2);
    let ret = ast.add_return(Some(mult));
    let body = ast.add_block(vec![ret]);
    let function = ast.add_function(Some(sq), vec![v], body);
    let s2 = ast.add_expression_statement(function);

    let rsq = ast.add_reference("sq", sq);
    let two = ast.add_number(2.0);
    let call = ast.add_call(rsq, vec![two]);
    let s3 = ast.add_expression_statement(call);
    let program = ast.add_program(vec![s1, s2, s3]);

    let snapshot = Snapshot::new();
    let global = snapshot.global();
    let classes = ClassRegistry::new();
    let options = InferenceOptions::default();
    let mut analysis = TypeAnalysis::new(&ast, &snapshot, &classes, &options);
    analysis.analyse_program(program).unwrap();
    let result = analysis.finish();

    let receiver = result.node_at(global, this).unwrap();
    assert!(result.heap_values(receiver).contains(&global));
    let x = result.field(receiver, "x").unwrap();
    assert_eq!(result.kinds(x), PrimitiveSet::NUMBER);

    let v = result.node_at(global, v).unwrap();
    assert_eq!(result.kinds(v), PrimitiveSet::NUMBER);
    let call = result.node_at(global, call).unwrap();
    assert_eq!(result.kinds(call), PrimitiveSet::NUMBER);
    assert!(result.entered_closures().is_empty());
}
