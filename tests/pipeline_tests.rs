//! Loading JSON inputs from disk and running the whole pipeline.

use dtsgen::ast::AstId;
use dtsgen::heap::ObjId;
use dtsgen::loader::{find_program, load_inputs, load_options};
use dtsgen::report::InferenceReport;
use dtsgen::solver::PrimitiveSet;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// `var x = 1 + "a"; (function (y) { return y; });`
const AST: &str = r#"{
  "nodes": [
    { "type": "identifier", "name": "x", "declaration": 0 },
    { "type": "numberLiteral", "value": 1 },
    { "type": "stringLiteral", "value": "a" },
    { "type": "binary", "op": "+", "lhs": 1, "rhs": 2 },
    { "type": "variableDeclaration", "name": 0, "init": 3 },
    { "type": "identifier", "name": "y", "declaration": 5 },
    { "type": "identifier", "name": "y", "declaration": 5 },
    { "type": "return", "argument": 6 },
    { "type": "block", "body": [7] },
    { "type": "function", "name": null, "params": [5], "body": 8 },
    { "type": "expressionStatement", "expression": 9 },
    { "type": "program", "body": [4, 10] }
  ]
}"#;

/// Global object with `f`, the function literal at node 9.
const SNAPSHOT: &str = r#"{
  "global": 0,
  "objects": [
    { "properties": [ { "name": "f", "value": { "kind": "object", "value": 1 } } ] },
    { "function": { "type": "user", "ast": 9, "params": ["y"] } }
  ]
}"#;

/// Fresh directory for one test; also installs captured tracing when asked.
fn scratch_dir() -> TempDir {
    dtsgen::tracing_config::init_test_tracing();
    TempDir::new().unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn files_round_through_the_whole_pipeline() {
    let dir = scratch_dir();
    let ast = write(&dir, "ast.json", AST);
    let snapshot = write(&dir, "snapshot.json", SNAPSHOT);

    let inference = dtsgen::infer_files(&ast, &snapshot, None).unwrap();
    let result = &inference.result;
    let global = ObjId(0);
    let f = ObjId(1);

    let x = result.node_at(global, AstId(0)).unwrap();
    assert_eq!(result.kinds(x), PrimitiveSet::STRING | PrimitiveSet::NUMBER);

    assert_eq!(result.walk_count(f), 1);
    let shape = result
        .function_shape(result.function_node(f).unwrap())
        .unwrap();
    assert_eq!(shape.args.len(), 1);
    assert_eq!(shape.args[0], shape.ret);
    assert!(inference.classes.is_empty());

    let report = InferenceReport::new(result);
    assert_eq!(report.closures.len(), 1);
    assert_eq!(report.closures[0].walks, 1);
    let json = report.to_json().unwrap();
    assert!(json.contains("\"resolverTriggers\""));
}

#[test]
fn options_file_overrides_only_the_keys_it_names() {
    let dir = scratch_dir();
    let path = write(
        &dir,
        "options.json",
        r#"{ "classOptions": { "useThisObjectUsages": false }, "analyseAllClosures": false }"#,
    );

    let options = load_options(Some(&path)).unwrap();
    assert!(!options.class_options.use_this_object_usages);
    assert!(options.class_options.use_constructor_usages);
    assert!(options.seed_environment);
    assert!(!options.analyse_all_closures);
    assert_eq!(load_options(None).unwrap(), Default::default());
}

#[test]
fn closures_are_skipped_when_not_requested() {
    let dir = scratch_dir();
    let ast = write(&dir, "ast.json", AST);
    let snapshot = write(&dir, "snapshot.json", SNAPSHOT);
    let options = write(&dir, "options.json", r#"{ "analyseAllClosures": false }"#);

    let inference = dtsgen::infer_files(&ast, &snapshot, Some(&options)).unwrap();
    assert_eq!(inference.result.walk_count(ObjId(1)), 0);
    assert!(inference.result.node_at(ObjId(0), AstId(3)).is_some());
}

#[test]
fn the_outermost_program_is_found() {
    let dir = scratch_dir();
    let ast = write(&dir, "ast.json", AST);
    let snapshot = write(&dir, "snapshot.json", SNAPSHOT);

    let inputs = load_inputs(&ast, &snapshot, None).unwrap();
    assert_eq!(find_program(&inputs.ast), Some(AstId(11)));
    assert_eq!(inputs.program, Some(AstId(11)));
}

#[test]
fn load_errors_name_the_file() {
    let dir = scratch_dir();
    let missing = dir.path().join("missing.json");
    let snapshot = write(&dir, "snapshot.json", SNAPSHOT);

    let err = dtsgen::infer_files(&missing, &snapshot, None).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));

    let bad = write(&dir, "bad.json", r#"{ "nodes": [ { "type": "binary", "op": "**", "lhs": 0, "rhs": 0 } ] }"#);
    let err = dtsgen::infer_files(&bad, &snapshot, None).unwrap_err();
    assert!(format!("{err:#}").contains("failed to decode syntax tree"));

    let dangling = write(&dir, "dangling.json", r#"{ "global": 0, "objects": [ { "prototype": 7 } ] }"#);
    let ast = write(&dir, "ast.json", AST);
    let err = dtsgen::infer_files(&ast, &dangling, None).unwrap_err();
    assert!(format!("{err:#}").contains("failed to decode heap snapshot"));
}

#[test]
fn inference_errors_surface_through_anyhow() {
    let dir = scratch_dir();
    let ast = write(
        &dir,
        "ast.json",
        r#"{ "nodes": [
            { "type": "identifier", "name": "ghost", "declaration": null },
            { "type": "expressionStatement", "expression": 0 },
            { "type": "program", "body": [1] }
        ] }"#,
    );
    let snapshot = write(&dir, "snapshot.json", r#"{ "global": 0, "objects": [ {} ] }"#);

    let err = dtsgen::infer_files(&ast, &snapshot, None).unwrap_err();
    let infer_err = err.downcast_ref::<dtsgen::InferError>().unwrap();
    assert!(matches!(
        infer_err,
        dtsgen::InferError::MissingDeclaration { name, .. } if name == "ghost"
    ));
}
