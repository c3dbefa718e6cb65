use super::*;

#[test]
fn empty_object_keeps_defaults() {
    let options = InferenceOptions::from_json_str("{}").unwrap();
    assert_eq!(options, InferenceOptions::default());
    assert!(options.class_options.use_this_object_usages);
    assert!(options.seed_environment);
}

#[test]
fn camel_case_keys_override() {
    let options = InferenceOptions::from_json_str(
        r#"{ "classOptions": { "useConstructorUsages": false }, "analyseAllClosures": false }"#,
    )
    .unwrap();
    assert!(options.class_options.use_this_object_usages);
    assert!(!options.class_options.use_constructor_usages);
    assert!(!options.analyse_all_closures);
    assert!(options.seed_environment);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(InferenceOptions::from_json_str("{ \"seedEnvironment\": 3 }").is_err());
}
