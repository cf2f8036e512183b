use casemap_core::{compile, IntegralType, MissingValuePolicy, ValueSetDecl, Visibility};
use pretty_assertions::assert_eq;

#[test]
fn minimal_declaration_fills_defaults() {
    let decl: ValueSetDecl = serde_json::from_str(
        r#"{
            "name": "Status",
            "cases": [ { "name": "Open", "value": 0 } ]
        }"#,
    )
    .unwrap();

    assert_eq!(decl.visibility, Visibility::Public);
    assert_eq!(decl.underlying, IntegralType::I32);
    assert!(!decl.flags);
    assert!(!decl.generic);
    assert!(decl.lookups.is_empty());
    assert!(decl.cases[0].annotations.is_empty());
}

#[test]
fn lookup_request_flattens_config_keys() {
    let decl: ValueSetDecl = serde_json::from_str(
        r#"{
            "name": "Status",
            "cases": [ { "name": "Open", "value": 0 } ],
            "lookups": [
                { "kind": "label", "missing": "kebab-case", "separator": "+", "method_name": "label_of" }
            ]
        }"#,
    )
    .unwrap();

    let request = &decl.lookups[0];
    assert_eq!(request.kind, "label");
    assert_eq!(request.config.missing, MissingValuePolicy::KebabCase);
    assert_eq!(request.config.separator.as_deref(), Some("+"));
    assert_eq!(request.config.method_name.as_deref(), Some("label_of"));
}

#[test]
fn output_envelope_json_keys() {
    let decl: ValueSetDecl = serde_json::from_str(
        r#"{
            "name": "Permissions",
            "namespace": "acme.io",
            "flags": true,
            "cases": [
                { "name": "Read",  "value": 1, "annotations": { "value": "R" } },
                { "name": "Write", "value": 2, "annotations": { "value": "W" } }
            ]
        }"#,
    )
    .unwrap();

    let output = compile(&decl).unwrap();
    let json = serde_json::to_value(&output).unwrap();
    let envelope = json.as_object().unwrap();

    assert!(envelope.contains_key("compilerVersion"));
    assert!(envelope.contains_key("descriptorVersion"));
    assert!(envelope.contains_key("descriptors"));
    assert!(envelope.contains_key("diagnostics"));

    let descriptor = &json["descriptors"][0];
    assert_eq!(descriptor["kind"], "value");
    assert_eq!(descriptor["outputTypeName"], "PermissionsValues");
    assert_eq!(descriptor["methodName"], "get_value");
    assert_eq!(descriptor["separator"], " | ");
    assert_eq!(descriptor["flags"], true);
    assert_eq!(descriptor["missing"], "fail");
    assert_eq!(descriptor["undefined"], "raw-value-as-string");
    assert_eq!(descriptor["set"]["name"], "Permissions");
    assert_eq!(descriptor["set"]["namespace"], "acme.io");
    assert_eq!(descriptor["set"]["underlying"], "i32");
    assert_eq!(descriptor["set"]["visibility"], "public");

    let case = &descriptor["cases"][0];
    assert_eq!(case["identifier"], "Read");
    assert_eq!(case["value"], 1);
    assert_eq!(case["text"], "R");
}

#[test]
fn diagnostic_json_keys() {
    let decl: ValueSetDecl = serde_json::from_str(
        r#"{
            "name": "Permissions",
            "flags": true,
            "cases": [
                { "name": "Read",    "value": 1, "annotations": { "value": "R" } },
                { "name": "Execute", "value": 4, "annotations": { "value": "X" } }
            ]
        }"#,
    )
    .unwrap();

    let output = compile(&decl).unwrap();
    let json = serde_json::to_value(&output).unwrap();
    let diagnostic = &json["diagnostics"][0];

    assert_eq!(diagnostic["kind"], "undefined-flag-member");
    assert_eq!(diagnostic["code"], "CM-W004");
    assert_eq!(diagnostic["severity"], "warning");
    assert_eq!(diagnostic["location"], "Permissions");
    assert!(diagnostic["message"].as_str().unwrap().contains("0x2"));
}

#[test]
fn descriptor_round_trips_through_json() {
    let decl: ValueSetDecl = serde_json::from_str(
        r#"{
            "name": "Sentiment",
            "cases": [
                { "name": "Happy", "value": 0, "annotations": { "value": "Green" } },
                { "name": "Sad",   "value": 2, "annotations": { "value": "Red" } }
            ]
        }"#,
    )
    .unwrap();

    let output = compile(&decl).unwrap();
    let json = serde_json::to_string(&output).unwrap();
    let back: casemap_core::CompileOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(output, back);
}
