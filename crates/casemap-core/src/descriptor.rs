use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::casing::InvalidConfiguration;
use crate::resolver::resolve_cases;
use crate::types::*;

/// Compile one value-set declaration into lookup descriptors.
///
/// Each requested lookup yields one descriptor; an empty request list
/// compiles a single default lookup of kind `"value"`. Problems surface as
/// diagnostics, never as aborts — a generic value set produces diagnostics
/// and no descriptors. The only hard error is a host-integration misuse
/// (`InvalidConfiguration`), fatal to this one value set.
pub fn compile(decl: &ValueSetDecl) -> Result<CompileOutput, InvalidConfiguration> {
    compile_with_cancel(decl, &CancellationToken::new())
}

/// [`compile`] with a cooperative cancellation signal, checked between
/// lookup requests and case groups. A cancelled compilation returns the
/// descriptors and diagnostics accumulated so far.
pub fn compile_with_cancel(
    decl: &ValueSetDecl,
    cancel: &CancellationToken,
) -> Result<CompileOutput, InvalidConfiguration> {
    let mut output = CompileOutput::new();
    let info = decl.info();

    if info.generic {
        output.diagnostics.push(Diagnostic::new(
            DiagnosticKind::GenericValueSetUnsupported,
            info.name.clone(),
            format!(
                "value set '{}' is declared in a generic type; move it to a non-generic type or namespace",
                info.name
            ),
        ));
        return Ok(output);
    }

    let default_request = [LookupRequest::default()];
    let requests: &[LookupRequest] = if decl.lookups.is_empty() {
        &default_request
    } else {
        &decl.lookups
    };

    debug!(set = %info.name, lookups = requests.len(), "compiling value set");

    for request in requests {
        if cancel.is_cancelled() {
            debug!(set = %info.name, "compilation cancelled");
            break;
        }
        let (descriptor, diagnostics) = build_descriptor(&info, decl, request, cancel)?;
        output.descriptors.push(descriptor);
        output.diagnostics.extend(diagnostics);
    }

    Ok(output)
}

fn build_descriptor(
    info: &ValueSetInfo,
    decl: &ValueSetDecl,
    request: &LookupRequest,
    cancel: &CancellationToken,
) -> Result<(LookupDescriptor, Vec<Diagnostic>), InvalidConfiguration> {
    let config = &request.config;
    let is_flags = config.flags.unwrap_or(info.flags);

    let raw_cases: Vec<RawCase> = decl
        .cases
        .iter()
        .map(|case| RawCase {
            identifier: case.name.clone(),
            value: case.value,
            annotation: case.annotations.get(&request.kind).cloned(),
        })
        .collect();

    let resolution = resolve_cases(info, &request.kind, &raw_cases, config.missing, is_flags, cancel)?;

    let descriptor = LookupDescriptor {
        set: info.clone(),
        kind: request.kind.clone(),
        namespace: config.namespace.clone().or_else(|| info.namespace.clone()),
        visibility: config.visibility.unwrap_or(info.visibility),
        output_type_name: config
            .output_type_name
            .clone()
            .unwrap_or_else(|| default_output_type_name(&info.name)),
        method_name: config
            .method_name
            .clone()
            .unwrap_or_else(|| format!("get_{}", request.kind)),
        flags: is_flags,
        separator: config
            .separator
            .clone()
            .unwrap_or_else(|| DEFAULT_FLAGS_SEPARATOR.to_string()),
        missing: config.missing,
        undefined: config.undefined,
        cases: resolution.cases,
    };

    Ok((descriptor, resolution.diagnostics))
}

/// Default output type name: the qualified set name with `.` flattened.
fn default_output_type_name(name: &str) -> String {
    format!("{}Values", name.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integral::Integral;
    use std::collections::HashMap;

    fn case(name: &str, value: i64, annotations: &[(&str, &str)]) -> CaseDecl {
        CaseDecl {
            name: name.to_string(),
            value: Integral::from(value),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn sentiment_decl() -> ValueSetDecl {
        ValueSetDecl {
            name: "Sentiment".to_string(),
            namespace: Some("app.comments".to_string()),
            visibility: Visibility::Public,
            underlying: IntegralType::I32,
            flags: false,
            generic: false,
            cases: vec![
                case("Happy", 0, &[("value", "Green")]),
                case("Neutral", 1, &[("value", "Yellow")]),
                case("Sad", 2, &[("value", "Red")]),
            ],
            lookups: vec![],
        }
    }

    #[test]
    fn empty_lookups_compile_a_default_value_lookup() {
        let output = compile(&sentiment_decl()).unwrap();
        assert_eq!(output.descriptors.len(), 1);

        let descriptor = &output.descriptors[0];
        assert_eq!(descriptor.kind, "value");
        assert_eq!(descriptor.method_name, "get_value");
        assert_eq!(descriptor.output_type_name, "SentimentValues");
        assert_eq!(descriptor.namespace.as_deref(), Some("app.comments"));
        assert_eq!(descriptor.separator, " | ");
        assert_eq!(descriptor.cases.len(), 3);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn config_overrides_apply() {
        let mut decl = sentiment_decl();
        decl.lookups = vec![LookupRequest {
            kind: "value".to_string(),
            config: LookupConfig {
                namespace: Some("app.helpers".to_string()),
                visibility: Some(Visibility::Internal),
                output_type_name: Some("SentimentHelpers".to_string()),
                method_name: Some("color_of".to_string()),
                missing: MissingValuePolicy::EmptyString,
                undefined: UndefinedValuePolicy::Fail,
                flags: None,
                separator: Some("+".to_string()),
            },
        }];

        let descriptor = &compile(&decl).unwrap().descriptors[0];
        assert_eq!(descriptor.namespace.as_deref(), Some("app.helpers"));
        assert_eq!(descriptor.visibility, Visibility::Internal);
        assert_eq!(descriptor.output_type_name, "SentimentHelpers");
        assert_eq!(descriptor.method_name, "color_of");
        assert_eq!(descriptor.undefined, UndefinedValuePolicy::Fail);
        assert_eq!(descriptor.separator, "+");
    }

    #[test]
    fn multiple_independent_lookups() {
        let mut decl = ValueSetDecl {
            name: "Greeting".to_string(),
            namespace: None,
            visibility: Visibility::Public,
            underlying: IntegralType::I32,
            flags: false,
            generic: false,
            cases: vec![
                case("Hi", 0, &[("spanish", "Hola"), ("french", "Salut")]),
                case(
                    "GoodMorning",
                    1,
                    &[("spanish", "Buenos días"), ("french", "Bonjour")],
                ),
            ],
            lookups: vec![],
        };
        decl.lookups = vec![
            LookupRequest {
                kind: "spanish".to_string(),
                config: LookupConfig::default(),
            },
            LookupRequest {
                kind: "french".to_string(),
                config: LookupConfig::default(),
            },
        ];

        let output = compile(&decl).unwrap();
        assert_eq!(output.descriptors.len(), 2);
        assert_eq!(output.descriptors[0].method_name, "get_spanish");
        assert_eq!(output.descriptors[0].cases[0].text, "Hola");
        assert_eq!(output.descriptors[1].method_name, "get_french");
        assert_eq!(output.descriptors[1].cases[0].text, "Salut");
    }

    #[test]
    fn generic_set_is_rejected_without_descriptors() {
        let mut decl = sentiment_decl();
        decl.generic = true;

        let output = compile(&decl).unwrap();
        assert!(output.descriptors.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].kind,
            DiagnosticKind::GenericValueSetUnsupported
        );
    }

    #[test]
    fn flags_override_beats_set_marker() {
        let mut decl = sentiment_decl();
        decl.lookups = vec![LookupRequest {
            kind: "value".to_string(),
            config: LookupConfig {
                flags: Some(true),
                missing: MissingValuePolicy::UseIdentifier,
                ..LookupConfig::default()
            },
        }];

        let descriptor = &compile(&decl).unwrap().descriptors[0];
        assert!(descriptor.flags);
    }

    #[test]
    fn nested_name_flattens_in_output_type_name() {
        let mut decl = sentiment_decl();
        decl.name = "Outer.Sentiment".to_string();
        let descriptor = &compile(&decl).unwrap().descriptors[0];
        assert_eq!(descriptor.output_type_name, "Outer_SentimentValues");
    }

    #[test]
    fn compile_is_deterministic() {
        let decl = ValueSetDecl {
            name: "Permissions".to_string(),
            namespace: None,
            visibility: Visibility::Public,
            underlying: IntegralType::I32,
            flags: true,
            generic: false,
            cases: vec![
                case("None", 0, &[("value", "-")]),
                case("Read", 1, &[("value", "R")]),
                case("Alias", 1, &[]),
                case("Execute", 4, &[]),
            ],
            lookups: vec![],
        };
        let a = compile(&decl).unwrap();
        let b = compile(&decl).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_compile_returns_partial_output() {
        let token = CancellationToken::new();
        token.cancel();
        let output = compile_with_cancel(&sentiment_decl(), &token).unwrap();
        assert!(output.descriptors.is_empty());
    }

    #[test]
    fn version_stamps_present() {
        let output = compile(&sentiment_decl()).unwrap();
        assert_eq!(output.compiler_version, COMPILER_VERSION);
        assert_eq!(output.descriptor_version, DESCRIPTOR_VERSION);
    }

    #[test]
    fn case_annotations_are_keyed_by_kind() {
        let decl = ValueSetDecl {
            name: "Level".to_string(),
            namespace: None,
            visibility: Visibility::Public,
            underlying: IntegralType::U8,
            flags: false,
            generic: false,
            cases: vec![CaseDecl {
                name: "High".to_string(),
                value: Integral::from(2i64),
                annotations: HashMap::from([("label".to_string(), "loud".to_string())]),
            }],
            lookups: vec![LookupRequest {
                kind: "label".to_string(),
                config: LookupConfig {
                    missing: MissingValuePolicy::UseIdentifier,
                    ..LookupConfig::default()
                },
            }],
        };
        let descriptor = &compile(&decl).unwrap().descriptors[0];
        assert_eq!(descriptor.cases[0].text, "loud");
    }
}
