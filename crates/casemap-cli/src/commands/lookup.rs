use std::path::Path;

use casemap_core::{compile, Integral, LookupDescriptor};

use crate::load_declarations;

/// Compile the definitions under `input_path` and evaluate one lookup
/// against a concrete value, exactly as the generated function would.
pub fn run_lookup(
    input_path: &Path,
    set: Option<&str>,
    kind: &str,
    raw_value: &str,
    separator: Option<&str>,
) -> Result<String, String> {
    let declarations = load_declarations(input_path)?;

    let (file, decl) = match set {
        Some(name) => declarations
            .iter()
            .find(|(_, d)| d.name == name)
            .ok_or_else(|| format!("No value set named '{name}' found"))?,
        None => {
            if declarations.len() > 1 {
                let names: Vec<&str> = declarations.iter().map(|(_, d)| d.name.as_str()).collect();
                return Err(format!(
                    "Multiple value sets found ({}); pass --set to pick one",
                    names.join(", ")
                ));
            }
            &declarations[0]
        }
    };

    let output = compile(decl).map_err(|e| format!("{file}: {e}"))?;
    let descriptor: &LookupDescriptor = output
        .descriptors
        .iter()
        .find(|d| d.kind == kind)
        .ok_or_else(|| format!("No '{kind}' lookup compiled for value set '{}'", decl.name))?;

    let value = parse_integral(raw_value)?;

    let result = match separator {
        Some(separator) => casemap_core::lookup_with_separator(descriptor, value, separator),
        None => casemap_core::lookup(descriptor, value),
    };
    result.map_err(|e| e.to_string())
}

fn parse_integral(raw: &str) -> Result<Integral, String> {
    if let Ok(signed) = raw.parse::<i64>() {
        return Ok(Integral::from(signed));
    }
    if let Ok(unsigned) = raw.parse::<u64>() {
        return Ok(Integral::Unsigned(unsigned));
    }
    Err(format!("Invalid integral value: {raw}"))
}
