use thiserror::Error;

use crate::types::MissingValuePolicy;

/// Host-integration programming error: a casing transform was requested with
/// a non-casing policy or an unusable identifier. Fatal to the one operation
/// that raised it, never collected as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid configuration: {0}")]
pub struct InvalidConfiguration(pub String);

/// Re-case an identifier assumed to be in upper-camel (Pascal) form.
///
/// Kebab and snake variants lower every uppercase letter and precede each
/// internal one with the separator; consecutive uppercase letters each get
/// their own separator (`IO` becomes `i-o`), which keeps the transform
/// reversible for acronym-free identifiers.
pub fn alter_casing(
    identifier: &str,
    policy: MissingValuePolicy,
) -> Result<String, InvalidConfiguration> {
    let separator = match policy {
        MissingValuePolicy::KebabCase => Some('-'),
        MissingValuePolicy::SnakeCase => Some('_'),
        MissingValuePolicy::PascalCase | MissingValuePolicy::CamelCase => None,
        other => {
            return Err(InvalidConfiguration(format!(
                "{other:?} is not a casing policy"
            )))
        }
    };

    let mut chars = identifier.chars();
    let first = chars
        .next()
        .ok_or_else(|| InvalidConfiguration("identifier was empty".to_string()))?;

    let mut out = String::with_capacity(identifier.len() * 2);
    if policy == MissingValuePolicy::PascalCase {
        out.extend(first.to_uppercase());
    } else {
        out.extend(first.to_lowercase());
    }

    for ch in chars {
        match separator {
            Some(sep) if ch.is_uppercase() => {
                out.push(sep);
                out.extend(ch.to_lowercase());
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case() {
        assert_eq!(
            alter_casing("ReadWrite", MissingValuePolicy::KebabCase).unwrap(),
            "read-write"
        );
    }

    #[test]
    fn snake_case() {
        assert_eq!(
            alter_casing("ReadWrite", MissingValuePolicy::SnakeCase).unwrap(),
            "read_write"
        );
    }

    #[test]
    fn camel_case() {
        assert_eq!(
            alter_casing("Read", MissingValuePolicy::CamelCase).unwrap(),
            "read"
        );
        assert_eq!(
            alter_casing("ReadWrite", MissingValuePolicy::CamelCase).unwrap(),
            "readWrite"
        );
    }

    #[test]
    fn pascal_case_identity() {
        assert_eq!(
            alter_casing("ReadWrite", MissingValuePolicy::PascalCase).unwrap(),
            "ReadWrite"
        );
        assert_eq!(
            alter_casing("readWrite", MissingValuePolicy::PascalCase).unwrap(),
            "ReadWrite"
        );
    }

    #[test]
    fn consecutive_uppercase_each_get_a_separator() {
        assert_eq!(
            alter_casing("IO", MissingValuePolicy::KebabCase).unwrap(),
            "i-o"
        );
        assert_eq!(
            alter_casing("ReadIO", MissingValuePolicy::SnakeCase).unwrap(),
            "read_i_o"
        );
    }

    #[test]
    fn single_letter() {
        assert_eq!(
            alter_casing("X", MissingValuePolicy::KebabCase).unwrap(),
            "x"
        );
    }

    #[test]
    fn empty_identifier_is_invalid() {
        let err = alter_casing("", MissingValuePolicy::KebabCase).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn non_casing_policy_is_invalid() {
        assert!(alter_casing("Read", MissingValuePolicy::Fail).is_err());
        assert!(alter_casing("Read", MissingValuePolicy::UseIdentifier).is_err());
        assert!(alter_casing("Read", MissingValuePolicy::RawValueAsString).is_err());
    }
}
