use thiserror::Error;

use crate::integral::Integral;
use crate::types::{LookupDescriptor, UndefinedValuePolicy};

/// Runtime failure of a compiled lookup, surfaced to the lookup's caller.
/// Both variants are policy-selectable: hosts that pick non-`fail` policies
/// and define their negative sentinels never see them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("missing enum value {value} on type {type_name}")]
    MissingEnumValue { type_name: String, value: Integral },
    #[error("flag value {value} on type {type_name} is negative and has no defined member")]
    FlagValueOutOfRange { type_name: String, value: Integral },
}

/// Evaluate the compiled lookup for `value`, using the descriptor's own
/// separator for flag concatenation.
pub fn lookup(descriptor: &LookupDescriptor, value: Integral) -> Result<String, LookupError> {
    lookup_with_separator(descriptor, value, &descriptor.separator)
}

/// Evaluate the compiled lookup for `value` with a caller-supplied
/// separator (empty means direct concatenation). The result is
/// deterministic: the same `(value, separator, table)` always yields the
/// same string.
pub fn lookup_with_separator(
    descriptor: &LookupDescriptor,
    value: Integral,
    separator: &str,
) -> Result<String, LookupError> {
    if !descriptor.flags {
        return match find(descriptor, value) {
            Some(text) => Ok(text.to_string()),
            None => undefined(descriptor, value),
        };
    }
    decompose(descriptor, value, separator)
}

/// Exact table hit. The case table is ordered by the value comparator, so
/// this is a binary search.
fn find(descriptor: &LookupDescriptor, value: Integral) -> Option<&str> {
    descriptor
        .cases
        .binary_search_by(|case| case.value.cmp(&value))
        .ok()
        .map(|index| descriptor.cases[index].text.as_str())
}

fn undefined(descriptor: &LookupDescriptor, value: Integral) -> Result<String, LookupError> {
    match descriptor.undefined {
        UndefinedValuePolicy::RawValueAsString => Ok(value.to_string()),
        UndefinedValuePolicy::EmptyString => Ok(String::new()),
        UndefinedValuePolicy::Fail => Err(LookupError::MissingEnumValue {
            type_name: descriptor.set.name.clone(),
            value,
        }),
    }
}

/// Decompose a flag value into its constituent single-bit entries and
/// concatenate them in ascending bit order.
fn decompose(
    descriptor: &LookupDescriptor,
    value: Integral,
    separator: &str,
) -> Result<String, LookupError> {
    // Single-flag fast path: zero and exact powers of two return their
    // entry directly, bypassing the concatenation loop. Multi-bit values
    // always decompose, whatever the separator.
    if value.is_flag_candidate() {
        if let Some(text) = find(descriptor, value) {
            return Ok(text.to_string());
        }
    }

    let magnitude = match value.as_unsigned() {
        Some(magnitude) => magnitude,
        None => {
            // Negative combinations are never decomposed bit by bit; only
            // an exact entry can answer them.
            return match find(descriptor, value) {
                Some(text) => Ok(text.to_string()),
                None => Err(LookupError::FlagValueOutOfRange {
                    type_name: descriptor.set.name.clone(),
                    value,
                }),
            };
        }
    };

    if magnitude == 0 {
        // No zero entry: the undefined-value policy answers, not an empty
        // concatenation.
        return undefined(descriptor, value);
    }

    let mut out = String::new();
    let mut first = true;
    let mut bit = 1u64;
    loop {
        if magnitude & bit != 0 {
            if !first {
                out.push_str(separator);
            }
            match find(descriptor, Integral::Unsigned(bit)) {
                Some(text) => out.push_str(text),
                None => out.push_str(&bit.to_string()),
            }
            first = false;
        }
        if bit >= magnitude {
            break;
        }
        match bit.checked_mul(2) {
            Some(next) => bit = next,
            None => break,
        }
    }
    Ok(out)
}
