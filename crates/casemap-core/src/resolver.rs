use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::casing::{alter_casing, InvalidConfiguration};
use crate::integral::Integral;
use crate::types::*;

/// Output of resolving one lookup's cases: the ordered table plus every
/// diagnostic raised along the way.
#[derive(Debug, Clone, Default)]
pub struct CaseResolution {
    pub cases: Vec<ResolvedCase>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve the declared cases of a value set into an ordered lookup table.
///
/// Aliased values collapse to their first-declared member (all aliases are
/// reported), flag sets drop every non-candidate value, missing annotations
/// follow `missing`, and the result is ordered ascending by constant value
/// with negatives last. Per-case failures become diagnostics; the only hard
/// error is a host-integration misuse surfaced by the casing transform.
pub fn resolve_cases(
    set: &ValueSetInfo,
    kind: &str,
    raw_cases: &[RawCase],
    missing: MissingValuePolicy,
    is_flags: bool,
    cancel: &CancellationToken,
) -> Result<CaseResolution, InvalidConfiguration> {
    debug!(
        set = %set.name,
        kind,
        declared = raw_cases.len(),
        is_flags,
        "resolving value cases"
    );

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // Group by constant value, keeping declaration order within each group.
    // The first-declared member of a group wins; output order is by value.
    let mut groups: Vec<(Integral, Vec<&RawCase>)> = Vec::new();
    for case in raw_cases {
        match groups.iter_mut().find(|(value, _)| *value == case.value) {
            Some((_, members)) => members.push(case),
            None => groups.push((case.value, vec![case])),
        }
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    for (value, members) in &groups {
        if members.len() > 1 {
            let names: Vec<&str> = members.iter().map(|c| c.identifier.as_str()).collect();
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateAliasedValue,
                set.name.clone(),
                format!(
                    "the members '{}' in {} represent the same value ({}); keep one member for every unique value",
                    names.join(", "),
                    set.name,
                    value
                ),
            ));
        }
    }

    if is_flags {
        detect_missing_flag_members(set, &groups, &mut diagnostics);
    }

    let mut cases: Vec<ResolvedCase> = Vec::with_capacity(groups.len());
    for (value, members) in &groups {
        // Cancellation is advisory: a cancelled resolution returns the
        // cases accumulated so far.
        if cancel.is_cancelled() {
            debug!(set = %set.name, "resolution cancelled");
            break;
        }

        // Non-candidate flag values never get table entries; decomposition
        // reconstructs their strings from the single-bit members.
        if is_flags && !value.is_flag_candidate() {
            continue;
        }

        let case = members[0];
        let text = match &case.annotation {
            Some(text) => Some(text.clone()),
            None => resolve_fallback(set, kind, case, missing, &mut diagnostics)?,
        };

        if let Some(text) = text {
            cases.push(ResolvedCase {
                identifier: case.identifier.clone(),
                value: *value,
                text,
            });
        }
    }

    Ok(CaseResolution { cases, diagnostics })
}

/// Apply the missing-value policy to a case with no explicit annotation.
/// Returns `None` when the case must be omitted from the table.
fn resolve_fallback(
    set: &ValueSetInfo,
    kind: &str,
    case: &RawCase,
    missing: MissingValuePolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<String>, InvalidConfiguration> {
    let text = match missing {
        MissingValuePolicy::Fail => {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingAnnotation,
                format!("{}.{}", set.name, case.identifier),
                format!(
                    "add a '{}' annotation to '{}.{}' or set the missing-value policy to other than 'fail'",
                    kind, set.name, case.identifier
                ),
            ));
            return Ok(None);
        }
        MissingValuePolicy::UseIdentifier => case.identifier.clone(),
        MissingValuePolicy::RawValueAsString => case.value.to_string(),
        MissingValuePolicy::EmptyString => String::new(),
        MissingValuePolicy::LowerInvariant => case.identifier.to_lowercase(),
        MissingValuePolicy::UpperInvariant => case.identifier.to_uppercase(),
        policy => alter_casing(&case.identifier, policy)?,
    };
    Ok(Some(text))
}

/// Advisory scan: every power of two below the largest declared flag
/// candidate should have a declared member.
fn detect_missing_flag_members(
    set: &ValueSetInfo,
    groups: &[(Integral, Vec<&RawCase>)],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let declared: HashSet<u64> = groups
        .iter()
        .filter(|(value, _)| value.is_flag_candidate())
        .filter_map(|(value, _)| value.as_unsigned())
        .collect();

    let max = declared.iter().copied().max().unwrap_or(0);

    let mut bit = 1u64;
    while bit < max {
        if !declared.contains(&bit) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UndefinedFlagMember,
                set.name.clone(),
                format!(
                    "add a member for the flag value {} (0x{:X}) to {}",
                    bit, bit, set.name
                ),
            ));
        }
        bit <<= 1;
    }
}
