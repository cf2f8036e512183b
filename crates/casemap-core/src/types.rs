use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::integral::Integral;

// ---------------------------------------------------------------------------
// Underlying integral types
// ---------------------------------------------------------------------------

/// The declared underlying integral type of a value set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegralType {
    I8,
    U8,
    I16,
    U16,
    #[default]
    I32,
    U32,
    I64,
    U64,
}

impl IntegralType {
    /// Whether values of this type can be negative.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
        }
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Behavior when a declared case has no explicit annotation for the
/// requested lookup kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingValuePolicy {
    /// Omit the case from the table; lookups on it fail at runtime.
    /// Each omitted case emits a `MissingAnnotation` diagnostic.
    #[default]
    Fail,
    /// The bare identifier, unchanged.
    UseIdentifier,
    PascalCase,
    CamelCase,
    KebabCase,
    SnakeCase,
    /// Decimal string of the constant value.
    RawValueAsString,
    EmptyString,
    LowerInvariant,
    UpperInvariant,
}

impl MissingValuePolicy {
    /// Whether this policy derives the string by re-casing the identifier.
    pub fn is_casing(self) -> bool {
        matches!(
            self,
            Self::PascalCase | Self::CamelCase | Self::KebabCase | Self::SnakeCase
        )
    }
}

/// Behavior when a looked-up value has no table entry (and, for flags, is
/// not handled by bit decomposition).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndefinedValuePolicy {
    #[default]
    RawValueAsString,
    EmptyString,
    Fail,
}

// ---------------------------------------------------------------------------
// Value set identity and declared cases
// ---------------------------------------------------------------------------

/// Identity of the value set being compiled. Created once per compilation
/// from host-provided facts, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSetInfo {
    /// Qualified name; may contain `.` for nested declarations.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub visibility: Visibility,
    pub underlying: IntegralType,
    /// Whether the host declared this set as a flag (bitwise) set.
    pub flags: bool,
    /// Whether the declaring type is generic (unsupported).
    pub generic: bool,
}

/// One declared member, as fed by the host for a single lookup kind.
/// Several raw cases may share a constant value (aliasing).
#[derive(Debug, Clone)]
pub struct RawCase {
    pub identifier: String,
    pub value: Integral,
    pub annotation: Option<String>,
}

/// One unique constant value with its final lookup string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCase {
    pub identifier: String,
    pub value: Integral,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Lookup configuration
// ---------------------------------------------------------------------------

/// Per-lookup configuration. Unset options fall back to value-set facts or
/// the documented defaults when the descriptor is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    pub missing: MissingValuePolicy,
    pub undefined: UndefinedValuePolicy,
    /// Overrides the value set's own flags marker when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

// ---------------------------------------------------------------------------
// Host-feed document (the declarative-config front end)
// ---------------------------------------------------------------------------

/// One declared member with its annotation strings, keyed by lookup kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDecl {
    pub name: String,
    pub value: Integral,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

/// One requested lookup over the value set's cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRequest {
    #[serde(default = "default_lookup_kind")]
    pub kind: String,
    #[serde(flatten)]
    pub config: LookupConfig,
}

impl Default for LookupRequest {
    fn default() -> Self {
        Self {
            kind: default_lookup_kind(),
            config: LookupConfig::default(),
        }
    }
}

fn default_lookup_kind() -> String {
    "value".to_string()
}

/// A complete value-set declaration: identity facts, ordered cases, and the
/// lookups to compile. An empty `lookups` list compiles one default lookup
/// of kind `"value"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSetDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub underlying: IntegralType,
    #[serde(default)]
    pub flags: bool,
    #[serde(default)]
    pub generic: bool,
    #[serde(default)]
    pub cases: Vec<CaseDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookups: Vec<LookupRequest>,
}

impl ValueSetDecl {
    pub fn info(&self) -> ValueSetInfo {
        ValueSetInfo {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            visibility: self.visibility,
            underlying: self.underlying,
            flags: self.flags,
            generic: self.generic,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup descriptor (the compiled artifact)
// ---------------------------------------------------------------------------

/// The complete artifact for one lookup: value-set identity, effective
/// configuration, and the ordered case table. Self-contained; everything a
/// renderer needs to emit a concrete lookup in any target representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupDescriptor {
    pub set: ValueSetInfo,
    /// The annotation kind this lookup was compiled from.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub visibility: Visibility,
    pub output_type_name: String,
    pub method_name: String,
    pub flags: bool,
    pub separator: String,
    pub missing: MissingValuePolicy,
    pub undefined: UndefinedValuePolicy,
    /// Ascending by constant value; negatives sort last.
    pub cases: Vec<ResolvedCase>,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MissingAnnotation,
    GenericValueSetUnsupported,
    DuplicateAliasedValue,
    UndefinedFlagMember,
}

impl DiagnosticKind {
    /// Stable identifier reported to hosts, 1:1 with the kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingAnnotation => "CM-W001",
            Self::GenericValueSetUnsupported => "CM-W002",
            Self::DuplicateAliasedValue => "CM-W003",
            Self::UndefinedFlagMember => "CM-W004",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Pure data; collected during compilation and returned alongside the
/// descriptors, never used as control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: String,
    pub severity: DiagnosticSeverity,
    /// `Type` or `Type.Member` the diagnostic attaches to.
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: impl Into<String>, message: String) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            severity: DiagnosticSeverity::Warning,
            location: location.into(),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Batch output envelope
// ---------------------------------------------------------------------------

/// Output of compiling one or more value sets: the descriptors plus every
/// diagnostic raised along the way, independent of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub compiler_version: String,
    pub descriptor_version: String,
    pub descriptors: Vec<LookupDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn new() -> Self {
        Self {
            compiler_version: COMPILER_VERSION.to_string(),
            descriptor_version: DESCRIPTOR_VERSION.to_string(),
            descriptors: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Merge another output into this one (used when compiling a batch of
    /// independent value sets).
    pub fn merge(&mut self, other: CompileOutput) {
        self.descriptors.extend(other.descriptors);
        self.diagnostics.extend(other.diagnostics);
    }
}

impl Default for CompileOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiler and descriptor-format version constants.
pub const COMPILER_VERSION: &str = "0.1.0";
pub const DESCRIPTOR_VERSION: &str = "1.0";

/// Separator used for flag concatenation unless overridden.
pub const DEFAULT_FLAGS_SEPARATOR: &str = " | ";
