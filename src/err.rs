//! The one fault kind construction-time problems surface through, modeled
//! the way the teacher models its own error enums: `thiserror::Error` for
//! the `Display`/`std::error::Error` impl, `miette::Diagnostic` for
//! structured reporting, lower-case backtick-quoted messages.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Every construction-time failure this crate can produce.
///
/// Evaluation never fails (spec §7) — `ConfigError` only ever comes out of
/// `Engine::compile` and the type-adapter `*_or_throw` accessors.
//
// CAUTION: treat this type as part of the public API surface; adding a
// variant is not a breaking change for callers who already match on it
// with a wildcard arm, but removing or renaming one is.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConfigError {
    /// A record annotated `::{"namespace", <Name>}` didn't have exactly that
    /// annotation shape.
    #[error("record `{record}` has a malformed namespace declaration: {reason}")]
    NamespaceShape { record: SmolStr, reason: String },

    /// The same namespace name was declared more than once.
    #[error("namespace `{name}` is declared more than once (first in `{first_record}`, again in `{second_record}`)")]
    DuplicateNamespace {
        name: SmolStr,
        first_record: SmolStr,
        second_record: SmolStr,
    },

    /// `prioritizedCriteria` was missing, null, or not a list of text values.
    #[error("namespace `{name}`'s `prioritizedCriteria` is missing or not a list of text values")]
    InvalidPrioritizedCriteria { name: SmolStr },

    /// A content record's first annotation names a namespace that was never
    /// declared anywhere in the compiled input.
    #[error("record `{record}` is content for namespace `{namespace}`, which was never declared")]
    UndeclaredNamespace {
        record: SmolStr,
        namespace: SmolStr,
    },

    /// An annotation or field name expected to parse as `[!]<name>-<value>`
    /// did not.
    #[error("record `{record}` has a malformed criterion annotation: `{text}`")]
    MalformedCriterion { record: SmolStr, text: SmolStr },

    /// A content record's top-level value wasn't a struct.
    #[error("record `{record}` is not a struct: {reason}")]
    ContentShape { record: SmolStr, reason: String },

    /// A rule used a criterion name absent from its namespace's
    /// `prioritizedCriteria`.
    #[error("record `{record}` uses criterion `{criterion}`, which is not in namespace `{namespace}`'s prioritizedCriteria")]
    CriterionNotPrioritized {
        record: SmolStr,
        namespace: SmolStr,
        criterion: SmolStr,
    },

    /// A list sub-field (an element annotated with a criterion) didn't have
    /// exactly one field, or that field wasn't named `value`/`values`, or a
    /// `values` field wasn't list-typed.
    #[error("record `{record}` has a malformed sub-field: {reason}")]
    SubFieldShape { record: SmolStr, reason: String },

    /// A file or directory named as a record source could not be read.
    #[error("failed to load `{path}`: {reason}")]
    SourceIo { path: String, reason: String },

    /// A type adapter's `*_or_throw` accessor was called on an absent value.
    #[error("expected a value for `{field}` in namespace `{namespace}`, but it was absent")]
    ValueAbsent { namespace: SmolStr, field: SmolStr },

    /// `cascade_config::default()` was called before `set_default()`.
    #[error("no default engine has been installed; call cascade_config::set_default() first")]
    NoDefaultEngine,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
